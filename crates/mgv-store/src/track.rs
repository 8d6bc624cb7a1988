// SPDX-License-Identifier: Apache-2.0

use crate::fasta::parse_fasta_sequence;
use crate::fetcher::CachingFetcher;
use crate::gff::parse_gff3;
use crate::location::encode_query_value;
use async_trait::async_trait;
use mgv_core::{Error, Result};
use mgv_model::TrackRecord;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Records of one feature track, sorted by chromosome then position.
#[async_trait]
pub trait FeatureTrackReader: Send + Sync {
    fn track(&self) -> &str;
    async fn read_all(&self) -> Result<Vec<TrackRecord>>;
    async fn read_range(&self, chromosome: &str, start: u64, end: u64)
        -> Result<Vec<TrackRecord>>;
}

#[async_trait]
pub trait SequenceTrackReader: Send + Sync {
    fn track(&self) -> &str;
    async fn read_range(&self, chromosome: &str, start: u64, end: u64) -> Result<String>;
}

/// A named track reader of either kind.
#[derive(Clone)]
pub enum TrackReader {
    Features(Arc<dyn FeatureTrackReader>),
    Sequence(Arc<dyn SequenceTrackReader>),
}

impl TrackReader {
    #[must_use]
    pub fn track(&self) -> &str {
        match self {
            Self::Features(r) => r.track(),
            Self::Sequence(r) => r.track(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Features(_) => "features",
            Self::Sequence(_) => "sequence",
        }
    }

    pub fn features(&self) -> Result<&Arc<dyn FeatureTrackReader>> {
        match self {
            Self::Features(r) => Ok(r),
            Self::Sequence(r) => Err(Error::unknown_sequence_type(&format!(
                "track {} serves sequence, not features",
                r.track()
            ))),
        }
    }

    pub fn sequence(&self) -> Result<&Arc<dyn SequenceTrackReader>> {
        match self {
            Self::Sequence(r) => Ok(r),
            Self::Features(r) => Err(Error::unknown_sequence_type(&format!(
                "track {} serves features, not sequence",
                r.track()
            ))),
        }
    }
}

impl std::fmt::Debug for TrackReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackReader")
            .field("track", &self.track())
            .field("kind", &self.kind())
            .finish()
    }
}

fn track_url(base_url: &str, datatype: &str, genome_path: &str, track: &str) -> String {
    format!(
        "{}/fetch.cgi?datatype={datatype}&genome={}&track={}",
        base_url.trim_end_matches('/'),
        encode_query_value(genome_path),
        encode_query_value(track)
    )
}

fn range_suffix(chromosome: &str, start: u64, end: u64) -> String {
    format!(
        "&chr={}&start={start}&end={end}",
        encode_query_value(chromosome)
    )
}

pub struct GffTrackReader {
    fetcher: CachingFetcher,
    track: String,
    genome_path: String,
    base_url: String,
}

impl GffTrackReader {
    #[must_use]
    pub fn new(
        fetcher: CachingFetcher,
        track: impl Into<String>,
        genome_path: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            track: track.into(),
            genome_path: genome_path.into(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn all_url(&self) -> String {
        track_url(&self.base_url, "gff", &self.genome_path, &self.track)
    }

    #[must_use]
    pub fn range_url(&self, chromosome: &str, start: u64, end: u64) -> String {
        format!("{}{}", self.all_url(), range_suffix(chromosome, start, end))
    }

    async fn read_url(&self, url: &str) -> Result<Vec<TrackRecord>> {
        let bytes = self.fetcher.fetch(url).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::decode(format!("gff body is not utf-8: {e}")))?;
        let records = parse_gff3(text)?;
        debug!(track = %self.track, count = records.len(), "decoded gff records");
        Ok(records)
    }
}

#[async_trait]
impl FeatureTrackReader for GffTrackReader {
    fn track(&self) -> &str {
        &self.track
    }

    #[instrument(skip(self))]
    async fn read_all(&self) -> Result<Vec<TrackRecord>> {
        self.read_url(&self.all_url()).await
    }

    #[instrument(skip(self))]
    async fn read_range(
        &self,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<TrackRecord>> {
        self.read_url(&self.range_url(chromosome, start, end)).await
    }
}

pub struct FastaTrackReader {
    fetcher: CachingFetcher,
    track: String,
    genome_path: String,
    base_url: String,
}

impl FastaTrackReader {
    #[must_use]
    pub fn new(
        fetcher: CachingFetcher,
        track: impl Into<String>,
        genome_path: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            track: track.into(),
            genome_path: genome_path.into(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn range_url(&self, chromosome: &str, start: u64, end: u64) -> String {
        format!(
            "{}{}",
            track_url(&self.base_url, "fasta", &self.genome_path, &self.track),
            range_suffix(chromosome, start, end)
        )
    }
}

#[async_trait]
impl SequenceTrackReader for FastaTrackReader {
    fn track(&self) -> &str {
        &self.track
    }

    #[instrument(skip(self))]
    async fn read_range(&self, chromosome: &str, start: u64, end: u64) -> Result<String> {
        let bytes = self
            .fetcher
            .fetch(&self.range_url(chromosome, start, end))
            .await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::decode(format!("fasta body is not utf-8: {e}")))?;
        Ok(parse_fasta_sequence(text))
    }
}
