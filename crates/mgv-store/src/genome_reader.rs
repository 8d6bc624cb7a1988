// SPDX-License-Identifier: Apache-2.0

use crate::byte_cache::ByteCache;
use crate::fetcher::CachingFetcher;
use crate::key_store::KeyStore;
use crate::source::DataSource;
use crate::track::{FastaTrackReader, GffTrackReader, TrackReader};
use mgv_core::Result;
use mgv_model::{Genome, TrackFileType};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Track whose gene-level view is also exposed under `<track>.genes`.
pub const MODELS_TRACK: &str = "models";

#[must_use]
pub fn metadata_key(genome_path: &str) -> String {
    format!("{genome_path}::INFO")
}

/// Track readers for one genome plus the timestamp check gating them.
pub struct GenomeReader {
    genome: Arc<Genome>,
    fetcher: CachingFetcher,
    key_store: Arc<dyn KeyStore>,
    readers: BTreeMap<String, TrackReader>,
    ready: OnceCell<Result<()>>,
}

impl GenomeReader {
    #[must_use]
    pub fn new(
        genome: Arc<Genome>,
        source: Arc<dyn DataSource>,
        byte_cache: Arc<dyn ByteCache>,
        key_store: Arc<dyn KeyStore>,
    ) -> Self {
        let fetcher = CachingFetcher::new(source, byte_cache, genome.path());
        let mut readers = BTreeMap::new();
        for t in &genome.descriptor().tracks {
            match t.file_type() {
                TrackFileType::Gff => {
                    readers.insert(t.track.clone(), gff_reader(&fetcher, &genome, &t.track));
                    if t.track == MODELS_TRACK {
                        let genes = format!("{MODELS_TRACK}.genes");
                        readers.insert(genes.clone(), gff_reader(&fetcher, &genome, &genes));
                    }
                }
                TrackFileType::Fasta => {
                    readers.insert(
                        t.track.clone(),
                        TrackReader::Sequence(Arc::new(FastaTrackReader::new(
                            fetcher.clone(),
                            t.track.clone(),
                            genome.path(),
                            genome.url(),
                        ))),
                    );
                }
                _ => warn!(
                    genome = %genome.name(),
                    track = %t.track,
                    filetype = %t.filetype,
                    "skipping track with unsupported filetype"
                ),
            }
        }
        Self {
            genome,
            fetcher,
            key_store,
            readers,
            ready: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn genome(&self) -> &Arc<Genome> {
        &self.genome
    }

    #[must_use]
    pub fn reader(&self, track: &str) -> Option<&TrackReader> {
        self.readers.get(track)
    }

    pub fn track_names(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    /// Runs the timestamp check once; every caller observes the same outcome.
    pub async fn check_timestamp(&self) -> Result<()> {
        self.ready
            .get_or_init(|| self.compare_and_reset())
            .await
            .clone()
    }

    pub async fn ready(&self) -> Result<()> {
        self.check_timestamp().await
    }

    async fn compare_and_reset(&self) -> Result<()> {
        let key = metadata_key(self.genome.path());
        let cached = self.key_store.get(&key).await?;
        let cached_ts = cached
            .as_ref()
            .and_then(|v| v.get("timestamp"))
            .and_then(timestamp_text);
        if cached_ts.as_deref() == Some(self.genome.timestamp()) {
            debug!(genome = %self.genome.name(), "cached bytes are current");
            return Ok(());
        }
        info!(
            genome = %self.genome.name(),
            cached = cached_ts.as_deref().unwrap_or("none"),
            current = %self.genome.timestamp(),
            "genome timestamp changed, clearing cached bytes"
        );
        self.fetcher.clear_namespace().await?;
        let descriptor = serde_json::to_value(self.genome.descriptor())?;
        self.key_store.set(&key, descriptor).await
    }
}

fn gff_reader(fetcher: &CachingFetcher, genome: &Genome, track: &str) -> TrackReader {
    TrackReader::Features(Arc::new(GffTrackReader::new(
        fetcher.clone(),
        track,
        genome.path(),
        genome.url(),
    )))
}

fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
