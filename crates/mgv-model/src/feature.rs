// SPDX-License-Identifier: Apache-2.0

use crate::{overlaps, Chromosome, Genome, ParseError, Strand, TrackRecord, TranscriptModel};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

const ATTR_ID: &str = "ID";
const ATTR_CLUSTER_ID: &str = "cID";
const ATTR_SYMBOL: &str = "symbol";
const ATTR_TRANSCRIPT_COUNT: &str = "tCount";

/// Layout slots computed by the per-chromosome assigners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureLayout {
    pub lane: usize,
    pub lane2: usize,
    pub contig: usize,
}

/// A decoded record that has not been laid out or sealed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDraft {
    pub id: String,
    pub cid: Option<String>,
    pub symbol: Option<String>,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
    pub so_type: String,
    pub source: String,
    pub transcript_count: u64,
    pub attributes: BTreeMap<String, String>,
}

impl FeatureDraft {
    /// Maps a raw gene record onto feature fields. Score, phase and the raw
    /// type column do not survive; the type is kept as the sequence-ontology type.
    pub fn from_record(record: &TrackRecord) -> Result<Self, ParseError> {
        let mut attributes = record.attrs.clone();
        let id = attributes
            .remove(ATTR_ID)
            .filter(|v| !v.is_empty())
            .ok_or(ParseError::Missing("feature ID"))?;
        let cid = attributes.remove(ATTR_CLUSTER_ID).filter(|v| !v.is_empty());
        let symbol = attributes.remove(ATTR_SYMBOL).filter(|v| !v.is_empty());
        let transcript_count = match attributes.remove(ATTR_TRANSCRIPT_COUNT) {
            None => 0,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidValue {
                    field: "tCount",
                    value: raw.clone(),
                })?,
        };
        if record.end < record.start {
            return Err(ParseError::InvalidValue {
                field: "feature span",
                value: format!("{}-{}", record.start, record.end),
            });
        }
        Ok(Self {
            id,
            cid,
            symbol,
            strand: record.strand,
            start: record.start,
            end: record.end,
            so_type: record.feature_type.clone(),
            source: record.source.clone(),
            transcript_count,
            attributes,
        })
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Packing weight: one slot per transcript, never less than one.
    #[must_use]
    pub fn weight(&self) -> u64 {
        self.transcript_count.max(1)
    }

    /// Seals the draft into an immutable feature.
    #[must_use]
    pub fn seal(self, genome: Arc<Genome>, chromosome: Chromosome, layout: FeatureLayout) -> Feature {
        let length = self.length();
        let display_id = self.cid.clone().unwrap_or_else(|| self.id.clone());
        let label = self.symbol.clone().unwrap_or_else(|| display_id.clone());
        Feature {
            id: self.id,
            cid: self.cid,
            symbol: self.symbol,
            genome,
            chromosome,
            strand: self.strand,
            start: self.start,
            end: self.end,
            length,
            so_type: self.so_type,
            source: self.source,
            transcript_count: self.transcript_count,
            attributes: self.attributes,
            display_id,
            label,
            layout,
            transcripts: OnceLock::new(),
        }
    }
}

/// A registered genomic feature.
///
/// Every field is fixed at construction. The transcript list is the single
/// deferred slot: it starts empty and can be filled once.
pub struct Feature {
    id: String,
    cid: Option<String>,
    symbol: Option<String>,
    genome: Arc<Genome>,
    chromosome: Chromosome,
    strand: Strand,
    start: u64,
    end: u64,
    length: u64,
    so_type: String,
    source: String,
    transcript_count: u64,
    attributes: BTreeMap<String, String>,
    display_id: String,
    label: String,
    layout: FeatureLayout,
    transcripts: OnceLock<Vec<TranscriptModel>>,
}

impl Feature {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    #[must_use]
    pub fn genome(&self) -> &Arc<Genome> {
        &self.genome
    }

    #[must_use]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub fn so_type(&self) -> &str {
        &self.so_type
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn transcript_count(&self) -> u64 {
        self.transcript_count
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Cluster id when present, else the feature id.
    #[must_use]
    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    /// Symbol when present, else the display id.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn lane(&self) -> usize {
        self.layout.lane
    }

    #[must_use]
    pub fn lane2(&self) -> usize {
        self.layout.lane2
    }

    #[must_use]
    pub fn contig(&self) -> usize {
        self.layout.contig
    }

    #[must_use]
    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    #[must_use]
    pub fn transcripts(&self) -> &[TranscriptModel] {
        self.transcripts.get().map_or(&[], Vec::as_slice)
    }

    /// Fills the transcript list if it is still empty. An empty `models` list
    /// leaves the slot open. Returns whether this call attached the models.
    pub fn attach_transcripts(&self, models: Vec<TranscriptModel>) -> bool {
        if models.is_empty() {
            return false;
        }
        self.transcripts.set(models).is_ok()
    }

    #[must_use]
    pub fn overlaps(&self, chromosome: &str, start: u64, end: u64) -> bool {
        self.chromosome.name == chromosome && overlaps(self.start, self.end, start, end)
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.genome.name() == other.genome.name() && self.id == other.id
    }
}

impl Eq for Feature {}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("id", &self.id)
            .field("cid", &self.cid)
            .field("symbol", &self.symbol)
            .field("genome", &self.genome.name())
            .field("chromosome", &self.chromosome.name)
            .field("strand", &self.strand)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Serialize for Feature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(serde::Serialize)]
        struct Wire<'a> {
            #[serde(rename = "ID")]
            id: &'a str,
            #[serde(rename = "cID", skip_serializing_if = "Option::is_none")]
            cid: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            symbol: Option<&'a str>,
            genome: &'a str,
            chr: &'a str,
            strand: &'a str,
            start: u64,
            end: u64,
            length: u64,
            sotype: &'a str,
            #[serde(rename = "tCount")]
            transcript_count: u64,
            id_display: &'a str,
            label: &'a str,
            lane: usize,
            lane2: usize,
            contig: usize,
            #[serde(skip_serializing_if = "<[TranscriptModel]>::is_empty")]
            transcripts: &'a [TranscriptModel],
            #[serde(skip_serializing_if = "BTreeMap::is_empty")]
            attributes: &'a BTreeMap<String, String>,
        }

        Wire {
            id: &self.id,
            cid: self.cid.as_deref(),
            symbol: self.symbol.as_deref(),
            genome: self.genome.name(),
            chr: &self.chromosome.name,
            strand: self.strand.as_symbol(),
            start: self.start,
            end: self.end,
            length: self.length,
            sotype: &self.so_type,
            transcript_count: self.transcript_count,
            id_display: &self.display_id,
            label: &self.label,
            lane: self.layout.lane,
            lane2: self.layout.lane2,
            contig: self.layout.contig,
            transcripts: self.transcripts(),
            attributes: &self.attributes,
        }
        .serialize(serializer)
    }
}
