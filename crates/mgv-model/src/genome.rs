// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::timestamp_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Value of the `type` field that marks a discovery object as a genome descriptor.
pub const GENOME_DESCRIPTOR_TYPE: &str = "genome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackFileType {
    Gff,
    Fasta,
    Other,
}

impl TrackFileType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "gff" | "gff3" => Self::Gff,
            "fasta" => Self::Fasta,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub track: String,
    pub filetype: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TrackDescriptor {
    #[must_use]
    pub fn file_type(&self) -> TrackFileType {
        TrackFileType::parse(&self.filetype)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A genome descriptor as served by the discovery document.
///
/// Unknown keys are preserved in `extra` so the descriptor can be persisted
/// as the last-seen metadata without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, with = "timestamp_string")]
    pub timestamp: String,
    #[serde(default)]
    pub chromosomes: Vec<ChromosomeDescriptor>,
    #[serde(default)]
    pub tracks: Vec<TrackDescriptor>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GenomeDescriptor {
    #[must_use]
    pub fn is_genome(&self) -> bool {
        self.kind == GENOME_DESCRIPTOR_TYPE
    }

    /// True when `value` is a JSON object whose `type` marks a genome.
    #[must_use]
    pub fn is_genome_value(value: &Value) -> bool {
        value.get("type").and_then(Value::as_str) == Some(GENOME_DESCRIPTOR_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Chromosome {
    pub name: String,
    /// Position within the owning genome's chromosome list.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

/// A registered genome. Immutable once built.
#[derive(Debug)]
pub struct Genome {
    name: String,
    short_name: Option<String>,
    path: String,
    url: String,
    timestamp: String,
    chromosomes: Vec<Chromosome>,
    name2chr: HashMap<String, usize>,
    tracks: BTreeSet<String>,
    descriptor: GenomeDescriptor,
}

impl Genome {
    /// Builds the genome, assigning chromosome indices in list order.
    /// `base_url` is used when the descriptor carries no url of its own.
    #[must_use]
    pub fn from_descriptor(mut descriptor: GenomeDescriptor, base_url: &str) -> Self {
        let url = descriptor
            .url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| base_url.to_string());
        descriptor.url = Some(url.clone());
        let chromosomes: Vec<Chromosome> = descriptor
            .chromosomes
            .iter()
            .enumerate()
            .map(|(index, c)| Chromosome {
                name: c.name.clone(),
                index,
                length: c.length,
            })
            .collect();
        let name2chr = chromosomes
            .iter()
            .map(|c| (c.name.clone(), c.index))
            .collect();
        let tracks = descriptor.tracks.iter().map(|t| t.track.clone()).collect();
        Self {
            name: descriptor.name.clone(),
            short_name: descriptor.shortname.clone().filter(|s| !s.is_empty()),
            path: descriptor.path.clone(),
            url,
            timestamp: descriptor.timestamp.clone(),
            chromosomes,
            name2chr,
            tracks,
            descriptor,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    #[must_use]
    pub fn chromosome(&self, name: &str) -> Option<&Chromosome> {
        self.name2chr.get(name).map(|idx| &self.chromosomes[*idx])
    }

    #[must_use]
    pub fn tracks(&self) -> &BTreeSet<String> {
        &self.tracks
    }

    #[must_use]
    pub fn descriptor(&self) -> &GenomeDescriptor {
        &self.descriptor
    }

    /// Every key this genome is registered under: name, path and short name.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str(), self.path.as_str()];
        if let Some(short) = self.short_name.as_deref() {
            out.push(short);
        }
        out
    }
}
