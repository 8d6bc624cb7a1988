// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use mgv_core::{Error, Result};
use mgv_model::{Feature, Genome};
use mgv_store::location::encode_query_value;
use mgv_store::DataSource;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceType {
    Dna,
    Transcript,
    Cds,
}

impl SequenceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dna => "dna",
            Self::Transcript => "transcript",
            Self::Cds => "cds",
        }
    }
}

impl FromStr for SequenceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dna" => Ok(Self::Dna),
            "transcript" => Ok(Self::Transcript),
            "cds" => Ok(Self::Cds),
            _ => Err(Error::unknown_sequence_type(s)),
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side query catalog and sequence export urls.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn queries(&self) -> Result<Value>;
    fn fasta_url(&self, feature: &Feature, kind: SequenceType, genomes: &[Arc<Genome>]) -> String;
}

pub struct HttpQueryService {
    source: Arc<dyn DataSource>,
    base_url: String,
}

impl HttpQueryService {
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    #[instrument(skip(self))]
    async fn queries(&self) -> Result<Value> {
        self.source
            .fetch_json(&format!("{}/fetch.cgi?datatype=queries", self.base_url))
            .await
    }

    fn fasta_url(&self, feature: &Feature, kind: SequenceType, genomes: &[Arc<Genome>]) -> String {
        let genomes = genomes
            .iter()
            .map(|g| encode_query_value(g.path()))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/fetch.cgi?datatype=fasta&type={kind}&ids={}&genomes={genomes}",
            self.base_url,
            encode_query_value(feature.id())
        )
    }
}
