// SPDX-License-Identifier: Apache-2.0

use crate::ParseError;
use serde::{Deserialize, Serialize};

/// Closed-interval overlap on one chromosome: `a.start <= b.end && b.start <= a.end`.
#[must_use]
pub const fn overlaps(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Result<Self, ParseError> {
        let chromosome = chromosome.into();
        if chromosome.is_empty() {
            return Err(ParseError::Empty("region chromosome"));
        }
        if start == 0 || end == 0 {
            return Err(ParseError::InvalidFormat("region start/end must be >= 1"));
        }
        if start > end {
            return Err(ParseError::InvalidFormat("region start must be <= end"));
        }
        Ok(Self {
            chromosome,
            start,
            end,
        })
    }

    /// Parses `chromosome:start-end`. Chromosome names may themselves contain `:`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let (chromosome, rest) = input.rsplit_once(':').ok_or(ParseError::InvalidFormat(
            "region must be in chromosome:start-end format",
        ))?;
        let (start_raw, end_raw) = rest.split_once('-').ok_or(ParseError::InvalidFormat(
            "region must be in chromosome:start-end format",
        ))?;
        let start = start_raw
            .replace(',', "")
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidFormat("region start must be integer"))?;
        let end = end_raw
            .replace(',', "")
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidFormat("region end must be integer"))?;
        Self::new(chromosome, start, end)
    }

    #[must_use]
    pub fn canonical_string(&self) -> String {
        format!("{}:{}-{}", self.chromosome, self.start, self.end)
    }

    #[must_use]
    pub fn overlaps(&self, chromosome: &str, start: u64, end: u64) -> bool {
        self.chromosome == chromosome && overlaps(self.start, self.end, start, end)
    }
}
