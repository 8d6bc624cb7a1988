// SPDX-License-Identifier: Apache-2.0

use crate::{ParseError, TrackRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptModel {
    pub gene_id: String,
    pub transcript_id: String,
    pub exons: Vec<Exon>,
}

impl TranscriptModel {
    /// Unpacks a transcript record: `Parent` names the gene, `ID` the
    /// transcript, and `exons` carries the packed exon coordinates.
    pub fn from_record(record: &TrackRecord) -> Result<Self, ParseError> {
        let gene_id = record
            .attr("Parent")
            .filter(|v| !v.is_empty())
            .ok_or(ParseError::Missing("transcript Parent"))?;
        let transcript_id = record
            .attr("ID")
            .filter(|v| !v.is_empty())
            .ok_or(ParseError::Missing("transcript ID"))?;
        let encoded = record
            .attr("exons")
            .ok_or(ParseError::Missing("transcript exons"))?;
        Ok(Self {
            gene_id: gene_id.to_string(),
            transcript_id: transcript_id.to_string(),
            exons: decode_exons(encoded, record.start)?,
        })
    }
}

/// Decodes `offset_length[,offset_length...]` relative to `transcript_start`
/// into absolute, closed exon intervals.
pub fn decode_exons(encoded: &str, transcript_start: u64) -> Result<Vec<Exon>, ParseError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    encoded
        .split(',')
        .map(|pair| {
            let (offset_raw, length_raw) =
                pair.trim()
                    .split_once('_')
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: "exon encoding",
                        value: pair.to_string(),
                    })?;
            let offset = parse_u64(offset_raw, pair)?;
            let length = parse_u64(length_raw, pair)?;
            if length == 0 {
                return Err(ParseError::InvalidValue {
                    field: "exon length",
                    value: pair.to_string(),
                });
            }
            let overflow = || ParseError::InvalidValue {
                field: "exon encoding",
                value: pair.to_string(),
            };
            let start = transcript_start.checked_add(offset).ok_or_else(overflow)?;
            let end = start.checked_add(length - 1).ok_or_else(overflow)?;
            Ok(Exon { start, end })
        })
        .collect()
}

fn parse_u64(raw: &str, pair: &str) -> Result<u64, ParseError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidValue {
            field: "exon encoding",
            value: pair.to_string(),
        })
}
