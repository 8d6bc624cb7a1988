// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Missing(&'static str),
    InvalidFormat(&'static str),
    InvalidValue { field: &'static str, value: String },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Missing(name) => write!(f, "{name} is required"),
            Self::InvalidFormat(msg) => f.write_str(msg),
            Self::InvalidValue { field, value } => write!(f, "invalid {field}: {value}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for mgv_core::Error {
    fn from(value: ParseError) -> Self {
        mgv_core::Error::decode(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "+" => Ok(Self::Plus),
            "-" => Ok(Self::Minus),
            "." | "?" => Ok(Self::Unknown),
            _ => Err(ParseError::InvalidFormat(
                "strand must be one of '+', '-', '.', '?'",
            )),
        }
    }

    #[must_use]
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Unknown => ".",
        }
    }

    #[must_use]
    pub const fn is_plus(self) -> bool {
        matches!(self, Self::Plus)
    }
}

/// One decoded row of a feature track (GFF3 column layout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: Option<String>,
    pub strand: Strand,
    pub phase: Option<String>,
    pub attrs: BTreeMap<String, String>,
}

impl TrackRecord {
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}
