// SPDX-License-Identifier: Apache-2.0

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    MissingChromosome,
    UnknownGenome,
    UnknownTrack,
    UnknownSequenceType,
    Decode,
    Network,
    Storage,
    Config,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingChromosome => "missing_chromosome",
            Self::UnknownGenome => "unknown_genome",
            Self::UnknownTrack => "unknown_track",
            Self::UnknownSequenceType => "unknown_sequence_type",
            Self::Decode => "decode_error",
            Self::Network => "network_error",
            Self::Storage => "storage_error",
            Self::Config => "config_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error shared by every crate of the data layer.
///
/// It is `Clone` so that a failed single-flight operation can hand the same
/// outcome to every caller that attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn missing_chromosome(genome: &str, chromosome: &str) -> Self {
        Self::new(
            ErrorCode::MissingChromosome,
            format!("could not find chromosome {chromosome} in genome {genome}"),
        )
    }

    #[must_use]
    pub fn unknown_genome(genome: &str) -> Self {
        Self::new(
            ErrorCode::UnknownGenome,
            format!("genome {genome} is not registered"),
        )
    }

    #[must_use]
    pub fn unknown_track(genome: &str, track: &str) -> Self {
        Self::new(
            ErrorCode::UnknownTrack,
            format!("genome {genome} has no track named {track}"),
        )
    }

    #[must_use]
    pub fn unknown_sequence_type(kind: &str) -> Self {
        Self::new(
            ErrorCode::UnknownSequenceType,
            format!("unknown sequence type: {kind}"),
        )
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Decode, message)
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Storage, message)
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::decode(format!("json decode failed: {value}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::storage(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_machine_code() {
        let err = Error::missing_chromosome("mus_musculus", "chrZ");
        assert_eq!(err.code, ErrorCode::MissingChromosome);
        assert_eq!(
            err.to_string(),
            "missing_chromosome: could not find chromosome chrZ in genome mus_musculus"
        );
    }

    #[test]
    fn io_errors_map_to_storage() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code, ErrorCode::Storage);
    }
}
