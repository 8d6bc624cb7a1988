// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Everything between a discovery location and decoded track records:
//! transport, the namespaced byte cache, the metadata key store, track
//! readers and the genome registrar.

mod byte_cache;
mod fake;
mod fasta;
mod fetcher;
mod genome_reader;
mod gff;
mod key_store;
pub mod location;
mod registrar;
mod source;
mod track;

pub use byte_cache::{ByteCache, FsByteCache, MemoryByteCache};
pub use fake::FakeDataSource;
pub use fasta::parse_fasta_sequence;
pub use fetcher::CachingFetcher;
pub use genome_reader::{metadata_key, GenomeReader, MODELS_TRACK};
pub use gff::parse_gff3;
pub use key_store::{FsKeyStore, KeyStore, MemoryKeyStore};
pub use registrar::GenomeRegistrar;
pub use source::{DataSource, HttpDataSource, RetryPolicy};
pub use track::{
    FastaTrackReader, FeatureTrackReader, GffTrackReader, SequenceTrackReader, TrackReader,
};

pub const CRATE_NAME: &str = "mgv-store";

/// File holding the persisted key store inside the cache database directory.
pub const KEY_STORE_FILE: &str = "keys.json";
/// Subdirectory of the cache database directory holding cached bytes.
pub const BYTE_CACHE_DIR: &str = "bytes";
