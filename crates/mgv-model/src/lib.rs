// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Model types shared by the registrar, the layout engine and the data manager.

mod feature;
mod genome;
mod record;
mod region;
mod serde_helpers;
mod transcript;

pub use feature::{Feature, FeatureDraft, FeatureLayout};
pub use genome::{
    Chromosome, ChromosomeDescriptor, Genome, GenomeDescriptor, TrackDescriptor, TrackFileType,
    GENOME_DESCRIPTOR_TYPE,
};
pub use record::{ParseError, Strand, TrackRecord};
pub use region::{overlaps, Region};
pub use transcript::{decode_exons, Exon, TranscriptModel};

pub const CRATE_NAME: &str = "mgv-model";
