// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod index;
mod manager;
mod query;
mod registrar;

pub use index::FeatureIndex;
pub use manager::{DataManager, FeatureRef, GENES_TRACK, SEQUENCES_TRACK, TRANSCRIPTS_TRACK};
pub use query::{HttpQueryService, QueryService, SequenceType};
pub use registrar::{FeatureRegistrar, LayoutSettings};

pub const CRATE_NAME: &str = "mgv-data";
