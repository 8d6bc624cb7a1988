// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Interval layout for one chromosome.
//!
//! Every assigner expects its intervals in ascending `start` order and
//! prefers the lowest lane or contig index that satisfies its constraint.

mod contig;
mod packer;
mod swim_lane;

pub use contig::ContigAssigner;
pub use packer::FeaturePacker;
pub use swim_lane::SwimLaneAssigner;

pub const CRATE_NAME: &str = "mgv-layout";
