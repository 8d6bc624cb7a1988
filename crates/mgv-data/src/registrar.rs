// SPDX-License-Identifier: Apache-2.0

use crate::index::FeatureIndex;
use mgv_core::{MgvConfig, Result};
use mgv_layout::{ContigAssigner, FeaturePacker, SwimLaneAssigner};
use mgv_model::{Chromosome, Feature, FeatureDraft, FeatureLayout, Genome, Strand, TrackRecord};
use std::sync::Arc;
use tracing::warn;

/// Size limit and assigner parameters applied to every chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSettings {
    pub feature_size_limit: u64,
    pub contig_max_gap: u64,
    pub packer_gap: u64,
    pub packer_reset_span: u64,
}

impl LayoutSettings {
    #[must_use]
    pub fn from_config(config: &MgvConfig) -> Self {
        Self {
            feature_size_limit: config.feature_size_limit,
            contig_max_gap: config.contig_max_gap,
            packer_gap: config.packer_gap,
            packer_reset_span: config.packer_reset_span,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self::from_config(&MgvConfig::default())
    }
}

/// Ingests one chromosome's gene records: decode, size filter, layout, index.
///
/// The assigners live and die with the registrar, so no layout state leaks
/// between chromosomes. Records must arrive in ascending start order.
pub struct FeatureRegistrar<'a> {
    genome: Arc<Genome>,
    chromosome: Chromosome,
    index: &'a mut FeatureIndex,
    plus_lanes: SwimLaneAssigner,
    minus_lanes: SwimLaneAssigner,
    packer: FeaturePacker,
    contigs: ContigAssigner,
    size_limit: u64,
}

impl<'a> FeatureRegistrar<'a> {
    pub fn new(
        genome: Arc<Genome>,
        chromosome: Chromosome,
        index: &'a mut FeatureIndex,
        settings: &LayoutSettings,
    ) -> Self {
        Self {
            genome,
            chromosome,
            index,
            plus_lanes: SwimLaneAssigner::new(),
            minus_lanes: SwimLaneAssigner::new(),
            packer: FeaturePacker::new(settings.packer_gap, settings.packer_reset_span),
            contigs: ContigAssigner::new(settings.contig_max_gap),
            size_limit: settings.feature_size_limit,
        }
    }

    /// Returns `None` for a feature longer than the size limit; such a
    /// feature takes no layout slot and is not indexed.
    pub fn register(&mut self, record: &TrackRecord) -> Result<Option<Arc<Feature>>> {
        let draft = FeatureDraft::from_record(record)?;
        if draft.length() > self.size_limit {
            warn!(
                genome = %self.genome.name(),
                chromosome = %self.chromosome.name,
                id = %draft.id,
                length = draft.length(),
                limit = self.size_limit,
                "feature too big, skipping"
            );
            return Ok(None);
        }
        let contig = self.contigs.assign_next(draft.start, draft.end);
        let lanes = if draft.strand == Strand::Plus {
            &mut self.plus_lanes
        } else {
            &mut self.minus_lanes
        };
        let lane = lanes.assign_next(draft.start, draft.end);
        let lane2 = self
            .packer
            .assign_next(draft.start, draft.end, draft.weight(), &draft.id);
        let feature = Arc::new(draft.seal(
            Arc::clone(&self.genome),
            self.chromosome.clone(),
            FeatureLayout {
                lane,
                lane2,
                contig,
            },
        ));
        self.index.insert(&feature);
        Ok(Some(feature))
    }
}
