// SPDX-License-Identifier: Apache-2.0

use tracing::trace;

/// Weighted lane assignment for the spread-transcript layout.
///
/// A feature with weight `w` keeps its lane busy up to a virtual end of
/// `end + (w - 1) * length + gap`, leaving room to draw `w` transcripts side
/// by side. Once the packed stretch exceeds `reset_span`, trailing lanes whose
/// occupancy already ended are dropped; only free lanes above every busy lane
/// are forgotten, so the assignments are the same as without the reset.
#[derive(Debug, Clone)]
pub struct FeaturePacker {
    gap: u64,
    reset_span: u64,
    lane_ends: Vec<u64>,
    window_start: u64,
    last_start: u64,
}

impl FeaturePacker {
    /// `reset_span == 0` disables forgetting.
    #[must_use]
    pub fn new(gap: u64, reset_span: u64) -> Self {
        Self {
            gap,
            reset_span,
            lane_ends: Vec::new(),
            window_start: 0,
            last_start: 0,
        }
    }

    pub fn assign_next(&mut self, start: u64, end: u64, weight: u64, id: &str) -> usize {
        debug_assert!(start >= self.last_start, "intervals must arrive sorted by start");
        self.last_start = start;
        if self.reset_span > 0 && start.saturating_sub(self.window_start) > self.reset_span {
            self.forget_finished(start, id);
        }

        let length = end.saturating_sub(start) + 1;
        let virtual_end = end
            .saturating_add(length.saturating_mul(weight.max(1) - 1))
            .saturating_add(self.gap);
        match self.lane_ends.iter().position(|lane_end| *lane_end < start) {
            Some(lane) => {
                self.lane_ends[lane] = virtual_end;
                lane
            }
            None => {
                self.lane_ends.push(virtual_end);
                self.lane_ends.len() - 1
            }
        }
    }

    fn forget_finished(&mut self, start: u64, id: &str) {
        let before = self.lane_ends.len();
        while self.lane_ends.last().is_some_and(|lane_end| *lane_end < start) {
            self.lane_ends.pop();
        }
        self.window_start = start;
        trace!(
            feature = id,
            forgotten = before - self.lane_ends.len(),
            "feature packer window reset"
        );
    }

    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lane_ends.len()
    }
}
