// SPDX-License-Identifier: Apache-2.0

/// Groups consecutive intervals into contigs; a gap wider than `max_gap`
/// between an interval and its predecessor opens the next contig.
#[derive(Debug, Clone)]
pub struct ContigAssigner {
    max_gap: u64,
    current: usize,
    previous_end: Option<u64>,
}

impl ContigAssigner {
    #[must_use]
    pub fn new(max_gap: u64) -> Self {
        Self {
            max_gap,
            current: 0,
            previous_end: None,
        }
    }

    pub fn assign_next(&mut self, start: u64, end: u64) -> usize {
        if let Some(previous_end) = self.previous_end {
            if start.saturating_sub(previous_end) > self.max_gap {
                self.current += 1;
            }
        }
        self.previous_end = Some(end);
        self.current
    }

    #[must_use]
    pub fn max_gap(&self) -> u64 {
        self.max_gap
    }
}
