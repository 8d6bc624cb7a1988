// SPDX-License-Identifier: Apache-2.0

/// Greedy interval colouring: each interval goes to the lowest lane whose
/// last interval ended strictly before it starts, or to a new lane.
#[derive(Debug, Clone, Default)]
pub struct SwimLaneAssigner {
    lane_ends: Vec<u64>,
    last_start: u64,
}

impl SwimLaneAssigner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_next(&mut self, start: u64, end: u64) -> usize {
        debug_assert!(start >= self.last_start, "intervals must arrive sorted by start");
        self.last_start = start;
        match self.lane_ends.iter().position(|lane_end| *lane_end < start) {
            Some(lane) => {
                self.lane_ends[lane] = end;
                lane
            }
            None => {
                self.lane_ends.push(end);
                self.lane_ends.len() - 1
            }
        }
    }

    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lane_ends.len()
    }
}
