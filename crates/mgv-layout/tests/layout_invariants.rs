// SPDX-License-Identifier: Apache-2.0

use mgv_layout::{ContigAssigner, FeaturePacker, SwimLaneAssigner};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn sorted(raw: Vec<(u64, u64, u64)>) -> Vec<(u64, u64, u64)> {
    let mut v: Vec<(u64, u64, u64)> = raw
        .into_iter()
        .map(|(start, len, weight)| (start, start + len, weight))
        .collect();
    v.sort_by_key(|(start, _, _)| *start);
    v
}

fn intervals() -> impl Strategy<Value = Vec<(u64, u64, u64)>> {
    prop::collection::vec((1_u64..50_000, 0_u64..2_000, 1_u64..5), 0..200).prop_map(sorted)
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn intervals_in_one_lane_never_overlap(items in intervals()) {
        let mut sla = SwimLaneAssigner::new();
        let mut lane_last_end: Vec<Option<u64>> = Vec::new();
        for (start, end, _) in &items {
            let lane = sla.assign_next(*start, *end);
            if lane >= lane_last_end.len() {
                lane_last_end.resize(lane + 1, None);
            }
            if let Some(prev_end) = lane_last_end[lane] {
                prop_assert!(prev_end < *start);
            }
            // a lane is only skipped when it is busy
            for busy in lane_last_end.iter().take(lane).flatten() {
                prop_assert!(*busy >= *start);
            }
            lane_last_end[lane] = Some(*end);
        }
        prop_assert_eq!(sla.lane_count(), lane_last_end.len());
    }

    #[test]
    fn contig_index_is_monotonic_and_steps_by_one(items in intervals(), max_gap in 0_u64..5_000) {
        let mut ca = ContigAssigner::new(max_gap);
        let mut previous: Option<(usize, u64)> = None;
        for (start, end, _) in &items {
            let contig = ca.assign_next(*start, *end);
            match previous {
                None => prop_assert_eq!(contig, 0),
                Some((prev_contig, prev_end)) => {
                    let expected = if start.saturating_sub(prev_end) > max_gap {
                        prev_contig + 1
                    } else {
                        prev_contig
                    };
                    prop_assert_eq!(contig, expected);
                }
            }
            previous = Some((contig, *end));
        }
    }

    #[test]
    fn packer_window_reset_does_not_change_assignment(items in intervals(), reset_span in 1_u64..3_000) {
        let mut with_reset = FeaturePacker::new(2, reset_span);
        let mut without_reset = FeaturePacker::new(2, 0);
        for (start, end, weight) in &items {
            prop_assert_eq!(
                with_reset.assign_next(*start, *end, *weight, "f"),
                without_reset.assign_next(*start, *end, *weight, "f")
            );
        }
    }

    #[test]
    fn packer_never_reuses_a_lane_before_its_virtual_end(
        items in intervals(),
        gap in 0_u64..50,
        reset_span in 0_u64..3_000,
    ) {
        let mut packer = FeaturePacker::new(gap, reset_span);
        let mut lane_virtual_end: Vec<Option<u64>> = Vec::new();
        for (start, end, weight) in &items {
            let lane = packer.assign_next(*start, *end, *weight, "f");
            if lane >= lane_virtual_end.len() {
                lane_virtual_end.resize(lane + 1, None);
            }
            if let Some(busy_until) = lane_virtual_end[lane] {
                prop_assert!(busy_until < *start);
            }
            for busy in lane_virtual_end.iter().take(lane).flatten() {
                prop_assert!(*busy >= *start);
            }
            let length = end - start + 1;
            lane_virtual_end[lane] = Some(end + length * (weight - 1) + gap);
        }
    }
}
