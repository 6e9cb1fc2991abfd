use proptest::prelude::*;

use super::run_checked;
use crate::{PageRecord, PageSet, Strategy as MeshStrategy};

/// Batches of 0 to 24 bitmaps that all share one length
fn batch_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (1usize..=40).prop_flat_map(|length| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), length), 0..=24)
    })
}

fn to_set(bitmaps: &[Vec<bool>]) -> PageSet {
    PageSet::from_records(bitmaps.iter().map(|bits| PageRecord::from_bits(bits)).collect()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_every_strategy_sound(bitmaps in batch_strategy()) {
        for identifier in MeshStrategy::IDENTIFIERS {
            let strategy: MeshStrategy = identifier.parse().unwrap();
            let result = run_checked(to_set(&bitmaps), &strategy);

            for (a, b) in result.pairs() {
                prop_assert!(a.is_compatible(b));
            }
            prop_assert_eq!(2 * result.meshed_count() + result.unmatched().count(), bitmaps.len());
        }
    }

    #[test]
    fn prop_exact_dominates(bitmaps in batch_strategy()) {
        let exact = run_checked(to_set(&bitmaps), &MeshStrategy::Exact).meshed_count();

        for identifier in MeshStrategy::IDENTIFIERS {
            let strategy: MeshStrategy = identifier.parse().unwrap();
            let found = run_checked(to_set(&bitmaps), &strategy).meshed_count();
            prop_assert!(found <= exact, "{} found {} > {}", identifier, found, exact);
        }
    }

    #[test]
    fn prop_occupancy_and_roundtrip(bits in prop::collection::vec(any::<bool>(), 1..=200)) {
        let record = PageRecord::from_bits(&bits);
        let text: String = bits.iter().map(|b| if *b { '1' } else { '0' }).collect();

        prop_assert_eq!(record.occupancy(), bits.iter().filter(|b| **b).count());
        prop_assert_eq!(record.to_bit_string(), text.clone());
        let parsed = PageRecord::parse(&text).unwrap();
        prop_assert_eq!(parsed.encoded(), record.encoded());
    }
}
