//! Property tests for release planning.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use pystrano::domain::ports::FixedClock;
use pystrano::domain::services::ReleasePlanner;
use pystrano::domain::value_objects::{KeepReleases, ReleaseId};

fn planner() -> ReleasePlanner {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    ReleasePlanner::new(Arc::new(FixedClock(now)))
}

/// Distinct release names, up to a year before the fixed clock, in
/// arbitrary order.
fn existing_releases() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set(0i64..(365 * 24 * 3600), 0..12).prop_flat_map(|offsets| {
        let base = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let names: Vec<String> = offsets
            .into_iter()
            .map(|s| ReleaseId::from_datetime(base + Duration::seconds(s)).to_string())
            .collect();
        Just(names).prop_shuffle()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: After pruning, at most `keep` releases remain (counting the new one),
    /// and only the oldest are removed.
    #[test]
    fn property_prune_keeps_newest(existing in existing_releases(), keep in 1u32..8) {
        let decision = planner().plan(KeepReleases::Newest(keep), &existing);

        let expected = existing.len().saturating_sub(keep as usize - 1);
        prop_assert_eq!(decision.releases_to_prune.len(), expected);

        let mut sorted = existing.clone();
        sorted.sort();
        prop_assert_eq!(&decision.releases_to_prune[..], &sorted[..expected]);
    }

    /// PROPERTY: Keeping all releases never prunes.
    #[test]
    fn property_keep_all_never_prunes(existing in existing_releases(), n in -5i64..=0) {
        let decision = planner().plan(KeepReleases::from_configured(n), &existing);
        prop_assert!(decision.releases_to_prune.is_empty());
    }

    /// PROPERTY: The new release sorts after every existing one and is never pruned.
    #[test]
    fn property_new_release_is_newest(existing in existing_releases(), keep in 1u32..8) {
        let decision = planner().plan(KeepReleases::Newest(keep), &existing);
        let new_name = decision.release_id.to_string();

        for name in &existing {
            let id: ReleaseId = name.parse().unwrap();
            prop_assert!(decision.release_id > id);
        }
        prop_assert!(!decision.releases_to_prune.contains(&new_name));
        prop_assert_eq!(decision.is_first_release, existing.is_empty());
    }

    /// PROPERTY: Names that are not release identifiers are never pruned.
    #[test]
    fn property_foreign_entries_survive(existing in existing_releases(), junk in "[a-z]{1,8}") {
        let mut listing = existing.clone();
        listing.push(junk.clone());
        let decision = planner().plan(KeepReleases::Newest(1), &listing);
        prop_assert!(!decision.releases_to_prune.contains(&junk));
        prop_assert_eq!(decision.releases_to_prune.len(), existing.len());
    }
}
