//! Release planning service
//!
//! Decides the identifier of the next release and which old releases
//! go away after cutover. Works only on the directory listing it is
//! given; the caller does the remote `ls`.

use std::sync::Arc;

use crate::domain::ports::Clock;
use crate::domain::value_objects::{KeepReleases, ReleaseId};

/// Outcome of planning one deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDecision {
    /// Name of the release directory about to be created
    pub release_id: ReleaseId,
    /// True when the releases directory was empty
    pub is_first_release: bool,
    /// Releases removed after cutover, oldest first
    pub releases_to_prune: Vec<String>,
}

/// Pure planning service
///
/// Deterministic given its inputs, apart from the injected clock.
#[derive(Clone)]
pub struct ReleasePlanner {
    clock: Arc<dyn Clock>,
}

impl ReleasePlanner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Plan a release against the current contents of `releases/`.
    ///
    /// Entries that are not release identifiers are left alone: they do not
    /// influence the new identifier and are never pruned.
    pub fn plan(&self, keep: KeepReleases, existing: &[String]) -> ReleaseDecision {
        let mut known: Vec<(ReleaseId, &String)> = existing
            .iter()
            .filter_map(|name| name.parse::<ReleaseId>().ok().map(|id| (id, name)))
            .collect();
        known.sort_by(|a, b| a.0.cmp(&b.0));

        let release_id = self.next_release_id(known.last().map(|(id, _)| id));
        let releases_to_prune = Self::prune_list(keep, &known);

        ReleaseDecision {
            release_id,
            is_first_release: existing.is_empty(),
            releases_to_prune,
        }
    }

    /// Identifier for "now", pushed past `newest` when the clock has not
    /// moved beyond it (same second, or clock behind the server's history).
    fn next_release_id(&self, newest: Option<&ReleaseId>) -> ReleaseId {
        let candidate = ReleaseId::from_datetime(self.clock.now());
        match newest {
            Some(newest) if *newest >= candidate => newest.successor().unwrap_or(candidate),
            _ => candidate,
        }
    }

    /// `known` must be sorted oldest first.
    fn prune_list(keep: KeepReleases, known: &[(ReleaseId, &String)]) -> Vec<String> {
        let keep = match keep {
            KeepReleases::All => return Vec::new(),
            KeepReleases::Newest(n) => n as usize,
        };

        // One slot is reserved for the release being deployed.
        let survivors = keep.saturating_sub(1);
        let prune_count = known.len().saturating_sub(survivors);

        known[..prune_count]
            .iter()
            .map(|(_, name)| (*name).clone())
            .collect()
    }
}
