//! Interval overlap clustering for agenda rendering.
//!
//! # Responsibility
//! - Partition a snapshot of schedules into transitively overlapping clusters.
//! - Keep member and cluster ordering deterministic for stable rendering.
//!
//! # Invariants
//! - Two schedules conflict only when their ranges strictly intersect, so
//!   touching endpoints never conflict.
//! - Every input schedule lands in exactly one cluster.
//! - Clusters are ordered by earliest member start.
//!
//! # See also
//! - docs/architecture/overlap.md

use crate::model::schedule::Schedule;
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// One group of transitively overlapping schedules.
///
/// Members need not overlap each other pairwise; a middle schedule can chain
/// two otherwise disjoint ones into a single cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapCluster {
    schedules: Vec<Schedule>,
    min_start: NaiveDateTime,
    max_end: NaiveDateTime,
}

impl OverlapCluster {
    fn new(schedule: Schedule) -> Self {
        Self {
            min_start: schedule.start,
            max_end: schedule.end,
            schedules: vec![schedule],
        }
    }

    // Sound only for start-sorted arrivals: the candidate starts no earlier
    // than any member, so intersecting the hull means strictly overlapping
    // the member that ends at `max_end`.
    fn intersects(&self, schedule: &Schedule) -> bool {
        self.min_start < schedule.end && schedule.start < self.max_end
    }

    fn push(&mut self, schedule: Schedule) {
        self.min_start = self.min_start.min(schedule.start);
        self.max_end = self.max_end.max(schedule.end);
        self.schedules.push(schedule);
    }

    /// Members in sweep order: start, then end, then name.
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Returns true when the cluster holds exactly one schedule.
    ///
    /// Singletons conflict with nothing; renderers draw them as plain cells
    /// instead of conflict groups.
    pub fn is_singleton(&self) -> bool {
        self.schedules.len() == 1
    }

    /// Earliest member start. Lower placement bound for grid rendering.
    pub fn start(&self) -> NaiveDateTime {
        self.min_start
    }

    /// Latest member end. Upper placement bound for grid rendering.
    pub fn end(&self) -> NaiveDateTime {
        self.max_end
    }
}

/// Partitions schedules into transitively overlapping clusters.
///
/// Input order does not matter. The result is ordered by earliest member
/// start; members within a cluster are ordered by start, then end, then
/// name. Cost is one sort plus a linear sweep.
pub fn cluster_by_overlap(mut schedules: Vec<Schedule>) -> Vec<OverlapCluster> {
    schedules.sort_by(compare_for_sweep);

    let mut clusters: Vec<OverlapCluster> = Vec::new();
    for schedule in schedules {
        // Only the newest cluster can still grow. Every earlier cluster was
        // sealed by some member starting at or after its max end, and starts
        // never decrease from there on.
        if let Some(cluster) = clusters.last_mut() {
            if cluster.intersects(&schedule) {
                cluster.push(schedule);
                continue;
            }
        }
        clusters.push(OverlapCluster::new(schedule));
    }
    clusters
}

fn compare_for_sweep(a: &Schedule, b: &Schedule) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.name.cmp(&b.name))
}
