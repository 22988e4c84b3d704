use crate::log::IterationRecord;
use std::collections::BTreeMap;

/// One aggregated (job, iteration) observation: the arithmetic mean of every
/// rank's reported timestamp, plus whether any rank tagged the iteration as
/// fast-forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPoint {
    pub iteration: u64,
    pub mean_time: f64,
    /// Any contributing record carried the fast-forward tag.
    pub marker: bool,
}

/// Group iteration records by job, then by iteration number, reducing each
/// group to a single representative point.
///
/// Ranks of the same job report the same logical iteration at nearly the same
/// virtual time; the mean smooths the cross-rank reporting skew. Iterations
/// come out sorted ascending per job; missing iteration numbers are left as
/// gaps for skip detection to interpret.
pub fn aggregate(records: &[IterationRecord]) -> BTreeMap<u64, Vec<AggregatedPoint>> {
    let mut groups: BTreeMap<u64, BTreeMap<u64, (f64, u32, bool)>> = BTreeMap::new();
    for rec in records {
        let (sum, count, marker) = groups
            .entry(rec.job)
            .or_default()
            .entry(rec.iteration)
            .or_insert((0.0, 0, false));
        *sum += rec.timestamp;
        *count += 1;
        *marker |= rec.skipped_marker;
    }

    groups
        .into_iter()
        .map(|(job, iterations)| {
            let points = iterations
                .into_iter()
                .map(|(iteration, (sum, count, marker))| AggregatedPoint {
                    iteration,
                    mean_time: sum / f64::from(count),
                    marker,
                })
                .collect();
            (job, points)
        })
        .collect()
}
