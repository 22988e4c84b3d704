use crate::log::SuspensionRecord;
use crate::timeline::{JobTimeline, TimelineError};
use std::collections::BTreeMap;

/// Per-job index of resume timestamps, sorted ascending and deduplicated.
///
/// Every rank of a suspended job logs the same resume event, so duplicates
/// are the norm. A job with no suspensions simply has no entry.
#[derive(Debug, Clone, Default)]
pub struct SuspensionIndex {
    resume_times: BTreeMap<u64, Vec<f64>>,
}

impl SuspensionIndex {
    pub fn build(records: &[SuspensionRecord]) -> Self {
        let mut resume_times: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
        for rec in records {
            resume_times.entry(rec.job).or_default().push(rec.resume_time);
        }
        for times in resume_times.values_mut() {
            times.sort_by(f64::total_cmp);
            times.dedup();
        }
        Self { resume_times }
    }

    pub fn resume_times(&self, job: u64) -> &[f64] {
        self.resume_times
            .get(&job)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Jobs that logged at least one suspension.
    pub fn jobs(&self) -> impl Iterator<Item = u64> + '_ {
        self.resume_times.keys().copied()
    }
}

/// Remove suspended idle time from the measured iteration durations.
///
/// Each resume event falls in the interval between two logged iterations;
/// the portion of that interval spent suspended is not iteration work, so it
/// is deducted from the duration of the iteration reported right after the
/// resume. Cumulative timestamps stay as observed.
pub fn correct_suspensions(
    timeline: &mut JobTimeline,
    resume_times: &[f64],
) -> Result<(), TimelineError> {
    for &resume_time in resume_times {
        // First iteration point reported strictly after the resume event.
        let Some(i) = timeline
            .cumulative_time
            .iter()
            .position(|&t| !(t <= resume_time))
        else {
            // Resume at or after the final logged iteration: nothing left to
            // correct for this event.
            continue;
        };
        if i == 0 {
            return Err(TimelineError::SuspendedBeforeFirstIteration {
                job: timeline.job,
                resume_time,
            });
        }
        if timeline.skipped[i] {
            // A skipped iteration carries no duration to deduct from.
            continue;
        }
        let offset = resume_time - timeline.cumulative_time[i - 1];
        timeline.duration[i] -= offset;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn susp(job: u64, resume_time: f64) -> SuspensionRecord {
        SuspensionRecord { job, resume_time }
    }

    fn timeline(cumulative_time: Vec<f64>) -> JobTimeline {
        let duration = cumulative_time
            .iter()
            .enumerate()
            .map(|(i, &t)| if i == 0 { t } else { t - cumulative_time[i - 1] })
            .collect();
        let n = cumulative_time.len();
        JobTimeline {
            job: 0,
            iteration: (0..n as u64).collect(),
            cumulative_time,
            duration,
            skipped: vec![false; n],
        }
    }

    #[test]
    fn index_sorts_and_dedups_across_ranks() {
        let index = SuspensionIndex::build(&[
            susp(1, 40.0),
            susp(1, 20.0),
            susp(1, 40.0),
            susp(3, 5.0),
        ]);
        assert_eq!(index.resume_times(1), &[20.0, 40.0]);
        assert_eq!(index.resume_times(3), &[5.0]);
        assert_eq!(index.resume_times(2), &[] as &[f64]);
    }

    #[test]
    fn idle_interval_is_deducted_from_the_following_iteration() {
        let mut tl = timeline(vec![0.0, 10.0, 30.0]);
        correct_suspensions(&mut tl, &[20.0]).unwrap();
        assert_eq!(tl.duration, vec![0.0, 10.0, 10.0]);
        // Observed timestamps are untouched.
        assert_eq!(tl.cumulative_time, vec![0.0, 10.0, 30.0]);
    }

    #[test]
    fn resume_after_the_last_iteration_is_ignored() {
        let mut tl = timeline(vec![0.0, 10.0]);
        correct_suspensions(&mut tl, &[10.0, 500.0]).unwrap();
        assert_eq!(tl.duration, vec![0.0, 10.0]);
    }

    #[test]
    fn resume_before_the_first_iteration_is_rejected() {
        let mut tl = timeline(vec![100.0, 110.0]);
        tl.job = 7;
        let err = correct_suspensions(&mut tl, &[50.0]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::SuspendedBeforeFirstIteration {
                job: 7,
                resume_time: 50.0,
            }
        );
    }

    #[test]
    fn multiple_resumes_correct_their_own_intervals() {
        let mut tl = timeline(vec![0.0, 10.0, 30.0, 60.0]);
        correct_suspensions(&mut tl, &[5.0, 40.0]).unwrap();
        assert_eq!(tl.duration, vec![0.0, 5.0, 20.0, 20.0]);
    }

    #[test]
    fn skipped_target_keeps_zero_duration() {
        let mut tl = timeline(vec![0.0, 10.0, 30.0]);
        tl.skipped[2] = true;
        tl.duration[2] = 0.0;
        correct_suspensions(&mut tl, &[20.0]).unwrap();
        assert_eq!(tl.duration, vec![0.0, 10.0, 0.0]);
    }
}
