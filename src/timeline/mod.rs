//! Timeline reconstruction: from pooled log records to one ordered,
//! duration-annotated, skip-aware sequence of iteration events per job.
//!
//! The pipeline per job is aggregate -> detect skips -> compute durations ->
//! correct for suspensions. Jobs are independent of each other; one job's
//! malformed records never block the others.

pub mod aggregate;
pub mod skip;
pub mod suspend;

use crate::log::LogCorpus;
use aggregate::AggregatedPoint;
use std::collections::BTreeMap;
use suspend::{SuspensionIndex, correct_suspensions};

/// Reconstruction failures that must be surfaced per job rather than
/// silently dropped: they indicate either a corrupt log corpus or an event
/// ordering bug in the simulator that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("job {job} suspended until time {resume_time} before its first logged iteration")]
    SuspendedBeforeFirstIteration { job: u64, resume_time: f64 },
}

impl TimelineError {
    pub fn job(&self) -> u64 {
        match self {
            Self::SuspendedBeforeFirstIteration { job, .. } => *job,
        }
    }
}

/// The reconstructed timeline of one job.
///
/// The four sequences run in lockstep, one entry per distinct iteration
/// number observed for the job, ascending. `cumulative_time` is the mean
/// observed virtual timestamp; `duration` is the virtual time spent in that
/// iteration, zero when skipped and net of any suspended idle interval.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobTimeline {
    pub job: u64,
    pub iteration: Vec<u64>,
    pub cumulative_time: Vec<f64>,
    pub duration: Vec<f64>,
    pub skipped: Vec<bool>,
}

impl JobTimeline {
    fn empty(job: u64) -> Self {
        Self {
            job,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.iteration.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iteration.is_empty()
    }

    /// Final observed virtual timestamp, if any iteration was logged.
    pub fn end_time(&self) -> Option<f64> {
        self.cumulative_time.last().copied()
    }

    /// Mean duration over non-skipped iterations. `None` when every entry
    /// was skipped (or the timeline is empty).
    pub fn mean_iteration_time(&self) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0u64;
        for (duration, &skipped) in self.duration.iter().zip(&self.skipped) {
            if !skipped {
                sum += duration;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }
}

/// The outcome of reconstructing a whole corpus: one timeline per job that
/// could be rebuilt, plus the per-job failures for those that could not.
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub timelines: BTreeMap<u64, JobTimeline>,
    pub failures: Vec<TimelineError>,
}

impl Reconstruction {
    /// Overall simulated run length: the latest final timestamp across jobs.
    pub fn simulation_end(&self) -> Option<f64> {
        self.timelines
            .values()
            .filter_map(JobTimeline::end_time)
            .max_by(f64::total_cmp)
    }
}

/// Reconstruct every job found in the corpus.
pub fn reconstruct(corpus: &LogCorpus) -> Reconstruction {
    let index = SuspensionIndex::build(&corpus.suspensions);

    let mut per_job = aggregate::aggregate(&corpus.iterations);
    // A job seen only through suspension records still gets a (degenerate)
    // timeline entry.
    for job in index.jobs() {
        per_job.entry(job).or_default();
    }

    let mut out = Reconstruction::default();
    for (job, points) in per_job {
        match build_job(job, &points, index.resume_times(job)) {
            Ok(timeline) => {
                out.timelines.insert(job, timeline);
            }
            Err(err) => out.failures.push(err),
        }
    }
    out
}

fn build_job(
    job: u64,
    points: &[AggregatedPoint],
    resume_times: &[f64],
) -> Result<JobTimeline, TimelineError> {
    if points.is_empty() {
        return Ok(JobTimeline::empty(job));
    }

    let skipped = skip::detect_skips(points);

    let iteration: Vec<u64> = points.iter().map(|p| p.iteration).collect();
    let cumulative_time: Vec<f64> = points.iter().map(|p| p.mean_time).collect();

    // Duration of the first iteration is measured from time zero; skipped
    // iterations contribute no measured cost at all.
    let duration: Vec<f64> = cumulative_time
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            if skipped[i] {
                0.0
            } else if i == 0 {
                t
            } else {
                t - cumulative_time[i - 1]
            }
        })
        .collect();

    let mut timeline = JobTimeline {
        job,
        iteration,
        cumulative_time,
        duration,
        skipped,
    };
    correct_suspensions(&mut timeline, resume_times)?;
    Ok(timeline)
}
