/// One observation of a job reaching an iteration, as reported by one rank.
///
/// Several ranks of the same job report the same logical iteration; the
/// aggregation step reduces them to one representative timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub job: u64,
    pub iteration: u64,
    /// Virtual (simulated) time at which the rank reported the iteration.
    pub timestamp: f64,
    /// True if the line was tagged as a fast-forward notification rather
    /// than a real completion.
    pub skipped_marker: bool,
}

/// One observation of a job being paused until a future virtual time.
#[derive(Debug, Clone, PartialEq)]
pub struct SuspensionRecord {
    pub job: u64,
    pub resume_time: f64,
}

/// A classified log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Iteration(IterationRecord),
    Suspension(SuspensionRecord),
}

/// All records pooled from one simulation run.
///
/// The corpus may come from a single log file or from one file per simulated
/// process; source-file identity carries no ordering significance, so the
/// records are simply concatenated.
#[derive(Debug, Clone, Default)]
pub struct LogCorpus {
    pub iterations: Vec<IterationRecord>,
    pub suspensions: Vec<SuspensionRecord>,
}

impl LogCorpus {
    pub fn absorb(&mut self, event: LogEvent) {
        match event {
            LogEvent::Iteration(rec) => self.iterations.push(rec),
            LogEvent::Suspension(rec) => self.suspensions.push(rec),
        }
    }
}
