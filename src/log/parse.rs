use crate::Result;
use crate::log::record::{IterationRecord, LogCorpus, LogEvent, SuspensionRecord};
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Classifier for the two line grammars the simulator emits.
///
/// Iteration lines, optionally prefixed with the fast-forward tag:
/// `SKIPPED TO ITERATION 12 node 3 job 1 rank 7 time 1834.25`
/// `ITERATION 12 node 3 job 1 rank 7 time 1834.25`
///
/// Suspension lines:
/// `SUSPENDED node 3 job 1 rank 7 until time 2100.0`
///
/// Node and rank fields are consumed but not retained; the reconstruction
/// pools all ranks of a job anyway. Everything else in the log (simulator
/// diagnostics, MPI chatter) does not match and is dropped without error.
pub struct LineClassifier {
    iteration_re: Regex,
    suspension_re: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self> {
        // Capture:
        // 1) optional "SKIPPED TO " prefix
        // 2) iteration: integer
        // 3) job: integer
        // 4) timestamp: float/integer
        let iteration_re =
            Regex::new(r#"(SKIPPED TO )?ITERATION (\d+) node \d+ job (\d+) rank \d+ time ([0-9]*\.?[0-9]+)"#)?;
        // Capture: 1) job, 2) resume time
        let suspension_re =
            Regex::new(r#"SUSPENDED node \d+ job (\d+) rank \d+ until time ([0-9]*\.?[0-9]+)"#)?;
        Ok(Self {
            iteration_re,
            suspension_re,
        })
    }

    /// Classify one raw line. `None` means the line matches neither grammar.
    pub fn classify(&self, line: &str) -> Option<LogEvent> {
        if let Some(caps) = self.iteration_re.captures(line) {
            let skipped_marker = caps.get(1).is_some();
            let iteration: u64 = caps.get(2).unwrap().as_str().parse().ok()?;
            let job: u64 = caps.get(3).unwrap().as_str().parse().ok()?;
            let timestamp: f64 = caps.get(4).unwrap().as_str().parse().ok()?;
            return Some(LogEvent::Iteration(IterationRecord {
                job,
                iteration,
                timestamp,
                skipped_marker,
            }));
        }

        if let Some(caps) = self.suspension_re.captures(line) {
            let job: u64 = caps.get(1).unwrap().as_str().parse().ok()?;
            let resume_time: f64 = caps.get(2).unwrap().as_str().parse().ok()?;
            return Some(LogEvent::Suspension(SuspensionRecord { job, resume_time }));
        }

        None
    }
}

/// Parse one log file, appending its records to `corpus`.
pub fn parse_log_file(path: &Path, classifier: &LineClassifier, corpus: &mut LogCorpus) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read log file {}", path.display()))?;

    for line in text.lines() {
        if let Some(event) = classifier.classify(line) {
            corpus.absorb(event);
        }
    }

    Ok(())
}

/// Load a full log corpus from `path`.
///
/// A directory is taken to hold one file per simulated process, named
/// `pe=<n>.txt`; any other path is read as a single combined log. All
/// records are pooled regardless of which file produced them.
pub fn parse_corpus(path: &Path) -> Result<LogCorpus> {
    let classifier = LineClassifier::new()?;
    let mut corpus = LogCorpus::default();

    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .with_context(|| format!("read log directory {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("pe=") && n.ends_with(".txt"))
            })
            .collect();
        files.sort();

        for file in &files {
            parse_log_file(file, &classifier, &mut corpus)?;
        }
    } else {
        parse_log_file(path, &classifier, &mut corpus)?;
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(line: &str) -> Option<LogEvent> {
        LineClassifier::new().unwrap().classify(line)
    }

    #[test]
    fn iteration_line() {
        assert_eq!(
            classify("ITERATION 12 node 3 job 1 rank 7 time 1834.25"),
            Some(LogEvent::Iteration(IterationRecord {
                job: 1,
                iteration: 12,
                timestamp: 1834.25,
                skipped_marker: false,
            }))
        );
    }

    #[test]
    fn skip_tagged_iteration_line() {
        assert_eq!(
            classify("SKIPPED TO ITERATION 40 node 0 job 2 rank 0 time 9000"),
            Some(LogEvent::Iteration(IterationRecord {
                job: 2,
                iteration: 40,
                timestamp: 9000.0,
                skipped_marker: true,
            }))
        );
    }

    #[test]
    fn suspension_line() {
        assert_eq!(
            classify("SUSPENDED node 3 job 1 rank 7 until time 2100.0"),
            Some(LogEvent::Suspension(SuspensionRecord {
                job: 1,
                resume_time: 2100.0,
            }))
        );
    }

    #[test]
    fn interleaved_diagnostics_are_dropped() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("LP 4021 finished GVT sweep"), None);
        assert_eq!(classify("ITERATION twelve node 0 job 0 rank 0 time 1"), None);
    }

    #[test]
    fn directory_corpus_pools_per_process_files() {
        let dir = std::env::temp_dir().join(format!("jobtrace-parse-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("pe=0.txt"),
            "ITERATION 0 node 0 job 1 rank 0 time 10.0\nGVT sweep done\n",
        )
        .unwrap();
        fs::write(
            dir.join("pe=1.txt"),
            "ITERATION 0 node 0 job 1 rank 1 time 12.0\nSUSPENDED node 0 job 1 rank 1 until time 90.0\n",
        )
        .unwrap();
        fs::write(dir.join("model-result.txt"), "ITERATION 9 node 9 job 9 rank 9 time 9\n").unwrap();

        let corpus = parse_corpus(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        // Both pe files pooled; the stray non-pe file is not part of the run.
        assert_eq!(corpus.iterations.len(), 2);
        assert_eq!(corpus.suspensions.len(), 1);
        assert!(corpus.iterations.iter().all(|r| r.job == 1));
    }

    #[test]
    fn marker_survives_leading_timestamp_prefix() {
        // Lines often carry a per-rank prefix before the marker.
        assert_eq!(
            classify("[7] 0.0021s SKIPPED TO ITERATION 5 node 1 job 0 rank 7 time 312.5"),
            Some(LogEvent::Iteration(IterationRecord {
                job: 0,
                iteration: 5,
                timestamp: 312.5,
                skipped_marker: true,
            }))
        );
    }
}
