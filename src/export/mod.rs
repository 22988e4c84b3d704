//! Tabular output surfaces for reconstructed timelines.

pub mod csv;

pub use csv::{write_raw_csv, write_summary_csv};

use std::collections::BTreeMap;

/// Map each job id to a display name.
///
/// The legend list is indexed by job id; jobs beyond it (or runs with no
/// legends at all) fall back to `App_<job>`.
pub fn job_names(jobs: impl Iterator<Item = u64>, legends: &[String]) -> BTreeMap<u64, String> {
    jobs.map(|job| {
        let name = usize::try_from(job)
            .ok()
            .and_then(|i| legends.get(i).cloned())
            .unwrap_or_else(|| format!("App_{job}"));
        (job, name)
    })
    .collect()
}
