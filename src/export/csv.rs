use crate::timeline::JobTimeline;
use std::collections::BTreeMap;
use std::io::Write;

/// Write one row per reconstructed iteration.
///
/// Columns: Job_ID, Application_Name, Iteration, Cumulative_Time_ns,
/// Iteration_Time_ns, Skipped.
pub fn write_raw_csv<W: Write>(
    timelines: &BTreeMap<u64, JobTimeline>,
    names: &BTreeMap<u64, String>,
    writer: &mut W,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "Job_ID,Application_Name,Iteration,Cumulative_Time_ns,Iteration_Time_ns,Skipped"
    )?;

    for (job, timeline) in timelines {
        let name = names.get(job).map(String::as_str).unwrap_or("");
        for i in 0..timeline.len() {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                job,
                escape_csv_field(name),
                timeline.iteration[i],
                timeline.cumulative_time[i],
                timeline.duration[i],
                timeline.skipped[i],
            )?;
        }
    }

    Ok(())
}

/// Write one summary row per job, with statistics computed over the
/// non-skipped iteration durations only.
pub fn write_summary_csv<W: Write>(
    timelines: &BTreeMap<u64, JobTimeline>,
    names: &BTreeMap<u64, String>,
    writer: &mut W,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "Job_ID,Application_Name,Total_Iterations,Skipped_Iterations,\
         Mean_Iteration_Time_ns,Std_Iteration_Time_ns,Total_Virtual_Time_ns,\
         Max_Iteration_Time_ns,Min_Iteration_Time_ns"
    )?;

    for (job, timeline) in timelines {
        let name = names.get(job).map(String::as_str).unwrap_or("");
        let skipped_count = timeline.skipped.iter().filter(|&&s| s).count();
        let stats = DurationStats::of(timeline);

        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            job,
            escape_csv_field(name),
            timeline.len(),
            skipped_count,
            stats.mean,
            stats.std,
            stats.total,
            stats.max,
            stats.min,
        )?;
    }

    Ok(())
}

/// Statistics over a timeline's non-skipped durations; all zero when the
/// job has none (every iteration skipped, or nothing logged).
struct DurationStats {
    mean: f64,
    std: f64,
    total: f64,
    max: f64,
    min: f64,
}

impl DurationStats {
    fn of(timeline: &JobTimeline) -> Self {
        let kept: Vec<f64> = timeline
            .duration
            .iter()
            .zip(&timeline.skipped)
            .filter(|&(_, &skipped)| !skipped)
            .map(|(&d, _)| d)
            .collect();

        if kept.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
                total: 0.0,
                max: 0.0,
                min: 0.0,
            };
        }

        let total: f64 = kept.iter().sum();
        let mean = total / kept.len() as f64;
        let variance = kept.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / kept.len() as f64;

        Self {
            mean,
            std: variance.sqrt(),
            total,
            max: kept.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: kept.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Escape a CSV field if it contains special characters.
fn escape_csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::job_names;
    use pretty_assertions::assert_eq;

    fn sample() -> BTreeMap<u64, JobTimeline> {
        let mut timelines = BTreeMap::new();
        timelines.insert(
            0,
            JobTimeline {
                job: 0,
                iteration: vec![0, 1, 5],
                cumulative_time: vec![10.0, 30.0, 31.0],
                duration: vec![10.0, 20.0, 0.0],
                skipped: vec![false, false, true],
            },
        );
        timelines
    }

    #[test]
    fn raw_rows_mirror_the_timeline() {
        let timelines = sample();
        let names = job_names(timelines.keys().copied(), &[]);

        let mut out = Vec::new();
        write_raw_csv(&timelines, &names, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Job_ID,Application_Name,Iteration,Cumulative_Time_ns,Iteration_Time_ns,Skipped\n\
             0,App_0,0,10,10,false\n\
             0,App_0,1,30,20,false\n\
             0,App_0,5,31,0,true\n"
        );
    }

    #[test]
    fn summary_statistics_ignore_skipped_iterations() {
        let timelines = sample();
        let names = job_names(timelines.keys().copied(), &["milc".to_string()]);

        let mut out = Vec::new();
        write_summary_csv(&timelines, &names, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let row = text.lines().nth(1).unwrap();
        // mean (10+20)/2 = 15, std = 5, total = 30, max = 20, min = 10
        assert_eq!(row, "0,milc,3,1,15,5,30,20,10");
    }

    #[test]
    fn all_skipped_job_reports_zeros() {
        let mut timelines = BTreeMap::new();
        timelines.insert(
            2,
            JobTimeline {
                job: 2,
                iteration: vec![0, 4],
                cumulative_time: vec![1.0, 2.0],
                duration: vec![0.0, 0.0],
                skipped: vec![true, true],
            },
        );
        let names = job_names(timelines.keys().copied(), &[]);

        let mut out = Vec::new();
        write_summary_csv(&timelines, &names, &mut out).unwrap();
        let row = String::from_utf8(out).unwrap();
        assert_eq!(row.lines().nth(1).unwrap(), "2,App_2,2,2,0,0,0,0,0");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        assert_eq!(escape_csv_field("milc, 64 ranks"), "\"milc, 64 ranks\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("plain"), "plain");
    }
}
