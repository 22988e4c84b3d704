//! Log parsing for the simulator's iteration and suspension markers.

pub mod parse;
pub mod record;

pub use parse::{LineClassifier, parse_corpus, parse_log_file};
pub use record::{IterationRecord, LogCorpus, LogEvent, SuspensionRecord};
