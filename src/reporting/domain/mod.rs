//! Domain model for retrieved session metadata.

mod information;
mod outcome;
mod report;

pub use information::TestInformation;
pub use outcome::{RetrievalOutcome, SkipReason};
pub use report::{AUTOMATION_SESSION, ReportParseError, SessionReport};
