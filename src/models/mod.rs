pub mod job;
pub mod report;

pub use job::{JobRecord, JobStatus};
pub use report::ReportRecord;
