mod report;

pub use report::{Report, ReportOptions, SubvolumeIndex};
