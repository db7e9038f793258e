pub mod content;
pub mod report;
pub mod taxonomy;

pub use crate::entities::content::ContentType;
pub use crate::entities::reports::{ReportReason, ReportStatus};
