pub mod content;
pub mod report;
pub mod taxonomy;
pub mod user;
