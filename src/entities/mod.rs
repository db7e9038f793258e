pub mod prelude;

pub mod categories;
pub mod content;
pub mod genres;
pub mod reports;
pub mod users;
