pub use super::categories::Entity as Categories;
pub use super::content::Entity as Content;
pub use super::genres::Entity as Genres;
pub use super::reports::Entity as Reports;
pub use super::users::Entity as Users;
