pub use super::songs::Entity as Songs;
pub use super::users::Entity as Users;
