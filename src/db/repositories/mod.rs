pub mod song;
pub mod user;
