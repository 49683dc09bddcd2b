pub mod prelude;

pub mod songs;
pub mod users;
