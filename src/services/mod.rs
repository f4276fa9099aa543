pub mod database;
pub mod password;
pub mod users;
