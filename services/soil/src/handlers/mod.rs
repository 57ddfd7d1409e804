pub mod extract;
pub mod health;
pub mod soil;
pub mod users;
