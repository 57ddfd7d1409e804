pub mod soil_analyses;
pub mod users;
