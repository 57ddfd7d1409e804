pub mod analysis;
pub mod gateway;
pub mod register;
pub mod token;
pub mod verification;
