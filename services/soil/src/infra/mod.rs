pub mod cache;
pub mod db;
pub mod inference;
pub mod mailer;
pub mod password;
pub mod storage;
