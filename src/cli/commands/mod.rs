pub mod category;
pub mod db;
pub mod location;
pub mod user;
