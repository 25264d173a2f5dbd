pub mod manager;
pub mod query_builder;
pub mod models;

pub mod categories;
pub mod comments;
pub mod locations;
pub mod posts;
pub mod users;

pub use manager::{DatabaseManager, DatabaseError};
pub use posts::PostScope;
