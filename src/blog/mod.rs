//! Blog domain rules shared by the HTTP handlers and the management CLI

pub mod forms;
pub mod pagination;
pub mod permissions;
pub mod slug;
pub mod visibility;

pub use pagination::{Page, PageQuery, Paginator};
pub use permissions::ensure_author;
pub use slug::slugify;
