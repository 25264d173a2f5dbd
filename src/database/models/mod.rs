pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod user;

pub use category::Category;
pub use comment::{CommentRow, CommentView};
pub use location::Location;
pub use post::{AuthorRef, CategoryRef, LocationRef, PostRow, PostView};
pub use user::{User, UserProfile};
