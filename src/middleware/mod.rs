pub mod auth;
pub mod response;
pub mod staff;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser, OptionalUser};
pub use response::{ApiResponse, ApiResult};
pub use staff::require_staff_middleware;
pub use validate_user::{validate_user_middleware, CurrentUser};
