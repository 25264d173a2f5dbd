// handlers/protected/mod.rs - Authenticated handlers (/api/*)
//
// Every handler here runs behind `jwt_auth_middleware` and
// `validate_user_middleware`, so `Extension<CurrentUser>` is always present.

pub mod auth;       // GET /api/auth/whoami
pub mod comments;   // POST/PATCH/DELETE /api/posts/:id/comments[/:comment_id]
pub mod posts;      // POST /api/posts, PATCH/DELETE /api/posts/:id
pub mod profile;    // GET/PATCH /api/profile
pub mod submission; // JSON or multipart post bodies
