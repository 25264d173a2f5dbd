// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Anyone may browse. A valid bearer token is still honored through
// `OptionalUser` so authors can see their own unpublished posts.

pub mod auth;   // POST /auth/registration, POST /auth/login
pub mod blog;   // GET /, /posts/:id, /category/:slug, /profile/:username
pub mod health; // GET /health
pub mod pages;  // GET /pages/about, /pages/rules
