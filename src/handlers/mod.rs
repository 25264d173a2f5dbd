// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (optional token) → Protected (JWT + live user, /api/*) → Elevated (staff, /api/admin/*)
pub mod public;    // Tier 1: Browsing, registration and login
pub mod protected; // Tier 2: Authoring posts, comments and the own profile
pub mod elevated;  // Tier 3: Staff moderation and catalog management
