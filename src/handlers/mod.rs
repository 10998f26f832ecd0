// Handlers organized by API area. Reads (list/get/stats/categories) are
// public; every mutation and /api/auth/me sit behind the JWT middleware.
pub mod auth;
pub mod content;
pub mod ratings;
