// Rating CRUD and per-media statistics
pub mod create;
pub mod list;
pub mod record;
pub mod stats;

pub use create::rating_create;
pub use list::rating_list;
pub use record::{rating_delete, rating_get, rating_put};
pub use stats::media_stats;
