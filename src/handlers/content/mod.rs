// Media content CRUD and discovery
pub mod categories;
pub mod create;
pub mod list;
pub mod record;

pub use categories::categories;
pub use create::content_create;
pub use list::content_list;
pub use record::{content_delete, content_get, content_put};
