pub mod media;
pub mod rating;
pub mod user;

pub use media::{ContentDetail, MediaCategory, MediaContent};
pub use rating::{Rating, RatingDetail};
pub use user::User;
