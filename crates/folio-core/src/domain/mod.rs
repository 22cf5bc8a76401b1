//! Domain entities - the core business objects.

mod category;
mod page;
mod post;
mod upload;
mod user;

pub use category::Category;
pub use page::{Page, PageRequest};
pub use post::Post;
pub use upload::UploadedFile;
pub use user::User;
