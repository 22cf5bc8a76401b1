//! Application services - workflows composed over the ports.

mod post;

pub use post::{
    PagedView, PostService, PostServiceConfig, PostValidation, SavedPost, TRENDING_POSTS,
    VIEW_INCREMENT_JOB, ValidationFailure, ViewIncrement, view_increment_handler,
};
