//! Domain models for Threadline
//!
//! This module contains the SQLx/serde models for:
//! - Posts and their comment switch
//! - Comments forming a forest per post
//! - Read-only users

pub mod comment;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentId, NewComment};
pub use post::{NewPost, Post, PostId};
pub use user::{User, UserId};
