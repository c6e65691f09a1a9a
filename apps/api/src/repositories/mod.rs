//! Storage backends for Threadline
//!
//! Two backends implement the service contracts:
//! - [`InMemoryStore`]: process-local tables, the default
//! - [`PgStore`]: PostgreSQL, built from one repository per table
//!
//! The repositories centralize the SQL for each table and return raw
//! `sqlx::Error`s; [`PgStore`] translates those into domain errors.

pub mod comment;
pub mod memory;
pub mod post;
pub mod postgres;
pub mod user;
pub mod utils;

pub use comment::CommentRepository;
pub use memory::InMemoryStore;
pub use post::PostRepository;
pub use postgres::PgStore;
pub use user::UserRepository;
