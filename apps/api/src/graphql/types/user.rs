//! User GraphQL type

use async_graphql::{Object, ID};

use crate::models::User as DbUser;

/// Author of posts and comments
pub struct User {
    inner: DbUser,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self { inner: user }
    }
}

#[Object]
impl User {
    /// Unique user identifier
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// Display name
    async fn username(&self) -> &str {
        &self.inner.username
    }
}
