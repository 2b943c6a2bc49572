//! Integration tests for `SqliteStore` and the core services running on it,
//! against an in-memory database.

mod follows;
mod store;

use std::sync::Arc;

use yatube_core::{
  model::{Group, NewGroup, NewPost, Post, User},
  store::FeedStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn shared_store() -> Arc<SqliteStore> { Arc::new(store().await) }

async fn user(s: &SqliteStore, username: &str) -> User {
  s.create_user(username.into()).await.unwrap()
}

async fn group(s: &SqliteStore, slug: &str) -> Group {
  s.create_group(NewGroup {
    slug:        slug.into(),
    title:       format!("Group {slug}"),
    description: "Test group".into(),
  })
  .await
  .unwrap()
}

async fn post(s: &SqliteStore, author: &User, text: &str, group: Option<&Group>) -> Post {
  s.create_post(NewPost {
    author_id: author.id,
    text:      text.into(),
    group_id:  group.map(|g| g.id),
    image:     None,
  })
  .await
  .unwrap()
}
