//! Error types for `yatube-core`.

use thiserror::Error;

use crate::model::PostId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("group not found: {0:?}")]
  GroupNotFound(String),

  #[error("user not found: {0:?}")]
  UserNotFound(String),

  #[error("post not found: {0}")]
  PostNotFound(PostId),

  #[error("text must not be empty")]
  EmptyText,

  #[error("cannot follow yourself")]
  SelfFollow,

  #[error("already following {0:?}")]
  DuplicateFollow(String),

  #[error("post {0} belongs to another author")]
  NotAuthor(PostId),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`FeedStore`](crate::store::FeedStore).
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::GroupNotFound(_) | Self::UserNotFound(_) | Self::PostNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
