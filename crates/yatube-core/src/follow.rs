//! The follow graph: directed `(user, author)` edges that drive the
//! personalized feed.

use std::{collections::BTreeSet, sync::Arc};

use tracing::info;

use crate::{
  Error, Result,
  model::{Follow, User, UserId},
  store::FeedStore,
};

/// Follow/unfollow operations over the edges held by a [`FeedStore`].
///
/// At most one edge exists per ordered pair. The existence check here gives a
/// precise error; the store's atomic insert is what actually guarantees the
/// invariant under concurrent writers.
pub struct FollowGraph<S> {
  store: Arc<S>,
}

impl<S> Clone for FollowGraph<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: FeedStore> FollowGraph<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Make `user` follow `author`.
  ///
  /// Fails with [`Error::SelfFollow`] for `user == author` and with
  /// [`Error::DuplicateFollow`] if the edge already exists; neither changes
  /// any state.
  pub async fn follow(&self, user: &User, author: &User) -> Result<Follow> {
    if user.id == author.id {
      return Err(Error::SelfFollow);
    }
    let duplicate = || Error::DuplicateFollow(author.username.clone());

    if self.is_following(user.id, author.id).await? {
      return Err(duplicate());
    }
    if !self
      .store
      .create_follow(user.id, author.id)
      .await
      .map_err(Error::store)?
    {
      return Err(duplicate());
    }

    info!(user = %user.username, author = %author.username, "followed");
    Ok(Follow { user: user.id, author: author.id })
  }

  /// Remove the edge if present. Unfollowing someone you do not follow is
  /// not an error.
  pub async fn unfollow(&self, user: UserId, author: UserId) -> Result<()> {
    let removed = self
      .store
      .delete_follow(user, author)
      .await
      .map_err(Error::store)?;
    if removed {
      info!(%user, %author, "unfollowed");
    }
    Ok(())
  }

  /// [`Self::follow`] with the author looked up by username.
  pub async fn follow_by_username(&self, user: &User, author: &str) -> Result<Follow> {
    let author = self
      .store
      .get_user_by_username(author.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(author.to_owned()))?;
    self.follow(user, &author).await
  }

  /// [`Self::unfollow`] with the author looked up by username. An unknown
  /// username is treated like a missing edge.
  pub async fn unfollow_by_username(&self, user: UserId, author: &str) -> Result<()> {
    let author = self
      .store
      .get_user_by_username(author.to_owned())
      .await
      .map_err(Error::store)?;
    match author {
      Some(author) => self.unfollow(user, author.id).await,
      None => Ok(()),
    }
  }

  pub async fn is_following(&self, user: UserId, author: UserId) -> Result<bool> {
    self
      .store
      .follows_exist(user, author)
      .await
      .map_err(Error::store)
  }

  /// Every author `user` follows; empty if they follow nobody.
  pub async fn following_set_of(&self, user: UserId) -> Result<BTreeSet<UserId>> {
    self
      .store
      .following_authors_of(user)
      .await
      .map_err(Error::store)
  }
}
