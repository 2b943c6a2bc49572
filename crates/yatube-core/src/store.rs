//! The `FeedStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `yatube-store-sqlite`).
//! The feed composer, follow graph and comment aggregator depend on this
//! abstraction, not on any concrete backend.

use std::{collections::BTreeSet, future::Future};

use crate::model::{
  Comment, Group, GroupId, NewComment, NewGroup, NewPost, Post, PostChanges,
  PostId, User, UserId,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Which posts [`FeedStore::list_posts`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
  All,
  Group(GroupId),
  Author(UserId),
  /// Posts by any of the given authors. An empty set matches nothing.
  AuthorIn(BTreeSet<UserId>),
  /// Posts by every author this user follows.
  FollowedBy(UserId),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a relational store for users, groups, posts, comments and
/// follow edges.
///
/// Every write touches a single aggregate and is atomic. Deletions follow the
/// ownership rules of the data model: deleting a user removes their posts and
/// follow edges and nulls the author of their comments; deleting a group nulls
/// the group of its posts; deleting a post removes its comments.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait FeedStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user known to the authentication layer.
  fn create_user(
    &self,
    username: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Delete a user. Returns `false` if no such user existed.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  fn create_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group_by_slug(
    &self,
    slug: String,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  /// Delete a group; its posts survive with no group. Returns `false` if no
  /// such group existed.
  fn delete_group(
    &self,
    id: GroupId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a post. `pub_date` is set by the store.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Replace the editable fields of a post. Returns `None` if the post does
  /// not exist.
  fn update_post(
    &self,
    id: PostId,
    changes: PostChanges,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete a post and its comments. Returns `false` if no such post existed.
  fn delete_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Posts matching `filter`, newest first; ties broken by id, highest
  /// first.
  fn list_posts(
    &self,
    filter: PostFilter,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// At most `limit` posts matching `filter` in the same order as
  /// [`Self::list_posts`], skipping the first `offset`.
  fn list_posts_window(
    &self,
    filter: PostFilter,
    offset: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Number of posts matching `filter`.
  fn count_posts(
    &self,
    filter: PostFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_posts_by_author(
    &self,
    author: UserId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Follow edges ──────────────────────────────────────────────────────

  /// Insert the `(user, author)` edge unless it already exists.
  ///
  /// Returns `true` if a new edge was written. The check and the insert are a
  /// single atomic operation, so concurrent callers never create two edges.
  fn create_follow(
    &self,
    user: UserId,
    author: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove the `(user, author)` edge. Returns `true` if an edge was removed.
  fn delete_follow(
    &self,
    user: UserId,
    author: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn follows_exist(
    &self,
    user: UserId,
    author: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All authors `user` follows.
  fn following_authors_of(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<BTreeSet<UserId>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Persist a comment. `created` is set by the store.
  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments on a post, newest first.
  fn list_comments_for_post(
    &self,
    post: PostId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;
}
