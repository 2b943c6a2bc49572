//! JSON REST API for Yatube.
//!
//! Exposes an axum [`Router`] backed by any [`yatube_core::store::FeedStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility; the requester's identity arrives in the
//! [`requester::REMOTE_USER`] header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", yatube_api::api_router(state))
//! ```

pub mod error;
pub mod feeds;
pub mod posts;
pub mod profiles;
pub mod requester;

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use yatube_core::{
  cache::PageCache,
  comments::CommentAggregator,
  feed::FeedComposer,
  follow::FollowGraph,
  store::FeedStore,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub feeds:    Arc<FeedComposer<S>>,
  pub follows:  FollowGraph<S>,
  pub comments: Arc<CommentAggregator<S>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      feeds:    self.feeds.clone(),
      follows:  self.follows.clone(),
      comments: self.comments.clone(),
    }
  }
}

impl<S: FeedStore> AppState<S> {
  /// Wire the feed services over `store` with an in-memory page cache.
  pub fn new(store: Arc<S>, page_size: NonZeroUsize, cache_ttl: Duration) -> Self {
    Self {
      feeds: Arc::new(FeedComposer::new(
        store.clone(),
        PageCache::in_memory(cache_ttl),
        page_size,
      )),
      follows: FollowGraph::new(store.clone()),
      comments: Arc::new(CommentAggregator::new(store.clone())),
      store,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: FeedStore + 'static,
{
  Router::new()
    // Posts
    .route("/posts", get(feeds::global::<S>).post(posts::create::<S>))
    .route(
      "/posts/{id}",
      get(posts::detail::<S>)
        .put(posts::edit::<S>)
        .delete(posts::delete::<S>),
    )
    .route("/posts/{id}/comments", post(posts::comment::<S>))
    // Groups
    .route("/groups/{slug}/posts", get(feeds::group::<S>))
    // Profiles
    .route("/profiles/{username}", get(profiles::show::<S>))
    .route("/profiles/{username}/posts", get(feeds::author::<S>))
    .route(
      "/profiles/{username}/follow",
      post(profiles::follow::<S>).delete(profiles::unfollow::<S>),
    )
    // Subscriptions
    .route("/follow/posts", get(feeds::personalized::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
