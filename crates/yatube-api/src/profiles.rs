//! Handlers for `/profiles/{username}` and follow edges.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use yatube_core::{model::User, store::FeedStore};

use crate::{
  AppState,
  error::ApiError,
  requester::{AuthedUser, Caller},
};

/// Summary shown at the top of an author's page.
#[derive(Debug, Serialize)]
pub struct Profile {
  pub author:     User,
  pub post_count: u64,
  /// Whether the requester follows this author; `false` when anonymous.
  pub following:  bool,
}

/// `GET /profiles/{username}`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  Caller(requester): Caller,
  Path(username): Path<String>,
) -> Result<Json<Profile>, ApiError>
where
  S: FeedStore + 'static,
{
  let author = state
    .store
    .get_user_by_username(username.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::from(yatube_core::Error::UserNotFound(username)))?;

  let post_count = state.comments.post_author_post_count(author.id).await?;
  let following = match requester.user() {
    Some(user) => state.follows.is_following(user.id, author.id).await?,
    None => false,
  };

  Ok(Json(Profile { author, post_count, following }))
}

/// `POST /profiles/{username}/follow`
pub async fn follow<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore + 'static,
{
  let edge = state.follows.follow_by_username(&user, &username).await?;
  Ok((StatusCode::CREATED, Json(edge)))
}

/// `DELETE /profiles/{username}/follow`; succeeds when no edge exists.
pub async fn unfollow<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  Path(username): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore + 'static,
{
  state.follows.unfollow_by_username(user.id, &username).await?;
  Ok(StatusCode::NO_CONTENT)
}
