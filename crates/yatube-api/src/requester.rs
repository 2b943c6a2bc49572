//! Request identity extractors.
//!
//! Authentication happens upstream; the authenticating proxy forwards the
//! username in the [`REMOTE_USER`] header.

use axum::{extract::FromRequestParts, http::request::Parts};
use yatube_core::{feed::Requester, model::User, store::FeedStore};

use crate::{AppState, error::ApiError};

pub const REMOTE_USER: &str = "x-remote-user";

/// The requester, anonymous when no [`REMOTE_USER`] header is present.
///
/// A header naming a user the store does not know is rejected with 401.
pub struct Caller(pub Requester);

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: FeedStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(REMOTE_USER) else {
      return Ok(Caller(Requester::Anonymous));
    };
    let username = value.to_str().map_err(|_| ApiError::Unauthorized)?.trim();
    if username.is_empty() {
      return Ok(Caller(Requester::Anonymous));
    }

    let user = state
      .store
      .get_user_by_username(username.to_owned())
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthorized)?;
    Ok(Caller(Requester::User(user)))
  }
}

/// An authenticated user; anonymous requests are rejected with 401.
pub struct AuthedUser(pub User);

impl<S> FromRequestParts<AppState<S>> for AuthedUser
where
  S: FeedStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match Caller::from_request_parts(parts, state).await?.0 {
      Requester::User(user) => Ok(AuthedUser(user)),
      Requester::Anonymous => Err(ApiError::Unauthorized),
    }
  }
}
