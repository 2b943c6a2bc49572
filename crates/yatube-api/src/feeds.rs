//! Handlers for the paginated feed endpoints.
//!
//! | Method | Path | Feed |
//! |--------|------|------|
//! | `GET`  | `/posts?page=` | global |
//! | `GET`  | `/groups/{slug}/posts?page=` | group |
//! | `GET`  | `/profiles/{username}/posts?page=` | author |
//! | `GET`  | `/follow/posts?page=` | personalized |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use yatube_core::{
  cache::CachedPage,
  feed::{FeedRequest, Requester},
  pagination::PageNumber,
  store::FeedStore,
};

use crate::{AppState, error::ApiError, requester::Caller};

/// The raw `?page=` parameter. Kept as a string so malformed values fall
/// back to the first page instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub page: Option<String>,
}

impl PageParams {
  pub fn number(&self) -> PageNumber { PageNumber::parse(self.page.as_deref()) }
}

async fn serve<S>(
  state: &AppState<S>,
  request: FeedRequest,
  requester: &Requester,
  params: &PageParams,
) -> Result<Json<CachedPage>, ApiError>
where
  S: FeedStore + 'static,
{
  let page = state
    .feeds
    .compose(&request, requester, params.number())
    .await?;
  Ok(Json(page))
}

/// `GET /posts`
pub async fn global<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PageParams>,
) -> Result<Json<CachedPage>, ApiError>
where
  S: FeedStore + 'static,
{
  serve(&state, FeedRequest::Global, &Requester::Anonymous, &params).await
}

/// `GET /groups/{slug}/posts`
pub async fn group<S>(
  State(state): State<AppState<S>>,
  Path(slug): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<CachedPage>, ApiError>
where
  S: FeedStore + 'static,
{
  serve(&state, FeedRequest::ByGroup(slug), &Requester::Anonymous, &params).await
}

/// `GET /profiles/{username}/posts`
pub async fn author<S>(
  State(state): State<AppState<S>>,
  Path(username): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<CachedPage>, ApiError>
where
  S: FeedStore + 'static,
{
  serve(&state, FeedRequest::ByAuthor(username), &Requester::Anonymous, &params).await
}

/// `GET /follow/posts`; empty for anonymous callers.
pub async fn personalized<S>(
  State(state): State<AppState<S>>,
  Caller(requester): Caller,
  Query(params): Query<PageParams>,
) -> Result<Json<CachedPage>, ApiError>
where
  S: FeedStore + 'static,
{
  serve(&state, FeedRequest::Personalized, &requester, &params).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_param_falls_back_to_first() {
    let raw = |s: &str| PageParams { page: Some(s.into()) }.number().get();
    assert_eq!(PageParams::default().number(), PageNumber::FIRST);
    assert_eq!(raw("abc"), 1);
    assert_eq!(raw("-3"), 1);
    assert_eq!(raw("4"), 4);
  }
}
