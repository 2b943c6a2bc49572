//! Handlers for `/posts/{id}` and the post write path.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/posts` | Body: `{"text":"…","group":"slug","image":"…"}` |
//! | `GET`    | `/posts/{id}` | Post, author's post count, comments |
//! | `PUT`    | `/posts/{id}` | Author only |
//! | `DELETE` | `/posts/{id}` | Author only |
//! | `POST`   | `/posts/{id}/comments` | Body: `{"text":"…"}` |

use axum::{
  Json,
  extract::{FromRequestParts, Path, State},
  http::{StatusCode, request::Parts},
  response::IntoResponse,
};
use serde::Deserialize;
use yatube_core::{
  comments::PostDetail,
  model::{Post, PostDraft, PostId},
  store::FeedStore,
};

use crate::{AppState, error::ApiError, requester::AuthedUser};

/// The `{id}` path segment; malformed ids are a JSON 400.
pub struct PostPath(pub PostId);

impl<St> FromRequestParts<St> for PostPath
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &St,
  ) -> Result<Self, Self::Rejection> {
    let Path(id) = Path::<PostId>::from_request_parts(parts, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Self(id))
  }
}

// ─── Publish ──────────────────────────────────────────────────────────────────

/// `POST /posts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedUser(author): AuthedUser,
  Json(draft): Json<PostDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore + 'static,
{
  let post = state.feeds.publish(&author, draft).await?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Detail ───────────────────────────────────────────────────────────────────

/// `GET /posts/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  PostPath(id): PostPath,
) -> Result<Json<PostDetail>, ApiError>
where
  S: FeedStore + 'static,
{
  Ok(Json(state.comments.post_detail(id).await?))
}

// ─── Edit / delete ────────────────────────────────────────────────────────────

/// `PUT /posts/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  PostPath(id): PostPath,
  Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, ApiError>
where
  S: FeedStore + 'static,
{
  Ok(Json(state.feeds.edit(&user, id, draft).await?))
}

/// `DELETE /posts/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  PostPath(id): PostPath,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore + 'static,
{
  state.feeds.delete(&user, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Comments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub text: String,
}

/// `POST /posts/{id}/comments`
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  AuthedUser(author): AuthedUser,
  PostPath(id): PostPath,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore + 'static,
{
  let comment = state.comments.add_comment(id, &author, body.text).await?;
  Ok((StatusCode::CREATED, Json(comment)))
}
