//! Comment threads and the post detail view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  model::{Comment, NewComment, Post, PostId, User, UserId, validate_text},
  store::FeedStore,
};

/// Everything shown alongside a single post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
  pub post:              Post,
  /// Total posts by the post's author, computed per request.
  pub author_post_count: u64,
  /// Newest first.
  pub comments:          Vec<Comment>,
}

pub struct CommentAggregator<S> {
  store: Arc<S>,
}

impl<S: FeedStore> CommentAggregator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Comments on `post`, newest first.
  pub async fn comments_for(&self, post: PostId) -> Result<Vec<Comment>> {
    self
      .store
      .list_comments_for_post(post)
      .await
      .map_err(Error::store)
  }

  pub async fn post_author_post_count(&self, author: UserId) -> Result<u64> {
    self
      .store
      .count_posts_by_author(author)
      .await
      .map_err(Error::store)
  }

  pub async fn add_comment(
    &self,
    post: PostId,
    author: &User,
    text: String,
  ) -> Result<Comment> {
    validate_text(&text)?;
    self.require_post(post).await?;
    self
      .store
      .create_comment(NewComment { post_id: post, author_id: author.id, text })
      .await
      .map_err(Error::store)
  }

  pub async fn post_detail(&self, id: PostId) -> Result<PostDetail> {
    let post = self.require_post(id).await?;
    let author_post_count = self.post_author_post_count(post.author.id).await?;
    let comments = self.comments_for(id).await?;
    Ok(PostDetail { post, author_post_count, comments })
  }

  async fn require_post(&self, id: PostId) -> Result<Post> {
    self
      .store
      .get_post(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(id))
  }
}
