//! Feed composition and the post write path.
//!
//! [`FeedComposer`] turns a [`FeedRequest`] into a store query, paginates the
//! result, and serves the global feed through the [`PageCache`]. Post writes
//! go through the composer as well so every change to the post set evicts the
//! cached global pages before the write returns.

use std::{num::NonZeroUsize, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Error, Result,
  cache::{CacheBackend, CacheKey, CachedPage, MemoryCache, PageCache},
  model::{GroupId, NewPost, Post, PostChanges, PostDraft, PostId, User, validate_text},
  pagination::{Page, PageNumber, PageWindow},
  store::{FeedStore, PostFilter},
};

// ─── Requests ────────────────────────────────────────────────────────────────

/// Which feed to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum FeedRequest {
  /// Every post.
  Global,
  /// Posts filed under the group with this slug.
  ByGroup(String),
  /// Posts by the user with this username.
  ByAuthor(String),
  /// Posts by everyone the requester follows.
  Personalized,
}

impl FeedRequest {
  pub fn kind(&self) -> FeedKind {
    match self {
      Self::Global => FeedKind::Global,
      Self::ByGroup(_) => FeedKind::Group,
      Self::ByAuthor(_) => FeedKind::Author,
      Self::Personalized => FeedKind::Personalized,
    }
  }
}

/// The discriminant of a [`FeedRequest`], used in cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
  Global,
  Group,
  Author,
  Personalized,
}

impl FeedKind {
  /// Whether pages of this kind are served through the page cache.
  pub fn is_cached(self) -> bool { matches!(self, Self::Global) }
}

/// Who is asking. Identity is established by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Requester {
  #[default]
  Anonymous,
  User(User),
}

impl Requester {
  pub fn user(&self) -> Option<&User> {
    match self {
      Self::Anonymous => None,
      Self::User(u) => Some(u),
    }
  }
}

// ─── Composer ────────────────────────────────────────────────────────────────

pub struct FeedComposer<S, C = MemoryCache> {
  store:     Arc<S>,
  cache:     PageCache<C>,
  page_size: NonZeroUsize,
}

impl<S, C> FeedComposer<S, C>
where
  S: FeedStore,
  C: CacheBackend,
{
  pub fn new(store: Arc<S>, cache: PageCache<C>, page_size: NonZeroUsize) -> Self {
    Self { store, cache, page_size }
  }

  pub fn cache(&self) -> &PageCache<C> { &self.cache }

  /// Build one page of a feed.
  ///
  /// Unknown groups and authors are errors; a personalized feed for an
  /// anonymous requester or one who follows nobody is an empty page.
  pub async fn compose(
    &self,
    request: &FeedRequest,
    requester: &Requester,
    page: PageNumber,
  ) -> Result<CachedPage> {
    let kind = request.kind();
    if kind.is_cached() {
      let key = CacheKey::new(kind, page);
      if let Some(hit) = self.cache.get(key).await {
        return Ok(hit);
      }
      let ticket = self.cache.ticket();
      let fresh = Arc::new(self.assemble(request, requester, page).await?);
      // Stored under the page actually served so out-of-range requests
      // share the last page's entry.
      let served = CacheKey::new(kind, PageNumber::new(i64::from(fresh.number)));
      self.cache.fill(ticket, served, fresh.clone()).await;
      return Ok(fresh);
    }

    Ok(Arc::new(self.assemble(request, requester, page).await?))
  }

  async fn assemble(
    &self,
    request: &FeedRequest,
    requester: &Requester,
    page: PageNumber,
  ) -> Result<Page<Post>> {
    let filter = match request {
      FeedRequest::Global => PostFilter::All,
      FeedRequest::ByGroup(slug) => {
        let group = self
          .store
          .get_group_by_slug(slug.clone())
          .await
          .map_err(Error::store)?
          .ok_or_else(|| Error::GroupNotFound(slug.clone()))?;
        PostFilter::Group(group.id)
      }
      FeedRequest::ByAuthor(username) => {
        let author = self.resolve_user(username).await?;
        PostFilter::Author(author.id)
      }
      FeedRequest::Personalized => {
        let Some(user) = requester.user() else {
          return Ok(Page::empty());
        };
        PostFilter::FollowedBy(user.id)
      }
    };

    let total = self
      .store
      .count_posts(filter.clone())
      .await
      .map_err(Error::store)?;
    let window = PageWindow::locate(
      usize::try_from(total).unwrap_or(usize::MAX),
      self.page_size,
      page,
    );
    if total == 0 {
      return Ok(window.fill(Vec::new()));
    }

    let posts = self
      .store
      .list_posts_window(filter, window.offset, window.limit)
      .await
      .map_err(Error::store)?;
    Ok(window.fill(posts))
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Publish a new post by `author`.
  pub async fn publish(&self, author: &User, draft: PostDraft) -> Result<Post> {
    validate_text(&draft.text)?;
    let group_id = self.resolve_group(draft.group.as_deref()).await?;

    let post = self
      .store
      .create_post(NewPost {
        author_id: author.id,
        text: draft.text,
        group_id,
        image: draft.image,
      })
      .await
      .map_err(Error::store)?;

    info!(post = %post.id, author = %author.username, "post published");
    self.invalidate_posts().await;
    Ok(post)
  }

  /// Replace the text, group and image of a post. Only its author may edit
  /// it; the publication date is kept.
  pub async fn edit(
    &self,
    requester: &User,
    id: PostId,
    draft: PostDraft,
  ) -> Result<Post> {
    self.owned_post(requester, id).await?;
    validate_text(&draft.text)?;
    let group_id = self.resolve_group(draft.group.as_deref()).await?;

    let post = self
      .store
      .update_post(id, PostChanges {
        text: draft.text,
        group_id,
        image: draft.image,
      })
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(id))?;

    info!(post = %id, "post edited");
    self.invalidate_posts().await;
    Ok(post)
  }

  /// Delete a post and its comments. Only its author may delete it.
  pub async fn delete(&self, requester: &User, id: PostId) -> Result<()> {
    self.owned_post(requester, id).await?;
    if !self.store.delete_post(id).await.map_err(Error::store)? {
      return Err(Error::PostNotFound(id));
    }

    info!(post = %id, "post deleted");
    self.invalidate_posts().await;
    Ok(())
  }

  /// Delete a group. Its posts stay, without a group.
  pub async fn delete_group(&self, slug: &str) -> Result<()> {
    let group_id = self
      .resolve_group(Some(slug))
      .await?
      .ok_or_else(|| Error::GroupNotFound(slug.to_owned()))?;
    if !self.store.delete_group(group_id).await.map_err(Error::store)? {
      return Err(Error::GroupNotFound(slug.to_owned()));
    }

    info!(group = slug, "group deleted");
    self.invalidate_posts().await;
    Ok(())
  }

  /// Remove a user whose account was deleted upstream, together with their
  /// posts and follow edges. Their comments remain, unattributed.
  pub async fn remove_author(&self, username: &str) -> Result<()> {
    let user = self.resolve_user(username).await?;
    if !self.store.delete_user(user.id).await.map_err(Error::store)? {
      return Err(Error::UserNotFound(username.to_owned()));
    }

    info!(user = username, "author removed");
    self.invalidate_posts().await;
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn invalidate_posts(&self) {
    self.cache.invalidate(FeedKind::Global).await;
  }

  async fn resolve_user(&self, username: &str) -> Result<User> {
    self
      .store
      .get_user_by_username(username.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(username.to_owned()))
  }

  async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<GroupId>> {
    let Some(slug) = slug.filter(|s| !s.is_empty()) else {
      return Ok(None);
    };
    let group = self
      .store
      .get_group_by_slug(slug.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::GroupNotFound(slug.to_owned()))?;
    Ok(Some(group.id))
  }

  async fn owned_post(&self, requester: &User, id: PostId) -> Result<Post> {
    let post = self
      .store
      .get_post(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(id))?;
    if post.author.id != requester.id {
      return Err(Error::NotAuthor(id));
    }
    Ok(post)
  }
}
