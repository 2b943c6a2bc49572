//! Domain types: users, groups, posts, comments and follow edges.
//!
//! Identities are store-assigned integers. Timestamps are server-assigned and
//! never change after creation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identities ──────────────────────────────────────────────────────────────

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

id_type!(
  /// Identity of a [`User`].
  UserId
);
id_type!(
  /// Identity of a [`Group`].
  GroupId
);
id_type!(
  /// Identity of a [`Post`]; also the tie-breaker in canonical feed order.
  PostId
);
id_type!(
  /// Identity of a [`Comment`].
  CommentId
);

// ─── Users ───────────────────────────────────────────────────────────────────

/// A user as known to the feed core. Accounts themselves are owned by the
/// authentication layer; only the identity and username live here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:       UserId,
  pub username: String,
}

// ─── Groups ──────────────────────────────────────────────────────────────────

/// A topical group posts may be filed under. The slug is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:          GroupId,
  pub slug:        String,
  pub title:       String,
  pub description: String,
}

impl Group {
  pub fn to_ref(&self) -> GroupRef {
    GroupRef {
      id:    self.id,
      slug:  self.slug.clone(),
      title: self.title.clone(),
    }
  }
}

/// Input to [`crate::store::FeedStore::create_group`].
#[derive(Debug, Clone)]
pub struct NewGroup {
  pub slug:        String,
  pub title:       String,
  pub description: String,
}

/// The part of a group a rendered post needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
  pub id:    GroupId,
  pub slug:  String,
  pub title: String,
}

// ─── Posts ───────────────────────────────────────────────────────────────────

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub id:       PostId,
  pub text:     String,
  /// Server-assigned; never changes after creation, not even on edit.
  pub pub_date: DateTime<Utc>,
  pub author:   User,
  /// `None` for ungrouped posts and for posts whose group was deleted.
  pub group:    Option<GroupRef>,
  /// Opaque reference to an image held by the media collaborator.
  pub image:    Option<String>,
}

/// What an author submits when publishing or editing a post. The group is
/// addressed by slug and resolved by the feed composer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
  pub text:  String,
  #[serde(default)]
  pub group: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
}

/// Input to [`crate::store::FeedStore::create_post`]. `pub_date` is set by the
/// store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id: UserId,
  pub text:      String,
  pub group_id:  Option<GroupId>,
  pub image:     Option<String>,
}

/// Replacement values for the editable fields of a post.
#[derive(Debug, Clone)]
pub struct PostChanges {
  pub text:     String,
  pub group_id: Option<GroupId>,
  pub image:    Option<String>,
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:      CommentId,
  pub post_id: PostId,
  /// `None` once the commenting user has been deleted.
  pub author:  Option<User>,
  pub text:    String,
  pub created: DateTime<Utc>,
}

/// Input to [`crate::store::FeedStore::create_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id:   PostId,
  pub author_id: UserId,
  pub text:      String,
}

// ─── Follow edges ────────────────────────────────────────────────────────────

/// A directed edge: `user` receives `author`'s posts in their personalized
/// feed. At most one edge exists per ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Follow {
  pub user:   UserId,
  pub author: UserId,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Reject text that is empty once surrounding whitespace is removed.
pub fn validate_text(text: &str) -> Result<()> {
  if text.trim().is_empty() {
    return Err(Error::EmptyText);
  }
  Ok(())
}
