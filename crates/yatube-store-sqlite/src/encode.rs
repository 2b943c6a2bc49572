//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Identities are stored as `INTEGER`. Timestamps are stored as fixed-width
//! RFC 3339 strings in UTC with microsecond precision, so lexical order is
//! chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use yatube_core::model::{
  Comment, CommentId, Group, GroupId, GroupRef, Post, PostId, User, UserId,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision the store keeps, so values handed back
/// to callers equal what a later read returns.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`raw_post`]; `p`, `u` and `g` are the posts, users
/// and groups aliases.
pub const POST_COLUMNS: &str = "
  p.post_id, p.text, p.pub_date, p.image,
  u.user_id, u.username,
  g.group_id, g.slug, g.title";

pub const POST_FROM: &str = "
  FROM posts p
  JOIN users u            ON u.user_id  = p.author_id
  LEFT JOIN post_groups g ON g.group_id = p.group_id";

/// Raw values read from a `posts` row joined with its author and group.
pub struct RawPost {
  pub post_id:     i64,
  pub text:        String,
  pub pub_date:    String,
  pub image:       Option<String>,
  pub author_id:   i64,
  pub username:    String,
  pub group_id:    Option<i64>,
  pub group_slug:  Option<String>,
  pub group_title: Option<String>,
}

pub fn raw_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    post_id:     row.get(0)?,
    text:        row.get(1)?,
    pub_date:    row.get(2)?,
    image:       row.get(3)?,
    author_id:   row.get(4)?,
    username:    row.get(5)?,
    group_id:    row.get(6)?,
    group_slug:  row.get(7)?,
    group_title: row.get(8)?,
  })
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    let group = match (self.group_id, self.group_slug, self.group_title) {
      (Some(id), Some(slug), Some(title)) => Some(GroupRef {
        id: GroupId(id),
        slug,
        title,
      }),
      _ => None,
    };

    Ok(Post {
      id: PostId(self.post_id),
      text: self.text,
      pub_date: decode_dt(&self.pub_date)?,
      author: User {
        id:       UserId(self.author_id),
        username: self.username,
      },
      group,
      image: self.image,
    })
  }
}

pub const COMMENT_SELECT: &str = "
  SELECT c.comment_id, c.post_id, c.text, c.created, u.user_id, u.username
  FROM comments c
  LEFT JOIN users u ON u.user_id = c.author_id";

/// Raw values read from a `comments` row joined with its (optional) author.
pub struct RawComment {
  pub comment_id: i64,
  pub post_id:    i64,
  pub text:       String,
  pub created:    String,
  pub author_id:  Option<i64>,
  pub username:   Option<String>,
}

pub fn raw_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    comment_id: row.get(0)?,
    post_id:    row.get(1)?,
    text:       row.get(2)?,
    created:    row.get(3)?,
    author_id:  row.get(4)?,
    username:   row.get(5)?,
  })
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    let author = match (self.author_id, self.username) {
      (Some(id), Some(username)) => Some(User { id: UserId(id), username }),
      _ => None,
    };

    Ok(Comment {
      id: CommentId(self.comment_id),
      post_id: PostId(self.post_id),
      author,
      text: self.text,
      created: decode_dt(&self.created)?,
    })
  }
}

pub fn group_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
  Ok(Group {
    id:          GroupId(row.get(0)?),
    slug:        row.get(1)?,
    title:       row.get(2)?,
    description: row.get(3)?,
  })
}

pub fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:       UserId(row.get(0)?),
    username: row.get(1)?,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let c = a + chrono::Duration::seconds(1);

    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb && eb < ec);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }
}
