//! [`SqliteStore`], the SQLite implementation of [`FeedStore`].

use std::{collections::BTreeSet, path::Path};

use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;

use yatube_core::{
  model::{
    Comment, Group, GroupId, NewComment, NewGroup, NewPost, Post, PostChanges,
    PostId, User, UserId,
  },
  store::{FeedStore, PostFilter},
};

use crate::{
  Result,
  encode::{
    COMMENT_SELECT, POST_COLUMNS, POST_FROM, RawComment, RawPost, encode_dt,
    group_row, now, raw_comment, raw_post, user_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Yatube feed store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Posts matching `filter` in canonical order, optionally restricted to an
  /// `(offset, limit)` window.
  async fn select_posts(
    &self,
    filter: PostFilter,
    window: Option<(usize, usize)>,
  ) -> Result<Vec<Post>> {
    if matches!(&filter, PostFilter::AuthorIn(ids) if ids.is_empty()) {
      return Ok(Vec::new());
    }
    let (where_clause, mut params) = filter_clause(&filter)?;
    let mut sql = format!(
      "SELECT {POST_COLUMNS} {POST_FROM}
       {where_clause}
       ORDER BY p.pub_date DESC, p.post_id DESC"
    );
    if let Some((offset, limit)) = window {
      let n = params.len();
      sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", n + 1, n + 2));
      params.push(Value::Integer(to_sql_int(limit)));
      params.push(Value::Integer(to_sql_int(offset)));
    }

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), raw_post)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(?filter, ?window, count = raws.len(), "listed posts");
    raws.into_iter().map(RawPost::into_post).collect()
  }

  /// Run a `DELETE` and report whether it removed anything.
  async fn delete_by_id(&self, sql: &'static str, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id])?))
      .await?;
    Ok(removed > 0)
  }
}

/// `WHERE` clause and positional parameters for a post filter.
///
/// An author set is bound as a single JSON array so its size is not limited
/// by SQLite's host-parameter cap.
fn filter_clause(filter: &PostFilter) -> Result<(&'static str, Vec<Value>)> {
  Ok(match filter {
    PostFilter::All => ("", vec![]),
    PostFilter::Group(id) => ("WHERE p.group_id = ?1", vec![Value::Integer(id.0)]),
    PostFilter::Author(id) => ("WHERE p.author_id = ?1", vec![Value::Integer(id.0)]),
    PostFilter::AuthorIn(ids) => {
      let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
      (
        "WHERE p.author_id IN (SELECT value FROM json_each(?1))",
        vec![Value::Text(serde_json::to_string(&ids)?)],
      )
    }
    PostFilter::FollowedBy(user) => (
      "WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?1)",
      vec![Value::Integer(user.0)],
    ),
  })
}

fn to_sql_int(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn select_post(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawPost>> {
  conn
    .query_row(
      &format!("SELECT {POST_COLUMNS} {POST_FROM} WHERE p.post_id = ?1"),
      rusqlite::params![id],
      raw_post,
    )
    .optional()
}

// ─── FeedStore impl ──────────────────────────────────────────────────────────

impl FeedStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, username: String) -> Result<User> {
    let user = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username) VALUES (?1)",
          rusqlite::params![username],
        )?;
        Ok(User {
          id: UserId(conn.last_insert_rowid()),
          username,
        })
      })
      .await?;
    Ok(user)
  }

  async fn get_user_by_username(&self, username: String) -> Result<Option<User>> {
    let user = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username FROM users WHERE username = ?1",
            rusqlite::params![username],
            user_row,
          )
          .optional()?)
      })
      .await?;
    Ok(user)
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM users WHERE user_id = ?1", id.0)
      .await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn create_group(&self, input: NewGroup) -> Result<Group> {
    let group = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO post_groups (slug, title, description) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.slug, input.title, input.description],
        )?;
        Ok(Group {
          id:          GroupId(conn.last_insert_rowid()),
          slug:        input.slug,
          title:       input.title,
          description: input.description,
        })
      })
      .await?;
    Ok(group)
  }

  async fn get_group_by_slug(&self, slug: String) -> Result<Option<Group>> {
    let group = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT group_id, slug, title, description FROM post_groups WHERE slug = ?1",
            rusqlite::params![slug],
            group_row,
          )
          .optional()?)
      })
      .await?;
    Ok(group)
  }

  async fn delete_group(&self, id: GroupId) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM post_groups WHERE group_id = ?1", id.0)
      .await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let pub_date = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (text, pub_date, author_id, group_id, image)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.text,
            pub_date,
            input.author_id.0,
            input.group_id.map(|g| g.0),
            input.image,
          ],
        )?;
        let id = conn.last_insert_rowid();
        select_post(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows.into())
      })
      .await?;

    raw.into_post()
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_post(conn, id.0)?))
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn update_post(&self, id: PostId, changes: PostChanges) -> Result<Option<Post>> {
    let raw = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE posts SET text = ?1, group_id = ?2, image = ?3 WHERE post_id = ?4",
          rusqlite::params![
            changes.text,
            changes.group_id.map(|g| g.0),
            changes.image,
            id.0,
          ],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(select_post(conn, id.0)?)
      })
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn delete_post(&self, id: PostId) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM posts WHERE post_id = ?1", id.0)
      .await
  }

  async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>> {
    self.select_posts(filter, None).await
  }

  async fn list_posts_window(
    &self,
    filter: PostFilter,
    offset: usize,
    limit: usize,
  ) -> Result<Vec<Post>> {
    self.select_posts(filter, Some((offset, limit))).await
  }

  async fn count_posts(&self, filter: PostFilter) -> Result<u64> {
    if matches!(&filter, PostFilter::AuthorIn(ids) if ids.is_empty()) {
      return Ok(0);
    }
    let (where_clause, params) = filter_clause(&filter)?;

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM posts p {where_clause}"),
          rusqlite::params_from_iter(params),
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn count_posts_by_author(&self, author: UserId) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM posts WHERE author_id = ?1",
          rusqlite::params![author.0],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn create_follow(&self, user: UserId, author: UserId) -> Result<bool> {
    let created = encode_dt(now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO follows (user_id, author_id, created) VALUES (?1, ?2, ?3)
           ON CONFLICT (user_id, author_id) DO NOTHING",
          rusqlite::params![user.0, author.0, created],
        )?)
      })
      .await?;
    Ok(inserted > 0)
  }

  async fn delete_follow(&self, user: UserId, author: UserId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2",
          rusqlite::params![user.0, author.0],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn follows_exist(&self, user: UserId, author: UserId) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2",
            rusqlite::params![user.0, author.0],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(exists)
  }

  async fn following_authors_of(&self, user: UserId) -> Result<BTreeSet<UserId>> {
    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT author_id FROM follows WHERE user_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![user.0], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids.into_iter().map(UserId).collect())
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    let created = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (post_id, author_id, text, created)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.post_id.0, input.author_id.0, input.text, created],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!("{COMMENT_SELECT} WHERE c.comment_id = ?1"),
          rusqlite::params![id],
          raw_comment,
        )?)
      })
      .await?;

    raw.into_comment()
  }

  async fn list_comments_for_post(&self, post: PostId) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{COMMENT_SELECT}
           WHERE c.post_id = ?1
           ORDER BY c.created DESC, c.comment_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post.0], raw_comment)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }
}
