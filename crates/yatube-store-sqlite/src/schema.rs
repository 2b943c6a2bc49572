//! SQL schema for the Yatube SQLite store.
//!
//! Executed once at connection startup. Ownership rules of the data model are
//! expressed as foreign-key actions, so they hold for every writer of the
//! file, not only this crate.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Mirror of accounts owned by the authentication layer.
CREATE TABLE IF NOT EXISTS users (
    user_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS post_groups (
    group_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    slug        TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

-- pub_date is fixed-width RFC 3339 (microseconds, Z) so it sorts as text.
CREATE TABLE IF NOT EXISTS posts (
    post_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    text      TEXT NOT NULL CHECK (length(trim(text)) > 0),
    pub_date  TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    group_id  INTEGER REFERENCES post_groups(group_id) ON DELETE SET NULL,
    image     TEXT
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id    INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    author_id  INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
    text       TEXT NOT NULL CHECK (length(trim(text)) > 0),
    created    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS follows (
    follow_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    author_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created   TEXT NOT NULL,
    UNIQUE (user_id, author_id),
    CHECK  (user_id != author_id)
);

CREATE INDEX IF NOT EXISTS posts_feed_idx      ON posts(pub_date DESC, post_id DESC);
CREATE INDEX IF NOT EXISTS posts_author_idx    ON posts(author_id);
CREATE INDEX IF NOT EXISTS posts_group_idx     ON posts(group_id);
CREATE INDEX IF NOT EXISTS comments_post_idx   ON comments(post_id);
CREATE INDEX IF NOT EXISTS comments_author_idx ON comments(author_id);
CREATE INDEX IF NOT EXISTS follows_author_idx  ON follows(author_id);

PRAGMA user_version = 1;
";
