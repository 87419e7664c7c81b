use crate::error::DbError;
use crate::models::{CommentRow, LikeRow, PostRow, TipRow, UserRow};
use crate::Database;
use anyhow::Result;
use plaza_types::TokenAmount;
use plaza_types::api::UpdateUserProfile;
use plaza_types::insert::{InsertComment, InsertLike, InsertPost, InsertTip, InsertUser};
use rusqlite::{Connection, ErrorCode, Row, params};
use tracing::{debug, info};
use uuid::Uuid;

/// Result of an ingestion call.
///
/// Every ingested row is keyed by its source transaction hash (users by
/// address), so replaying an event yields `Duplicate` with the id of the row
/// that is already stored, and no counter is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted {
    Created(String),
    Duplicate(String),
}

impl Inserted {
    pub fn id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Duplicate(id) => id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Where the next page of [`Database::list_posts`] starts: the `created_at`
/// and `id` of the last post already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostCursor<'a> {
    pub created_at: &'a str,
    pub id: Option<&'a str>,
}

const POST_COLUMNS: &str = "id, author, content, ipfs_hash, image_hash, block_number, \
     transaction_hash, likes_count, comments_count, tips_received, created_at";
const COMMENT_COLUMNS: &str = "id, post_id, author, content, ipfs_hash, transaction_hash, created_at";
const LIKE_COLUMNS: &str = "id, post_id, author, transaction_hash, created_at";
const TIP_COLUMNS: &str =
    "id, post_id, from_address, to_address, amount, transaction_hash, created_at";
const USER_COLUMNS: &str =
    "id, address, name, avatar_url, reputation, total_likes, total_tips";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Database {
    // -- Posts --

    pub fn insert_post(&self, post: &InsertPost) -> Result<Inserted> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO posts (id, author, content, ipfs_hash, image_hash, block_number,
                                    transaction_hash, likes_count, comments_count, tips_received)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, 0), COALESCE(?9, 0), COALESCE(?10, '0'))
                 ON CONFLICT DO NOTHING",
                params![
                    id,
                    post.author,
                    post.content,
                    post.ipfs_hash,
                    post.image_hash,
                    post.block_number,
                    post.transaction_hash,
                    post.likes_count,
                    post.comments_count,
                    post.tips_received.as_ref().map(TokenAmount::to_string),
                ],
            )?;

            if inserted == 0 {
                let existing = existing_id(
                    conn,
                    "SELECT id FROM posts WHERE transaction_hash = ?1",
                    &post.transaction_hash,
                )?;
                debug!("Post from tx {} already ingested as {}", post.transaction_hash, existing);
                return Ok(Inserted::Duplicate(existing));
            }

            info!("Ingested post {} from tx {}", id, post.transaction_hash);
            Ok(Inserted::Created(id))
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Newest first, ties on `created_at` broken by insertion order.
    pub fn list_posts(
        &self,
        limit: u32,
        author: Option<&str>,
        before: Option<PostCursor<'_>>,
    ) -> Result<Vec<PostRow>> {
        let (before_created_at, before_id) = match before {
            Some(c) => (Some(c.created_at), c.id),
            None => (None, None),
        };

        self.with_conn(|conn| {
            // Posts sharing the cursor's second are resumed after the cursor
            // row itself; without an id only strictly older posts match.
            let sql = format!(
                "SELECT {} FROM posts
                 WHERE (?1 IS NULL OR author = ?1)
                   AND (?2 IS NULL
                        OR created_at < ?2
                        OR (created_at = ?2
                            AND rowid < (SELECT rowid FROM posts WHERE id = ?3)))
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?4",
                POST_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![author, before_created_at, before_id, limit], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Refused with [`DbError::PostHasDependents`] while any comment, like
    /// or tip still points at the post.
    pub fn delete_post(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| match conn.execute("DELETE FROM posts WHERE id = ?1", [id]) {
            Ok(n) => {
                if n > 0 {
                    info!("Deleted post {}", id);
                }
                Ok(n > 0)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(DbError::PostHasDependents(id.to_string()).into())
            }
            Err(e) => Err(e.into()),
        })
    }

    // -- Comments --

    /// Insert a comment and bump the post's `comments_count` in one transaction.
    pub fn insert_comment(&self, comment: &InsertComment) -> Result<Inserted> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            require_post(&tx, &comment.post_id)?;

            let inserted = tx.execute(
                "INSERT INTO comments (id, post_id, author, content, ipfs_hash, transaction_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT DO NOTHING",
                params![
                    id,
                    comment.post_id,
                    comment.author,
                    comment.content,
                    comment.ipfs_hash,
                    comment.transaction_hash,
                ],
            )?;

            let outcome = if inserted == 0 {
                let existing = existing_id(
                    &tx,
                    "SELECT id FROM comments WHERE transaction_hash = ?1",
                    &comment.transaction_hash,
                )?;
                debug!("Comment from tx {} already ingested as {}", comment.transaction_hash, existing);
                Inserted::Duplicate(existing)
            } else {
                tx.execute(
                    "UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?1",
                    [&comment.post_id],
                )?;
                info!("Ingested comment {} on post {}", id, comment.post_id);
                Inserted::Created(id)
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    pub fn get_comments(&self, post_id: &str, limit: u32) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM comments WHERE post_id = ?1
                 ORDER BY created_at ASC, rowid ASC LIMIT ?2",
                COMMENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![post_id, limit], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        author: row.get(2)?,
                        content: row.get(3)?,
                        ipfs_hash: row.get(4)?,
                        transaction_hash: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Likes --

    /// One like per author per post. A new like bumps the post's
    /// `likes_count` and the post author's `total_likes` when that author is
    /// a registered user.
    pub fn insert_like(&self, like: &InsertLike) -> Result<Inserted> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let post = require_post(&tx, &like.post_id)?;

            let inserted = tx.execute(
                "INSERT INTO likes (id, post_id, author, transaction_hash)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT DO NOTHING",
                params![id, like.post_id, like.author, like.transaction_hash],
            )?;

            let outcome = if inserted == 0 {
                let existing: String = tx.query_row(
                    "SELECT id FROM likes
                     WHERE transaction_hash = ?1 OR (post_id = ?2 AND author = ?3)
                     LIMIT 1",
                    params![like.transaction_hash, like.post_id, like.author],
                    |row| row.get(0),
                )?;
                debug!(
                    "Like by {} on post {} (tx {}) already ingested as {}",
                    like.author, like.post_id, like.transaction_hash, existing
                );
                Inserted::Duplicate(existing)
            } else {
                tx.execute(
                    "UPDATE posts SET likes_count = likes_count + 1 WHERE id = ?1",
                    [&like.post_id],
                )?;
                tx.execute(
                    "UPDATE users SET total_likes = total_likes + 1 WHERE address = ?1",
                    [&post.author],
                )?;
                info!("Ingested like {} on post {}", id, like.post_id);
                Inserted::Created(id)
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    pub fn get_likes(&self, post_id: &str, limit: u32) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM likes WHERE post_id = ?1
                 ORDER BY created_at ASC, rowid ASC LIMIT ?2",
                LIKE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![post_id, limit], |row| {
                    Ok(LikeRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        author: row.get(2)?,
                        transaction_hash: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Tips --

    /// A new tip adds its amount to the post's `tips_received` and to the
    /// recipient's `total_tips` when `to_address` is a registered user.
    pub fn insert_tip(&self, tip: &InsertTip) -> Result<Inserted> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let post = require_post(&tx, &tip.post_id)?;
            let amount = tip.amount.to_string();

            let inserted = tx.execute(
                "INSERT INTO tips (id, post_id, from_address, to_address, amount, transaction_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT DO NOTHING",
                params![
                    id,
                    tip.post_id,
                    tip.from_address,
                    tip.to_address,
                    amount,
                    tip.transaction_hash,
                ],
            )?;

            if inserted == 0 {
                let existing = existing_id(
                    &tx,
                    "SELECT id FROM tips WHERE transaction_hash = ?1",
                    &tip.transaction_hash,
                )?;
                debug!("Tip from tx {} already ingested as {}", tip.transaction_hash, existing);
                return Ok(Inserted::Duplicate(existing));
            }

            let received = parse_amount("posts", "tips_received", &post.id, &post.tips_received)?;
            tx.execute(
                "UPDATE posts SET tips_received = ?1 WHERE id = ?2",
                params![(&received + &tip.amount).to_string(), post.id],
            )?;

            let recipient: Option<(String, String)> = tx
                .query_row(
                    "SELECT id, total_tips FROM users WHERE address = ?1",
                    [&tip.to_address],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            if let Some((user_id, total_tips)) = recipient {
                let total = parse_amount("users", "total_tips", &user_id, &total_tips)?;
                tx.execute(
                    "UPDATE users SET total_tips = ?1 WHERE id = ?2",
                    params![(&total + &tip.amount).to_string(), user_id],
                )?;
            }

            tx.commit()?;
            info!("Ingested tip {} of {} on post {}", id, amount, tip.post_id);
            Ok(Inserted::Created(id))
        })
    }

    pub fn get_tips(&self, post_id: &str, limit: u32) -> Result<Vec<TipRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM tips WHERE post_id = ?1
                 ORDER BY created_at ASC, rowid ASC LIMIT ?2",
                TIP_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![post_id, limit], |row| {
                    Ok(TipRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        from_address: row.get(2)?,
                        to_address: row.get(3)?,
                        amount: row.get(4)?,
                        transaction_hash: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Users --

    /// Register a wallet. An address that already exists is left as is.
    pub fn insert_user(&self, user: &InsertUser) -> Result<Inserted> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, address, name, avatar_url, reputation, total_likes, total_tips)
                 VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 0), COALESCE(?6, 0), COALESCE(?7, '0'))
                 ON CONFLICT DO NOTHING",
                params![
                    id,
                    user.address,
                    user.name,
                    user.avatar_url,
                    user.reputation,
                    user.total_likes,
                    user.total_tips.as_ref().map(TokenAmount::to_string),
                ],
            )?;

            if inserted == 0 {
                let existing =
                    existing_id(conn, "SELECT id FROM users WHERE address = ?1", &user.address)?;
                debug!("User {} already registered as {}", user.address, existing);
                return Ok(Inserted::Duplicate(existing));
            }

            info!("Registered user {} ({})", id, user.address);
            Ok(Inserted::Created(id))
        })
    }

    pub fn get_user_by_address(&self, address: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_address(conn, address))
    }

    /// Apply the fields present in `update`. Returns `None` for an unknown
    /// address.
    pub fn update_user_profile(
        &self,
        address: &str,
        update: &UpdateUserProfile,
    ) -> Result<Option<UserRow>> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE users SET name = COALESCE(?1, name), avatar_url = COALESCE(?2, avatar_url)
                 WHERE address = ?3",
                params![update.name, update.avatar_url, address],
            )?;
            if updated == 0 {
                return Ok(None);
            }

            debug!("Updated profile of {}", address);
            query_user_by_address(conn, address)
        })
    }
}

fn require_post(conn: &Connection, post_id: &str) -> Result<PostRow> {
    query_post(conn, post_id)?.ok_or_else(|| DbError::PostNotFound(post_id.to_string()).into())
}

fn existing_id(conn: &Connection, sql: &str, key: &str) -> Result<String> {
    Ok(conn.query_row(sql, [key], |row| row.get(0))?)
}

fn parse_amount(table: &'static str, column: &'static str, id: &str, value: &str) -> Result<TokenAmount> {
    value.parse().map_err(|_| {
        DbError::CorruptAmount {
            table,
            column,
            id: id.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

fn query_post(conn: &Connection, id: &str) -> Result<Option<PostRow>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS);
    conn.query_row(&sql, [id], post_from_row).optional()
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author: row.get(1)?,
        content: row.get(2)?,
        ipfs_hash: row.get(3)?,
        image_hash: row.get(4)?,
        block_number: row.get(5)?,
        transaction_hash: row.get(6)?,
        likes_count: row.get(7)?,
        comments_count: row.get(8)?,
        tips_received: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn query_user_by_address(conn: &Connection, address: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE address = ?1", USER_COLUMNS);
    conn.query_row(&sql, [address], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            address: row.get(1)?,
            name: row.get(2)?,
            avatar_url: row.get(3)?,
            reputation: row.get(4)?,
            total_likes: row.get(5)?,
            total_tips: row.get(6)?,
        })
    })
    .optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
