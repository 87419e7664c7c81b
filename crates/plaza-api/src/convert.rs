//! Row to wire-model conversion. Stored values that fail to parse are
//! logged and replaced with a neutral value rather than failing the request.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use plaza_db::models::{CommentRow, LikeRow, PostRow, TipRow, UserRow};
use plaza_types::TokenAmount;
use plaza_types::models::{Comment, Like, Post, Tip, User};

/// Format of SQLite's `datetime('now')`.
pub const SQLITE_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            NaiveDateTime::parse_from_str(raw, SQLITE_DATETIME).map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row '{}': {}", raw, row_id, e);
            DateTime::default()
        })
}

/// Inverse of [`timestamp`] for cursors passed back into queries.
pub fn to_sqlite(ts: &DateTime<Utc>) -> String {
    ts.format(SQLITE_DATETIME).to_string()
}

fn amount(raw: &str, column: &str, row_id: &str) -> TokenAmount {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", column, raw, row_id, e);
        TokenAmount::zero()
    })
}

pub fn post(row: PostRow) -> Post {
    Post {
        created_at: timestamp(&row.created_at, &row.id),
        tips_received: amount(&row.tips_received, "tips_received", &row.id),
        id: row.id,
        author: row.author,
        content: row.content,
        ipfs_hash: row.ipfs_hash,
        image_hash: row.image_hash,
        block_number: row.block_number,
        transaction_hash: row.transaction_hash,
        likes_count: row.likes_count,
        comments_count: row.comments_count,
    }
}

pub fn comment(row: CommentRow) -> Comment {
    Comment {
        created_at: timestamp(&row.created_at, &row.id),
        id: row.id,
        post_id: row.post_id,
        author: row.author,
        content: row.content,
        ipfs_hash: row.ipfs_hash,
        transaction_hash: row.transaction_hash,
    }
}

pub fn like(row: LikeRow) -> Like {
    Like {
        created_at: timestamp(&row.created_at, &row.id),
        id: row.id,
        post_id: row.post_id,
        author: row.author,
        transaction_hash: row.transaction_hash,
    }
}

pub fn tip(row: TipRow) -> Tip {
    Tip {
        created_at: timestamp(&row.created_at, &row.id),
        amount: amount(&row.amount, "amount", &row.id),
        id: row.id,
        post_id: row.post_id,
        from_address: row.from_address,
        to_address: row.to_address,
        transaction_hash: row.transaction_hash,
    }
}

pub fn user(row: UserRow) -> User {
    User {
        total_tips: amount(&row.total_tips, "total_tips", &row.id),
        id: row.id,
        address: row.address,
        name: row.name,
        avatar_url: row.avatar_url,
        reputation: row.reputation,
        total_likes: row.total_likes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let a = timestamp("2024-05-01 12:30:00", "r");
        let b = timestamp("2024-05-01T12:30:00Z", "r");
        assert_eq!(a, b);
        assert_eq!(to_sqlite(&a), "2024-05-01 12:30:00");
    }

    #[test]
    fn corrupt_values_fall_back() {
        assert_eq!(timestamp("yesterday", "r"), DateTime::<Utc>::default());
        assert!(amount("-3", "amount", "r").is_zero());
    }
}
