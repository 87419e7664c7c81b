use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: String,
    pub content: String,
    pub ipfs_hash: String,
    pub image_hash: Option<String>,
    pub block_number: i64,
    pub transaction_hash: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub tips_received: TokenAmount,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub ipfs_hash: String,
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: String,
    pub post_id: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: TokenAmount,
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Linked to content only by matching `address` against `author` and
/// `toAddress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub address: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub reputation: i64,
    pub total_likes: i64,
    pub total_tips: TokenAmount,
}
