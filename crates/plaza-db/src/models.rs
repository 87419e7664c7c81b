/// Rows as stored. Amounts and timestamps stay in their TEXT form here.
/// Distinct from plaza-types API models to keep the DB layer independent.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub id: String,
    pub author: String,
    pub content: String,
    pub ipfs_hash: String,
    pub image_hash: Option<String>,
    pub block_number: i64,
    pub transaction_hash: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub tips_received: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub ipfs_hash: String,
    pub transaction_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRow {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub transaction_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipRow {
    pub id: String,
    pub post_id: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
    pub transaction_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub address: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub reputation: i64,
    pub total_likes: i64,
    pub total_tips: String,
}
