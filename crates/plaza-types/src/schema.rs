//! Table declarations for the five record kinds.
//!
//! These are the single source of truth for column names, types, nullability,
//! defaults and relations. `plaza-db` renders them into `CREATE TABLE`
//! statements and the insert validators in [`crate::insert`] are derived from
//! them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Opaque string identifier (UUIDv4 when generated here).
    Id,
    Text,
    Integer,
    /// Exact decimal stored as text, see [`crate::TokenAmount`].
    Amount,
    Timestamp,
}

impl ColumnType {
    /// Name used in validation messages.
    pub fn expected(self) -> &'static str {
        match self {
            Self::Id | Self::Text => "string",
            Self::Integer => "integer",
            Self::Amount => "decimal string",
            Self::Timestamp => "timestamp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    Integer(i64),
    Amount(&'static str),
    /// Insert time, assigned by the database.
    Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Restrict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name in the database.
    pub name: &'static str,
    /// Field name on the wire.
    pub field: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    const fn new(name: &'static str, field: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            field,
            ty,
            nullable: false,
            primary_key: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey {
            table,
            column,
            on_delete: OnDelete::Restrict,
        });
        self
    }

    /// Assigned by the server on insert and never accepted from callers.
    pub fn server_assigned(&self) -> bool {
        self.primary_key || self.default == Some(ColumnDefault::Now)
    }

    /// Must be present (and non-null) in an insert.
    pub fn required_on_insert(&self) -> bool {
        !self.server_assigned() && !self.nullable && self.default.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    /// Multi-column uniqueness constraints, by column name.
    pub unique_together: &'static [&'static [&'static str]],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns a caller may supply on insert, in declaration order.
    pub fn insert_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.server_assigned())
    }
}

use ColumnType::{Amount, Id, Integer, Text, Timestamp};

const ID: ColumnDef = ColumnDef::new("id", "id", Id).primary_key();
const CREATED_AT: ColumnDef =
    ColumnDef::new("created_at", "createdAt", Timestamp).default(ColumnDefault::Now);
const POST_ID: ColumnDef = ColumnDef::new("post_id", "postId", Id).references("posts", "id");
const AUTHOR: ColumnDef = ColumnDef::new("author", "author", Text);
const CONTENT: ColumnDef = ColumnDef::new("content", "content", Text);
const IPFS_HASH: ColumnDef = ColumnDef::new("ipfs_hash", "ipfsHash", Text);
const TRANSACTION_HASH: ColumnDef =
    ColumnDef::new("transaction_hash", "transactionHash", Text).unique();

pub const POSTS: TableSchema = TableSchema {
    name: "posts",
    columns: &[
        ID,
        AUTHOR,
        CONTENT,
        IPFS_HASH,
        ColumnDef::new("image_hash", "imageHash", Text).nullable(),
        ColumnDef::new("block_number", "blockNumber", Integer),
        TRANSACTION_HASH,
        ColumnDef::new("likes_count", "likesCount", Integer).default(ColumnDefault::Integer(0)),
        ColumnDef::new("comments_count", "commentsCount", Integer)
            .default(ColumnDefault::Integer(0)),
        ColumnDef::new("tips_received", "tipsReceived", Amount).default(ColumnDefault::Amount("0")),
        CREATED_AT,
    ],
    unique_together: &[],
};

pub const COMMENTS: TableSchema = TableSchema {
    name: "comments",
    columns: &[ID, POST_ID, AUTHOR, CONTENT, IPFS_HASH, TRANSACTION_HASH, CREATED_AT],
    unique_together: &[],
};

pub const LIKES: TableSchema = TableSchema {
    name: "likes",
    columns: &[ID, POST_ID, AUTHOR, TRANSACTION_HASH, CREATED_AT],
    unique_together: &[&["post_id", "author"]],
};

pub const TIPS: TableSchema = TableSchema {
    name: "tips",
    columns: &[
        ID,
        POST_ID,
        ColumnDef::new("from_address", "fromAddress", Text),
        ColumnDef::new("to_address", "toAddress", Text),
        ColumnDef::new("amount", "amount", Amount),
        TRANSACTION_HASH,
        CREATED_AT,
    ],
    unique_together: &[],
};

pub const USERS: TableSchema = TableSchema {
    name: "users",
    columns: &[
        ID,
        ColumnDef::new("address", "address", Text).unique(),
        ColumnDef::new("name", "name", Text).nullable(),
        ColumnDef::new("avatar_url", "avatarUrl", Text).nullable(),
        ColumnDef::new("reputation", "reputation", Integer).default(ColumnDefault::Integer(0)),
        ColumnDef::new("total_likes", "totalLikes", Integer).default(ColumnDefault::Integer(0)),
        ColumnDef::new("total_tips", "totalTips", Amount).default(ColumnDefault::Amount("0")),
    ],
    unique_together: &[],
};

/// Every table, parents before children.
pub const ALL_TABLES: &[&TableSchema] = &[&POSTS, &COMMENTS, &LIKES, &TIPS, &USERS];
