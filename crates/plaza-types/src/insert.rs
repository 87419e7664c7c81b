//! Insert shapes, one per table.
//!
//! Each shape carries exactly the caller-supplied columns of its table. `id`
//! and `createdAt` are never part of an insert shape.

use serde::Serialize;

use crate::amount::TokenAmount;
use crate::schema::{COMMENTS, LIKES, POSTS, TIPS, TableSchema, USERS};
use crate::validate::{self, Fields, Record, ValidationErrors};

pub trait Insertable: Sized {
    const TABLE: &'static TableSchema;

    fn from_record(record: &mut Record) -> Result<Self, ValidationErrors>;

    /// Validate a caller-supplied field map into this shape.
    fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut record = validate::check(Self::TABLE, fields)?;
        Self::from_record(&mut record)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPost {
    pub author: String,
    pub content: String,
    pub ipfs_hash: String,
    pub image_hash: Option<String>,
    pub block_number: i64,
    pub transaction_hash: String,
    pub likes_count: Option<i64>,
    pub comments_count: Option<i64>,
    pub tips_received: Option<TokenAmount>,
}

impl Insertable for InsertPost {
    const TABLE: &'static TableSchema = &POSTS;

    fn from_record(r: &mut Record) -> Result<Self, ValidationErrors> {
        Ok(Self {
            author: r.text("author")?,
            content: r.text("content")?,
            ipfs_hash: r.text("ipfsHash")?,
            image_hash: r.optional_text("imageHash")?,
            block_number: r.integer("blockNumber")?,
            transaction_hash: r.text("transactionHash")?,
            likes_count: r.optional_integer("likesCount")?,
            comments_count: r.optional_integer("commentsCount")?,
            tips_received: r.optional_amount("tipsReceived")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertComment {
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub ipfs_hash: String,
    pub transaction_hash: String,
}

impl Insertable for InsertComment {
    const TABLE: &'static TableSchema = &COMMENTS;

    fn from_record(r: &mut Record) -> Result<Self, ValidationErrors> {
        Ok(Self {
            post_id: r.text("postId")?,
            author: r.text("author")?,
            content: r.text("content")?,
            ipfs_hash: r.text("ipfsHash")?,
            transaction_hash: r.text("transactionHash")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertLike {
    pub post_id: String,
    pub author: String,
    pub transaction_hash: String,
}

impl Insertable for InsertLike {
    const TABLE: &'static TableSchema = &LIKES;

    fn from_record(r: &mut Record) -> Result<Self, ValidationErrors> {
        Ok(Self {
            post_id: r.text("postId")?,
            author: r.text("author")?,
            transaction_hash: r.text("transactionHash")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTip {
    pub post_id: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: TokenAmount,
    pub transaction_hash: String,
}

impl Insertable for InsertTip {
    const TABLE: &'static TableSchema = &TIPS;

    fn from_record(r: &mut Record) -> Result<Self, ValidationErrors> {
        Ok(Self {
            post_id: r.text("postId")?,
            from_address: r.text("fromAddress")?,
            to_address: r.text("toAddress")?,
            amount: r.amount("amount")?,
            transaction_hash: r.text("transactionHash")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertUser {
    pub address: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub reputation: Option<i64>,
    pub total_likes: Option<i64>,
    pub total_tips: Option<TokenAmount>,
}

impl Insertable for InsertUser {
    const TABLE: &'static TableSchema = &USERS;

    fn from_record(r: &mut Record) -> Result<Self, ValidationErrors> {
        Ok(Self {
            address: r.text("address")?,
            name: r.optional_text("name")?,
            avatar_url: r.optional_text("avatarUrl")?,
            reputation: r.optional_integer("reputation")?,
            total_likes: r.optional_integer("totalLikes")?,
            total_tips: r.optional_amount("totalTips")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Violation;
    use serde_json::{Value, json};

    fn fields(v: Value) -> Fields {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn post() -> Value {
        json!({
            "author": "0x71C7656EC7ab88b098defB751B7401B5f6d8976F",
            "content": "gm",
            "ipfsHash": "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
            "blockNumber": 18_000_000,
            "transactionHash": "0xa1",
        })
    }

    fn comment() -> Value {
        json!({
            "postId": "post-1",
            "author": "0xbob",
            "content": "nice",
            "ipfsHash": "QmComment",
            "transactionHash": "0xb1",
        })
    }

    fn like() -> Value {
        json!({ "postId": "post-1", "author": "0xbob", "transactionHash": "0xc1" })
    }

    fn tip() -> Value {
        json!({
            "postId": "post-1",
            "fromAddress": "0xbob",
            "toAddress": "0xalice",
            "amount": "123456789012345678",
            "transactionHash": "0xd1",
        })
    }

    fn user() -> Value {
        json!({ "address": "0xalice" })
    }

    fn with_server_fields(v: Value) -> Fields {
        let mut f = fields(v);
        f.insert("id".into(), json!("client-id"));
        f.insert("createdAt".into(), json!("2024-01-01T00:00:00Z"));
        f
    }

    /// Removing any single required field must fail on that field.
    fn assert_each_required<T: Insertable + std::fmt::Debug>(full: Value) {
        let required: Vec<&str> = T::TABLE
            .columns
            .iter()
            .filter(|c| c.required_on_insert())
            .map(|c| c.field)
            .collect();
        assert!(!required.is_empty());

        for field in required {
            let mut f = fields(full.clone());
            f.remove(field);
            let err = T::from_fields(&f).unwrap_err();
            assert_eq!(err.get(field), Some(&Violation::Required), "{}", field);
        }
    }

    #[test]
    fn well_formed_inputs_validate() {
        let p = InsertPost::from_fields(&with_server_fields(post())).unwrap();
        assert_eq!(p.block_number, 18_000_000);
        assert_eq!(p.image_hash, None);
        assert_eq!(p.likes_count, None);

        let c = InsertComment::from_fields(&with_server_fields(comment())).unwrap();
        assert_eq!(c.post_id, "post-1");

        let l = InsertLike::from_fields(&with_server_fields(like())).unwrap();
        assert_eq!(l.author, "0xbob");

        let t = InsertTip::from_fields(&with_server_fields(tip())).unwrap();
        assert_eq!(t.to_address, "0xalice");

        let u = InsertUser::from_fields(&with_server_fields(user())).unwrap();
        assert_eq!(u.address, "0xalice");
        assert_eq!(u.total_tips, None);
    }

    #[test]
    fn validated_shapes_exclude_id_and_created_at() {
        let values = [
            serde_json::to_value(InsertPost::from_fields(&with_server_fields(post())).unwrap()),
            serde_json::to_value(InsertComment::from_fields(&with_server_fields(comment())).unwrap()),
            serde_json::to_value(InsertLike::from_fields(&with_server_fields(like())).unwrap()),
            serde_json::to_value(InsertTip::from_fields(&with_server_fields(tip())).unwrap()),
            serde_json::to_value(InsertUser::from_fields(&with_server_fields(user())).unwrap()),
        ];

        for value in values {
            let obj = value.unwrap();
            assert!(obj.get("id").is_none());
            assert!(obj.get("createdAt").is_none());
        }
    }

    #[test]
    fn missing_required_fields_fail() {
        assert_each_required::<InsertPost>(post());
        assert_each_required::<InsertComment>(comment());
        assert_each_required::<InsertLike>(like());
        assert_each_required::<InsertTip>(tip());
        assert_each_required::<InsertUser>(user());
    }

    #[test]
    fn post_id_is_required_and_non_null() {
        let null_post_id = |v: Value| {
            let mut f = fields(v);
            f.insert("postId".into(), Value::Null);
            f
        };

        let errors = [
            InsertComment::from_fields(&null_post_id(comment())).unwrap_err(),
            InsertLike::from_fields(&null_post_id(like())).unwrap_err(),
            InsertTip::from_fields(&null_post_id(tip())).unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.get("postId"), Some(&Violation::Null));
        }
    }

    #[test]
    fn optional_columns_accept_values_and_null() {
        let mut f = fields(post());
        f.insert("imageHash".into(), Value::Null);
        f.insert("likesCount".into(), json!(3));
        f.insert("tipsReceived".into(), json!("0.5"));
        let p = InsertPost::from_fields(&f).unwrap();
        assert_eq!(p.image_hash, None);
        assert_eq!(p.likes_count, Some(3));
        assert_eq!(p.tips_received.map(|a| a.to_string()).as_deref(), Some("0.5"));

        let mut f = fields(user());
        f.insert("name".into(), json!("Alice"));
        f.insert("avatarUrl".into(), Value::Null);
        let u = InsertUser::from_fields(&f).unwrap();
        assert_eq!(u.name.as_deref(), Some("Alice"));
        assert_eq!(u.avatar_url, None);
    }

    #[test]
    fn tip_amount_is_kept_exactly() {
        let t = InsertTip::from_fields(&fields(tip())).unwrap();
        assert_eq!(t.amount.to_string(), "123456789012345678");
        assert_eq!(
            serde_json::to_value(&t).unwrap()["amount"],
            json!("123456789012345678")
        );
    }

    #[test]
    fn tip_amount_rejects_numbers() {
        let mut f = fields(tip());
        f.insert("amount".into(), json!(1.5));
        let err = InsertTip::from_fields(&f).unwrap_err();
        assert_eq!(
            err.get("amount"),
            Some(&Violation::InvalidType {
                expected: "decimal string"
            })
        );
    }
}
