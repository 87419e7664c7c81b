/// Failures callers are expected to tell apart. They travel inside
/// `anyhow::Error`; use `downcast_ref::<DbError>()` to recover them.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("post {0} is still referenced by comments, likes or tips")]
    PostHasDependents(String),

    #[error("corrupt amount {value:?} in {table}.{column} for row {id}")]
    CorruptAmount {
        table: &'static str,
        column: &'static str,
        id: String,
        value: String,
    },
}
