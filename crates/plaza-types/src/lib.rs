pub mod amount;
pub mod api;
pub mod insert;
pub mod models;
pub mod schema;
pub mod validate;

pub use amount::TokenAmount;
pub use validate::{FieldError, ValidationErrors, Violation};
