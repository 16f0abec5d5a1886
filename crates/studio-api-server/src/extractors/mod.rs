pub mod json;
pub mod query;

pub use json::{ApiJson, ValidatedJson};
pub use query::ApiQuery;
