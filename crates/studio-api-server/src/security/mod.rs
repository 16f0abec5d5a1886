pub mod bearer;

pub use bearer::{bearer_token, require_secret};
