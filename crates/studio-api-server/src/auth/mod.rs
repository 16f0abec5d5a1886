pub mod extractor;
pub mod password;
pub mod token;

pub use extractor::{AdminSession, CurrentSession};
pub use password::{PasswordError, PasswordHasher};
