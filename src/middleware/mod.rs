//! Request gates. Each gate is an extractor whose rejection is the terminal
//! response; handlers list them in the order they must run.

pub mod auth;
pub mod validate;

pub use auth::{authorize, AuthError, Authenticated};
pub use validate::{Validate, ValidUserId, Validated};
