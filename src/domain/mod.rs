//! Domain error types for Aegis.
//!
//! All fallible operations return [`Result<T, AegisError>`]:
//!
//! ```rust
//! use aegis::domain::{AegisError, Result};
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let _config = aegis::config::load_config("aegis.toml")?;
//!     Ok(())
//! }
//! # assert!(matches!(example(), Err(AegisError::Configuration(_))));
//! ```

pub mod errors;
pub mod result;

pub use errors::AegisError;
pub use result::Result;
