//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for transport tokens, app
//! certificates and backend API keys. `SecretString` implements `Debug` with
//! redaction, so a struct deriving `Debug` that holds one stays safe to log
//! through `{:?}` or `tracing`.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct JoinCredentials {
//!     app_id: String,
//!     token: SecretString,
//! }
//!
//! let creds = JoinCredentials {
//!     app_id: "academy-app".to_string(),
//!     token: SecretString::from("rtc-token-value"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("rtc-token-value"));
//! let token: &str = creds.token.expose_secret();
//! assert_eq!(token, "rtc-token-value");
//! ```

pub use secrecy::{ExposeSecret, SecretString};
