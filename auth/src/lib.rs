//! Authentication utilities library
//!
//! Provides the building blocks of a cookie/refresh-token session:
//! - Password hashing (Argon2id)
//! - JWT encoding and validation
//! - Access/refresh token issuing with independent secrets
//!
//! Services keep their own session state (which refresh token is live) and
//! use these pieces to mint and check credentials.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{TokenIssuer, TokenKind, TokenSettings};
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(
//!     TokenSettings::new(b"access_secret_at_least_32_bytes_long!".to_vec(), Duration::minutes(15)),
//!     TokenSettings::new(b"refresh_secret_at_least_32_bytes_long".to_vec(), Duration::days(10)),
//! );
//!
//! let pair = issuer.issue_pair("user123", "alice").unwrap();
//! let verified = issuer.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();
//! assert_eq!(verified.subject, "user123");
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use issuer::TokenKind;
pub use issuer::TokenPair;
pub use issuer::TokenSettings;
pub use issuer::VerificationError;
pub use issuer::VerifiedToken;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
