//! Authentication primitives.
//!
//! This module provides password hashing with Argon2id and verification.
//! Plaintext secrets never leave this boundary.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
