//! Credential hashing for the defect tracker
//!
//! Passwords are stored as Argon2id PHC strings; the plain text never
//! reaches disk.

pub mod password;

pub use password::{hash_password, verify_password, HashParams};
