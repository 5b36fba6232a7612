//! Defect Tracker - project and defect tracking with role-based access
//!
//! This library provides the core of the `tracker` command-line tool: users
//! and roles, projects, defects and comments, and a field-level change
//! history written on every edit.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `access`: Role → permission policy and the per-request `AuthContext`
//! - `audit`: Change-history entries and the snapshot/diff recorder
//! - `config`: Configuration and path management
//! - `crypto`: Argon2id password hashing
//! - `error`: Custom error types
//! - `models`: Core data models (users, projects, defects, comments)
//! - `storage`: Record stores (JSON files or memory) and the session
//! - `services`: Business logic layer
//! - `export`: JSON, YAML and CSV exports
//! - `display` / `cli`: Terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use defect_tracker::config::{paths::TrackerPaths, settings::Settings};
//! use defect_tracker::services::AuthService;
//! use defect_tracker::storage::Storage;
//!
//! let paths = TrackerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths, &settings)?;
//! let ctx = AuthService::new(&storage, &settings).current()?;
//! ```

pub mod access;
pub mod audit;
pub mod cli;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TrackerError, TrackerResult};
