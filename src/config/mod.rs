//! Configuration for the defect tracker
//!
//! - Path resolution (environment override, XDG, platform default)
//! - Persisted settings, including which storage backend to use

pub mod paths;
pub mod settings;

pub use paths::TrackerPaths;
pub use settings::{Backend, Settings};
