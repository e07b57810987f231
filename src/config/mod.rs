//! Configuration management.

mod settings;

pub use settings::{AppSettings, Paths};
