#![warn(clippy::pedantic)]

pub mod log;
mod service;
mod settings;

pub use service::Service;
pub use settings::{MAX_USERS, Settings, SettingsError, SettingsRepository, SettingsService};
