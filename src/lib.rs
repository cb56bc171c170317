pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::error::{AppError, Result};
pub use crate::state::OrganizeSession;
