//! Equipment Checkout
//!
//! Client for the equipment checkout API: browse equipment types, request a
//! checkout behind the liability waiver, and run the ambassador console that
//! approves requests, assigns units and tracks active checkouts.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by the front-end commands
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire the HTTP repository and services from configuration
    pub fn from_config(
        config: AppConfig,
        notifier: Arc<dyn services::notifications::Notifier>,
    ) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let repository = repository::HttpRepository::new(&config.api)?;
        let services = services::Services::new(Arc::new(repository), &config, notifier);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
