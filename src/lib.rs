pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::{ApiClient, HttpTransport};
pub use adapters::storage::{FileStore, MemoryStore};
pub use app::advisor::TaxAdvisor;
pub use config::ClientSettings;
pub use core::form::{FormController, FormPhase};
pub use core::session::{SessionEvent, SessionManager};
pub use utils::error::{ApiError, Result, TaxError};
