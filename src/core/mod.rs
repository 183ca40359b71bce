pub mod form;
pub mod preferences;
pub mod report;
pub mod session;

pub use crate::domain::model::{Field, FormData, ValidationErrors};
pub use crate::domain::ports::{AdviceApi, ConfigProvider, KeyValueStore, TokenSource};
pub use crate::utils::error::Result;
