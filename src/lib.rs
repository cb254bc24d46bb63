pub mod api;
pub mod auth;
pub mod chat;
pub mod config;

pub use api::{ApiClient, ApiError, UploadForm};
pub use auth::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use chat::{ChatState, ChatSync};
pub use config::ApiConfig;
