pub mod client;
pub mod error;
pub mod upload;

pub use client::ApiClient;
pub use error::ApiError;
pub use upload::UploadForm;
