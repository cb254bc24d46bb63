pub mod sync;
pub mod types;

pub use sync::{ChatState, ChatSync, DEFAULT_POLL_INTERVAL};
pub use types::{Channel, Message, NewChannel, NewMessage};
