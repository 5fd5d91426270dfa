pub mod channel_id;
pub mod config;
pub mod error;
pub mod memory;
pub mod message_log;
pub mod registry;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use message_log::MessageLog;
pub use registry::ChannelRegistry;
pub use store::NotifyStore;
