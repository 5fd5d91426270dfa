pub mod dispatcher;
pub mod relay;
pub mod transport;
pub mod webpush;


pub use dispatcher::{DispatchConfig, Dispatcher, Notification};
pub use relay::{ChannelView, OutgoingMessage, PostedMessage, Relay};
pub use transport::{PushError, PushTransport};
pub use webpush::WebPushTransport;
