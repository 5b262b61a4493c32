pub mod base;
pub mod channel_sink;

pub use base::{CredentialSink, Navigator};
pub use channel_sink::ChannelSink;
