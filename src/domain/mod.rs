pub mod item;
pub mod message;
pub mod source;

pub use item::RawItem;
pub use message::OutboundMessage;
pub use source::{Source, SourceList};
