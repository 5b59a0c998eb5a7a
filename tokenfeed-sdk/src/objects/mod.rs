pub mod event;
pub mod metadata;
pub mod upstream;
pub mod ws;

pub use event::EnrichedEvent;
pub use metadata::MetadataDocument;
pub use upstream::{RawEvent, SubscribeRequest};
pub use ws::{Decision, FeedFrame, FrameStyle, TaggedFrame};
