pub mod content_address;
pub mod description;
pub mod shutdown;
