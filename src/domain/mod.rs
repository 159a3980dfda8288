//! Domain layer: normalized records and pure helpers.

pub mod posts;
pub mod slug;
pub mod url;
