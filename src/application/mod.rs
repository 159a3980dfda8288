//! Content services: category resolution, the posts gateway and the cached
//! query layer on top of them.

pub mod context;
pub mod error;
pub mod gateway;
pub mod infinite;
pub mod notice;
pub mod query;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod testing;
