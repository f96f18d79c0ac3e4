#![forbid(unsafe_code)]

pub mod catalog;
pub mod json;
pub mod repository;

pub use catalog::ContentCatalog;
pub use repository::{
    ContentRepository, InMemoryContentRepository, InMemorySessionStore, SessionStore, Storage,
    StorageError,
};
