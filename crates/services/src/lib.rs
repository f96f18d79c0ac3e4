#![forbid(unsafe_code)]

pub mod config;
pub mod content_service;
pub mod error;
pub mod sessions;
pub mod transport;

pub use quiz_core::Clock;

pub use config::EngineConfig;
pub use content_service::ContentService;
pub use error::{ConfigError, EngineError, TransportError};
pub use sessions::{SessionEvent, SessionHub};
pub use transport::{Choice, Delivery, InputMode, Notice, Transport};
