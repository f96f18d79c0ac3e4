mod countdown;
mod event;
mod hub;
mod machine;
pub mod prompts;
mod runner;

// Public API of the session subsystem.
pub use event::SessionEvent;
pub use hub::SessionHub;
