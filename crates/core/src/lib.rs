#![forbid(unsafe_code)]

pub mod model;
pub mod pagination;
pub mod sampler;
pub mod time;

pub use time::Clock;
