//! Shared tracing setup for the Kokoromi binaries

mod subscriber;

pub use subscriber::{LogFormat, init, init_with_level};
