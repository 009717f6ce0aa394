pub mod error;
pub mod record;
pub mod signature;
pub mod sink;
pub mod publisher;
pub mod noop_sink;

#[cfg(feature = "tracing-layer")]
pub mod layer;

pub mod env;
