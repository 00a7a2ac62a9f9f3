//! stanza.toml loading and engine settings

pub mod consts;
mod model;

pub use model::{CacheConfig, Config, EngineConfig, TemplatesConfig};
