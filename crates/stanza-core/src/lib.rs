// Core modules
pub mod builtins;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod template;

// Re-export commonly used types
pub use config::{Config, EngineConfig};
pub use engine::{CompileStatus, Engine, WarmReport};
pub use error::{CallableKind, Result, StanzaError};
pub use path::{FileSystemResolver, PathResolver, ResolveError};
pub use registry::{CallableError, Filter, Macro, Registry};
pub use template::{CompiledUnit, Variables};
