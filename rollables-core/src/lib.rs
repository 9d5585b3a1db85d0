pub mod bundle;
pub mod config;
pub mod error;
pub mod resolver;

pub use bundle::{build, BuildMode, BuildOptions, BuildReport};
pub use config::RollablesConfig;
pub use error::{BuildError, ConfigError, ResolveError};
pub use resolver::{filter_entries, EntryId, Resolver};
