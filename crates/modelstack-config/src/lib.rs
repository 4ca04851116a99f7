pub mod env;
pub mod loader;
pub mod model;

pub use env::{EnvResolver, Placeholder, PlaceholderOp};
pub use loader::ConfigLoader;
pub use model::{
    DistributionConfig, ModelEntry, ModelType, ProviderSpec, ServerConfig, ShieldEntry,
    StoreReference, ToolGroupEntry,
};
