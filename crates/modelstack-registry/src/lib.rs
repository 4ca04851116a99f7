pub mod registry;
pub mod validate;

pub use registry::{ModelRegistry, ProviderRegistry, ToolGroupRegistry};
pub use validate::{ValidationReport, validate};
