//! ldev configuration library.
//!
//! Two kinds of configuration live here:
//! - the `.ldev` project file, found by walking up from the working directory
//! - the per-environment descriptors (`docker-compose.yml`, `ldev.yml`) read
//!   from the docker host during discovery

pub mod descriptor;
pub mod loader;
pub mod project;

pub use descriptor::{ComposeDescriptor, LdevDescriptor};
pub use loader::ConfigLoader;
pub use project::{ProjectConfig, ProjectDefaults, CONFIG_FILENAME, NAMESPACE};
