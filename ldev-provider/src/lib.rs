//! Command dispatch for ldev.
//!
//! Decides where docker commands run (this machine, an explicit ssh host, or
//! the Vagrant machine of the current project), runs them through a cached
//! session, and discovers the compose environments running there.

pub mod compose;
pub mod context;
pub mod credential;
pub mod executor;
pub mod registry;
pub mod session;
pub mod ssh_config;
pub mod target;
pub mod web;

pub use context::ExecutionContext;
pub use credential::CredentialResolver;
pub use executor::{CommandExecutor, ExecOptions, SessionKey};
pub use registry::{Environment, EnvironmentRegistry, PortRole};
pub use session::{Connector, ExecResult, Session};
pub use target::{ConnectionResolver, ConnectionTarget, RemoteTarget, TargetOptions};
pub use web::WebConnection;

pub use ldev_core::error::{LdevError, Result};
