//! Execution context shared by every command of one invocation.
//!
//! Holds the memoized connection target, the session cache and the memoized
//! environment registry, so a command can call `exec`, `discover` and
//! `exec_web` in any order and still connect and discover at most once.

use crate::compose::REMOTE_ROOT_DIR;
use crate::executor::{CommandExecutor, ExecOptions, SessionKey, DEFAULT_TIMEOUT_SECS};
use crate::registry::EnvironmentRegistry;
use crate::session::{Connector, ExecResult, SshConnector};
use crate::ssh_config::{ConnectionInfoSource, VagrantSshConfig};
use crate::target::{ConnectionResolver, ConnectionTarget, TargetOptions};
use crate::web::{resolve_web, WebConnection};
use ldev_core::error::Result;
use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct ExecutionContext<S = VagrantSshConfig, C = SshConnector> {
    resolver: ConnectionResolver<S>,
    executor: CommandExecutor<C>,
    registry: OnceCell<EnvironmentRegistry>,
    project_dir: PathBuf,
    timeout: Duration,
}

impl ExecutionContext {
    pub fn new(options: TargetOptions, project_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::from_parts(
            ConnectionResolver::new(options)?,
            CommandExecutor::new(),
            project_dir,
        ))
    }
}

impl<S: ConnectionInfoSource, C: Connector> ExecutionContext<S, C> {
    pub fn from_parts(
        resolver: ConnectionResolver<S>,
        executor: CommandExecutor<C>,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            executor,
            registry: OnceCell::new(),
            project_dir: project_dir.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Timeout used when a remote session is opened.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn executor(&self) -> &CommandExecutor<C> {
        &self.executor
    }

    pub fn target(&self) -> Result<&ConnectionTarget> {
        self.resolver.resolve()
    }

    /// Directory holding `provision/docker/compose`.
    pub fn root_dir(&self) -> Result<String> {
        Ok(root_dir_for(self.target()?, &self.project_dir))
    }

    fn options(&self, print: bool) -> ExecOptions {
        ExecOptions::default()
            .with_timeout(self.timeout)
            .printed(print)
    }

    /// Run `command` on the docker host; `None` only opens the session.
    pub fn exec(&mut self, command: Option<&str>, print: bool) -> Result<Option<ExecResult>> {
        let opts = self.options(print);
        let target = self.resolver.resolve()?;
        self.executor.exec(target, command, &opts)
    }

    pub fn run(&mut self, command: &str, print: bool) -> Result<ExecResult> {
        let opts = self.options(print);
        let target = self.resolver.resolve()?;
        self.executor.run(target, command, &opts)
    }

    /// Environments running on the docker host. Discovered on first call.
    pub fn discover(&mut self) -> Result<&EnvironmentRegistry> {
        let opts = self.options(false);
        let Self {
            resolver,
            executor,
            registry,
            project_dir,
            ..
        } = self;
        Self::ensure_registry(resolver, executor, registry, project_dir, &opts)
    }

    pub fn web_connection(&mut self, env: Option<&str>) -> Result<WebConnection> {
        let opts = self.options(false);
        let Self {
            resolver,
            executor,
            registry,
            project_dir,
            ..
        } = self;
        let registry = Self::ensure_registry(resolver, executor, registry, project_dir, &opts)?;
        resolve_web(
            env,
            resolver.resolve()?,
            registry,
            resolver.credentials(),
            resolver.options().identity.as_deref(),
        )
    }

    /// Run `command` in the web container of `env` through its own cached
    /// session; `None` only opens the session.
    pub fn exec_web(
        &mut self,
        env: Option<&str>,
        command: Option<&str>,
        print: bool,
    ) -> Result<Option<ExecResult>> {
        let web = self.web_connection(env)?;
        let opts = self.options(print);
        self.executor.exec_keyed(
            SessionKey::Web(web.env.clone()),
            &ConnectionTarget::Remote(web.target()),
            command,
            &opts,
        )
    }

    pub fn read_web_file(&mut self, env: Option<&str>, path: &str) -> Result<String> {
        let web = self.web_connection(env)?;
        let opts = self.options(false);
        self.executor.read_file(
            SessionKey::Web(web.env.clone()),
            &ConnectionTarget::Remote(web.target()),
            path,
            &opts,
        )
    }

    pub fn write_web_file(&mut self, env: Option<&str>, path: &str, contents: &str) -> Result<()> {
        let web = self.web_connection(env)?;
        let opts = self.options(false);
        self.executor.write_file(
            SessionKey::Web(web.env.clone()),
            &ConnectionTarget::Remote(web.target()),
            path,
            contents,
            &opts,
        )
    }

    fn ensure_registry<'a>(
        resolver: &ConnectionResolver<S>,
        executor: &mut CommandExecutor<C>,
        registry: &'a OnceCell<EnvironmentRegistry>,
        project_dir: &Path,
        opts: &ExecOptions,
    ) -> Result<&'a EnvironmentRegistry> {
        registry.get_or_try_init(|| {
            let target = resolver.resolve()?;
            let root = root_dir_for(target, project_dir);
            EnvironmentRegistry::discover(executor, target, &root, opts)
        })
    }
}

/// `/opt` on a remote docker host, the project directory locally.
pub fn root_dir_for(target: &ConnectionTarget, project_dir: &Path) -> String {
    if target.is_remote() {
        REMOTE_ROOT_DIR.to_string()
    } else {
        project_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialResolver;
    use crate::target::RemoteTarget;
    use indexmap::IndexMap;
    use std::fs;
    use tempfile::tempdir;

    fn local_context(dir: &Path) -> ExecutionContext {
        ExecutionContext::from_parts(
            ConnectionResolver::with_parts(
                TargetOptions::default(),
                CredentialResolver::with_ssh_dir(dir),
                VagrantSshConfig::default(),
            ),
            CommandExecutor::new(),
            dir,
        )
    }

    #[test]
    fn test_root_dir_for() {
        let remote = ConnectionTarget::Remote(RemoteTarget {
            user: "core".into(),
            host: "h".into(),
            port: 22,
            identity_file: "/k".into(),
            options: IndexMap::new(),
        });
        assert_eq!(root_dir_for(&remote, Path::new("/home/me/site")), "/opt");
        assert_eq!(
            root_dir_for(&ConnectionTarget::Local, Path::new("/home/me/site")),
            "/home/me/site"
        );
    }

    #[test]
    fn test_remote_root_dir_without_connecting() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("id_rsa"), "key").unwrap();
        let options = TargetOptions {
            remote: Some("core@docker.example.com".into()),
            ..TargetOptions::default()
        };
        let context: ExecutionContext = ExecutionContext::from_parts(
            ConnectionResolver::with_parts(
                options,
                CredentialResolver::with_ssh_dir(dir.path()),
                VagrantSshConfig::default(),
            ),
            CommandExecutor::new(),
            dir.path(),
        );

        assert_eq!(context.root_dir().unwrap(), "/opt");
        assert!(context.target().unwrap().is_remote());
    }

    #[test]
    fn test_local_exec_and_timeout() {
        let dir = tempdir().unwrap();
        let mut context = local_context(dir.path()).with_timeout(Duration::from_secs(5));

        assert_eq!(context.timeout(), Duration::from_secs(5));
        assert!(context.exec(None, false).unwrap().is_none());
        let result = context.run("echo ready", false).unwrap();
        assert_eq!(result.output, "ready");
        assert_eq!(
            context.root_dir().unwrap(),
            dir.path().display().to_string()
        );
    }
}
