//! End-to-end dispatch against a scripted docker host.

use indexmap::IndexMap;
use ldev_provider::registry::PortRole;
use ldev_provider::ssh_config::ConnectionInfoSource;
use ldev_provider::{
    CommandExecutor, ConnectionResolver, Connector, CredentialResolver, ExecResult,
    ExecutionContext, LdevError, RemoteTarget, Result, Session, TargetOptions,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

const VAGRANT_SSH_CONFIG: &str = "Host default
  HostName 192.168.33.10
  User vagrant
  Port 2222
  IdentityFile /home/me/site/.vagrant/private_key
  StrictHostKeyChecking no
";

const LISTING: &str = "shop_web_1  0.0.0.0:32776->22/tcp, 0.0.0.0:32777->80/tcp, 0.0.0.0:32778->443/tcp
shop_db_1  0.0.0.0:32780->3306/tcp
blog_web_1  0.0.0.0:32790->22/tcp
";

const COMPOSE: &str = "version: '2'
services:
  web:
    image: php:7-apache
  db:
    image: mariadb
";

struct VagrantOutput;

impl ConnectionInfoSource for VagrantOutput {
    fn describe(&self) -> String {
        "vagrant ssh-config".to_string()
    }

    fn fetch(&self) -> Result<String> {
        Ok(VAGRANT_SSH_CONFIG.to_string())
    }
}

#[derive(Default)]
struct HostLog {
    connects: Vec<String>,
    commands: Vec<(String, String)>,
    files: HashMap<String, String>,
}

/// Answers `docker ps` and `cat` like a docker host with two environments.
struct ScriptedSession {
    address: String,
    log: Rc<RefCell<HostLog>>,
}

impl Session for ScriptedSession {
    fn execute(&mut self, command: &str, sink: Option<&mut dyn Write>) -> Result<ExecResult> {
        self.log
            .borrow_mut()
            .commands
            .push((self.address.clone(), command.to_string()));

        let (output, exit_status) = if command.starts_with("docker ps --format='{{.Names}}") {
            (LISTING.trim_end().to_string(), 0)
        } else if let Some(path) = command.strip_prefix("cat ") {
            if path.ends_with("/docker-compose.yml") {
                (COMPOSE.trim_end().to_string(), 0)
            } else if path == "/opt/provision/docker/compose/shop/ldev.yml" {
                ("db:\n  port: 3306/tcp".to_string(), 0)
            } else if path.ends_with("/ldev.yml") {
                (String::new(), 0)
            } else {
                (format!("cat: {path}: No such file or directory"), 1)
            }
        } else {
            (format!("{} ran {}", self.address, command), 0)
        };

        if let Some(out) = sink {
            writeln!(out, "{output}")?;
            return Ok(ExecResult {
                output: String::new(),
                timed_out: false,
                exit_status,
            });
        }
        Ok(ExecResult {
            output,
            timed_out: false,
            exit_status,
        })
    }

    fn read_file(&mut self, path: &str) -> Result<String> {
        self.log
            .borrow()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| LdevError::RemoteExecution {
                host: self.address.clone(),
                message: format!("{path}: no such file"),
            })
    }

    fn write_file(&mut self, path: &str, contents: &str) -> Result<()> {
        self.log
            .borrow_mut()
            .files
            .insert(path.to_string(), contents.to_string());
        Ok(())
    }
}

struct ScriptedConnector {
    log: Rc<RefCell<HostLog>>,
}

impl Connector for ScriptedConnector {
    fn connect(&self, target: &RemoteTarget, _timeout: Duration) -> Result<Box<dyn Session>> {
        let address = target.address();
        self.log.borrow_mut().connects.push(address.clone());
        Ok(Box::new(ScriptedSession {
            address,
            log: Rc::clone(&self.log),
        }))
    }
}

struct Fixture {
    _ssh_dir: TempDir,
    log: Rc<RefCell<HostLog>>,
    context: ExecutionContext<VagrantOutput, ScriptedConnector>,
}

fn vagrant_fixture(identity: Option<&str>) -> Fixture {
    let ssh_dir = tempfile::tempdir().unwrap();
    fs::write(ssh_dir.path().join("id_ed25519"), "key").unwrap();
    let log = Rc::new(RefCell::new(HostLog::default()));

    let options = TargetOptions {
        vagrant: true,
        identity: identity.map(str::to_string),
        ..TargetOptions::default()
    };
    let resolver = ConnectionResolver::with_parts(
        options,
        CredentialResolver::with_ssh_dir(ssh_dir.path()),
        VagrantOutput,
    );
    let executor = CommandExecutor::with_connector(ScriptedConnector {
        log: Rc::clone(&log),
    });

    Fixture {
        context: ExecutionContext::from_parts(resolver, executor, "/home/me/site"),
        log,
        _ssh_dir: ssh_dir,
    }
}

#[test]
fn test_discovery_reads_descriptors_from_remote_root() {
    let mut fx = vagrant_fixture(None);

    let registry = fx.context.discover().unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), ["shop", "blog"]);

    let shop = registry.get("shop").unwrap();
    assert_eq!(shop.port(PortRole::Ssh), Some("32776"));
    assert_eq!(shop.port(PortRole::Https), Some("32778"));
    assert_eq!(shop.port(PortRole::Db), Some("32780"));
    assert_eq!(
        shop.compose.service_names().collect::<Vec<_>>(),
        ["web", "db"]
    );
    assert_eq!(registry.get("blog").unwrap().port(PortRole::Db), None);

    let log = fx.log.borrow();
    assert_eq!(log.connects, ["vagrant@192.168.33.10:2222"]);
    let commands: Vec<_> = log.commands.iter().map(|(_, c)| c.as_str()).collect();
    assert_eq!(
        commands,
        [
            "docker ps --format='{{.Names}}  {{.Ports}}'",
            "cat /opt/provision/docker/compose/shop/docker-compose.yml",
            "cat /opt/provision/docker/compose/shop/ldev.yml",
            "cat /opt/provision/docker/compose/blog/docker-compose.yml",
            "cat /opt/provision/docker/compose/blog/ldev.yml",
        ]
    );
}

#[test]
fn test_discovery_runs_once_per_invocation() {
    let mut fx = vagrant_fixture(None);
    fx.context.discover().unwrap();
    fx.context.discover().unwrap();
    fx.context.web_connection(Some("shop")).unwrap();

    assert_eq!(fx.log.borrow().commands.len(), 5);
}

#[test]
fn test_web_exec_uses_separate_cached_session() {
    let mut fx = vagrant_fixture(Some("/keys/web_key"));

    fx.context.exec(None, false).unwrap();
    let first = fx
        .context
        .exec_web(Some("shop"), Some("drush status"), false)
        .unwrap()
        .unwrap();
    fx.context
        .exec_web(Some("shop"), Some("drush cr"), false)
        .unwrap();
    fx.context.exec_web(Some("blog"), None, false).unwrap();

    assert_eq!(first.output, "root@192.168.33.10:32776 ran drush status");
    let log = fx.log.borrow();
    assert_eq!(
        log.connects,
        [
            "vagrant@192.168.33.10:2222",
            "root@192.168.33.10:32776",
            "root@192.168.33.10:32790",
        ]
    );
}

#[test]
fn test_web_connection_carries_vagrant_options() {
    let mut fx = vagrant_fixture(None);
    let web = fx.context.web_connection(Some("shop")).unwrap();

    assert_eq!(web.host, "192.168.33.10");
    assert_eq!(web.port, 32776);
    assert!(web.identity_file.ends_with("id_ed25519"));
    assert_eq!(
        web.extra_options,
        IndexMap::from([("StrictHostKeyChecking".to_string(), "no".to_string())])
    );
    assert_eq!(web.session_config["ForwardAgent"], "yes");
}

#[test]
fn test_web_file_access() {
    let mut fx = vagrant_fixture(None);
    fx.context
        .write_web_file(Some("blog"), "/etc/motd", "hello\n")
        .unwrap();
    assert_eq!(
        fx.context.read_web_file(Some("blog"), "/etc/motd").unwrap(),
        "hello\n"
    );
    assert!(matches!(
        fx.context.read_web_file(Some("blog"), "/missing"),
        Err(LdevError::RemoteExecution { .. })
    ));
}

#[test]
fn test_ambiguous_and_unknown_environments() {
    let mut fx = vagrant_fixture(None);
    assert!(matches!(
        fx.context.web_connection(None),
        Err(LdevError::MissingEnvironment)
    ));
    assert!(matches!(
        fx.context.exec_web(Some("wiki"), Some("id"), false),
        Err(LdevError::UnknownEnvironment(_))
    ));
}
