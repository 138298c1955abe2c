//! Typed views of an environment's declarative descriptors.
//!
//! Each environment directory holds a `docker-compose.yml` and an `ldev.yml`.
//! Only the fields ldev consumes are typed; everything else is kept as raw
//! YAML so nothing is lost when a descriptor is displayed.

use indexmap::IndexMap;
use ldev_core::error::{LdevError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml_ng::Value;

pub const COMPOSE_FILENAME: &str = "docker-compose.yml";
pub const LDEV_FILENAME: &str = "ldev.yml";

/// Parse a descriptor, treating an empty document as all-defaults.
fn parse_yaml<T>(text: &str, source: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml_ng::from_str(text).map_err(|e| LdevError::DescriptorParse {
        path: source.to_string(),
        message: e.to_string(),
    })
}

/// Accept a YAML scalar that may be written as a string or a number.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn de_opt_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_to_string))
}

/// Ports compare against docker's `22/tcp` notation, so a bare number means tcp.
fn de_opt_container_port<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_scalar(deserializer)?
        .map(|port| port.trim().to_string())
        .filter(|port| !port.is_empty())
        .map(|port| {
            if port.contains('/') {
                port
            } else {
                format!("{}/tcp", port)
            }
        }))
}

/// `docker-compose.yml` of one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeDescriptor {
    #[serde(default, deserialize_with = "de_opt_scalar")]
    pub version: Option<String>,

    #[serde(default)]
    pub services: IndexMap<String, Value>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ComposeDescriptor {
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        parse_yaml(text, source)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

/// `ldev.yml` of one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LdevDescriptor {
    #[serde(default)]
    pub db: Option<DbSection>,

    #[serde(default)]
    pub xdebug: Option<XdebugSection>,

    #[serde(default)]
    pub phpstorm: Option<PhpStormSection>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbSection {
    /// Container-side database port, normalized to `<port>/<proto>`.
    #[serde(default, deserialize_with = "de_opt_container_port")]
    pub port: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XdebugSection {
    /// Path of the xdebug ini file inside the web container.
    #[serde(default)]
    pub ini: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhpStormSection {
    #[serde(default)]
    pub project_root: Option<String>,

    #[serde(default, deserialize_with = "de_opt_scalar")]
    pub language_level: Option<String>,
}

impl LdevDescriptor {
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        parse_yaml(text, source)
    }

    /// Container port that should be classified as the `db` role, e.g. `3306/tcp`.
    pub fn db_port(&self) -> Option<&str> {
        self.db.as_ref().and_then(|db| db.port.as_deref())
    }

    pub fn xdebug_ini(&self) -> Option<&str> {
        self.xdebug.as_ref().and_then(|x| x.ini.as_deref())
    }

    pub fn phpstorm_project_root(&self) -> Option<&str> {
        self.phpstorm.as_ref().and_then(|p| p.project_root.as_deref())
    }

    pub fn language_level(&self) -> Option<&str> {
        self.phpstorm
            .as_ref()
            .and_then(|p| p.language_level.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LDEV_YML: &str = r#"
db:
  port: 3306/tcp
xdebug:
  ini: /etc/php/7.0/mods-available/xdebug.ini
phpstorm:
  project_root: docroot
  language_level: 7.0
drush:
  alias: site
"#;

    #[test]
    fn test_ldev_descriptor_typed_fields() {
        let ldev = LdevDescriptor::parse(LDEV_YML, "ldev.yml").unwrap();
        assert_eq!(ldev.db_port(), Some("3306/tcp"));
        assert_eq!(
            ldev.xdebug_ini(),
            Some("/etc/php/7.0/mods-available/xdebug.ini")
        );
        assert_eq!(ldev.phpstorm_project_root(), Some("docroot"));
        assert_eq!(ldev.language_level(), Some("7.0"));
        assert!(ldev.extra.contains_key("drush"));
    }

    #[test]
    fn test_numeric_db_port_is_tcp() {
        let ldev = LdevDescriptor::parse("db:\n  port: 5432\n", "ldev.yml").unwrap();
        assert_eq!(ldev.db_port(), Some("5432/tcp"));
    }

    #[test]
    fn test_udp_db_port_kept() {
        let ldev = LdevDescriptor::parse("db:\n  port: \"9000/udp\"\n", "ldev.yml").unwrap();
        assert_eq!(ldev.db_port(), Some("9000/udp"));
    }

    #[test]
    fn test_missing_db_port_is_tolerated() {
        let ldev = LdevDescriptor::parse("xdebug:\n  ini: /x.ini\n", "ldev.yml").unwrap();
        assert_eq!(ldev.db_port(), None);

        let ldev = LdevDescriptor::parse("db:\n", "ldev.yml").unwrap();
        assert_eq!(ldev.db_port(), None);
    }

    #[test]
    fn test_empty_descriptor_is_default() {
        assert_eq!(
            LdevDescriptor::parse("  \n", "ldev.yml").unwrap(),
            LdevDescriptor::default()
        );
        assert_eq!(
            ComposeDescriptor::parse("", "docker-compose.yml").unwrap(),
            ComposeDescriptor::default()
        );
    }

    #[test]
    fn test_compose_services_in_order() {
        let yaml = r#"
version: 2
services:
  web:
    image: php:7-apache
    ports: ["22", "80"]
  db:
    image: mysql:5.7
volumes:
  data: {}
"#;
        let compose = ComposeDescriptor::parse(yaml, "docker-compose.yml").unwrap();
        assert_eq!(compose.version.as_deref(), Some("2"));
        assert_eq!(compose.service_names().collect::<Vec<_>>(), ["web", "db"]);
        assert!(compose.extra.contains_key("volumes"));
    }

    #[test]
    fn test_malformed_yaml_names_source() {
        let err = ComposeDescriptor::parse("services: [unclosed", "/opt/x/docker-compose.yml")
            .unwrap_err();
        match err {
            LdevError::DescriptorParse { path, .. } => {
                assert_eq!(path, "/opt/x/docker-compose.yml")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
