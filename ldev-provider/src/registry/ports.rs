use serde::Serialize;
use std::fmt;

/// Well-known services an environment exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Ssh,
    Http,
    Https,
    Db,
}

impl PortRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Http => "http",
            Self::Https => "https",
            Self::Db => "db",
        }
    }

    /// Role of a container port such as `"22/tcp"`. `db_port` is the
    /// environment's declared database port, if any.
    pub fn classify(container_port: &str, db_port: Option<&str>) -> Option<Self> {
        match container_port {
            "22/tcp" => Some(Self::Ssh),
            "80/tcp" => Some(Self::Http),
            "443/tcp" => Some(Self::Https),
            port if db_port == Some(port) => Some(Self::Db),
            _ => None,
        }
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

/// A published port: `0.0.0.0:32776->22/tcp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortBinding {
    pub container_port: String,
    pub protocol: Protocol,
    pub external_host: String,
    pub external_port: String,
}

impl PortBinding {
    /// Parse one token of the ports field. Exposed-but-unpublished ports
    /// (`3306/tcp`, no `->`) and unknown protocols yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let (public, private) = token.trim().split_once("->")?;

        let (external_host, external_port) = match public.rsplit_once(':') {
            Some((host, port)) => (host, port),
            None => ("", public),
        };
        let (container_port, protocol) = match private.split_once('/') {
            Some((port, proto)) => (port, Protocol::parse(proto)?),
            None => (private, Protocol::Tcp),
        };

        if external_port.is_empty() || container_port.is_empty() {
            return None;
        }

        Some(Self {
            container_port: container_port.to_string(),
            protocol,
            external_host: external_host.to_string(),
            external_port: external_port.to_string(),
        })
    }

    /// `<port>/<proto>`, the key used in container port maps.
    pub fn container_spec(&self) -> String {
        format!("{}/{}", self.container_port, self.protocol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_published_port() {
        let binding = PortBinding::parse("0.0.0.0:32776->22/tcp").unwrap();
        assert_eq!(binding.container_port, "22");
        assert_eq!(binding.protocol, Protocol::Tcp);
        assert_eq!(binding.external_host, "0.0.0.0");
        assert_eq!(binding.external_port, "32776");
        assert_eq!(binding.container_spec(), "22/tcp");
    }

    #[test]
    fn test_parse_ipv6_and_udp() {
        let binding = PortBinding::parse(":::5353->53/udp").unwrap();
        assert_eq!(binding.external_host, "::");
        assert_eq!(binding.external_port, "5353");
        assert_eq!(binding.container_spec(), "53/udp");
    }

    #[test]
    fn test_unpublished_port_is_skipped() {
        assert!(PortBinding::parse("3306/tcp").is_none());
        assert!(PortBinding::parse("").is_none());
        assert!(PortBinding::parse("0.0.0.0:1->2/sctp").is_none());
    }

    #[test]
    fn test_classification() {
        assert_eq!(PortRole::classify("22/tcp", None), Some(PortRole::Ssh));
        assert_eq!(PortRole::classify("80/tcp", None), Some(PortRole::Http));
        assert_eq!(PortRole::classify("443/tcp", None), Some(PortRole::Https));
        assert_eq!(PortRole::classify("3306/tcp", None), None);
        assert_eq!(
            PortRole::classify("3306/tcp", Some("3306/tcp")),
            Some(PortRole::Db)
        );
        assert_eq!(PortRole::classify("22/udp", None), None);
        // The fixed roles take precedence over a clashing db port.
        assert_eq!(
            PortRole::classify("80/tcp", Some("80/tcp")),
            Some(PortRole::Http)
        );
    }
}
