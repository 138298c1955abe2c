//! One line of `docker ps --format='{{.Names}}  {{.Ports}}'`.

/// A container line split into its naming parts.
///
/// Compose names containers `<project>_<service>_<index>`. The project is the
/// environment; a second copy of a project (`index` > 1) is treated as an
/// environment of its own, named `<project>.<index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub container: String,
    pub env: String,
    pub role: String,
    pub index: u32,
    /// The raw, comma-separated published-ports field. May be empty.
    pub ports: String,
}

/// Split a listing line. Returns `None` for blank lines and for container
/// names that don't follow the compose `<project>_<service>` pattern.
pub fn parse_listing_line(line: &str) -> Option<ListingLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (container, ports) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let mut parts = container.split('_');
    let project = parts.next().filter(|p| !p.is_empty())?;
    let role = parts.next().filter(|r| !r.is_empty())?;
    let index = parts
        .next()
        .and_then(|i| i.parse::<u32>().ok())
        .unwrap_or(1);

    let env = if index > 1 {
        format!("{project}.{index}")
    } else {
        project.to_string()
    };

    Some(ListingLine {
        container: container.to_string(),
        env,
        role: role.to_string(),
        index,
        ports: ports.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_instance() {
        let line =
            parse_listing_line("myapp_web_1  0.0.0.0:32776->22/tcp, 0.0.0.0:32777->80/tcp")
                .unwrap();
        assert_eq!(line.container, "myapp_web_1");
        assert_eq!(line.env, "myapp");
        assert_eq!(line.role, "web");
        assert_eq!(line.index, 1);
        assert_eq!(line.ports, "0.0.0.0:32776->22/tcp, 0.0.0.0:32777->80/tcp");
    }

    #[test]
    fn test_second_instance_gets_its_own_environment() {
        let line = parse_listing_line("myapp_web_2  0.0.0.0:32790->22/tcp").unwrap();
        assert_eq!(line.env, "myapp.2");
        assert_eq!(line.index, 2);
    }

    #[test]
    fn test_container_without_ports() {
        let line = parse_listing_line("myapp_db_1  ").unwrap();
        assert_eq!(line.role, "db");
        assert!(line.ports.is_empty());
    }

    #[test]
    fn test_rejects_non_compose_names() {
        assert!(parse_listing_line("").is_none());
        assert!(parse_listing_line("   ").is_none());
        assert!(parse_listing_line("registry  0.0.0.0:5000->5000/tcp").is_none());
        assert!(parse_listing_line("_web_1  ").is_none());
    }
}
