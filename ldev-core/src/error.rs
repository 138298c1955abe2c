use thiserror::Error;

/// Every failure the dispatcher can raise.
///
/// None of these are recovered from inside the library: they propagate to the
/// command layer, which renders them and picks the exit code.
#[derive(Error, Debug)]
pub enum LdevError {
    #[error("--remote and --vagrant cannot both be specified")]
    ConflictingTargets,

    #[error("No user in remote \"{remote}\", expected user@host[:port]")]
    MissingUser { remote: String },

    #[error("Invalid port \"{port}\" in remote \"{remote}\"")]
    InvalidPort { remote: String, port: String },

    #[error("Could not find private key, searched: {searched}")]
    NoCredentialFound { searched: String },

    #[error("`{tool}` exited with status {status}:\n{output}")]
    ToolInvocationFailed {
        tool: String,
        status: i32,
        output: String,
    },

    #[error("Could not determine {key} from `{tool}`")]
    IncompleteVirtualizationConfig { tool: String, key: String },

    #[error("Remote ssh socket failed for {host}:{port}: {code} {message}")]
    Socket {
        host: String,
        port: u16,
        code: i32,
        message: String,
    },

    #[error("Remote ssh login failed for {user}@{host}: {log}")]
    AuthenticationFailed {
        user: String,
        host: String,
        log: String,
    },

    #[error("Remote execution on {host} failed: {message}")]
    RemoteExecution { host: String, message: String },

    #[error("Could not read {path}:\n{output}")]
    DescriptorFetch { path: String, output: String },

    #[error("Could not parse {path}: {message}")]
    DescriptorParse { path: String, message: String },

    #[error("No running environment \"{0}\" with a published ssh port")]
    UnknownEnvironment(String),

    #[error("Could not determine the environment to connect to")]
    MissingEnvironment,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Dependency not found: {0}")]
    Dependency(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LdevError {
    /// One-line remediation shown under the error, when there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConflictingTargets => Some("Pick one of --remote or --vagrant"),
            Self::MissingUser { .. } => Some("Use the form user@host or user@host:port"),
            Self::NoCredentialFound { .. } => Some("Pass a private key with --identity"),
            Self::ToolInvocationFailed { .. } | Self::IncompleteVirtualizationConfig { .. } => {
                Some("Check that the Vagrant machine is up: vagrant status")
            }
            Self::Dependency(_) => Some("Install it and make sure it is on PATH"),
            Self::Socket { .. } => Some("Check that the host is reachable and sshd is running"),
            Self::UnknownEnvironment(_) => Some("List running environments with: ldev env"),
            Self::MissingEnvironment => Some("Name the environment explicitly"),
            Self::Config(msg) if msg.starts_with("No .ldev") => Some("Run `ldev init`"),
            _ => None,
        }
    }
}

impl From<serde_yaml_ng::Error> for LdevError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        LdevError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LdevError {
    fn from(err: serde_json::Error) -> Self {
        LdevError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LdevError>;
