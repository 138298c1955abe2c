// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ldev")]
#[command(about = "Run docker-compose development environments locally, over ssh, or inside Vagrant")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

/// Where docker runs. Unset values fall back to the `.ldev` defaults.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Host of the machine running docker, as user@hostname[:port]. Cannot be used with --vagrant
    #[arg(short, long, global = true, value_name = "USER@HOST[:PORT]")]
    pub remote: Option<String>,

    /// Private key to use with ssh. By default ~/.ssh is searched for id_dsa, id_ecdsa, id_ed25519, id_rsa
    #[arg(short, long, global = true, value_name = "PATH")]
    pub identity: Option<String>,

    /// Docker is running inside the Vagrant machine defined in the current directory. Cannot be used with --remote
    #[arg(long, global = true)]
    pub vagrant: bool,

    /// Seconds a remote command may stay silent before it is reported as timed out
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a .ldev project file in the current directory
    Init,

    /// Start a development environment
    Up {
        /// Directory name under provision/docker/compose holding the environment's docker-compose.yml
        environment: String,
    },

    /// Stop and remove a development environment's containers
    Destroy {
        /// Directory name under provision/docker/compose holding the environment's docker-compose.yml
        environment: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List running containers
    Ps {
        /// Only list containers of this environment
        environment: Option<String>,
    },

    /// List development environments defined on the docker host
    #[command(alias = "compose:ls")]
    Ls,

    /// Show running environments with their containers and ports
    Env {
        /// Only show this environment
        environment: Option<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the ssh command that logs into an environment's web container
    SshCommand {
        /// Environment name; may be omitted when only one is running
        environment: Option<String>,
    },

    /// Run a command in an environment's web container
    Exec {
        /// Environment name; may be omitted when only one is running
        environment: Option<String>,

        /// Command and arguments, after `--`
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Print a file from an environment's web container
    Get {
        environment: String,

        /// Path inside the container
        path: String,
    },

    /// Copy a local file into an environment's web container
    Put {
        environment: String,

        /// Local file to upload
        file: PathBuf,

        /// Destination path inside the container
        path: String,
    },
}

impl Command {
    /// Subcommand name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Up { .. } => "up",
            Command::Destroy { .. } => "destroy",
            Command::Ps { .. } => "ps",
            Command::Ls => "ls",
            Command::Env { .. } => "env",
            Command::SshCommand { .. } => "ssh-command",
            Command::Exec { .. } => "exec",
            Command::Get { .. } => "get",
            Command::Put { .. } => "put",
        }
    }
}
