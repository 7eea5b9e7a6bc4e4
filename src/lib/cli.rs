use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "libvirt_fleet")]
#[command(version, about = "Manage a fleet of libvirt domains declared in a YAML file")]
pub struct Cli {
    /// Path to the fleet configuration file
    #[arg(short = 'f', long, global = true, default_value = "fleet.yaml")]
    pub config: PathBuf,

    /// Storage pool holding the fleet's volumes
    #[arg(short, long, global = true, default_value = "default")]
    pub pool: String,

    /// Virtualization backend passed to virt-install
    #[arg(short, long, global = true, value_enum, default_value_t = Backend::Kvm)]
    pub backend: Backend,

    /// Operate on every configured domain
    #[arg(short, long, global = true)]
    pub all: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `create` when no action is given
    #[command(subcommand)]
    pub action: Option<Action>,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Print each configured domain with its current state
    List,
    /// Print the parsed configuration
    Dump,
    /// Create volumes and domains, start them and enable autostart
    Create { domains: Vec<String> },
    /// Stop and undefine domains, then delete their volumes
    Delete { domains: Vec<String> },
    /// Delete then create, as two full passes
    Recreate { domains: Vec<String> },
    /// Start domains that are not already running
    Start { domains: Vec<String> },
    /// Stop domains that are running
    Stop { domains: Vec<String> },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Backend {
    Kvm,
    Qemu,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Kvm => "kvm",
            Backend::Qemu => "qemu",
        }
    }
}
