use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_RAM: i64 = 1024;
pub const DEFAULT_CPU: i64 = 2;
pub const DEFAULT_CACHE: &str = "none";
pub const DEFAULT_BUS: &str = "virtio";
pub const DEFAULT_MODEL: &str = "virtio";

/// A YAML scalar that may be written as a number, boolean or string.
/// `ram: 2048` and `ram: "2048"` both load and render identically.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DomainSpec {
    pub name: String,
    #[serde(default = "default_ram")]
    pub ram: Scalar,
    #[serde(default = "default_cpu")]
    pub cpu: Scalar,
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
    #[serde(default)]
    pub networks: Vec<NetworkSpec>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VolumeSpec {
    pub name: String,
    pub size: Scalar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default = "default_cache")]
    pub cache: String,
    #[serde(default = "default_bus")]
    pub bus: String,
    /// Remaining attributes are forwarded verbatim into the disk descriptor,
    /// in declaration order.
    #[serde(flatten)]
    pub extra: IndexMap<String, Scalar>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NetworkSpec {
    /// Target libvirt network. An entry without one produces no interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Scalar>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FleetConfig {
    pub domains: Vec<DomainSpec>,
}

impl FleetConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("can't read config file {}", path.display()))?;
        let config: FleetConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("can't parse config file {}", path.display()))?;
        debug!("loaded {} domains from {}", config.domains.len(), path.display());
        Ok(config)
    }

    // first match wins when a name is configured twice
    pub fn get(&self, name: &str) -> Option<&DomainSpec> {
        self.domains.iter().find(|d| d.name == name)
    }
}

/// One row of `virsh list --all`, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainStatus {
    pub state: String,
    pub id: Option<String>,
}

fn default_ram() -> Scalar {
    Scalar::Int(DEFAULT_RAM)
}

fn default_cpu() -> Scalar {
    Scalar::Int(DEFAULT_CPU)
}

fn default_cache() -> String {
    DEFAULT_CACHE.to_string()
}

fn default_bus() -> String {
    DEFAULT_BUS.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
