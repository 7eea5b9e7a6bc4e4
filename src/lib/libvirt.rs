use crate::command::{Runner, ShellRunner};
use crate::structs::{DomainSpec, DomainStatus, NetworkSpec, VolumeSpec};
use anyhow::{bail, Result};
use std::collections::HashMap;
use uuid::Uuid;

pub const STATE_RUNNING: &str = "running";
pub const STATE_MISSING: &str = "missing";

/// Facade over the `virsh` and `virt-install` command-line tools. Nothing is
/// cached: every query re-invokes the external tool and re-parses its output.
pub struct Libvirt {
    runner: Box<dyn Runner>,
    backend: String,
}

impl Libvirt {
    pub fn new(backend: &str) -> Self {
        Self::with_runner(Box::new(ShellRunner), backend)
    }

    pub fn with_runner(runner: Box<dyn Runner>, backend: &str) -> Self {
        Libvirt {
            runner,
            backend: backend.to_string(),
        }
    }

    fn virsh(&self, args: &[&str]) -> (String, bool) {
        let mut argv = vec!["virsh".to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        self.runner.run(&argv)
    }

    pub fn domain_delete(&self, name: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["undefine", name]);
        if !ok {
            bail!("failed to undefine domain {name}: {}", output.trim());
        }
        info!("domain {name} undefined");
        Ok(())
    }

    pub fn domain_start(&self, name: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["start", name]);
        if !ok {
            bail!("failed to start domain {name}: {}", output.trim());
        }
        info!("domain {name} started");
        Ok(())
    }

    pub fn domain_stop(&self, name: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["destroy", name]);
        if !ok {
            bail!("failed to stop domain {name}: {}", output.trim());
        }
        info!("domain {name} stopped");
        Ok(())
    }

    pub fn domain_autostart(&self, name: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["autostart", name]);
        if !ok {
            bail!("failed to enable autostart for domain {name}: {}", output.trim());
        }
        Ok(())
    }

    pub fn domain_no_autostart(&self, name: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["autostart", "--disable", name]);
        if !ok {
            bail!("failed to disable autostart for domain {name}: {}", output.trim());
        }
        Ok(())
    }

    pub fn domain_list(&self) -> Result<HashMap<String, DomainStatus>> {
        let (output, ok) = self.virsh(&["list", "--all"]);
        if !ok {
            bail!("can't list domains: {}", output.trim());
        }
        Ok(parse_domain_list(&output))
    }

    pub fn domain_state(&self, name: &str) -> Result<String> {
        let domains = self.domain_list()?;
        Ok(domains
            .get(name)
            .map(|d| d.state.clone())
            .unwrap_or_else(|| STATE_MISSING.to_string()))
    }

    pub fn domain_started(&self, name: &str) -> Result<bool> {
        Ok(self.domain_state(name)? == STATE_RUNNING)
    }

    pub fn domain_defined(&self, name: &str) -> Result<bool> {
        Ok(self.domain_list()?.contains_key(name))
    }

    pub fn domain_create(&self, spec: &DomainSpec) -> Result<()> {
        let argv = domain_create_args(spec, &self.backend);
        let (output, ok) = self.runner.run(&argv);
        if !ok {
            bail!("failed to create domain {}: {}", spec.name, output.trim());
        }
        info!("domain {} created", spec.name);
        Ok(())
    }

    pub fn volume_create(&self, name: &str, pool: &str, size: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["vol-create-as", pool, name, size]);
        if !ok {
            bail!("failed to create volume {name} in pool {pool}: {}", output.trim());
        }
        info!("volume {name} created in pool {pool}");
        Ok(())
    }

    pub fn volume_delete(&self, name: &str, pool: &str) -> Result<()> {
        let (output, ok) = self.virsh(&["vol-delete", "--pool", pool, name]);
        if !ok {
            bail!("failed to delete volume {name} from pool {pool}: {}", output.trim());
        }
        info!("volume {name} deleted from pool {pool}");
        Ok(())
    }

    pub fn volume_list(&self, pool: &str) -> Result<HashMap<String, String>> {
        let (output, ok) = self.virsh(&["vol-list", pool]);
        if !ok {
            bail!("can't list volumes in pool {pool}: {}", output.trim());
        }
        Ok(parse_volume_list(&output))
    }

    pub fn volume_path(&self, name: &str, pool: &str) -> Result<Option<String>> {
        Ok(self.volume_list(pool)?.get(name).cloned())
    }

    pub fn volume_defined(&self, name: &str, pool: &str) -> Result<bool> {
        Ok(self.volume_list(pool)?.contains_key(name))
    }
}

/// Parse `virsh list --all` output. The header row and the separator line
/// fall out of the token-count rule; a "-" id means the domain has no id.
pub fn parse_domain_list(output: &str) -> HashMap<String, DomainStatus> {
    let mut domains = HashMap::new();
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 || tokens[0] == "Id" {
            continue;
        }
        let id = match tokens[0] {
            "-" => None,
            id => Some(id.to_string()),
        };
        domains.insert(
            tokens[1].to_string(),
            DomainStatus {
                state: tokens[2..].join(" "),
                id,
            },
        );
    }
    domains
}

/// Parse `virsh vol-list POOL` output into name -> path.
pub fn parse_volume_list(output: &str) -> HashMap<String, String> {
    let mut volumes = HashMap::new();
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 || tokens[0] == "Name" {
            continue;
        }
        volumes.insert(tokens[0].to_string(), tokens[1].to_string());
    }
    volumes
}

pub fn domain_create_args(spec: &DomainSpec, backend: &str) -> Vec<String> {
    let cpu = spec.cpu.to_string();
    let mut argv: Vec<String> = vec![
        "virt-install".into(),
        "--name".into(),
        spec.name.clone(),
        "--ram".into(),
        spec.ram.to_string(),
        "--vcpus".into(),
        format!("{cpu},cores={cpu}"),
        "--os-type".into(),
        "linux".into(),
        "--virt-type".into(),
        backend.to_string(),
        "--pxe".into(),
        "--boot".into(),
        "network,hd".into(),
        "--noautoconsole".into(),
        "--graphics".into(),
        "vnc,listen=0.0.0.0".into(),
        "--autostart".into(),
    ];
    for volume in &spec.volumes {
        if let Some(flag) = disk_flag(volume) {
            argv.push("--disk".into());
            argv.push(flag);
        }
    }
    for network in &spec.networks {
        if let Some(flag) = network_flag(network) {
            argv.push("--network".into());
            argv.push(flag);
        }
    }
    argv
}

/// Build the `--disk` value for one volume. The volume's name and size never
/// appear in the flag; a missing serial gets a random UUID. Returns None for
/// a volume without a path.
pub fn disk_flag(volume: &VolumeSpec) -> Option<String> {
    let path = match &volume.path {
        Some(p) => p.clone(),
        None => {
            warn!("volume {} has no path, skipping disk", volume.name);
            return None;
        }
    };
    let serial = volume
        .serial
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut parts = vec![
        format!("path={path}"),
        format!("serial={serial}"),
        format!("cache={}", volume.cache),
        format!("bus={}", volume.bus),
    ];
    for (key, value) in &volume.extra {
        parts.push(format!("{key}={value}"));
    }
    Some(parts.join(","))
}

/// Build the `--network` value for one network entry, or None when no target
/// network is named.
pub fn network_flag(net: &NetworkSpec) -> Option<String> {
    let name = match &net.network {
        Some(n) => n.clone(),
        None => {
            warn!("network entry has no target network, skipping");
            return None;
        }
    };
    let mut parts = vec![format!("network={name}"), format!("model={}", net.model)];
    for (key, value) in &net.extra {
        parts.push(format!("{key}={value}"));
    }
    Some(parts.join(","))
}
