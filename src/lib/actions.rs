use crate::cli::Action;
use crate::libvirt::Libvirt;
use crate::structs::{DomainSpec, FleetConfig};
use anyhow::Result;

/// Run one top-level action over the configured fleet. Warnings log and
/// continue; anything returned as Err aborts the whole run.
pub fn run(action: &Action, config: &FleetConfig, virt: &Libvirt, pool: &str, all: bool) -> Result<()> {
    match action {
        Action::List => list(config, virt),
        Action::Dump => dump(config),
        Action::Create { domains } => create(&working_set(config, domains, all), virt, pool),
        Action::Delete { domains } => delete(&working_set(config, domains, all), virt, pool),
        Action::Recreate { domains } => {
            let selected = working_set(config, domains, all);
            delete(&selected, virt, pool)?;
            create(&selected, virt, pool)
        }
        Action::Start { domains } => start(&working_set(config, domains, all), virt),
        Action::Stop { domains } => stop(&working_set(config, domains, all), virt),
    }
}

fn working_set<'a>(config: &'a FleetConfig, names: &[String], all: bool) -> Vec<&'a DomainSpec> {
    if all {
        return config.domains.iter().collect();
    }
    for name in names {
        if config.get(name).is_none() {
            warn!("domain {name} is not in the configuration");
        }
    }
    config
        .domains
        .iter()
        .filter(|d| names.iter().any(|n| n == &d.name))
        .collect()
}

fn list(config: &FleetConfig, virt: &Libvirt) -> Result<()> {
    let width = config.domains.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for domain in &config.domains {
        let current = virt.domain_state(&domain.name)?;
        println!("{:>width$} {current}", domain.name, width = width);
    }
    Ok(())
}

fn dump(config: &FleetConfig) -> Result<()> {
    println!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

fn create(selected: &[&DomainSpec], virt: &Libvirt, pool: &str) -> Result<()> {
    for domain in selected {
        for volume in &domain.volumes {
            if volume.path.is_some() {
                info!("volume {} has a path, assumed already created", volume.name);
                continue;
            }
            if virt.volume_defined(&volume.name, pool)? {
                warn!("volume {} already defined in pool {pool}", volume.name);
                continue;
            }
            virt.volume_create(&volume.name, pool, &volume.size.to_string())?;
        }
        if virt.domain_defined(&domain.name)? {
            warn!("domain {} already defined", domain.name);
        } else {
            let resolved = resolve_volume_paths(domain, virt, pool)?;
            virt.domain_create(&resolved)?;
        }
        if virt.domain_started(&domain.name)? {
            warn!("domain {} already running", domain.name);
        } else if let Err(e) = virt.domain_start(&domain.name) {
            warn!("{e:#}");
        }
        if let Err(e) = virt.domain_autostart(&domain.name) {
            warn!("{e:#}");
        }
    }
    Ok(())
}

// Volumes created through the pool get their path filled in from vol-list so
// the disk flag can reference them. A path that still can't be resolved is
// reported when the disk flag is built.
fn resolve_volume_paths(domain: &DomainSpec, virt: &Libvirt, pool: &str) -> Result<DomainSpec> {
    let mut resolved = (*domain).clone();
    for volume in &mut resolved.volumes {
        if volume.path.is_none() {
            volume.path = virt.volume_path(&volume.name, pool)?;
        }
    }
    Ok(resolved)
}

fn delete(selected: &[&DomainSpec], virt: &Libvirt, pool: &str) -> Result<()> {
    for domain in selected {
        if virt.domain_started(&domain.name)? {
            if let Err(e) = virt.domain_stop(&domain.name) {
                warn!("{e:#}");
            }
        }
        if virt.domain_defined(&domain.name)? {
            virt.domain_delete(&domain.name)?;
        } else {
            warn!("domain {} not defined", domain.name);
        }
        for volume in &domain.volumes {
            if virt.volume_defined(&volume.name, pool)? {
                virt.volume_delete(&volume.name, pool)?;
            } else {
                warn!("volume {} not defined in pool {pool}", volume.name);
            }
        }
    }
    Ok(())
}

fn start(selected: &[&DomainSpec], virt: &Libvirt) -> Result<()> {
    for domain in selected {
        if virt.domain_started(&domain.name)? {
            warn!("domain {} already running", domain.name);
            continue;
        }
        if let Err(e) = virt.domain_start(&domain.name) {
            warn!("{e:#}");
        }
    }
    Ok(())
}

fn stop(selected: &[&DomainSpec], virt: &Libvirt) -> Result<()> {
    for domain in selected {
        if !virt.domain_started(&domain.name)? {
            warn!("domain {} not running", domain.name);
            continue;
        }
        if let Err(e) = virt.domain_stop(&domain.name) {
            warn!("{e:#}");
        }
    }
    Ok(())
}
