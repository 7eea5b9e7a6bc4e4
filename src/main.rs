#[macro_use]
extern crate tracing;

use clap::Parser;
use libvirt_fleet::actions;
use libvirt_fleet::cli::{Action, Cli};
use libvirt_fleet::libvirt::Libvirt;
use libvirt_fleet::structs::FleetConfig;
use std::env;

fn main() {
    let cli = Cli::parse();

    // setup logging
    if cli.verbose {
        env::set_var("RUST_LOG", "debug");
    } else if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!(
        "libvirt_fleet {} {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let config = match FleetConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    };

    let virt = Libvirt::new(cli.backend.as_str());
    let action = cli.action.unwrap_or(Action::Create { domains: vec![] });
    if let Err(e) = actions::run(&action, &config, &virt, &cli.pool, cli.all) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
