#[macro_use]
extern crate tracing;
pub mod actions;
pub mod cli;
pub mod command;
pub mod libvirt;
pub mod structs;
