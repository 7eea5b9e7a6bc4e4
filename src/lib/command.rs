use std::process::Command;

/// Seam between the hypervisor facade and the external toolset, so tests can
/// drive the facade with scripted output instead of a live hypervisor.
pub trait Runner {
    /// Execute `argv` synchronously and return its combined stdout/stderr
    /// text plus whether the process exited zero. A missing binary is
    /// reported the same way as a non-zero exit.
    fn run(&self, argv: &[String]) -> (String, bool);
}

pub struct ShellRunner;

impl Runner for ShellRunner {
    fn run(&self, argv: &[String]) -> (String, bool) {
        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => return (String::new(), false),
        };
        debug!("exec: {}", argv.join(" "));
        match Command::new(program).args(args).output() {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                (text, output.status.success())
            }
            Err(e) => {
                warn!("failed to execute {program}: {e}");
                (e.to_string(), false)
            }
        }
    }
}
