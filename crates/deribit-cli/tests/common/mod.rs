use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI binary with an isolated HOME so no real config is read.
pub fn run_cli(args: &[&str], home: &Path, base_url: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_deribit-cli"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("NO_COLOR", "1");
    for var in [
        "DERIBIT_ENV",
        "DERIBIT_BASE_URL",
        "DERIBIT_CLIENT_ID",
        "DERIBIT_CLIENT_SECRET",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    if let Some(url) = base_url {
        cmd.env("DERIBIT_BASE_URL", url);
    }
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(args: &[&str], home: &Path, base_url: Option<&str>) -> String {
    let output = run_cli(args, home, base_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str], home: &Path, base_url: Option<&str>) -> String {
    let output = run_cli(args, home, base_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
