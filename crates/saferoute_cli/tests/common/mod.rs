use assert_cmd::Command;
use std::path::Path;

/// `saferoute` bound to `db`, isolated from the caller's environment.
pub fn saferoute(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("saferoute").unwrap();
    cmd.env_remove("SAFEROUTE_DB_PATH")
        .env_remove("SAFEROUTE_LOG_DIR")
        .env_remove("SAFEROUTE_LOG_LEVEL")
        .env_remove("SAFEROUTE_REPORT_LIST_LIMIT")
        .arg("--db")
        .arg(db);
    cmd
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
