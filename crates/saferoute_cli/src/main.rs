//! `saferoute` command-line entry point.
//!
//! Every subcommand prints one pretty JSON document on stdout. Failed
//! submit/list calls print their error envelope and exit with status 1;
//! setup failures go to stderr with status 2.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match commands::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    log::logger().flush();
    ExitCode::from(code)
}
