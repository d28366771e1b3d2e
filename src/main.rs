mod app;
mod cli;
mod commands;
mod config;
mod crypto;
mod exit_codes;
mod generator;
mod item;
mod output;
mod prompt;
mod session;
mod store;
mod version;

use std::process::ExitCode;

fn main() -> ExitCode {
    app::run()
}
