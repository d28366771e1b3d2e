mod config;
mod crypt;
mod item;
mod password;

use crate::app::AppContext;
use crate::session::{self, Session};
use crate::{cli, config as settings, exit_codes, prompt};
use std::process::ExitCode;

pub fn dispatch(command: cli::Commands, ctx: &AppContext) -> ExitCode {
    match command {
        cli::Commands::Password(args) => password::run(args, ctx),
        cli::Commands::Encrypt(args) => crypt::encrypt(args, ctx),
        cli::Commands::Decrypt(args) => crypt::decrypt(args, ctx),
        cli::Commands::Item(args) => item::run(args, ctx),
        cli::Commands::Config(args) => config::run(args, ctx),
    }
}

fn load_settings() -> Result<settings::Settings, ExitCode> {
    settings::load_settings().map_err(|error| {
        eprintln!("Error: {error}");
        exit_codes::exit_code_for_config_error(&error)
    })
}

/// Unlock a session from the remembered master password, or by prompting.
///
/// The returned session owns the only copy of the password; it is cleared
/// when the caller drops it.
fn unlock_session(settings: &settings::Settings) -> Result<Session, ExitCode> {
    let remembered =
        session::remembered_master_password(settings.security.remember_master_password);

    let master_password = match remembered {
        Some(master_password) => master_password,
        None => prompt::prompt_master_password().map_err(|error| {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_prompt_error(&error)
        })?,
    };

    let mut session = Session::locked();
    session.unlock(master_password).map_err(|error| {
        eprintln!("Error: {error}");
        exit_codes::exit_code_for_session_error(&error)
    })?;
    Ok(session)
}

/// Use `inline` when given, otherwise whatever stdin still holds.
fn inline_or_stdin(inline: Option<String>) -> Result<zeroize::Zeroizing<String>, ExitCode> {
    match inline {
        Some(value) => Ok(zeroize::Zeroizing::new(value)),
        None => prompt::read_remaining_stdin().map_err(|error| {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_prompt_error(&error)
        }),
    }
}
