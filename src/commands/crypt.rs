use crate::app::AppContext;
use crate::{cli, crypto, exit_codes, output};
use serde_json::json;
use std::process::ExitCode;
use tracing::info;

pub fn encrypt(args: cli::EncryptArgs, ctx: &AppContext) -> ExitCode {
    let settings = match super::load_settings() {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let mut session = match super::unlock_session(&settings) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let plaintext = match super::inline_or_stdin(args.plaintext) {
        Ok(plaintext) => plaintext,
        Err(code) => return code,
    };

    let result = session
        .master_password()
        .map_err(|error| {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_session_error(&error)
        })
        .and_then(|master_password| {
            crypto::encrypt(&plaintext, master_password).map_err(|error| {
                eprintln!("Error: {error}");
                exit_codes::exit_code_for_crypto_error(&error)
            })
        });
    session.lock();

    match result {
        Ok(blob) => {
            info!(plaintext_bytes = plaintext.len(), "encrypted");
            output::print_value(
                &blob,
                json!({
                    "kind": "encrypt",
                    "plaintext_bytes": plaintext.len(),
                }),
                &ctx.output_mode,
                ctx.copy_requested,
            )
        }
        Err(code) => code,
    }
}

pub fn decrypt(args: cli::DecryptArgs, ctx: &AppContext) -> ExitCode {
    let settings = match super::load_settings() {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let mut session = match super::unlock_session(&settings) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let blob = match super::inline_or_stdin(args.blob) {
        Ok(blob) => blob,
        Err(code) => return code,
    };

    let result = session
        .master_password()
        .map_err(|error| {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_session_error(&error)
        })
        .and_then(|master_password| {
            crypto::decrypt(&blob, master_password).map_err(|error| {
                eprintln!("Error: {error}");
                exit_codes::exit_code_for_crypto_error(&error)
            })
        });
    session.lock();

    match result {
        Ok(plaintext) => {
            info!(plaintext_bytes = plaintext.len(), "decrypted");
            output::print_value(
                &plaintext,
                json!({
                    "kind": "decrypt",
                    "plaintext_bytes": plaintext.len(),
                }),
                &ctx.output_mode,
                ctx.copy_requested,
            )
        }
        Err(code) => code,
    }
}
