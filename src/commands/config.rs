use crate::app::AppContext;
use crate::{cli, config, exit_codes, output};
use serde_json::json;
use std::process::ExitCode;

pub fn run(args: cli::ConfigArgs, ctx: &AppContext) -> ExitCode {
    match args.command {
        cli::ConfigCommands::Path => {
            let path = match config::config_path() {
                Ok(path) => path,
                Err(error) => {
                    eprintln!("Error: {error}");
                    return exit_codes::exit_code_for_config_error(&error);
                }
            };

            output::print_value(
                &path.display().to_string(),
                json!({
                    "kind": "config-path",
                }),
                &ctx.output_mode,
                ctx.copy_requested,
            )
        }
        cli::ConfigCommands::Show => {
            let settings = match super::load_settings() {
                Ok(settings) => settings,
                Err(code) => return code,
            };

            let rendered = match toml::to_string_pretty(&settings) {
                Ok(rendered) => rendered,
                Err(error) => {
                    eprintln!("Error: {error}");
                    return ExitCode::from(exit_codes::EXIT_SOFTWARE);
                }
            };

            output::print_value(
                rendered.trim_end(),
                json!({
                    "kind": "config-show",
                    "settings": settings,
                }),
                &ctx.output_mode,
                false,
            )
        }
        cli::ConfigCommands::Set(set_args) => {
            let mut settings = match super::load_settings() {
                Ok(settings) => settings,
                Err(code) => return code,
            };

            if let Some(length) = set_args.length {
                settings.generator.length = length;
            }
            if let Some(sampling) = set_args.sampling {
                settings.generator.sampling = sampling;
            }
            if let Some(remember) = set_args.remember_master_password {
                settings.security.remember_master_password = remember;
            }

            match config::save_settings(&settings) {
                Ok(path) => {
                    output::print_note(
                        &format!("Saved settings to {}", path.display()),
                        &ctx.output_mode,
                    );
                    output::print_value(
                        &path.display().to_string(),
                        json!({
                            "kind": "config-set",
                            "settings": settings,
                        }),
                        &ctx.output_mode,
                        false,
                    )
                }
                Err(error) => {
                    eprintln!("Error: {error}");
                    exit_codes::exit_code_for_config_error(&error)
                }
            }
        }
    }
}
