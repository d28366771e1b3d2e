use crate::app::AppContext;
use crate::{cli, exit_codes, generator, output};
use serde_json::json;
use std::process::ExitCode;
use zeroize::Zeroizing;

pub fn run(args: cli::PasswordArgs, ctx: &AppContext) -> ExitCode {
    let mut config = match super::load_settings() {
        Ok(settings) => settings.generator,
        Err(code) => return code,
    };

    args.apply_to_config(&mut config);

    match generator::generate(config, ctx.dev_seed) {
        Ok(password) => {
            let password = Zeroizing::new(password);
            output::print_value(
                &password,
                json!({
                    "kind": "password",
                    "length": config.length,
                    "sampling": config.sampling.as_str(),
                    "entropy_bits": generator::entropy_bits(config.length),
                }),
                &ctx.output_mode,
                ctx.copy_requested,
            )
        }
        Err(error) => {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_generation_error(&error)
        }
    }
}
