use crate::app::AppContext;
use crate::item::{self, ItemRecord, SealedInput, VaultItemPayload};
use crate::output::item::{item_json, item_text, record_meta_json};
use crate::session::Session;
use crate::{cli, exit_codes, generator, output, store};
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use zeroize::Zeroizing;

pub fn run(args: cli::ItemArgs, ctx: &AppContext) -> ExitCode {
    match args.command {
        cli::ItemCommands::Seal(args) => seal(args, ctx),
        cli::ItemCommands::Open(args) => open(args, ctx),
        cli::ItemCommands::Edit(args) => edit(args, ctx),
    }
}

fn seal(args: cli::ItemSealArgs, ctx: &AppContext) -> ExitCode {
    let settings = match super::load_settings() {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let generated = match maybe_generate(args.fields.generate, settings.generator, ctx) {
        Ok(generated) => generated,
        Err(code) => return code,
    };
    let generated_password = generated.is_some();

    let meta = args.meta();
    let out = args.out;
    let mut payload = VaultItemPayload::default();
    args.fields.into_patch(generated).apply(&mut payload);

    let mut session = match super::unlock_session(&settings) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let result = with_master_password(&session, |master_password| {
        item::seal_record(&payload, meta, master_password)
    });
    session.lock();

    match result {
        Ok(record) => {
            info!(item_type = record.item_type.as_str(), "sealed item");
            emit_record(&record, "item-seal", generated_password, out.as_deref(), ctx)
        }
        Err(code) => code,
    }
}

fn open(args: cli::ItemOpenArgs, ctx: &AppContext) -> ExitCode {
    let settings = match super::load_settings() {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let inline = match read_source(args.source) {
        Ok(inline) => inline,
        Err(code) => return code,
    };

    let mut session = match super::unlock_session(&settings) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let input = match super::inline_or_stdin(inline).and_then(|text| parse_input(&text)) {
        Ok(input) => input,
        Err(code) => return code,
    };

    let result = with_master_password(&session, |master_password| {
        item::open_item(input.blob(), master_password)
    });
    session.lock();

    let payload = match result {
        Ok(payload) => payload,
        Err(code) => return code,
    };

    let mut meta = json!({
        "kind": "item-open",
        "item": item_json(&payload, args.reveal),
    });
    if let SealedInput::Record(record) = &input {
        meta["record"] = record_meta_json(record);
    }

    let value = if ctx.output_mode.json {
        Zeroizing::new(payload.title.clone())
    } else if ctx.output_mode.quiet && args.reveal {
        Zeroizing::new(payload.password.clone())
    } else {
        Zeroizing::new(item_text(&payload, args.reveal))
    };

    let copy_requested = ctx.copy_requested && args.reveal;
    if ctx.copy_requested && !args.reveal {
        output::print_note("Note: --copy needs --reveal; nothing copied.", &ctx.output_mode);
    }
    output::print_value(&value, meta, &ctx.output_mode, copy_requested)
}

fn edit(args: cli::ItemEditArgs, ctx: &AppContext) -> ExitCode {
    let settings = match super::load_settings() {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let meta_patch = args.meta_patch();

    let inline = match read_source(args.source) {
        Ok(inline) => inline,
        Err(code) => return code,
    };

    let generated = match maybe_generate(args.fields.generate, settings.generator, ctx) {
        Ok(generated) => generated,
        Err(code) => return code,
    };
    let generated_password = generated.is_some();
    let out = args.out;
    let patch = args.fields.into_patch(generated);

    let mut session = match super::unlock_session(&settings) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let input = match super::inline_or_stdin(inline).and_then(|text| parse_input(&text)) {
        Ok(input) => input,
        Err(code) => return code,
    };

    if patch.is_empty() && meta_patch.is_empty() {
        output::print_note(
            "Note: no fields changed; re-sealing with fresh salt and nonce.",
            &ctx.output_mode,
        );
    }

    let result = with_master_password(&session, |master_password| {
        item::reseal_item(&input, patch, meta_patch, master_password)
    });
    session.lock();

    match result {
        Ok((_payload, record)) => {
            info!(item_type = record.item_type.as_str(), "re-sealed item");
            emit_record(
                &record,
                "item-edit",
                generated_password,
                out.as_deref(),
                ctx,
            )
        }
        Err(code) => code,
    }
}

fn with_master_password<T>(
    session: &Session,
    op: impl FnOnce(&crate::session::MasterPassword) -> Result<T, item::ItemError>,
) -> Result<T, ExitCode> {
    let master_password = session.master_password().map_err(|error| {
        eprintln!("Error: {error}");
        exit_codes::exit_code_for_session_error(&error)
    })?;

    op(master_password).map_err(|error| {
        eprintln!("Error: {error}");
        exit_codes::exit_code_for_item_error(&error)
    })
}

fn maybe_generate(
    requested: bool,
    config: generator::GeneratorConfig,
    ctx: &AppContext,
) -> Result<Option<String>, ExitCode> {
    if !requested {
        return Ok(None);
    }

    generator::generate(config, ctx.dev_seed)
        .map(Some)
        .map_err(|error| {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_generation_error(&error)
        })
}

/// Inline or file contents; `None` means read stdin once the prompt is done.
fn read_source(source: cli::SealedSourceArgs) -> Result<Option<String>, ExitCode> {
    match (source.blob, source.file) {
        (Some(blob), _) => Ok(Some(blob)),
        (None, Some(path)) => store::read_sealed(&path).map(Some).map_err(|error| {
            eprintln!("Error: {error}");
            exit_codes::exit_code_for_store_error(&error)
        }),
        (None, None) => Ok(None),
    }
}

fn parse_input(text: &str) -> Result<SealedInput, ExitCode> {
    SealedInput::parse(text).map_err(|error| {
        eprintln!("Error: {error}");
        exit_codes::exit_code_for_item_error(&error)
    })
}

fn emit_record(
    record: &ItemRecord,
    kind: &str,
    generated_password: bool,
    out: Option<&Path>,
    ctx: &AppContext,
) -> ExitCode {
    let record_json = match serde_json::to_string(record) {
        Ok(json) => json,
        Err(error) => {
            eprintln!("Error: {error}");
            return ExitCode::from(exit_codes::EXIT_SOFTWARE);
        }
    };

    let mut meta = json!({
        "kind": kind,
        "record": record_meta_json(record),
        "generated_password": generated_password,
    });

    let value = match out {
        Some(path) => {
            if let Err(error) = store::write_sealed_atomic(path, &record_json) {
                eprintln!("Error: {error}");
                return exit_codes::exit_code_for_store_error(&error);
            }
            meta["path"] = json!(path.display().to_string());
            path.display().to_string()
        }
        None => record_json,
    };

    if generated_password {
        output::print_note(
            "Generated a new password; use `item open --reveal` to see it.",
            &ctx.output_mode,
        );
    }

    output::print_value(&value, meta, &ctx.output_mode, ctx.copy_requested)
}
