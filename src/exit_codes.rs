use crate::crypto::CryptoError;
use crate::{config, generator, item, prompt, session, store};
use std::process::ExitCode;

pub const EXIT_USAGE: u8 = 64;
pub const EXIT_DATAERR: u8 = 65;
pub const EXIT_IO: u8 = 2;
pub const EXIT_SOFTWARE: u8 = 1;

pub fn exit_code_for_config_error(error: &config::ConfigError) -> ExitCode {
    use config::ConfigError::*;

    match error {
        ConfigDirUnavailable | Io(_) => ExitCode::from(EXIT_IO),
        InvalidGenerator(_) => ExitCode::from(EXIT_USAGE),
        Parse(_) | Serialize(_) => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_generation_error(error: &generator::GenerationError) -> ExitCode {
    use generator::GenerationError::*;

    match error {
        LengthZero | LengthTooLarge(_) => ExitCode::from(EXIT_USAGE),
        RandomSource(_) => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_crypto_error(error: &CryptoError) -> ExitCode {
    match error {
        CryptoError::Decryption => ExitCode::from(EXIT_DATAERR),
        CryptoError::KeyDerivation | CryptoError::Encryption => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_item_error(error: &item::ItemError) -> ExitCode {
    use item::ItemError::*;

    match error {
        Crypto(err) => exit_code_for_crypto_error(err),
        Payload(_) | Record(_) => ExitCode::from(EXIT_DATAERR),
        EmptyTitle => ExitCode::from(EXIT_USAGE),
        Json(_) => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_prompt_error(error: &prompt::PromptError) -> ExitCode {
    use prompt::PromptError::*;

    match error {
        Io(_) => ExitCode::from(EXIT_IO),
        Empty => ExitCode::from(EXIT_USAGE),
    }
}

pub fn exit_code_for_session_error(error: &session::SessionError) -> ExitCode {
    use session::SessionError::*;

    match error {
        Locked | EmptyPassword => ExitCode::from(EXIT_USAGE),
    }
}

pub fn exit_code_for_store_error(error: &store::StoreError) -> ExitCode {
    use store::StoreError::*;

    match error {
        Io(_) | NoParentDir => ExitCode::from(EXIT_IO),
    }
}
