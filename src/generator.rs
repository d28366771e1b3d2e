use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

#[cfg(any(debug_assertions, feature = "dev-seed"))]
use rand::{SeedableRng, rngs::StdRng};

/// Output alphabet. Order is significant: modulo mapping indexes into it.
pub const CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const DEFAULT_LENGTH: usize = 16;
pub const MAX_LENGTH: usize = 4096;

/// How random bytes become characters.
///
/// `Modulo` maps `byte % 88`, which favours the first 80 characters slightly
/// (256 is not a multiple of 88). It is the default because it reproduces the
/// output distribution of existing clients. `Rejection` discards bytes at or
/// above the largest multiple of the charset length and is unbiased.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Sampling {
    #[default]
    Modulo,
    Rejection,
}

impl Sampling {
    pub fn as_str(self) -> &'static str {
        match self {
            Sampling::Modulo => "modulo",
            Sampling::Rejection => "rejection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub length: usize,
    #[serde(default)]
    pub sampling: Sampling,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            sampling: Sampling::Modulo,
        }
    }
}

#[derive(Debug)]
pub enum GenerationError {
    LengthZero,
    LengthTooLarge(usize),
    RandomSource(rand::Error),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::LengthZero => write!(f, "password length must be greater than zero"),
            GenerationError::LengthTooLarge(length) => write!(
                f,
                "password length {length} exceeds the maximum of {MAX_LENGTH}"
            ),
            GenerationError::RandomSource(err) => {
                write!(f, "secure random source unavailable: {err}")
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::RandomSource(err) => Some(err),
            GenerationError::LengthZero | GenerationError::LengthTooLarge(_) => None,
        }
    }
}

#[cfg(any(debug_assertions, feature = "dev-seed"))]
pub fn generate(config: GeneratorConfig, seed: Option<u64>) -> Result<String, GenerationError> {
    if let Some(seed_value) = seed {
        let mut rng = StdRng::seed_from_u64(seed_value);
        generate_with_rng(&mut rng, config)
    } else {
        let mut rng = OsRng;
        generate_with_rng(&mut rng, config)
    }
}

#[cfg(not(any(debug_assertions, feature = "dev-seed")))]
pub fn generate(config: GeneratorConfig, _seed: Option<u64>) -> Result<String, GenerationError> {
    let mut rng = OsRng;
    generate_with_rng(&mut rng, config)
}

pub fn validate_config(config: &GeneratorConfig) -> Result<(), GenerationError> {
    if config.length == 0 {
        return Err(GenerationError::LengthZero);
    }
    if config.length > MAX_LENGTH {
        return Err(GenerationError::LengthTooLarge(config.length));
    }
    Ok(())
}

pub fn generate_with_rng<R: RngCore + ?Sized>(
    rng: &mut R,
    config: GeneratorConfig,
) -> Result<String, GenerationError> {
    validate_config(&config)?;

    match config.sampling {
        Sampling::Modulo => {
            let mut bytes = Zeroizing::new(vec![0u8; config.length]);
            rng.try_fill_bytes(&mut bytes)
                .map_err(GenerationError::RandomSource)?;
            Ok(map_modulo(&bytes))
        }
        Sampling::Rejection => {
            let mut password = String::with_capacity(config.length);
            let mut buf = Zeroizing::new([0u8; 64]);
            while password.len() < config.length {
                rng.try_fill_bytes(buf.as_mut_slice())
                    .map_err(GenerationError::RandomSource)?;
                push_unbiased(buf.as_slice(), &mut password, config.length);
            }
            Ok(password)
        }
    }
}

/// Bits of entropy of a uniformly generated password of `length` characters.
///
/// Modulo mapping yields marginally less; the figure is an upper bound there.
pub fn entropy_bits(length: usize) -> f64 {
    length as f64 * (CHARSET.len() as f64).log2()
}

fn map_modulo(bytes: &[u8]) -> String {
    let charset = CHARSET.as_bytes();
    bytes
        .iter()
        .map(|b| charset[*b as usize % charset.len()] as char)
        .collect()
}

fn rejection_limit() -> usize {
    256 - 256 % CHARSET.len()
}

fn push_unbiased(bytes: &[u8], password: &mut String, length: usize) {
    let charset = CHARSET.as_bytes();
    let limit = rejection_limit();
    for b in bytes {
        if password.len() == length {
            return;
        }
        let value = *b as usize;
        if value < limit {
            password.push(charset[value % charset.len()] as char);
        }
    }
}
