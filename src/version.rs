#[cfg(all(not(feature = "clipboard"), not(feature = "dev-seed")))]
pub const SHORT: &str = env!("CARGO_PKG_VERSION");

#[cfg(all(feature = "clipboard", not(feature = "dev-seed")))]
pub const SHORT: &str = concat!(env!("CARGO_PKG_VERSION"), " (features: clipboard)");

#[cfg(all(not(feature = "clipboard"), feature = "dev-seed"))]
pub const SHORT: &str = concat!(env!("CARGO_PKG_VERSION"), " (features: dev-seed)");

#[cfg(all(feature = "clipboard", feature = "dev-seed"))]
pub const SHORT: &str = concat!(env!("CARGO_PKG_VERSION"), " (features: clipboard,dev-seed)");

pub const LONG: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nkdf: PBKDF2-HMAC-SHA256, 100000 iterations\naead: AES-256-GCM"
);
