use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{self, CryptoError};
use crate::session::MasterPassword;

/// Plaintext fields of a vault item, sealed as one JSON document.
///
/// Field order is part of the stored format: it matches what earlier clients
/// produced with `JSON.stringify({title, username, password, url, notes})`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct VaultItemPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

impl fmt::Debug for VaultItemPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultItemPayload")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Password,
    Note,
    Card,
    Identity,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Password => "password",
            ItemType::Note => "note",
            ItemType::Card => "card",
            ItemType::Identity => "identity",
        }
    }
}

/// What gets handed to the storage service: the sealed payload plus the
/// cleartext metadata it indexes on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    pub encrypted_data: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub favorite: bool,
}

/// Record metadata that lives outside the encrypted payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMeta {
    pub item_type: ItemType,
    pub category: Option<String>,
    pub favorite: bool,
}

/// Metadata overrides for re-sealing an existing item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaPatch {
    pub item_type: Option<ItemType>,
    /// An empty category clears it.
    pub category: Option<String>,
    pub favorite: Option<bool>,
}

impl MetaPatch {
    pub fn is_empty(&self) -> bool {
        self.item_type.is_none() && self.category.is_none() && self.favorite.is_none()
    }

    pub fn apply(self, meta: &mut RecordMeta) {
        if let Some(item_type) = self.item_type {
            meta.item_type = item_type;
        }
        if let Some(category) = self.category {
            meta.category = Some(category);
        }
        if let Some(favorite) = self.favorite {
            meta.favorite = favorite;
        }
    }
}

/// Field overrides for re-sealing an existing item.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl fmt::Debug for ItemPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPatch")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.url.is_none()
            && self.notes.is_none()
    }

    pub fn apply(self, payload: &mut VaultItemPayload) {
        let ItemPatch {
            title,
            username,
            password,
            url,
            notes,
        } = self;

        if let Some(title) = title {
            payload.title = title;
        }
        if let Some(username) = username {
            payload.username = username;
        }
        if let Some(password) = password {
            payload.password = password;
        }
        if let Some(url) = url {
            payload.url = url;
        }
        if let Some(notes) = notes {
            payload.notes = notes;
        }
    }
}

#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("decrypted data is not a vault item")]
    Payload(#[source] serde_json::Error),

    #[error("invalid item record")]
    Record(#[source] serde_json::Error),

    #[error("item title cannot be empty")]
    EmptyTitle,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Sealed input as read from a flag, stdin or a file: a full record or a bare blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealedInput {
    Record(ItemRecord),
    Blob(String),
}

impl SealedInput {
    pub fn parse(input: &str) -> Result<Self, ItemError> {
        let trimmed = input.trim();
        if trimmed.starts_with('{') {
            let record = serde_json::from_str(trimmed).map_err(ItemError::Record)?;
            Ok(SealedInput::Record(record))
        } else {
            Ok(SealedInput::Blob(trimmed.to_string()))
        }
    }

    pub fn blob(&self) -> &str {
        match self {
            SealedInput::Record(record) => &record.encrypted_data,
            SealedInput::Blob(blob) => blob,
        }
    }

    pub fn meta(&self) -> RecordMeta {
        match self {
            SealedInput::Record(record) => RecordMeta {
                item_type: record.item_type,
                category: record.category.clone(),
                favorite: record.favorite,
            },
            SealedInput::Blob(_) => RecordMeta::default(),
        }
    }
}

pub fn seal_item(
    payload: &VaultItemPayload,
    master_password: &MasterPassword,
) -> Result<String, ItemError> {
    let json = Zeroizing::new(serde_json::to_string(payload)?);
    Ok(crypto::encrypt(&json, master_password)?)
}

pub fn open_item(
    blob: &str,
    master_password: &MasterPassword,
) -> Result<VaultItemPayload, ItemError> {
    let json = crypto::decrypt(blob, master_password)?;
    serde_json::from_str(&json).map_err(ItemError::Payload)
}

pub fn seal_record(
    payload: &VaultItemPayload,
    meta: RecordMeta,
    master_password: &MasterPassword,
) -> Result<ItemRecord, ItemError> {
    if payload.title.trim().is_empty() {
        return Err(ItemError::EmptyTitle);
    }

    let encrypted_data = seal_item(payload, master_password)?;
    Ok(ItemRecord {
        title: payload.title.clone(),
        encrypted_data,
        item_type: meta.item_type,
        category: meta.category.filter(|c| !c.is_empty()),
        favorite: meta.favorite,
    })
}

/// Open a sealed item, apply both patches, and seal it again under fresh randomness.
pub fn reseal_item(
    input: &SealedInput,
    patch: ItemPatch,
    meta_patch: MetaPatch,
    master_password: &MasterPassword,
) -> Result<(VaultItemPayload, ItemRecord), ItemError> {
    let mut payload = open_item(input.blob(), master_password)?;
    patch.apply(&mut payload);
    let mut meta = input.meta();
    meta_patch.apply(&mut meta);
    let record = seal_record(&payload, meta, master_password)?;
    Ok((payload, record))
}
