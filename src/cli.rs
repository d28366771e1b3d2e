use crate::generator::{GeneratorConfig, Sampling};
use crate::item::{ItemPatch, ItemType, MetaPatch, RecordMeta};
use crate::version;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "keynest",
    author,
    version = version::SHORT,
    long_version = version::LONG,
    about = "Client-side vault encryption and password generation.",
    long_about = "Client-side vault encryption and password generation.\n\n\
        Item data is sealed with a key derived from your master password before it \
        leaves this machine. The master password is never stored; losing it loses \
        the data."
)]
pub struct Cli {
    #[arg(long, global = true, help = "Emit JSON with `value` and `meta` fields.")]
    pub json: bool,

    #[arg(short, long, global = true, help = "Print only the value.")]
    pub quiet: bool,

    #[cfg(feature = "clipboard")]
    #[arg(long, global = true, help = "Copy the value to the clipboard.")]
    pub copy: bool,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)."
    )]
    pub verbose: u8,

    #[cfg(any(debug_assertions, feature = "dev-seed"))]
    #[arg(
        long,
        global = true,
        value_name = "SEED",
        help = "Deterministic generator seed (testing only, never for real secrets)."
    )]
    pub dev_seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    #[cfg(feature = "clipboard")]
    pub fn copy_requested(&self) -> bool {
        self.copy
    }

    #[cfg(not(feature = "clipboard"))]
    pub fn copy_requested(&self) -> bool {
        false
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Generate a random password.")]
    Password(PasswordArgs),

    #[command(about = "Encrypt text into an encoded blob.")]
    Encrypt(EncryptArgs),

    #[command(about = "Decrypt an encoded blob.")]
    Decrypt(DecryptArgs),

    #[command(about = "Seal, open and edit vault items.")]
    Item(ItemArgs),

    #[command(about = "Inspect or change settings.")]
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[arg(short, long, help = "Password length (defaults to the configured length).")]
    pub length: Option<usize>,

    #[arg(long, value_enum, help = "How random bytes map to characters.")]
    pub sampling: Option<Sampling>,
}

impl PasswordArgs {
    pub fn apply_to_config(&self, config: &mut GeneratorConfig) {
        if let Some(length) = self.length {
            config.length = length;
        }
        if let Some(sampling) = self.sampling {
            config.sampling = sampling;
        }
    }
}

#[derive(Debug, Args)]
pub struct EncryptArgs {
    #[arg(
        long,
        help = "Text to encrypt. Read from stdin after the master password when omitted."
    )]
    pub plaintext: Option<String>,
}

#[derive(Debug, Args)]
pub struct DecryptArgs {
    #[arg(long, help = "Encoded blob. Read from stdin after the master password when omitted.")]
    pub blob: Option<String>,
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommands,
}

#[derive(Debug, Subcommand)]
pub enum ItemCommands {
    #[command(about = "Seal item fields into a storage record.")]
    Seal(ItemSealArgs),

    #[command(about = "Open a sealed record or blob.")]
    Open(ItemOpenArgs),

    #[command(about = "Change fields of a sealed item and seal it again.")]
    Edit(ItemEditArgs),
}

#[derive(Debug, Args)]
pub struct SealedSourceArgs {
    #[arg(long, conflicts_with = "file", help = "Sealed record JSON or bare blob.")]
    pub blob: Option<String>,

    #[arg(long, value_name = "PATH", help = "Read the sealed record or blob from a file.")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ItemFieldArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, conflicts_with = "generate", help = "Item password (visible in shell history).")]
    pub password: Option<String>,

    #[arg(long, help = "Fill the password with a freshly generated one.")]
    pub generate: bool,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl fmt::Debug for ItemFieldArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemFieldArgs")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("generate", &self.generate)
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

impl ItemFieldArgs {
    pub fn into_patch(self, generated_password: Option<String>) -> ItemPatch {
        ItemPatch {
            title: self.title,
            username: self.username,
            password: generated_password.or(self.password),
            url: self.url,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Args)]
pub struct ItemSealArgs {
    #[command(flatten)]
    pub fields: ItemFieldArgs,

    #[arg(long = "type", value_enum, default_value_t = ItemType::Password)]
    pub item_type: ItemType,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub favorite: bool,

    #[arg(long, value_name = "PATH", help = "Write the record to a file (mode 0600).")]
    pub out: Option<PathBuf>,
}

impl ItemSealArgs {
    pub fn meta(&self) -> RecordMeta {
        RecordMeta {
            item_type: self.item_type,
            category: self.category.clone(),
            favorite: self.favorite,
        }
    }
}

#[derive(Debug, Args)]
pub struct ItemOpenArgs {
    #[command(flatten)]
    pub source: SealedSourceArgs,

    #[arg(long, help = "Show the password instead of redacting it.")]
    pub reveal: bool,
}

#[derive(Debug, Args)]
pub struct ItemEditArgs {
    #[command(flatten)]
    pub source: SealedSourceArgs,

    #[command(flatten)]
    pub fields: ItemFieldArgs,

    #[arg(long = "type", value_enum, help = "Change the item type.")]
    pub item_type: Option<ItemType>,

    #[arg(long, help = "Change the category (an empty value clears it).")]
    pub category: Option<String>,

    #[arg(long, overrides_with = "no_favorite", help = "Mark the item as a favorite.")]
    pub favorite: bool,

    #[arg(long, overrides_with = "favorite", help = "Unmark the item as a favorite.")]
    pub no_favorite: bool,

    #[arg(long, value_name = "PATH", help = "Write the record to a file (mode 0600).")]
    pub out: Option<PathBuf>,
}

impl ItemEditArgs {
    pub fn meta_patch(&self) -> MetaPatch {
        let favorite = match (self.favorite, self.no_favorite) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        MetaPatch {
            item_type: self.item_type,
            category: self.category.clone(),
            favorite,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Print the config file location.")]
    Path,

    #[command(about = "Print the effective settings.")]
    Show,

    #[command(about = "Update settings.")]
    Set(ConfigSetArgs),
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    #[arg(long, help = "Default generated password length.")]
    pub length: Option<usize>,

    #[arg(long, value_enum)]
    pub sampling: Option<Sampling>,

    #[arg(
        long,
        value_name = "BOOL",
        help = "Read the master password from KEYNEST_MASTER_PASSWORD instead of prompting."
    )]
    pub remember_master_password: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("keynest").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    fn edit_args(args: &[&str]) -> ItemEditArgs {
        match parse(args).command {
            Some(Commands::Item(ItemArgs {
                command: ItemCommands::Edit(edit),
            })) => edit,
            other => panic!("expected item edit, got {other:?}"),
        }
    }

    #[test]
    fn edit_without_metadata_flags_changes_nothing() {
        let edit = edit_args(&["item", "edit", "--blob", "AAAA", "--title", "x"]);
        assert!(edit.meta_patch().is_empty());
    }

    #[test]
    fn edit_metadata_flags_build_a_patch() {
        let edit = edit_args(&[
            "item", "edit", "--blob", "AAAA", "--type", "note", "--category", "work",
            "--favorite",
        ]);
        let patch = edit.meta_patch();
        assert_eq!(patch.item_type, Some(ItemType::Note));
        assert_eq!(patch.category.as_deref(), Some("work"));
        assert_eq!(patch.favorite, Some(true));

        let edit = edit_args(&["item", "edit", "--blob", "AAAA", "--favorite", "--no-favorite"]);
        assert_eq!(edit.meta_patch().favorite, Some(false), "last flag wins");
    }

    #[test]
    fn debug_output_redacts_item_password() {
        let edit = edit_args(&["item", "edit", "--blob", "AAAA", "--password", "hunter2"]);
        let rendered = format!("{edit:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
