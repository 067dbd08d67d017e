//! CLI Tooling
//!
//! Operator commands against a local data directory: provision roots, walk
//! and edit one user's tree, and inspect raw records.

use crate::asset::{Asset, AssetInfo, DirListing};
use crate::config::{BmsConfig, ConfigLoader, StoragePaths};
use crate::content::{LocalContentStore, OpenFlags};
use crate::error::{ApiError, FsError, StorageError};
use crate::filesystem::{split_path, FileSystem, FolderFileSystem};
use crate::metadata::MODE_PERM;
use crate::store::{RecordStore, SledRecordStore, Storable};
use crate::tree::FolderTree;
use crate::types::Id;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;
use serde_json::json;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// BMS CLI - identifier-addressed hierarchical file store
#[derive(Parser)]
#[command(name = "bms")]
#[command(about = "Multi-user hierarchical file store addressed by opaque identifiers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data directory holding the record database and content
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Root folder identifier for this session
    #[arg(long)]
    pub root: Option<Id>,

    /// Owner identifier recorded on created assets
    #[arg(long)]
    pub owner: Option<Id>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage root folders
    Root {
        #[command(subcommand)]
        command: RootCommands,
    },
    /// Create a folder
    Mkdir {
        path: String,
        /// Permission bits, octal
        #[arg(long, default_value = "755", value_parser = parse_perm)]
        perm: u32,
        /// Create missing parents; an existing folder is not an error
        #[arg(short, long)]
        parents: bool,
    },
    /// List a folder
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write a file from a local file or stdin
    Put {
        path: String,
        /// Local source file (stdin when omitted)
        source: Option<PathBuf>,
        /// Append instead of replacing
        #[arg(long)]
        append: bool,
        /// Permission bits for a new file, octal
        #[arg(long, default_value = "644", value_parser = parse_perm)]
        perm: u32,
    },
    /// Print a file's content
    Cat { path: String },
    /// Remove a file or folder recursively
    Rm { path: String },
    /// Rename or move
    Mv { from: String, to: String },
    /// Describe a file or folder
    Stat {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Change permission bits
    Chmod {
        #[arg(value_parser = parse_perm)]
        perm: u32,
        path: String,
    },
    /// Change owner
    Chown { owner: Id, path: String },
    /// Set the modification time to now
    Touch { path: String },
    /// Dump the raw record stored under an identifier
    Inspect { id: Id },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum RootCommands {
    /// Create a new empty root folder for the session owner
    Create {
        #[arg(long, default_value = "700", value_parser = parse_perm)]
        perm: u32,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

/// Octal permission bits, with or without a `0o` prefix.
pub fn parse_perm(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0o");
    let perm = u32::from_str_radix(digits, 8)
        .map_err(|e| format!("invalid octal permissions {:?}: {}", s, e))?;
    if perm & !MODE_PERM != 0 {
        return Err(format!("permissions out of range: {:o}", perm));
    }
    Ok(perm)
}

/// What a command produced.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutput {
    Text(String),
    Bytes(Vec<u8>),
}

impl CommandOutput {
    /// Write to `out`, adding a trailing newline to non-empty text.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        match self {
            CommandOutput::Text(text) if text.is_empty() => Ok(()),
            CommandOutput::Text(text) => writeln!(out, "{}", text),
            CommandOutput::Bytes(bytes) => out.write_all(bytes),
        }
    }
}

impl Cli {
    /// Effective configuration: file layers plus command-line overrides.
    pub fn load_config(&self) -> Result<BmsConfig, ApiError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        if self.root.is_some() {
            config.session.root = self.root;
        }
        if self.owner.is_some() {
            config.session.owner = self.owner;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        Ok(config)
    }
}

/// CLI context: opened stores plus the effective configuration.
pub struct CliContext {
    config: BmsConfig,
    paths: StoragePaths,
    records: Arc<SledRecordStore>,
    tree: FolderTree,
}

impl CliContext {
    /// Open the record database and content root named by `config`.
    pub fn new(config: BmsConfig) -> Result<Self, ApiError> {
        let paths = config.storage.resolve_paths()?;
        let records = Arc::new(SledRecordStore::open(&paths.records)?);
        let content = Arc::new(LocalContentStore::new(&paths.content).map_err(StorageError::IoError)?);
        let tree = FolderTree::new(records.clone(), content);
        info!(records = %paths.records.display(), content = %paths.content.display(), "opened storage");
        Ok(Self {
            config,
            paths,
            records,
            tree,
        })
    }

    pub fn config(&self) -> &BmsConfig {
        &self.config
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    /// The session filesystem; needs a configured root and owner.
    pub fn filesystem(&self) -> Result<FolderFileSystem, ApiError> {
        Ok(FolderFileSystem::new(
            self.tree.clone(),
            self.config.session.require_root()?,
            self.config.session.require_owner()?,
        ))
    }

    /// Run one command.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        let output = self.execute_inner(command)?;
        self.records.flush()?;
        Ok(output)
    }

    fn execute_inner(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Root {
                command: RootCommands::Create { perm },
            } => {
                let owner = self.config.session.require_owner()?;
                let root = self.tree.create_root(owner, *perm)?;
                Ok(CommandOutput::Text(format!(
                    "Created root {} for owner {}\nexport BMS__SESSION__ROOT={}",
                    root.id(),
                    owner,
                    root.id()
                )))
            }
            Commands::Mkdir {
                path,
                perm,
                parents,
            } => {
                let fs = self.filesystem()?;
                if *parents {
                    mkdir_all(&fs, path, *perm)?;
                } else {
                    fs.mkdir(path, *perm)?;
                }
                Ok(CommandOutput::Text(String::new()))
            }
            Commands::Ls { path, format } => {
                let listing = self.filesystem()?.read_dir(path, 0)?;
                format_listing(&listing, format).map(CommandOutput::Text)
            }
            Commands::Put {
                path,
                source,
                append,
                perm,
            } => {
                let fs = self.filesystem()?;
                let flags = if *append {
                    OpenFlags::create().with_append()
                } else {
                    OpenFlags::overwrite()
                };
                let mut file = fs.open_file(path, flags, *perm)?.into_file()?;
                let written = match source {
                    Some(local) => {
                        let mut reader = std::fs::File::open(local).map_err(StorageError::IoError)?;
                        std::io::copy(&mut reader, &mut file)
                    }
                    None => std::io::copy(&mut std::io::stdin().lock(), &mut file),
                }
                .map_err(|e| FsError::io("put", path.as_str(), e))?;
                file.close()?;
                info!(path = %path, bytes = written, "put");
                Ok(CommandOutput::Text(format!("Wrote {} bytes to {}", written, path)))
            }
            Commands::Cat { path } => {
                let fs = self.filesystem()?;
                let mut file = fs.open_file(path, OpenFlags::read_only(), 0)?.into_file()?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)
                    .map_err(|e| FsError::io("cat", path.as_str(), e))?;
                Ok(CommandOutput::Bytes(bytes))
            }
            Commands::Rm { path } => {
                self.filesystem()?.remove_all(path)?;
                Ok(CommandOutput::Text(String::new()))
            }
            Commands::Mv { from, to } => {
                self.filesystem()?.rename(from, to)?;
                Ok(CommandOutput::Text(String::new()))
            }
            Commands::Stat { path, format } => {
                let info = self.filesystem()?.stat(path)?;
                format_stat(&info, format).map(CommandOutput::Text)
            }
            Commands::Chmod { perm, path } => {
                let info = self.filesystem()?.set_permissions(path, *perm)?;
                Ok(CommandOutput::Text(format!("{} {}", info.mode_string(), path)))
            }
            Commands::Chown { owner, path } => {
                let info = self.filesystem()?.set_owner(path, *owner)?;
                Ok(CommandOutput::Text(format!("{} {}", info.owner, path)))
            }
            Commands::Touch { path } => {
                let info = self.filesystem()?.touch(path)?;
                Ok(CommandOutput::Text(format!("{} {}", info.modified.to_rfc3339(), path)))
            }
            Commands::Inspect { id } => self.inspect(id).map(CommandOutput::Text),
            Commands::Config {
                command: ConfigCommands::Show,
            } => toml::to_string_pretty(&self.config)
                .map(CommandOutput::Text)
                .map_err(|e| ApiError::OutputError(format!("config as TOML: {}", e))),
        }
    }

    fn inspect(&self, id: &Id) -> Result<String, ApiError> {
        let bytes = self
            .records
            .get(id)?
            .ok_or(StorageError::NotFound(*id))?;
        let mut out = format!("Record {} ({} bytes)\n", id, bytes.len());
        out.push_str(&hex_dump(&bytes));

        match Asset::decode(&bytes) {
            Ok(asset) => {
                let meta = asset.metadata();
                out.push_str(&format!(
                    "\nkind:     {}\nname:     {:?}\nowner:    {}\nmode:     {:#o}\nmodified: {}\n",
                    asset.kind(),
                    meta.name,
                    meta.owner,
                    meta.mode,
                    meta.modified().to_rfc3339()
                ));
                match &asset {
                    Asset::Folder(folder) => {
                        out.push_str(&format!("entries:  {}\n", folder.len()));
                        for entry in folder.entries() {
                            out.push_str(&format!("  {} {} {}\n", entry.id, entry.kind(), entry.name));
                        }
                    }
                    Asset::File(file) => {
                        out.push_str(&format!(
                            "content:  {} at {}\n",
                            file.content_id,
                            file.content_path()
                        ));
                    }
                }
            }
            Err(e) => out.push_str(&format!("\nundecodable: {}\n", e)),
        }
        Ok(out)
    }
}

/// Create `path` and any missing parents.
fn mkdir_all(fs: &FolderFileSystem, path: &str, perm: u32) -> Result<(), FsError> {
    let components = split_path(path);
    for depth in 1..=components.len() {
        let prefix = format!("/{}", components[..depth].join("/"));
        match fs.mkdir(&prefix, perm) {
            Ok(()) => {}
            Err(e) if e.is_already_exists() && fs.stat(&prefix)?.is_dir => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Offset, hex, and printable columns, 16 bytes per line.
fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in bytes.chunks(16).enumerate() {
        let printable: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!(
            "{:08x}  {:<32}  {}\n",
            line * 16,
            hex::encode(chunk),
            printable
        ));
    }
    out
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::OutputError(format!("JSON: {}", e)))
}

fn format_listing(listing: &DirListing, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        let skipped: Vec<_> = listing
            .skipped
            .iter()
            .map(|s| json!({ "name": s.name, "error": s.error.to_string() }))
            .collect();
        let out = json!({ "entries": listing.entries, "skipped": skipped });
        return render_json(&out);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Mode", "Size", "Modified", "Name", "ID"]);
    for info in &listing.entries {
        table.add_row(vec![
            info.mode_string(),
            info.size.to_string(),
            info.modified.format("%Y-%m-%d %H:%M").to_string(),
            info.name.clone(),
            info.id.to_string(),
        ]);
    }
    let mut out = table.to_string();
    for skipped in &listing.skipped {
        out.push_str(&format!("\nskipped {}: {}", skipped.name, skipped.error));
    }
    Ok(out)
}

fn format_stat(info: &AssetInfo, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return render_json(info);
    }
    Ok(format!(
        "name:     {}\nid:       {}\nkind:     {}\nmode:     {}\nsize:     {}\nowner:    {}\nmodified: {}",
        info.name,
        info.id,
        if info.is_dir { "folder" } else { "file" },
        info.mode_string(),
        info.size,
        info.owner,
        info.modified.to_rfc3339()
    ))
}
