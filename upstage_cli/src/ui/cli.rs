use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use log::{debug, info, warn};
use serde::Serialize;
use upstage_core::{Forward, ForwardSpec, Profile, ProfileStore, ProfileUpdate, StoreError};

use super::output::{format_profile, format_table, shell_join};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "upstage-ssh",
    version,
    about = "Manage ssh settings automatically"
)]
pub struct Args {
    /// Profile store file (default: <config dir>/upstage-ssh/profiles.json)
    #[arg(long, global = true, env = "UPSTAGE_SSH_STORE", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new ssh profile (host, username, port, key)
    Add(AddArgs),
    /// Show one profile
    Get(ShowArgs),
    /// List every profile in the order it was added
    #[command(alias = "ls")]
    List(ListArgs),
    /// Delete a profile
    #[command(alias = "rm")]
    Remove(NameArgs),
    /// Change fields of an existing profile
    Update(UpdateArgs),
    /// Search profiles by name, host, username or key
    Find(FindArgs),
    /// Print the ssh command for a profile without running it
    Command(CommandArgs),
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    /// Unique profile name
    pub name: String,
    /// The host of the ssh settings
    #[arg(short = 'o', long)]
    pub host: String,
    /// The user of the ssh settings
    #[arg(short, long)]
    pub username: Option<String>,
    /// The port of the ssh settings
    #[arg(short, long, default_value_t = upstage_core::storage::DEFAULT_PORT)]
    pub port: u32,
    /// Path to the private key of the ssh settings
    #[arg(short, long)]
    pub key: Option<String>,
}

impl AddArgs {
    fn into_profile(self) -> Profile {
        Profile {
            name: self.name,
            host: self.host,
            username: self.username,
            port: self.port,
            key: self.key,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct NameArgs {
    /// Profile name
    pub name: String,
}

#[derive(ClapArgs, Debug)]
pub struct CommandArgs {
    /// Profile name
    pub name: String,
    /// Print a background tunnel forwarding a local port instead
    #[arg(short = 'L', long, value_name = "LISTEN_PORT:HOST:PORT", conflicts_with = "remote")]
    pub local: Option<ForwardSpec>,
    /// Print a background tunnel forwarding a remote port instead
    #[arg(short = 'R', long, value_name = "LISTEN_PORT:HOST:PORT")]
    pub remote: Option<ForwardSpec>,
}

impl CommandArgs {
    fn forward(&self) -> Option<Forward> {
        match (&self.local, &self.remote) {
            (Some(spec), _) => Some(Forward::Local(spec.clone())),
            (None, Some(spec)) => Some(Forward::Remote(spec.clone())),
            (None, None) => None,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct ShowArgs {
    /// Profile name
    pub name: String,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct FindArgs {
    /// Text to look for, case-insensitive
    pub query: String,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct UpdateArgs {
    /// Profile name
    pub name: String,
    /// New host
    #[arg(short = 'o', long)]
    pub host: Option<String>,
    /// New username
    #[arg(short, long, conflicts_with = "clear_username")]
    pub username: Option<String>,
    /// Forget the stored username
    #[arg(long)]
    pub clear_username: bool,
    /// New port
    #[arg(short, long)]
    pub port: Option<u32>,
    /// New private key path
    #[arg(short, long, conflicts_with = "clear_key")]
    pub key: Option<String>,
    /// Forget the stored key path
    #[arg(long)]
    pub clear_key: bool,
}

impl UpdateArgs {
    fn changes(&self) -> ProfileUpdate {
        ProfileUpdate {
            host: self.host.clone(),
            username: optional_change(&self.username, self.clear_username),
            port: self.port,
            key: optional_change(&self.key, self.clear_key),
        }
    }
}

fn optional_change(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

/// `--store`, then `UPSTAGE_SSH_STORE` (both handled by clap), then the
/// per-user default.
fn resolve_store_path(store: Option<PathBuf>) -> Result<PathBuf, StoreError> {
    store.map(Ok).unwrap_or_else(ProfileStore::default_path)
}

/// Runs exactly one store operation and writes its result to `out`.
pub fn run_cli(args: Args, out: &mut impl Write) -> Result<(), StoreError> {
    let Args { store, command, .. } = args;
    let Some(command) = command else {
        writeln!(out, "upstage-ssh {}", env!("CARGO_PKG_VERSION"))?;
        return Ok(());
    };

    let mut store = ProfileStore::open(resolve_store_path(store)?)?;
    debug!("Using profile store {:?}", store.path());

    match command {
        Command::Add(add) => {
            let profile = add.into_profile();
            let name = profile.name.clone();
            store.add(profile)?;
            writeln!(out, "Added profile '{name}'.")?;
        }
        Command::Get(show) => {
            let profile = store.get(&show.name)?;
            if show.json {
                write_json(out, profile)?;
            } else {
                write!(out, "{}", format_profile(profile))?;
            }
        }
        Command::List(list) => {
            if list.json {
                write_json(out, &store.list().collect::<Vec<_>>())?;
            } else if store.is_empty() {
                writeln!(out, "No profiles stored.")?;
            } else {
                write!(out, "{}", format_table(store.list()))?;
            }
        }
        Command::Remove(target) => {
            store.remove(&target.name)?;
            writeln!(out, "Removed profile '{}'.", target.name)?;
        }
        Command::Update(update) => {
            let changes = update.changes();
            if changes.is_empty() {
                warn!("No fields given for '{}'; profile left as is", update.name);
            }
            let profile = store.update(&update.name, &changes)?;
            writeln!(out, "Updated profile '{}'.", profile.name)?;
            write!(out, "{}", format_profile(&profile))?;
        }
        Command::Find(find) => {
            let hits: Vec<&Profile> = store.find(&find.query).collect();
            info!("{} profile(s) match {:?}", hits.len(), find.query);
            if find.json {
                write_json(out, &hits)?;
            } else if hits.is_empty() {
                writeln!(out, "No profiles match '{}'.", find.query)?;
            } else {
                write!(out, "{}", format_table(hits))?;
            }
        }
        Command::Command(target) => {
            let profile = store.get(&target.name)?;
            let argv = match target.forward() {
                Some(forward) => profile.tunnel_command(&forward),
                None => profile.ssh_command(),
            };
            writeln!(out, "{}", shell_join(&argv))?;
        }
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<(), StoreError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
