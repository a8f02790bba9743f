use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use tempfile::NamedTempFile;

use super::lock::StoreLock;
use super::profile::{Profile, ProfileUpdate, DEFAULT_PORT};
use crate::errors::StoreError;

/// Newest backing-file format this build reads and writes.
pub const STORE_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "profiles.json";

/// On-disk layout: `{ "version": 1, "profiles": { "<name>": { ... } } }`.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default, deserialize_with = "unique_names")]
    profiles: IndexMap<String, StoredProfile>,
}

/// Like the plain `IndexMap` impl, but a repeated name is an error instead of
/// the last entry silently winning.
fn unique_names<'de, D>(deserializer: D) -> Result<IndexMap<String, StoredProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueNames;

    impl<'de> Visitor<'de> for UniqueNames {
        type Value = IndexMap<String, StoredProfile>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of profile names to profiles")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut profiles = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, profile)) = map.next_entry::<String, StoredProfile>()? {
                if profiles.contains_key(&name) {
                    return Err(de::Error::custom(format_args!(
                        "duplicate profile name '{name}'"
                    )));
                }
                profiles.insert(name, profile);
            }
            Ok(profiles)
        }
    }

    deserializer.deserialize_map(UniqueNames)
}

/// A profile as written under its name; the name is the map key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default = "default_port")]
    port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

fn default_port() -> u32 {
    DEFAULT_PORT
}

impl StoredProfile {
    fn into_profile(self, name: String) -> Profile {
        Profile {
            name,
            host: self.host,
            username: self.username,
            port: self.port,
            key: self.key,
        }
    }
}

impl From<&Profile> for StoredProfile {
    fn from(p: &Profile) -> Self {
        Self {
            host: p.host.clone(),
            username: p.username.clone(),
            port: p.port,
            key: p.key.clone(),
        }
    }
}

/// Validated, durable collection of named SSH profiles.
///
/// The whole file is loaded on [`open`](Self::open). Every mutation re-reads
/// it under [`StoreLock`], applies the change and atomically replaces the
/// file, so the in-memory view is always what was last committed.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: IndexMap<String, Profile>,
}

impl ProfileStore {
    /// `~/.config/upstage-ssh/profiles.json` on Linux,
    /// `%APPDATA%\upstage-ssh\config\profiles.json` on Windows, etc.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let proj = ProjectDirs::from("", "", "upstage-ssh").ok_or(StoreError::NoConfigDir)?;
        Ok(proj.config_dir().join(STORE_FILE_NAME))
    }

    /// Loads the store backed by `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let profiles = read_profiles(&path)?;
        debug!("Opened store {:?} with {} profile(s)", path, profiles.len());
        Ok(Self { path, profiles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Inserts a new profile at the end of the list.
    pub fn add(&mut self, profile: Profile) -> Result<(), StoreError> {
        profile.validate()?;
        self.mutate(|profiles| {
            if profiles.contains_key(&profile.name) {
                return Err(StoreError::DuplicateName(profile.name));
            }
            info!("Adding profile '{}' ({})", profile.name, profile.destination());
            profiles.insert(profile.name.clone(), profile);
            Ok(())
        })
    }

    pub fn get(&self, name: &str) -> Result<&Profile, StoreError> {
        self.profiles
            .get(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Every profile, in insertion order. Call again to restart.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &Profile> + Clone + '_ {
        self.profiles.values()
    }

    /// Profiles whose name, host, username or key contains `query`,
    /// ignoring case, in insertion order.
    pub fn find(&self, query: &str) -> impl Iterator<Item = &Profile> + '_ {
        let needle = query.to_lowercase();
        self.profiles.values().filter(move |p| p.matches(&needle))
    }

    /// Deletes a profile; the others keep their order.
    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        self.mutate(|profiles| {
            profiles
                .shift_remove(name)
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
            info!("Removed profile '{name}'");
            Ok(())
        })
    }

    /// Merges `changes` over the stored record and returns the new record.
    /// The profile keeps its position in the list.
    pub fn update(&mut self, name: &str, changes: &ProfileUpdate) -> Result<Profile, StoreError> {
        self.mutate(|profiles| {
            let current = profiles
                .get_mut(name)
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
            let merged = changes.apply_to(current);
            merged.validate()?;
            *current = merged.clone();
            info!("Updated profile '{name}'");
            Ok(merged)
        })
    }

    /// One read-validate-mutate-write sequence under the store lock.
    /// Nothing is written when `op` fails.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut IndexMap<String, Profile>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = StoreLock::acquire(&self.path)?;
        let mut profiles = read_profiles(&self.path)?;
        let out = op(&mut profiles)?;
        write_profiles(&self.path, &profiles)?;
        self.profiles = profiles;
        Ok(out)
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn read_profiles(path: &Path) -> Result<IndexMap<String, Profile>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No store file at {path:?}, starting empty");
            return Ok(IndexMap::new());
        }
        Err(e) => return Err(corrupt(path, e.to_string())),
    };

    let file: StoreFile =
        serde_json::from_str(&contents).map_err(|e| corrupt(path, e.to_string()))?;
    if file.version > STORE_VERSION {
        return Err(corrupt(
            path,
            format!(
                "format version {} is newer than supported {STORE_VERSION}",
                file.version
            ),
        ));
    }

    let mut profiles = IndexMap::with_capacity(file.profiles.len());
    for (name, stored) in file.profiles {
        let profile = stored.into_profile(name.clone());
        profile
            .validate()
            .map_err(|e| corrupt(path, format!("profile '{name}': {e}")))?;
        profiles.insert(name, profile);
    }
    Ok(profiles)
}

/// Writes the whole mapping to a temp file beside `path`, syncs it, then
/// renames it over `path`.
fn write_profiles(path: &Path, profiles: &IndexMap<String, Profile>) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file = StoreFile {
        version: STORE_VERSION,
        profiles: profiles
            .iter()
            .map(|(name, p)| (name.clone(), StoredProfile::from(p)))
            .collect(),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, &file).map_err(io::Error::from)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} profile(s) to {:?}", profiles.len(), path);
    Ok(())
}
