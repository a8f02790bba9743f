use serde::{Deserialize, Serialize};

use super::forward::Forward;
use crate::errors::StoreError;

pub const DEFAULT_PORT: u32 = 22;
const MAX_PORT: u32 = u16::MAX as u32;

/// A user-named SSH connection preset.
///
/// `port` is kept wider than `u16` so that out-of-range input reaches
/// [`Profile::validate`] instead of being truncated on the way in.
///
/// JSON looks like:
/// `{ "name":"prod", "host":"10.0.0.1", "username":"deploy", "port":22, "key":"~/.ssh/id_ed25519" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default = "default_port")]
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

fn default_port() -> u32 {
    DEFAULT_PORT
}

impl Profile {
    /// A profile for `host` on port 22 with no username or key.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: None,
            port: DEFAULT_PORT,
            key: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_port(mut self, port: u32) -> Self {
        self.port = port;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Checks every field invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), StoreError> {
        check_token("name", &self.name)?;
        check_token("host", &self.host)?;
        check_not_option("host", &self.host)?;
        if let Some(username) = &self.username {
            check_token("username", username)?;
            check_not_option("username", username)?;
            if username.contains('@') {
                return Err(StoreError::validation(
                    "username",
                    format!("must not contain '@': {username:?}"),
                ));
            }
        }
        if !(1..=MAX_PORT).contains(&self.port) {
            return Err(StoreError::validation(
                "port",
                format!("must be between 1 and {MAX_PORT}, got {}", self.port),
            ));
        }
        if let Some(key) = &self.key {
            if key.trim().is_empty() {
                return Err(StoreError::validation("key", "path must not be empty"));
            }
            if key.contains('\0') {
                return Err(StoreError::validation("key", "path must not contain NUL bytes"));
            }
        }
        Ok(())
    }

    /// `user@host`, or just the host when no username is stored.
    pub fn destination(&self) -> String {
        match &self.username {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    /// Argument vector of the `ssh` invocation this profile describes.
    /// Nothing is executed.
    pub fn ssh_command(&self) -> Vec<String> {
        self.command_with(Vec::new())
    }

    /// A background tunnel through this profile: `ssh -N -f -L|-R spec ...`.
    /// Nothing is executed.
    pub fn tunnel_command(&self, forward: &Forward) -> Vec<String> {
        self.command_with(vec![
            "-N".to_string(),
            "-f".to_string(),
            forward.flag().to_string(),
            forward.spec().to_string(),
        ])
    }

    fn command_with(&self, options: Vec<String>) -> Vec<String> {
        let mut args = vec!["ssh".to_string()];
        args.extend(options);
        args.push("-p".to_string());
        args.push(self.port.to_string());
        if let Some(key) = &self.key {
            args.push("-i".to_string());
            args.push(key.clone());
        }
        args.push(self.destination());
        args
    }

    /// Case-insensitive substring match over name, host, username and key.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [
            Some(self.name.as_str()),
            Some(self.host.as_str()),
            self.username.as_deref(),
            self.key.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

fn check_token(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::validation(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(StoreError::validation(
            field,
            format!("must not contain whitespace: {value:?}"),
        ));
    }
    Ok(())
}

/// Hostnames, IP literals and user names never start with `-`; ssh would
/// read such a value as an option.
fn check_not_option(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.starts_with('-') {
        return Err(StoreError::validation(
            field,
            format!("must not start with '-': {value:?}"),
        ));
    }
    Ok(())
}

/// Fields to merge over an existing profile. `None` leaves a field as is;
/// for the optional fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub host: Option<String>,
    pub username: Option<Option<String>>,
    pub port: Option<u32>,
    pub key: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The merged record. The name is never changed.
    pub fn apply_to(&self, current: &Profile) -> Profile {
        let mut merged = current.clone();
        if let Some(host) = &self.host {
            merged.host = host.clone();
        }
        if let Some(username) = &self.username {
            merged.username = username.clone();
        }
        if let Some(port) = self.port {
            merged.port = port;
        }
        if let Some(key) = &self.key {
            merged.key = key.clone();
        }
        merged
    }
}
