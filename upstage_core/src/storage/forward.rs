use std::{fmt, str::FromStr};

use crate::errors::StoreError;

/// `listen_port:host:port`, the argument of ssh's `-L` and `-R`.
///
/// For a local forward `host:port` is reached from the remote side; for a
/// remote forward it is reached from this machine. IPv6 hosts are written
/// in brackets: `8080:[::1]:80`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardSpec {
    pub listen_port: u16,
    pub host: String,
    pub port: u16,
}

/// A port forward to render into a tunnel command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forward {
    Local(ForwardSpec),
    Remote(ForwardSpec),
}

impl Forward {
    pub fn flag(&self) -> &'static str {
        match self {
            Forward::Local(_) => "-L",
            Forward::Remote(_) => "-R",
        }
    }

    pub fn spec(&self) -> &ForwardSpec {
        match self {
            Forward::Local(spec) | Forward::Remote(spec) => spec,
        }
    }
}

impl fmt::Display for ForwardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.listen_port, self.host, self.port)
    }
}

fn forward_error(reason: String) -> StoreError {
    StoreError::validation("forward", reason)
}

fn parse_port(raw: &str, what: &str) -> Result<u16, StoreError> {
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(forward_error(format!(
            "{what} must be between 1 and 65535, got {raw:?}"
        ))),
    }
}

impl FromStr for ForwardSpec {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let shape = || forward_error(format!("expected LISTEN_PORT:HOST:PORT, got {s:?}"));
        let (listen, rest) = s.split_once(':').ok_or_else(shape)?;
        let (host, port) = rest.rsplit_once(':').ok_or_else(shape)?;

        if host.is_empty() || host.chars().any(char::is_whitespace) || host.starts_with('-') {
            return Err(forward_error(format!("invalid forward host {host:?}")));
        }
        Ok(Self {
            listen_port: parse_port(listen, "listen port")?,
            host: host.to_string(),
            port: parse_port(port, "target port")?,
        })
    }
}
