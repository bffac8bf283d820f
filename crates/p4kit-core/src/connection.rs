use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::P4Error;

pub const ENV_PORT: &str = "P4PORT";
pub const ENV_USER: &str = "P4USER";
pub const ENV_PASSWORD: &str = "P4PASSWD";
pub const ENV_CLIENT: &str = "P4CLIENT";

const DEFAULT_BINARY: &str = "p4";

/// Everything needed to talk to a server as a given user and workspace.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub port: String,
    pub user: String,
    pub password: String,
    pub client: String,
    /// Log every command line at `info` instead of `debug`.
    pub verbose: bool,
    /// Explicit binary to run instead of looking `p4` up on `PATH`.
    pub binary: Option<PathBuf>,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("client", &self.client)
            .field("verbose", &self.verbose)
            .field("binary", &self.binary)
            .finish()
    }
}

/// A resolved, immutable connection: the binary to run plus the environment
/// injected into every invocation.
#[derive(Clone)]
pub struct Connection {
    pub(crate) user: String,
    pub(crate) client: String,
    pub(crate) verbose: bool,
    pub(crate) binary: PathBuf,
    pub(crate) env: BTreeMap<&'static str, String>,
}

impl Connection {
    /// Locates the binary up front so a missing install fails here rather than
    /// on the first command.
    pub fn open(settings: ConnectionSettings) -> Result<Self, P4Error> {
        let wanted = settings
            .binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY));
        let binary = which::which(&wanted).map_err(|err| {
            P4Error::BinaryNotFound(format!("{}: {}", wanted.display(), err))
        })?;

        let mut env = BTreeMap::new();
        env.insert(ENV_USER, settings.user.clone());
        env.insert(ENV_PASSWORD, settings.password);
        env.insert(ENV_PORT, settings.port);
        env.insert(ENV_CLIENT, settings.client.clone());

        Ok(Self {
            user: settings.user,
            client: settings.client,
            verbose: settings.verbose,
            binary,
            env,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn env(&self) -> &BTreeMap<&'static str, String> {
        &self.env
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("user", &self.user)
            .field("client", &self.client)
            .field("verbose", &self.verbose)
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}
