use crate::connection::{Connection, ConnectionSettings};
use crate::error::P4Error;
use crate::invoke::{CommandResult, CommandRunner};

/// Entry point for every operation: who we are (user and workspace) plus the
/// runner that executes commands.
#[derive(Debug, Clone)]
pub struct P4<R = Connection> {
    user: String,
    client: String,
    runner: R,
}

impl P4<Connection> {
    pub fn connect(settings: ConnectionSettings) -> Result<Self, P4Error> {
        let connection = Connection::open(settings)?;
        Ok(Self {
            user: connection.user().to_string(),
            client: connection.client().to_string(),
            runner: connection,
        })
    }
}

impl<R: CommandRunner> P4<R> {
    pub fn with_runner(user: impl Into<String>, client: impl Into<String>, runner: R) -> Self {
        Self {
            user: user.into(),
            client: client.into(),
            runner,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub(crate) fn run(&self, args: Vec<String>, stdin: Option<&str>) -> Result<CommandResult, P4Error> {
        self.runner.run(&args, stdin)
    }
}

pub(crate) fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}
