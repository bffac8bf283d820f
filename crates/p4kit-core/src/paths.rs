use serde::Serialize;

use crate::client::{args, P4};
use crate::error::P4Error;
use crate::invoke::CommandRunner;

/// The three names `p4 where` reports for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WherePaths {
    pub depot: String,
    pub client: String,
    pub filesystem: String,
}

impl<R: CommandRunner> P4<R> {
    pub fn where_path(&self, path: &str) -> Result<WherePaths, P4Error> {
        let out = self
            .run(args(&["where", path]), None)?
            .check(format!("Couldn't find '{}'", path))?;
        parse_where(&out.stdout, &out.stderr)
    }
}

pub(crate) fn parse_where(stdout: &str, stderr: &str) -> Result<WherePaths, P4Error> {
    let tokens: Vec<&str> = stdout.split(' ').collect();
    let [depot, client, filesystem] = tokens.as_slice() else {
        return Err(P4Error::protocol(
            format!(
                "Expected 3 space separated paths from where, got {}",
                tokens.len()
            ),
            stdout,
            stderr,
        ));
    };
    Ok(WherePaths {
        depot: depot.to_string(),
        client: client.to_string(),
        filesystem: filesystem
            .strip_suffix('\n')
            .unwrap_or(*filesystem)
            .to_string(),
    })
}
