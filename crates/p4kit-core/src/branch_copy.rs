use tracing::{debug, warn};

use crate::client::{args, P4};
use crate::error::P4Error;
use crate::invoke::{CommandResult, CommandRunner};
use crate::spec::{BranchSpec, ViewEntry};

/// Name of the scratch branch used by [`P4::bulk_copy`]. Namespaced by user,
/// workspace and changelist so concurrent runs do not share one.
pub fn temp_branch_name(user: &str, client: &str, changelist: &str) -> String {
    format!("{}-{}-temp-{}", user, client, changelist)
}

impl<R: CommandRunner> P4<R> {
    /// Single integration of `source` onto `dest`. Best effort, like `add`.
    pub fn copy(&self, changelist: &str, source: &str, dest: &str) -> Result<CommandResult, P4Error> {
        self.run(args(&["copy", "-c", changelist, source, dest]), None)
    }

    /// Copies every `(source, dest)` pair in one `p4 copy -b` through a
    /// temporary branch spec that is always deleted again.
    pub fn bulk_copy(
        &self,
        changelist: &str,
        copies: &[(String, String)],
    ) -> Result<CommandResult, P4Error> {
        if copies.is_empty() {
            return Err(P4Error::Validation("bulk copy needs at least one pair".to_string()));
        }
        for (source, dest) in copies {
            if !source.starts_with("//") || !dest.starts_with("//") {
                return Err(P4Error::Validation(format!(
                    "bulk copy paths must be depot paths: '{}' -> '{}'",
                    source, dest
                )));
            }
        }

        let name = temp_branch_name(self.user(), self.client(), changelist);
        let view = copies
            .iter()
            .map(|(source, dest)| ViewEntry::new(source.as_str(), dest.as_str()))
            .collect();
        let spec = BranchSpec::new(name, self.user(), view);

        self.with_temp_branch(&spec, |p4, branch| {
            p4.run(args(&["copy", "-c", changelist, "-b", branch]), None)?
                .check(format!("Couldn't copy with branch '{}'", branch))
        })
    }

    /// Creates `spec` on the server, runs `body` against it and deletes it.
    ///
    /// Once creation succeeds the delete always runs. A failure in `body`
    /// wins over a failed delete; a failed delete is only reported when
    /// `body` succeeded.
    pub fn with_temp_branch<T>(
        &self,
        spec: &BranchSpec,
        body: impl FnOnce(&Self, &str) -> Result<T, P4Error>,
    ) -> Result<T, P4Error> {
        let name = spec.name.as_str();
        let created = self.run(args(&["branch", "-i"]), Some(&spec.render()))?;
        if !created.success() {
            return Err(P4Error::operation(
                format!("Couldn't create temporary branch '{}'", name),
                &created.stderr,
            ));
        }
        debug!(branch = name, "created temporary branch");

        let outcome = body(self, name);

        let deleted = self.run(args(&["branch", "-d", name]), None).and_then(|out| {
            out.check(format!("Couldn't delete temporary branch '{}'", name))
        });

        match (outcome, deleted) {
            (Ok(value), Ok(_)) => {
                debug!(branch = name, "deleted temporary branch");
                Ok(value)
            }
            (Ok(_), Err(delete_err)) => Err(delete_err),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(delete_err)) => {
                warn!(branch = name, error = %delete_err, "temporary branch left behind");
                Err(err)
            }
        }
    }
}
