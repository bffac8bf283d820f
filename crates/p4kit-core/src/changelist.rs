use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::client::{args, P4};
use crate::error::P4Error;
use crate::invoke::{CommandResult, CommandRunner};
use crate::spec::ChangelistSpec;

fn change_created_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Change ([0-9]+) created\.").expect("regex"))
}

pub fn validate_changelist_id(id: &str) -> Result<(), P4Error> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(P4Error::Validation(format!(
            "changelist must be numeric, got '{}'",
            id
        )));
    }
    Ok(())
}

/// Changelist operations.
///
/// `add`, `edit`, `reopen`, `revert`, `tree_revert` (and `copy`) are best
/// effort: they return the raw [`CommandResult`] without looking at the exit
/// status, so callers who care chain [`CommandResult::check`]. Everything else
/// here fails with [`P4Error::Operation`] on a non-zero status.
impl<R: CommandRunner> P4<R> {
    pub fn create_changelist(&self) -> Result<String, P4Error> {
        let spec = ChangelistSpec::new(self.client(), self.user()).render();
        let out = self
            .run(args(&["change", "-i"]), Some(&spec))?
            .check("Couldn't create new changelist")?;
        let number = parse_change_created(&out.stdout, &out.stderr)?;
        info!(changelist = %number, "created changelist");
        Ok(number)
    }

    pub fn add(&self, changelist: &str, path: &str) -> Result<CommandResult, P4Error> {
        self.run(args(&["add", "-c", changelist, "-I", path]), None)
    }

    pub fn edit(&self, changelist: &str, path: &str) -> Result<CommandResult, P4Error> {
        self.run(args(&["edit", "-c", changelist, path]), None)
    }

    pub fn reopen(
        &self,
        changelist: &str,
        filetype: &str,
        path: &str,
    ) -> Result<CommandResult, P4Error> {
        self.run(args(&["reopen", "-c", changelist, "-t", filetype, path]), None)
    }

    pub fn revert(&self, path: &str) -> Result<CommandResult, P4Error> {
        self.run(args(&["revert", path]), None)
    }

    /// Reverts every file on disk under the workspace location of `path`.
    ///
    /// Returns `None` without running anything when no files are found, since
    /// a bare `p4 revert` has no defined meaning here. A missing root (wildcard
    /// paths map to `.../...` locally) or an unreadable directory counts as
    /// holding no files. Symlinks are reverted unless they point at a directory.
    pub fn tree_revert(&self, path: &str) -> Result<Option<CommandResult>, P4Error> {
        let root = self.where_path(path)?.filesystem;
        let mut command = args(&["revert"]);
        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(root = %root, error = %err, "tree revert skipped entry");
                    continue;
                }
            };
            let file_type = entry.file_type();
            if file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir()) {
                command.push(entry.path().to_string_lossy().to_string());
            }
        }
        if command.len() == 1 {
            debug!(root = %root, "tree revert found no files");
            return Ok(None);
        }
        debug!(root = %root, files = command.len() - 1, "tree revert");
        self.run(command, None).map(Some)
    }

    /// Depot paths opened in `changelist`, revision markers removed.
    pub fn opened(&self, changelist: &str) -> Result<Vec<String>, P4Error> {
        validate_changelist_id(changelist)?;
        let out = self
            .run(args(&["opened", "-c", changelist]), None)?
            .check(format!("Couldn't get files open in changelist {}", changelist))?;
        Ok(parse_opened(&out.stdout))
    }

    pub fn delete_changelist(&self, changelist: &str) -> Result<CommandResult, P4Error> {
        validate_changelist_id(changelist)?;
        self.run(args(&["changelist", "-d", changelist]), None)?
            .check(format!("Couldn't delete changelist {}", changelist))
    }

    /// Moves every file opened in `merge` into `keep`, then deletes `merge`.
    /// Returns how many files were moved.
    pub fn merge_changelists(&self, keep: &str, merge: &str) -> Result<usize, P4Error> {
        validate_changelist_id(keep)?;
        validate_changelist_id(merge)?;

        let files = self.opened(merge)?;
        if let Some(first) = files.first() {
            let mut command = args(&["reopen", "-c", keep]);
            command.extend(files.iter().cloned());
            self.run(command, None)?.check(format!(
                "Couldn't reopen {} files including {}",
                files.len(),
                first
            ))?;
        }

        self.delete_changelist(merge)?;
        info!(keep, merge, files = files.len(), "merged changelists");
        Ok(files.len())
    }
}

pub(crate) fn parse_change_created(stdout: &str, stderr: &str) -> Result<String, P4Error> {
    change_created_re()
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|number| number.as_str().to_string())
        .ok_or_else(|| {
            P4Error::protocol("Couldn't determine changelist number", stdout, stderr)
        })
}

pub(crate) fn parse_opened(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once('#')
                .map(|(path, _)| path)
                .unwrap_or(line)
                .to_string()
        })
        .collect()
}
