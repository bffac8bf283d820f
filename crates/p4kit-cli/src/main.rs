use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use p4kit_core::config::{resolve_settings, P4kitConfig};
use p4kit_core::{CommandResult, P4};

#[derive(Parser)]
#[command(
    name = "p4kit",
    version,
    about = "Structured Perforce operations over the p4 command line"
)]
struct Cli {
    /// Server address (P4PORT)
    #[arg(long, env = "P4PORT", global = true)]
    port: Option<String>,
    /// User name (P4USER)
    #[arg(long, env = "P4USER", global = true)]
    user: Option<String>,
    /// Workspace name (P4CLIENT)
    #[arg(long, env = "P4CLIENT", global = true)]
    client: Option<String>,
    /// Password or ticket (P4PASSWD)
    #[arg(long, env = "P4PASSWD", hide_env_values = true, global = true)]
    password: Option<String>,
    /// p4 binary to run instead of the one on PATH
    #[arg(long = "p4", env = "P4KIT_P4", global = true)]
    binary: Option<PathBuf>,
    /// Directory to start looking for .p4kit.toml from (defaults to cwd)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Log every p4 command line
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show depot, client and local paths of a file
    Where { path: String },
    /// Create an empty pending changelist and print its number
    NewChangelist,
    /// List depot paths opened in a changelist
    Opened {
        #[arg(short = 'c', long)]
        changelist: String,
    },
    /// Open a local file for add
    Add {
        #[arg(short = 'c', long)]
        changelist: String,
        path: String,
        #[arg(long)]
        check: bool,
    },
    /// Open a file for edit
    Edit {
        #[arg(short = 'c', long)]
        changelist: String,
        path: String,
        #[arg(long)]
        check: bool,
    },
    /// Move an opened file into a changelist with a new file type
    Reopen {
        #[arg(short = 'c', long)]
        changelist: String,
        #[arg(short = 't', long = "type")]
        filetype: String,
        path: String,
        #[arg(long)]
        check: bool,
    },
    /// Revert an opened file
    Revert {
        path: String,
        #[arg(long)]
        check: bool,
    },
    /// Revert every file on disk below a workspace path
    TreeRevert {
        path: String,
        #[arg(long)]
        check: bool,
    },
    /// Integrate one source path onto a destination
    Copy {
        #[arg(short = 'c', long)]
        changelist: String,
        source: String,
        dest: String,
        #[arg(long)]
        check: bool,
    },
    /// Copy many source/destination pairs through a temporary branch spec
    BulkCopy {
        #[arg(short = 'c', long)]
        changelist: String,
        /// Alternating source and destination depot paths
        #[arg(required = true, num_args = 2..)]
        paths: Vec<String>,
    },
    /// Move all files of MERGE into KEEP and delete MERGE
    Merge { keep: String, merge: String },
    /// Delete an empty pending changelist
    DeleteChangelist { changelist: String },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.root.clone() {
        Some(root) => root,
        None => std::env::current_dir().context("resolve current dir")?,
    };
    let settings = resolve_settings(
        P4kitConfig {
            port: non_empty(&cli.port),
            user: non_empty(&cli.user),
            password: non_empty(&cli.password),
            client: non_empty(&cli.client),
            verbose: cli.verbose.then_some(true),
            binary: cli.binary.clone(),
        },
        &root,
    )
    .context("load connection settings")?;
    debug!(?settings, "resolved connection settings");
    let p4 = P4::connect(settings)?;

    run(&p4, cli.command, cli.json)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "p4kit=info,p4kit_core=info"
    } else {
        "p4kit=warn,p4kit_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(p4: &P4, command: Command, json: bool) -> Result<ExitCode> {
    match command {
        Command::Where { path } => {
            let resolved = p4.where_path(&path)?;
            if json {
                print_json(&resolved)?;
            } else {
                println!("depot: {}", resolved.depot);
                println!("client: {}", resolved.client);
                println!("local: {}", resolved.filesystem);
            }
        }
        Command::NewChangelist => {
            let number = p4.create_changelist()?;
            if json {
                print_json(&json!({ "changelist": number }))?;
            } else {
                println!("{}", number);
            }
        }
        Command::Opened { changelist } => {
            let files = p4.opened(&changelist)?;
            if json {
                print_json(&json!({ "changelist": changelist, "files": files }))?;
            } else {
                for file in files {
                    println!("{}", file);
                }
            }
        }
        Command::Add {
            changelist,
            path,
            check,
        } => {
            let out = p4.add(&changelist, &path)?;
            return finish(out, check, json, format!("Couldn't add {}", path));
        }
        Command::Edit {
            changelist,
            path,
            check,
        } => {
            let out = p4.edit(&changelist, &path)?;
            return finish(out, check, json, format!("Couldn't edit {}", path));
        }
        Command::Reopen {
            changelist,
            filetype,
            path,
            check,
        } => {
            let out = p4.reopen(&changelist, &filetype, &path)?;
            return finish(out, check, json, format!("Couldn't reopen {}", path));
        }
        Command::Revert { path, check } => {
            let out = p4.revert(&path)?;
            return finish(out, check, json, format!("Couldn't revert {}", path));
        }
        Command::TreeRevert { path, check } => match p4.tree_revert(&path)? {
            Some(out) => {
                return finish(out, check, json, format!("Couldn't revert files under {}", path));
            }
            None => {
                if json {
                    print_json(&json!({ "reverted": false }))?;
                } else {
                    eprintln!("nothing to revert under {}", path);
                }
            }
        },
        Command::Copy {
            changelist,
            source,
            dest,
            check,
        } => {
            let out = p4.copy(&changelist, &source, &dest)?;
            return finish(
                out,
                check,
                json,
                format!("Couldn't copy {} to {}", source, dest),
            );
        }
        Command::BulkCopy { changelist, paths } => {
            let copies = pair_up(paths)?;
            let out = p4.bulk_copy(&changelist, &copies)?;
            return finish(out, true, json, "bulk copy".to_string());
        }
        Command::Merge { keep, merge } => {
            let moved = p4.merge_changelists(&keep, &merge)?;
            if json {
                print_json(&json!({ "keep": keep, "deleted": merge, "moved": moved }))?;
            } else {
                println!("moved {} files from {} to {}", moved, merge, keep);
            }
        }
        Command::DeleteChangelist { changelist } => {
            let out = p4.delete_changelist(&changelist)?;
            return finish(out, true, json, "delete changelist".to_string());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Echoes a tool result and maps its status onto our exit code.
fn finish(out: CommandResult, check: bool, json: bool, what: String) -> Result<ExitCode> {
    let out = if check { out.check(what)? } else { out };
    if json {
        print_json(&out)?;
    } else {
        print!("{}", out.stdout);
        eprint!("{}", out.stderr);
    }
    Ok(exit_code(out.status))
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(exit_byte(status))
}

fn exit_byte(status: i32) -> u8 {
    match status {
        0 => 0,
        code if (1..=255).contains(&code) => code as u8,
        _ => 1,
    }
}

fn pair_up(paths: Vec<String>) -> Result<Vec<(String, String)>> {
    if paths.len() % 2 != 0 {
        bail!(
            "bulk-copy expects source/destination pairs, got {} paths",
            paths.len()
        );
    }
    let mut copies = Vec::with_capacity(paths.len() / 2);
    let mut iter = paths.into_iter();
    while let (Some(source), Some(dest)) = (iter.next(), iter.next()) {
        copies.push((source, dest));
    }
    Ok(copies)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
