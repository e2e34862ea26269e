//! Command definitions and handlers
//!
//! Each subcommand owns its flags and its flow; shared plumbing (store
//! opening, path parsing) lives here too. Handlers return the process exit
//! code rather than calling `exit` so tests can drive them directly.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use paramtree_core::{
    build_tree, diff_namespaces, execute_copy, fetch_all, filter_parameters, plan_copy,
    CopySummary, DestinationSnapshot,
};
use paramtree_model::ParamPath;

use crate::output;
use crate::snapshot::SnapshotStore;

/// Top-level command line
#[derive(Debug, Parser)]
#[command(
    name = "paramtree",
    version,
    about = "Render, diff and copy parameter-store namespaces"
)]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

/// Arguments shared by every subcommand
#[derive(Debug, Args)]
pub struct RootArgs {
    /// Snapshot file backing the parameter store
    #[arg(
        long,
        global = true,
        env = "PARAMTREE_SNAPSHOT",
        default_value = "paramtree.json"
    )]
    pub snapshot: PathBuf,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum SubCommands {
    /// Render a namespace as a tree
    Tree(TreeCommand),
    /// Compare two namespaces path by path
    Diff(DiffCommand),
    /// Copy a namespace into another, with conflict handling
    Copy(CopyCommand),
}

impl RootCommand {
    /// Open the store and dispatch to the selected subcommand
    ///
    /// # Errors
    /// Propagates store and command failures for the binary to report.
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let store = SnapshotStore::open(&self.args.snapshot)?;
        match self.action {
            SubCommands::Tree(cmd) => cmd.run(&store).await,
            SubCommands::Diff(cmd) => cmd.run(&store).await,
            SubCommands::Copy(cmd) => cmd.run(&store).await,
        }
    }
}

fn parse_path(raw: &str) -> anyhow::Result<ParamPath> {
    raw.parse()
        .with_context(|| format!("invalid path '{raw}'"))
}

/// Output format for `tree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// Unicode tree rendering
    Tree,
    /// Flat JSON parameter list
    Json,
}

/// Output format for `diff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    /// Differences as a table
    Table,
    /// Full record list as JSON
    Json,
}

/// `paramtree tree`
#[derive(Debug, Args)]
pub struct TreeCommand {
    /// Namespace root to render
    #[arg(default_value = "/")]
    pub path: String,

    /// Glob filter on full paths, applied before building the tree
    #[arg(long)]
    pub filter: Option<String>,

    /// Fetch secure values decrypted
    #[arg(long)]
    pub decrypt: bool,

    /// Show parameter values in the tree
    #[arg(long)]
    pub show_values: bool,

    /// Include secret values in JSON output
    #[arg(long)]
    pub include_secrets: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = TreeFormat::Tree)]
    pub output: TreeFormat,
}

impl TreeCommand {
    /// Fetch, filter and render one namespace
    ///
    /// # Errors
    /// Fails on invalid paths or filters and on store errors.
    pub async fn run(self, store: &SnapshotStore) -> anyhow::Result<ExitCode> {
        let root = parse_path(&self.path)?;
        let mut params = fetch_all(store, &root, true, self.decrypt).await?;
        if let Some(pattern) = &self.filter {
            params = filter_parameters(&params, pattern)?;
        }

        match self.output {
            TreeFormat::Json => {
                let json = output::params_to_json(&params, self.include_secrets);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            TreeFormat::Tree => {
                if params.is_empty() {
                    println!("No parameters found under {root}");
                    return Ok(ExitCode::SUCCESS);
                }
                let tree = build_tree(&params, &root)?;
                print!("{}", output::render_tree(&tree, self.show_values, self.decrypt));
                println!("\n{} parameter(s)", tree.parameter_count());
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// `paramtree diff`
#[derive(Debug, Args)]
pub struct DiffCommand {
    /// Source namespace root
    pub source: String,

    /// Destination namespace root
    pub dest: String,

    /// Fetch secure values decrypted (both sides)
    #[arg(long)]
    pub decrypt: bool,

    /// Show values in the table
    #[arg(long)]
    pub show_values: bool,

    /// Include secret values in JSON output
    #[arg(long)]
    pub include_secrets: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = TableFormat::Table)]
    pub output: TableFormat,
}

impl DiffCommand {
    /// Fetch both namespaces and report their differences
    ///
    /// # Errors
    /// Fails on invalid paths and on store errors.
    pub async fn run(self, store: &SnapshotStore) -> anyhow::Result<ExitCode> {
        let source_root = parse_path(&self.source)?;
        let dest_root = parse_path(&self.dest)?;

        let source = fetch_all(store, &source_root, true, self.decrypt).await?;
        let dest = fetch_all(store, &dest_root, true, self.decrypt).await?;
        let records = diff_namespaces(&source, &dest, &source_root, &dest_root)?;

        match self.output {
            TableFormat::Json => {
                let json = output::diff_to_json(&records, self.include_secrets);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            TableFormat::Table => {
                let differences = records.iter().filter(|r| r.is_difference()).count();
                if differences == 0 {
                    println!("Namespaces are identical.");
                } else {
                    let table = output::render_diff_table(
                        &records,
                        &source_root,
                        &dest_root,
                        self.show_values,
                        self.decrypt,
                    );
                    println!("{table}");
                    println!(
                        "\n{differences} difference(s) across {} path(s)",
                        records.len()
                    );
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// `paramtree copy`
#[derive(Debug, Args)]
pub struct CopyCommand {
    /// Source namespace root
    pub source: String,

    /// Destination namespace root
    pub dest: String,

    /// Fetch source values decrypted (required to copy secret plaintext)
    #[arg(long)]
    pub decrypt: bool,

    /// Replace parameters that already exist at the destination
    #[arg(long)]
    pub overwrite: bool,

    /// Plan and print, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// KMS key for secure writes, forwarded to the store
    #[arg(long)]
    pub kms_key_id: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl CopyCommand {
    /// Plan a namespace copy, confirm, then execute it
    ///
    /// # Errors
    /// Fails on invalid paths and on store errors during fetch; write
    /// failures during execution are reported per path instead.
    pub async fn run(self, store: &SnapshotStore) -> anyhow::Result<ExitCode> {
        let source_root = parse_path(&self.source)?;
        let dest_root = parse_path(&self.dest)?;
        if source_root == dest_root {
            bail!("source and destination are the same namespace: {source_root}");
        }

        let source = fetch_all(store, &source_root, true, self.decrypt).await?;
        if source.is_empty() {
            println!("No parameters found under {source_root}");
            return Ok(ExitCode::SUCCESS);
        }

        let dest_params = fetch_all(store, &dest_root, true, false).await?;
        let dest = DestinationSnapshot::from_parameters(&dest_params, &dest_root)?;
        let actions = plan_copy(&source, &source_root, &dest_root, &dest, self.overwrite)?;

        println!("{}", output::render_plan_table(&actions));
        let writes = actions.iter().filter(|a| a.is_write()).count();
        let skips = actions.len() - writes;

        if self.dry_run {
            println!("\nDry run: {writes} parameter(s) would be copied, {skips} skipped.");
            return Ok(ExitCode::SUCCESS);
        }
        if writes == 0 {
            println!("\nNothing to copy.");
            return Ok(ExitCode::SUCCESS);
        }
        if !self.yes {
            let prompt = if self.overwrite {
                format!("Copy {writes} parameter(s) to {dest_root}, overwriting existing ones?")
            } else {
                format!("Copy {writes} parameter(s) to {dest_root}?")
            };
            if !confirm(&prompt)? {
                println!("Aborted.");
                return Ok(ExitCode::SUCCESS);
            }
        }

        let outcomes = execute_copy(&actions, store, self.kms_key_id.as_deref()).await;
        for line in output::outcome_lines(&outcomes) {
            println!("{line}");
        }

        let summary = CopySummary::of(&outcomes);
        println!(
            "\nCopied {}/{} parameter(s), {} skipped.",
            summary.succeeded,
            summary.attempted(),
            summary.skipped
        );
        if summary.has_failures() {
            eprintln!("{} write(s) failed; see the report above.", summary.failed);
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    let _ = io::stdin()
        .read_line(&mut line)
        .context("reading confirmation")?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
