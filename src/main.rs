//! quill - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

use quill::analyze::{GenerateOptions, generate_commit_message, optimized_status};
use quill::config::load_config;
use quill::error::AnalyzeError;
use quill::repo::{create_commit, open_repository, stage_all};
use quill::{CommitReport, CommitType, StatusSnapshot};

/// Draft Conventional Commit messages from your working tree.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Draft Conventional Commit messages from your working tree")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze changes and print a candidate commit message
    Generate(GenerateArgs),
    /// Fast repository status summary
    Status(StatusArgs),
    /// Stage everything and commit with a confirmed generated message
    Commit(CommitArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to the repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Commit type to use instead of the inferred one
    #[arg(long = "type", value_name = "TYPE")]
    commit_type: Option<CommitType>,

    /// Scope to use instead of the inferred one
    #[arg(long)]
    scope: Option<String>,

    /// Short description for the header
    #[arg(short = 'm', long)]
    description: Option<String>,

    /// Free-text body
    #[arg(long)]
    body: Option<String>,

    /// Skip diff content retrieval (faster, less precise)
    #[arg(long)]
    lite: bool,

    /// Context lines per diff hunk
    #[arg(long, default_value_t = quill::DEFAULT_CONTEXT_LINES)]
    context_lines: u32,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Path to the repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Emit the snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CommitArgs {
    /// Path to the repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Commit type to use instead of the inferred one
    #[arg(long = "type", value_name = "TYPE")]
    commit_type: Option<CommitType>,

    /// Scope to use instead of the inferred one
    #[arg(long)]
    scope: Option<String>,

    /// Short description for the header
    #[arg(short = 'm', long)]
    description: Option<String>,

    /// Free-text body
    #[arg(long)]
    body: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Status(args) => run_status(args),
        Command::Commit(args) => run_commit(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let repo = open_repository(&args.repo)
        .context("Not a git repository. Pass --repo or run quill inside one.")?;
    let config = load_config(&args.repo).context("Failed to load project config")?;

    let opts = GenerateOptions {
        commit_type: args.commit_type,
        scope: args.scope,
        description: args.description,
        body: args.body,
        lite_mode: args.lite,
        context_lines: Some(args.context_lines),
        config,
    };

    let report = match generate_commit_message(&repo, &opts) {
        Ok(report) => report,
        Err(AnalyzeError::NoChanges) => {
            println!("No changes found. Edit or stage files first.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn run_status(args: StatusArgs) -> Result<()> {
    let repo = open_repository(&args.repo)
        .context("Not a git repository. Pass --repo or run quill inside one.")?;

    let snapshot = optimized_status(&repo)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    Ok(())
}

fn run_commit(args: CommitArgs) -> Result<()> {
    let repo = open_repository(&args.repo)
        .context("Not a git repository. Pass --repo or run quill inside one.")?;
    let config = load_config(&args.repo).context("Failed to load project config")?;

    let opts = GenerateOptions {
        commit_type: args.commit_type,
        scope: args.scope,
        description: args.description,
        body: args.body,
        lite_mode: false,
        context_lines: None,
        config,
    };

    let report = match generate_commit_message(&repo, &opts) {
        Ok(report) => report,
        Err(AnalyzeError::NoChanges) => {
            println!("Working tree clean. Nothing to commit.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_report(&report);
    println!();

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Stage all changes and commit with this message?")
            .default(false)
            .interact()
            .context("Confirmation prompt failed")?;
        if !confirmed {
            println!("Aborted. No changes made.");
            return Ok(());
        }
    }

    stage_all(&repo).context("Failed to stage changes")?;
    let oid = create_commit(&repo, &report.message.format())
        .context("Failed to create commit")?;

    println!("✓ Committed {}", &oid.to_string()[..7]);

    Ok(())
}

fn print_report(report: &CommitReport) {
    println!("{}", report.message.format());
    println!();
    println!(
        "Type: {} (confidence: {})",
        report.commit_type, report.confidence
    );
    if let Some(scope) = &report.scope {
        println!("Scope: {scope}");
    }
    println!("Files: {}", report.files.len());
    println!("Rationale:");
    for entry in &report.rationale {
        println!("  - {entry}");
    }
    for warning in &report.message.warnings {
        eprintln!("\x1b[33m⚠ {warning}\x1b[0m");
    }
}

fn print_snapshot(snapshot: &StatusSnapshot) {
    match &snapshot.branch {
        Some(branch) => println!("Current branch: {branch}"),
        None => println!("Current branch: (detached HEAD)"),
    }
    if let (Some(ahead), Some(behind)) = (snapshot.ahead, snapshot.behind) {
        println!("Upstream: {ahead} ahead, {behind} behind");
    }
    println!(
        "Staged: {}, Unstaged: {}, Untracked: {}",
        snapshot.staged, snapshot.unstaged, snapshot.untracked
    );

    if snapshot.has_conflicts {
        println!("✗ Unresolved conflicts. Resolve them before committing.");
    } else if snapshot.ready_to_commit {
        println!("✓ Ready to commit!");
    } else if snapshot.unstaged > 0 || snapshot.untracked > 0 {
        println!("ℹ Stage files with 'git add' to generate commit messages.");
    } else {
        println!("✓ Working tree clean");
    }
}
