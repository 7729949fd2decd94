use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

use gitscope::config::CONFIG_FILE;
use gitscope::{clone_repo, logging, pull_repo, CliGitRunner, Config, Dispatcher, DEFAULT_COMMIT_LIMIT};

#[derive(Parser)]
#[command(name = "gitscope")]
#[command(about = "Fetch repository info, commits and diffs from GitHub or Gitee")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: gitscope.toml, optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hosting platform: github or gitee
    #[arg(short, long, global = true, default_value = "github")]
    platform: String,

    /// Log requests to stderr (GITSCOPE_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show repository metadata
    Info { owner: String, repo: String },

    /// List recent commits, newest first
    Commits {
        owner: String,
        repo: String,

        /// Number of commits (single page, at most 100)
        #[arg(short = 'n', long, default_value_t = DEFAULT_COMMIT_LIMIT)]
        limit: usize,
    },

    /// List files changed by one commit
    Files { owner: String, repo: String, sha: String },

    /// Repository metadata plus recent commits with their files
    Report {
        owner: String,
        repo: String,

        /// Number of commits to include
        #[arg(short = 'n', long, default_value_t = DEFAULT_COMMIT_LIMIT)]
        max_num: usize,
    },

    /// Clone a repository unless the destination already exists
    Clone {
        owner: String,
        repo: String,
        dest: PathBuf,
    },

    /// Pull the latest changes into an existing clone
    Pull {
        owner: String,
        repo: String,
        dest: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logger(cli.verbose);

    let config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("Could not load {}", path.display()))?,
        None => Config::load_or_default(&PathBuf::from(CONFIG_FILE))?,
    };

    let platform = cli.platform.as_str();
    match cli.command {
        Commands::Info { owner, repo } => cmd_info(config, platform, &owner, &repo),
        Commands::Commits { owner, repo, limit } => cmd_commits(config, platform, &owner, &repo, limit),
        Commands::Files { owner, repo, sha } => cmd_files(config, platform, &owner, &repo, &sha),
        Commands::Report { owner, repo, max_num } => cmd_report(config, platform, &owner, &repo, max_num),
        Commands::Clone { owner, repo, dest } => cmd_clone(platform, &owner, &repo, &dest),
        Commands::Pull { owner, repo, dest } => cmd_pull(platform, &owner, &repo, &dest),
    }
}

#[tokio::main]
async fn cmd_info(config: Config, platform: &str, owner: &str, repo: &str) -> Result<()> {
    let dispatcher = Dispatcher::new(config)?;
    let info = dispatcher.get_repo_info(owner, repo, platform).await?;
    print_json(&info)
}

#[tokio::main]
async fn cmd_commits(config: Config, platform: &str, owner: &str, repo: &str, limit: usize) -> Result<()> {
    let dispatcher = Dispatcher::new(config)?;
    let commits = dispatcher.get_commits(owner, repo, limit, platform).await?;
    print_json(&commits)
}

#[tokio::main]
async fn cmd_files(config: Config, platform: &str, owner: &str, repo: &str, sha: &str) -> Result<()> {
    let dispatcher = Dispatcher::new(config)?;
    let files = dispatcher.get_commit_files(owner, repo, sha, platform).await?;
    print_json(&files)
}

#[tokio::main]
async fn cmd_report(config: Config, platform: &str, owner: &str, repo: &str, max_num: usize) -> Result<()> {
    let dispatcher = Dispatcher::new(config)?;
    let report = dispatcher
        .get_repo_commit_info(owner, repo, max_num, platform)
        .await
        .with_context(|| format!("Could not build report for {}/{}", owner, repo))?;
    print_json(&report)
}

fn cmd_clone(platform: &str, owner: &str, repo: &str, dest: &Path) -> Result<()> {
    if clone_repo(&CliGitRunner, platform, owner, repo, dest)? {
        println!("{} Cloned {}/{} into {}", "✓".green(), owner, repo, dest.display().to_string().cyan());
    } else {
        println!(
            "{} {} already exists, nothing cloned",
            "•".yellow(),
            dest.display().to_string().cyan()
        );
    }
    Ok(())
}

fn cmd_pull(platform: &str, owner: &str, repo: &str, dest: &Path) -> Result<()> {
    pull_repo(&CliGitRunner, platform, owner, repo, dest)?;
    println!("{} Pulled {}/{} in {}", "✓".green(), owner, repo, dest.display().to_string().cyan());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
