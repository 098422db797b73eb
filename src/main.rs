use anyhow::Result;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use tracing_subscriber::EnvFilter;
use twig::areas::repository::Repository;
use twig::artifacts::core::{PagerWriter, pager_enabled};
use twig::errors::{RepositoryError, repository_error};

/// Environment variable holding the log filter
const LOG_FILTER_ENV: &str = "TWIG_LOG";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A minimal local version-control system",
    long_about = "twig keeps whole-file snapshots of a flat working tree in a local \
    object store, with branches, a per-branch staging area, a three-way merge and \
    filesystem remotes.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Create a new repository in the current directory",
        long_about = "This command creates the .twig directory with a root commit \
        and a master branch pointing at it."
    )]
    Init,
    #[command(name = "add", about = "Stage the current content of a file")]
    Add {
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "commit", about = "Record the staged changes as a new commit")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stop tracking it and delete it"
    )]
    Rm {
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "log", about = "Show the first-parent history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of commits with the given message")]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(name = "status", about = "Show branches, staged changes and working tree changes")]
    Status,
    #[command(
        name = "checkout",
        about = "Restore a file or switch branches",
        long_about = "checkout -- <file> restores a file from the head commit, \
        checkout <commit> -- <file> restores it from the given commit and \
        checkout <branch> switches to another branch."
    )]
    Checkout {
        #[arg(index = 1, help = "A branch name, or a commit id when a file follows")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "branch", about = "Create a branch at the current head")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch pointer")]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "reset", about = "Move the current branch and working tree to a commit")]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(name = "add-remote", about = "Record a remote repository")]
    AddRemote {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2, help = "Path to the remote working tree or its .twig directory")]
        path: String,
    },
    #[command(name = "rm-remote", about = "Forget a remote repository")]
    RmRemote {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "push", about = "Append the current branch to a remote branch")]
    Push {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(name = "fetch", about = "Copy a remote branch as <remote>-<branch>")]
    Fetch {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(name = "pull", about = "Fetch a remote branch and merge it")]
    Pull {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the body of a stored blob or commit. \
        It requires the full id of the object."
    )]
    CatFile {
        #[arg(index = 1)]
        object_id: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally store it",
        long_about = "This command prints the blob id of a file and can write the \
        blob to the object store."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the blob to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
}

impl Commands {
    fn is_paged(&self) -> bool {
        matches!(self, Commands::Log | Commands::GlobalLog)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    // user-facing failures are reported on stdout and are not process failures
    if let Err(err) = run(cli).await {
        tracing::debug!(error = ?err, "command failed");
        match repository_error(&err) {
            Some(domain_error) => println!("{domain_error}"),
            None => println!("{err:#}"),
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let pwd = std::env::current_dir()?;
    let pager = (cli.command.is_paged() && pager_enabled()).then(Pager::new);
    let writer: Box<dyn Write> = match &pager {
        Some(pager) => Box::new(PagerWriter::new(pager.clone())),
        None => Box::new(std::io::stdout()),
    };
    let mut repository = Repository::new(&pwd.to_string_lossy(), writer)?;

    if !matches!(cli.command, Commands::Init) {
        repository.ensure_initialized()?;
    }

    match &cli.command {
        Commands::Init => repository.init().await?,
        Commands::Add { file } => repository.add(file).await?,
        Commands::Commit { message } => repository.commit(message).await?,
        Commands::Rm { file } => repository.rm(file).await?,
        Commands::Log => repository.log()?,
        Commands::GlobalLog => repository.global_log()?,
        Commands::Find { message } => repository.find(message)?,
        Commands::Status => repository.status().await?,
        Commands::Checkout { target, file } => match (target, file) {
            (None, Some(file)) => repository.checkout_file(file).await?,
            (Some(commit), Some(file)) => repository.checkout_file_from(commit, file).await?,
            (Some(branch), None) => repository.checkout_branch(branch).await?,
            (None, None) => {
                return Err(RepositoryError::InvalidOperand(
                    "checkout needs a branch or -- <file>".into(),
                )
                .into());
            }
        },
        Commands::Branch { name } => repository.branch(name)?,
        Commands::RmBranch { name } => repository.rm_branch(name)?,
        Commands::Reset { commit } => repository.reset(commit).await?,
        Commands::Merge { branch } => {
            repository.merge(branch).await?;
        }
        Commands::AddRemote { name, path } => repository.add_remote(name, path)?,
        Commands::RmRemote { name } => repository.rm_remote(name)?,
        Commands::Push { remote, branch } => repository.push(remote, branch).await?,
        Commands::Fetch { remote, branch } => repository.fetch(remote, branch).await?,
        Commands::Pull { remote, branch } => {
            repository.pull(remote, branch).await?;
        }
        Commands::CatFile { object_id } => repository.cat_file(object_id)?,
        Commands::HashObject { write, file } => repository.hash_object(file, *write)?,
    }

    repository.writer().flush()?;
    if let Some(pager) = pager {
        minus::page_all(pager)?;
    }

    Ok(())
}
