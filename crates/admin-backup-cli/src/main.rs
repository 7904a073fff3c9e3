//! AdminBackup entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use admin_backup_cli::commands;
use admin_backup_cli::config::BackupConfig;

#[derive(Parser)]
#[command(
    name = "admin-backup",
    about = "Snapshot a wiki site's admin panel settings into a zip archive",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Site to back up (same as `backup <site>`).
    site: Option<String>,

    #[command(flatten)]
    backup: BackupArgs,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Clone, Default)]
struct BackupArgs {
    /// Session id of a site admin.
    /// Also reads from WIKIDOT_SESSION_ID env var.
    #[arg(short, long)]
    session: Option<String>,

    /// Directory to write the archive into.
    /// Also reads from ADMIN_BACKUP_DIR env var.
    #[arg(short, long)]
    output: Option<String>,

    /// Override the site URL (defaults to https://<site>.wikidot.com).
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a site (default).
    Backup {
        /// Site short name, e.g. `scp-wiki`.
        site: String,

        #[command(flatten)]
        args: BackupArgs,
    },

    /// List the entries of a backup archive.
    Inspect {
        /// Path to a `.zip` produced by `backup`.
        archive: PathBuf,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   admin-backup completions bash > ~/.local/share/bash-completion/completions/admin-backup
    ///   admin-backup completions zsh > ~/.zfunc/_admin-backup
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = match (cli.command, cli.site) {
        (Some(command), _) => command,
        (None, Some(site)) => Commands::Backup {
            site,
            args: cli.backup,
        },
        (None, None) => {
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    match command {
        Commands::Backup { site, args } => {
            let config = BackupConfig::resolve(
                &site,
                args.session.as_deref(),
                args.output.as_deref(),
                args.base_url.as_deref(),
                args.timeout_ms,
            )?;
            let path = commands::backup(&config).await?;
            println!("{}", path.display());
        }

        Commands::Inspect { archive } => {
            let entries = commands::inspect(&archive)?;
            println!("{}", archive.display());
            for (name, size) in &entries {
                println!("  {size:>10}  {name}");
            }
            println!("  {} entries", entries.len());
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "admin-backup", &mut std::io::stdout());
        }
    }

    Ok(())
}
