//! uibo - a focus countdown timer.
//!
//! `uibo daemon` hosts the countdown, the completion alert, the task list
//! and the settings; every other subcommand talks to it over a Unix socket.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use uibo::cli::{
    self, Cli, Commands, DaemonArgs, Display, IpcClient, SettingsCommand, TaskCommand,
};
use uibo::daemon::{self, DaemonConfig};
use uibo::paths::{default_settings_path, default_socket_path, default_sounds_dir};
use uibo::types::IpcResponse;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let is_daemon = matches!(cli.command, Some(Commands::Daemon(_)));
    init_tracing(cli.verbose, is_daemon);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `-v` selects debug, the daemon logs at info
/// and the client commands at warn.
fn init_tracing(verbose: bool, is_daemon: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match (verbose, is_daemon) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt().with_env_filter(filter).with_target(false);
    if is_daemon {
        builder.init();
    } else {
        builder.without_time().init();
    }
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let socket_path = cli.socket.unwrap_or_else(default_socket_path);
    let client = IpcClient::with_socket_path(socket_path.clone());

    match command {
        Commands::Start(args) => {
            let response = client.start(args.total_minutes()).await?;
            Display::show_command_result(&cli::ensure_success(response)?);
        }
        Commands::Toggle => {
            let response = client.toggle_pause().await?;
            Display::show_command_result(&cli::ensure_success(response)?);
        }
        Commands::Reset => {
            let response = client.reset().await?;
            Display::show_command_result(&cli::ensure_success(response)?);
        }
        Commands::Stop { yes } => {
            if !yes
                && cli::should_confirm_stop(&client).await?
                && !cli::confirm("Stop the countdown?")?
            {
                println!("Cancelled");
                return Ok(());
            }
            let response = client.stop().await?;
            Display::show_command_result(&cli::ensure_success(response)?);
        }
        Commands::Status { watch: true } => cli::watch_status(&client).await?,
        Commands::Status { watch: false } => {
            let response = client.status().await?;
            Display::show_status(&cli::ensure_success(response)?);
        }
        Commands::Dismiss => {
            let response = client.dismiss().await?;
            println!("{}", cli::ensure_success(response)?.message);
        }
        Commands::Task { command } => execute_task(&client, command).await?,
        Commands::Settings { command } => execute_settings(&client, command).await?,
        Commands::Themes { mode } => Display::show_themes(mode.map(Into::into)),
        Commands::Sounds => Display::show_sounds(),
        Commands::Presets => Display::show_presets(),
        Commands::Daemon(args) => daemon::run(daemon_config(socket_path, args)).await?,
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

async fn execute_task(client: &IpcClient, command: TaskCommand) -> Result<()> {
    let response = match command {
        TaskCommand::Add { text } => client.add_task(text.join(" ")).await?,
        TaskCommand::List => client.list_tasks().await?,
        TaskCommand::Toggle { id } => client.toggle_task(id).await?,
        TaskCommand::Delete { id } => client.delete_task(id).await?,
    };
    let response = cli::ensure_success(response)?;
    if !response.message.is_empty() {
        println!("{}", response.message);
    }
    Display::show_tasks(&tasks_of(response));
    Ok(())
}

async fn execute_settings(client: &IpcClient, command: SettingsCommand) -> Result<()> {
    let response = match command {
        SettingsCommand::Show => client.get_settings().await?,
        SettingsCommand::Set(args) => client.update_settings(args.into_patch()).await?,
        SettingsCommand::Reset => client.reset_settings().await?,
    };
    let settings = cli::ensure_success(response)?
        .data
        .and_then(|d| d.settings)
        .context("The daemon did not return settings")?;
    Display::show_settings(&settings);
    Ok(())
}

fn tasks_of(response: IpcResponse) -> Vec<uibo::tasks::Task> {
    response.data.and_then(|d| d.tasks).unwrap_or_default()
}

fn daemon_config(socket_path: std::path::PathBuf, args: DaemonArgs) -> DaemonConfig {
    let settings_path = if args.no_persist {
        None
    } else {
        args.settings.or_else(default_settings_path)
    };
    DaemonConfig {
        socket_path,
        settings_path,
        sounds_dir: args.sounds_dir.or_else(default_sounds_dir),
        mute: args.mute,
        notifications: !args.no_notifications,
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_daemon_config_defaults() {
        let config = daemon_config(PathBuf::from("/tmp/u.sock"), DaemonArgs::default());
        assert_eq!(config.socket_path, PathBuf::from("/tmp/u.sock"));
        assert_eq!(config.settings_path, default_settings_path());
        assert!(config.notifications);
        assert!(!config.mute);
    }

    #[test]
    fn test_daemon_config_no_persist() {
        let args = DaemonArgs {
            no_persist: true,
            no_notifications: true,
            ..DaemonArgs::default()
        };
        let config = daemon_config(PathBuf::from("/tmp/u.sock"), args);
        assert!(config.settings_path.is_none());
        assert!(!config.notifications);
    }

    #[test]
    fn test_daemon_config_explicit_paths() {
        let args = DaemonArgs {
            settings: Some(PathBuf::from("/tmp/settings.json")),
            sounds_dir: Some(PathBuf::from("/tmp/sounds")),
            ..DaemonArgs::default()
        };
        let config = daemon_config(PathBuf::from("/tmp/u.sock"), args);
        assert_eq!(config.settings_path, Some(PathBuf::from("/tmp/settings.json")));
        assert_eq!(config.sounds_dir, Some(PathBuf::from("/tmp/sounds")));
    }
}
