use clap::{Parser, Subcommand};
use std::io::Write;

use talking_timer::commands::{self, ConfigureArgs};
use talking_timer::logging;
use talking_timer::readline;
use talking_timer::state_watcher::spawn_state_watcher;
use talking_timer::CliContext;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();

    let ctx = CliContext::new();
    let watcher = spawn_state_watcher(&ctx);

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    watcher.abort();
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "talking countdown timer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the duration and what gets announced
    Configure(ConfigureArgs),
    Start,
    Pause,
    Resume,
    Stop {
        /// Skip the end message and chime
        #[arg(long)]
        silent: bool,
    },
    Reset {
        /// Reset even while running
        #[arg(long)]
        force: bool,
    },
    Restart,
    Status,
    /// List the announcements the current settings produce
    Preview,
    SavePreset {
        #[arg(short, long)]
        name: String,
    },
    LoadPreset {
        #[arg(short, long)]
        name: String,
    },
    DeletePreset {
        #[arg(short, long)]
        name: String,
    },
    RenamePreset {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        to: String,
    },
    Presets,
    /// Show the config file location and audio settings
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "talking-timer".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Configure(args)) => commands::configure(args, ctx).await?,
        Some(Commands::Start) => commands::start(ctx).await?,
        Some(Commands::Pause) => commands::pause(ctx).await?,
        Some(Commands::Resume) => commands::resume(ctx).await?,
        Some(Commands::Stop { silent }) => commands::stop(*silent, ctx).await?,
        Some(Commands::Reset { force }) => commands::reset(*force, ctx).await?,
        Some(Commands::Restart) => commands::restart(ctx).await?,
        Some(Commands::Status) => commands::show_status(ctx).await,
        Some(Commands::Preview) => commands::preview(ctx).await?,
        Some(Commands::SavePreset { name }) => commands::save_preset(name, ctx).await?,
        Some(Commands::LoadPreset { name }) => commands::load_preset(name, ctx).await?,
        Some(Commands::DeletePreset { name }) => commands::delete_preset(name, ctx).await?,
        Some(Commands::RenamePreset { name, to }) => commands::rename_preset(name, to, ctx).await?,
        Some(Commands::Presets) => commands::list_presets(ctx).await,
        Some(Commands::Config) => commands::show_config(ctx).await,
        Some(Commands::Exit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
