use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use talking_timer_core::context::{AppConfigExt, MAX_PRESETS};
use talking_timer_core::{TimerConfig, TimerSnapshot, TimerState, format_remaining, load_say_data};
use talking_timer_types::{DurationValue, Priority, SayDataMode, TimerSettings};

use crate::CliContext;

/// Options accepted by `configure`; anything omitted comes from the saved defaults
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigureArgs {
    /// Seconds (< 10000), milliseconds (>= 10000), or HH:MM:SS / MM:SS
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Interval spec, e.g. "1/2 30s last20 last15 allLast10"
    #[arg(short, long)]
    pub say: Option<String>,

    /// TOML file of explicit announcements ([[say]] offset_ms/message/rate)
    #[arg(long)]
    pub say_data: Option<PathBuf>,

    /// Reconcile say-data together with the interval spec instead of replacing it
    #[arg(long)]
    pub merge: bool,

    /// fraction, time or order
    #[arg(short, long)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub say_start: bool,

    #[arg(long)]
    pub no_say_end: bool,

    #[arg(long)]
    pub no_end_chime: bool,

    /// Restart this many milliseconds after the timer ends
    #[arg(long)]
    pub auto_restart: Option<u64>,

    #[arg(long)]
    pub no_pause: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Control
// ─────────────────────────────────────────────────────────────────────────────

pub async fn configure(args: &ConfigureArgs, ctx: &CliContext) -> Result<(), String> {
    let base = ctx.config.read().await.defaults.clone();
    let settings = settings_from_args(base, args)?;
    apply_settings(settings, ctx).await
}

pub async fn start(ctx: &CliContext) -> Result<(), String> {
    let state = ctx.timer.start().await.map_err(|e| e.to_string())?;
    print_state(state);
    Ok(())
}

pub async fn pause(ctx: &CliContext) -> Result<(), String> {
    let state = ctx.timer.pause().await.map_err(|e| e.to_string())?;
    print_state(state);
    Ok(())
}

pub async fn resume(ctx: &CliContext) -> Result<(), String> {
    let state = ctx.timer.resume().await.map_err(|e| e.to_string())?;
    print_state(state);
    Ok(())
}

pub async fn stop(silent: bool, ctx: &CliContext) -> Result<(), String> {
    let state = ctx.timer.stop(silent).await.map_err(|e| e.to_string())?;
    print_state(state);
    Ok(())
}

pub async fn reset(force: bool, ctx: &CliContext) -> Result<(), String> {
    let state = ctx.timer.reset(force).await.map_err(|e| e.to_string())?;
    print_state(state);
    Ok(())
}

pub async fn restart(ctx: &CliContext) -> Result<(), String> {
    let state = ctx.timer.restart().await.map_err(|e| e.to_string())?;
    print_state(state);
    Ok(())
}

pub async fn show_status(ctx: &CliContext) {
    let snapshot = ctx.timer.snapshot().await;
    println!("{}", status_line(&snapshot));
    if let Some(next) = &snapshot.next_announcement {
        println!(
            "next: \"{}\" at {} ({} pending)",
            next.message,
            format_remaining(next.offset_ms),
            snapshot.pending_announcements
        );
    }
}

/// Print the reconciled announcements for the current settings
pub async fn preview(ctx: &CliContext) -> Result<(), String> {
    let settings = ctx.settings.read().await.clone();
    let config = TimerConfig::from_settings(&settings).map_err(|e| e.to_string())?;

    println!(
        "{} total, {} announcements",
        format_remaining(config.total_ms),
        config.announcements.len()
    );
    for announcement in &config.announcements {
        println!(
            "  {:>8}  {} (rate {})",
            format_remaining(announcement.offset_ms),
            announcement.message,
            announcement.rate
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

pub async fn save_preset(name: &str, ctx: &CliContext) -> Result<(), String> {
    let settings = ctx.settings.read().await.clone();
    let mut config = ctx.config.write().await;
    config
        .save_preset(name.to_string(), settings)
        .map_err(|e| e.to_string())?;
    ctx.persist(&config)?;
    println!("saved preset '{}'", name.trim());
    Ok(())
}

pub async fn load_preset(name: &str, ctx: &CliContext) -> Result<(), String> {
    let settings = {
        let mut config = ctx.config.write().await;
        let settings = config.load_preset(name).map_err(|e| e.to_string())?;
        if let Err(e) = ctx.persist(&config) {
            tracing::warn!(error = %e, "failed to persist active preset");
        }
        settings
    };
    apply_settings(settings, ctx).await
}

pub async fn delete_preset(name: &str, ctx: &CliContext) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    let removed = config.delete_preset(name).map_err(|e| e.to_string())?;
    ctx.persist(&config)?;
    println!("deleted preset '{}'", removed.name);
    Ok(())
}

pub async fn rename_preset(name: &str, to: &str, ctx: &CliContext) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    config.rename_preset(name, to).map_err(|e| e.to_string())?;
    ctx.persist(&config)?;
    println!("renamed preset '{}' to '{}'", name, to.trim());
    Ok(())
}

pub async fn list_presets(ctx: &CliContext) {
    let config = ctx.config.read().await;
    if config.presets.is_empty() {
        println!("no presets saved");
        return;
    }
    for name in config.preset_names() {
        let marker = if config.active_preset_name.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker, name);
    }
}

/// Where settings are stored and the audio setup they describe
pub async fn show_config(ctx: &CliContext) {
    match &ctx.config_file {
        Some(path) => println!("config file: {}", path.display()),
        None => println!("config file: none (presets are not saved)"),
    }
    let config = ctx.config.read().await;
    let audio = &config.audio;
    println!(
        "audio: {} (volume {}, {} wpm, voice {})",
        if audio.enabled { "on" } else { "off" },
        audio.volume,
        audio.words_per_minute,
        audio.voice.as_deref().unwrap_or("default")
    );
    println!("{} of {} presets used", config.presets.len(), MAX_PRESETS);
}

pub fn exit() -> Result<(), String> {
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn apply_settings(settings: TimerSettings, ctx: &CliContext) -> Result<(), String> {
    ctx.timer
        .configure(settings.clone())
        .await
        .map_err(|e| e.to_string())?;
    *ctx.settings.write().await = settings;
    show_status(ctx).await;
    Ok(())
}

/// Apply `configure` flags on top of `base`
pub fn settings_from_args(base: TimerSettings, args: &ConfigureArgs) -> Result<TimerSettings, String> {
    let mut settings = base;

    if let Some(duration) = &args.duration {
        settings.duration = duration_arg(duration);
    }
    if let Some(say) = &args.say {
        settings.say = say.clone();
    }
    if let Some(path) = &args.say_data {
        settings.say_data = load_say_data(path).map_err(|e| e.to_string())?;
    }
    if args.merge {
        settings.say_data_mode = SayDataMode::Merge;
    }
    if let Some(priority) = args.priority {
        settings.priority = priority;
    }
    if args.say_start {
        settings.say_start = true;
    }
    if args.no_say_end {
        settings.say_end = false;
    }
    if args.no_end_chime {
        settings.end_chime = false;
    }
    if args.auto_restart.is_some() {
        settings.auto_restart_ms = args.auto_restart;
    }
    if args.no_pause {
        settings.allow_pause = false;
    }

    Ok(settings)
}

/// Bare digits are a number (seconds below 10000, milliseconds above); anything else is text
pub fn duration_arg(input: &str) -> DurationValue {
    let input = input.trim();
    match input.parse::<u64>() {
        Ok(n) => DurationValue::Number(n),
        Err(_) => DurationValue::from(input),
    }
}

fn status_line(snapshot: &TimerSnapshot) -> String {
    if snapshot.state == TimerState::Unset {
        return "not configured".to_string();
    }
    format!(
        "{}: {} of {} remaining ({:.1}% left)",
        snapshot.state,
        snapshot.remaining_label,
        format_remaining(snapshot.total_ms),
        snapshot.percent
    )
}

fn print_state(state: TimerState) {
    println!("timer {}", state);
}
