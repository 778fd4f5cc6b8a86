use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "sprig")]
#[command(bin_name = "sprig")]
#[command(version)]
#[command(about = "A local-first plant care tracker with remote reminder sync")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "SPRIG_DB_PATH",
        default_value = ".sprig/cache/state.sqlite",
        help = "Path to the local SQLite cache database."
    )]
    pub db: String,

    #[arg(
        short = 's',
        long,
        env = "SPRIG_STATE_DIR",
        default_value = ".sprig",
        help = "State directory holding config.toml and sync locks."
    )]
    pub state_dir: PathBuf,

    #[arg(
        short = 'r',
        long,
        env = "SPRIG_REMOTE_ROOT",
        help = "Root directory of the remote document store (defaults to <state-dir>/remote)."
    )]
    pub remote: Option<PathBuf>,

    #[arg(
        short = 'u',
        long,
        env = "SPRIG_USER",
        help = "User id owning the plants (falls back to config.toml)."
    )]
    pub user: Option<String>,

    #[arg(
        long,
        env = "SPRIG_TODAY",
        help = "Override today's date (YYYY-M-D) for deterministic runs."
    )]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Add a plant locally and to the remote store.")]
    Add(AddArgs),
    #[command(about = "List cached plants for the user.")]
    Ls(ListArgs),
    #[command(about = "Remove a plant and its reminder state everywhere.")]
    Rm(RemoveArgs),
    #[command(about = "Show which plants need water or fertilizer today.")]
    Due(DueArgs),
    #[command(about = "Run one reminder check pass (writes remote state only on change).")]
    Check(CheckArgs),
    #[command(about = "Replace the local cache with the user's remote plant set.")]
    Sync(SyncArgs),
    #[command(about = "Record that a plant was watered today.")]
    Water(CareArgs),
    #[command(about = "Record that a plant was fertilized today.")]
    Fertilize(CareArgs),
    #[command(about = "Acknowledge a reminder, recording every flagged action.")]
    Done(CareArgs),
    #[command(about = "Show plant counts per type and weekly care load.")]
    Stats(StatsArgs),
    #[command(about = "Show the remote user profile.")]
    Profile(ProfileArgs),
    #[command(about = "Generate shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(help = "Plant name.")]
    pub name: String,

    #[arg(short = 't', long = "type", help = "Plant type (herb, flower, ...).")]
    pub plant_type: String,

    #[arg(short = 'p', long, help = "Planting date (YYYY-M-D).")]
    pub planted: String,

    #[arg(short = 'w', long, help = "Watering interval in days.")]
    pub water_every: String,

    #[arg(short = 'f', long, help = "Fertilizing interval in days.")]
    pub feed_every: String,

    #[arg(long, help = "Last watered date (YYYY-M-D); omit if never watered.")]
    pub watered: Option<String>,

    #[arg(long, help = "Last fertilized date (YYYY-M-D); omit if never fertilized.")]
    pub fertilized: Option<String>,

    #[arg(long, help = "Path to an image file stored with the plant.")]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short = 't', long = "type", help = "Only plants of this type.")]
    pub plant_type: Option<String>,

    #[arg(short = 'q', long, help = "Only plants whose name contains this text.")]
    pub query: Option<String>,

    #[arg(long, help = "Print JSON instead of the table view.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[arg(help = "Plant id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DueArgs {
    #[arg(long, help = "Print JSON instead of the table view.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long, help = "Print the summary as JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(long, help = "Print the summary as JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CareArgs {
    #[arg(help = "Plant id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long, help = "Print JSON instead of the table view.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long, help = "Print JSON instead of the table view.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for.")]
    pub shell: Shell,
}
