mod commands;
mod render;
mod utils;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use commands::Context;

#[derive(Parser)]
#[command(name = "pairdays")]
#[command(about = "Shared calendar, daily messages and photo memories for two")]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show a month grid with events
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Press "next" this many times
        #[arg(long, default_value_t = 0)]
        next: u32,

        /// Press "previous" this many times
        #[arg(long, default_value_t = 0)]
        prev: u32,

        /// Highlight a day and list its events (YYYY-MM-DD)
        #[arg(short, long)]
        select: Option<NaiveDate>,
    },
    /// Manage calendar events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
    /// Manage photo memories
    Memories {
        #[command(subcommand)]
        command: MemoriesCommand,
    },
    /// Manage daily messages
    Messages {
        #[command(subcommand)]
        command: MessagesCommand,
    },
}

#[derive(Subcommand)]
enum EventsCommand {
    List {
        /// Only events in this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
    Add {
        title: Option<String>,

        /// Day of the event (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Start time (HH:MM)
        #[arg(short, long)]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        note: Option<String>,
    },
    Edit {
        id: Uuid,

        #[arg(short, long)]
        title: Option<String>,

        /// Start time (HH:MM)
        #[arg(short, long)]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(short, long)]
        end: Option<String>,

        /// New note; pass an empty string to clear it
        #[arg(short, long)]
        note: Option<String>,
    },
    Delete {
        id: Uuid,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum MemoriesCommand {
    List,
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Images to upload, in display order
        files: Vec<PathBuf>,
    },
    Delete {
        id: Uuid,

        #[arg(short, long)]
        yes: bool,
    },
    /// Browse a memory's images
    View {
        id: Uuid,

        /// Image to open on (1-based)
        #[arg(long, default_value_t = 1)]
        start: usize,
    },
}

#[derive(Subcommand)]
enum MessagesCommand {
    List,
    Send { text: String },
    Delete { id: Uuid },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pairdays=debug" } else { "pairdays=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::load().await?;

    match cli.command {
        Commands::Login { email } => commands::auth::login(&ctx, email).await,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Calendar {
            month,
            next,
            prev,
            select,
        } => commands::calendar::run(&ctx, month.as_deref(), next, prev, select).await,
        Commands::Events { command } => match command {
            EventsCommand::List { month } => commands::events::list(&ctx, month.as_deref()).await,
            EventsCommand::Add {
                title,
                date,
                start,
                end,
                note,
            } => commands::events::add(&ctx, title, date, start, end, note).await,
            EventsCommand::Edit {
                id,
                title,
                start,
                end,
                note,
            } => commands::events::edit(&ctx, id, title, start, end, note).await,
            EventsCommand::Delete { id, yes } => commands::events::delete(&ctx, id, yes).await,
        },
        Commands::Memories { command } => match command {
            MemoriesCommand::List => commands::memories::list(&ctx).await,
            MemoriesCommand::Add {
                title,
                description,
                files,
            } => commands::memories::add(&ctx, &title, description.as_deref(), &files).await,
            MemoriesCommand::Delete { id, yes } => commands::memories::delete(&ctx, id, yes).await,
            MemoriesCommand::View { id, start } => commands::memories::view(&ctx, id, start).await,
        },
        Commands::Messages { command } => match command {
            MessagesCommand::List => commands::messages::list(&ctx).await,
            MessagesCommand::Send { text } => commands::messages::send(&ctx, &text).await,
            MessagesCommand::Delete { id } => commands::messages::delete(&ctx, id).await,
        },
    }
}
