use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod assistant;
mod config;
mod feed;
mod handler;
mod persona;
mod prompt;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "upstander")]
#[command(about = "Simulated social feed with an AI anti-bullying assistant")]
struct Cli {
    /// Path to the static posts document
    #[arg(long, default_value = "data/example_posts.json")]
    posts: String,

    /// Log file path (the terminal is taken over by the UI)
    #[arg(long, default_value = "upstander.log")]
    log_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_logging(&cli.log_file)?;

    let mut app = App::new(&cli.posts).await?;
    tracing::info!(
        offline = app.assistant.is_offline(),
        posts = app.feed.len(),
        "starting"
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        } else {
            break;
        }
    }
    Ok(())
}

fn init_logging(path: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
