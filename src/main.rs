mod app;
mod catalog;
mod config;
mod digest;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use digest::{DigestClient, SubmissionPayload};

#[derive(Parser, Debug)]
#[command(name = "newsbrief")]
#[command(version = "0.1.0")]
#[command(about = "A terminal-friendly news digest subscription client")]
struct Args {
    /// Submit once from the command line instead of opening the TUI
    #[arg(short, long)]
    send: bool,

    /// Backend base URL (overrides the configured endpoint)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Recipient name (defaults to the remembered value)
    #[arg(long)]
    name: Option<String>,

    /// Recipient email (defaults to the remembered value)
    #[arg(long)]
    email: Option<String>,

    /// Two-letter country code, e.g. us or fr
    #[arg(short, long)]
    country: Option<String>,

    /// Comma-separated topic names; at most four are kept
    #[arg(long)]
    categories: Option<String>,

    /// News API key (required with --send)
    #[arg(long)]
    api_key: Option<String>,

    /// Gmail account used as the sender (required with --send)
    #[arg(long)]
    gmail_user: Option<String>,

    /// Gmail app password (required with --send)
    #[arg(long)]
    gmail_pass: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }

    // Handle CLI-only commands
    if args.send {
        return run_send(args, config).await;
    }

    // Run TUI
    run_tui(config).await
}

async fn run_send(args: Args, config: AppConfig) -> Result<()> {
    let name = args.name.unwrap_or_else(|| config.defaults.name.clone());
    let email = args.email.unwrap_or_else(|| config.defaults.email.clone());
    if name.trim().is_empty() {
        anyhow::bail!("--name is required (no remembered value)");
    }
    if email.trim().is_empty() || !email.contains('@') {
        anyhow::bail!("--email must be an address (no remembered value)");
    }

    let api_key = required_flag(args.api_key, "--api-key")?;
    let gmail_user = required_flag(args.gmail_user, "--gmail-user")?;
    let gmail_pass = required_flag(args.gmail_pass, "--gmail-pass")?;

    let country = args
        .country
        .or_else(|| config.defaults.country.clone())
        .unwrap_or_else(|| "us".to_string())
        .to_lowercase();
    if catalog::country_index(&country).is_none() {
        anyhow::bail!("Unknown country code: {}", country);
    }

    let mut selected: Vec<&'static str> = Vec::new();
    let requested: Vec<String> = match &args.categories {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => config.defaults.categories.clone(),
    };
    for name in requested.iter().filter(|s| !s.is_empty()) {
        let Some(cat) = catalog::category(name) else {
            anyhow::bail!("Unknown topic: {}", name);
        };
        if selected.contains(&cat) {
            continue;
        }
        if selected.len() == catalog::MAX_CATEGORIES {
            tracing::warn!("Dropping topic over the limit: {}", cat);
            continue;
        }
        selected.push(cat);
    }

    let mut preferences = vec![country];
    preferences.extend(selected.iter().map(|c| c.to_string()));

    let payload = SubmissionPayload {
        email: email.trim().to_string(),
        name: name.trim().to_string(),
        preferences,
        api_key,
        gmail_user,
        gmail_pass,
    };

    let client = DigestClient::new(config.endpoint.clone());
    match client.send(&payload).await {
        Ok(body) => {
            println!("{}", body);
            if config.notifications {
                let _ = notify("newsbrief", &body);
            }
            Ok(())
        }
        Err(e) => {
            if config.notifications {
                let _ = notify("newsbrief", &format!("Failed to send digest: {}", e));
            }
            Err(anyhow::anyhow!("Failed to send digest: {}", e))
        }
    }
}

fn required_flag(value: Option<String>, flag: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => anyhow::bail!("{} is required with --send", flag),
    }
}

async fn run_tui(config: AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None && !app.editing => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key).await {
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("internet-mail")
        .show()?;
    Ok(())
}
