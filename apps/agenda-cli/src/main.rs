//! # Agenda
//!
//! Terminal front-end: sign in, then manage a personal event list that stays
//! in sync with the backing store.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

mod commands;
mod config;
mod handlers;
mod render;
mod state;
mod telemetry;

use config::AppConfig;
use handlers::Flow;
use state::AppState;
use telemetry::TelemetryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    telemetry::init_telemetry(&telemetry);

    let config = AppConfig::from_env();
    let state = AppState::in_memory(&config);

    if state.session.restore().await.is_authenticated() {
        state.events.start_for_current_user().await?;
    }

    let renderer = render::spawn_renderer(state.clone());
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", handlers::HELP)?;
    prompt(&mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match commands::parse(&line) {
            Ok(Some(command)) => {
                if handlers::execute(&state, command, &mut stdout).await? == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => writeln!(stdout, "{e}")?,
        }
        prompt(&mut stdout)?;
    }

    state.events.stop();
    renderer.abort();
    tracing::info!("Bye");
    Ok(())
}

fn prompt(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
