//! Command execution against the shared state.

use std::io::{self, Write};

use agenda_core::AuthState;

use crate::commands::Command;
use crate::render;
use crate::state::AppState;

pub const HELP: &str = "\
Commands:
  register <email> <password> <confirm>   create an account and sign in
  login <email> <password>                sign in
  logout                                  sign out
  whoami                                  show the signed-in user
  list                                    show your events
  add <title> | <date> | <description>    create an event
  edit <id> <title> | <date> | <description>
                                          replace an event's fields
  delete <id>                             delete an event
  help                                    show this text
  quit                                    leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn execute(state: &AppState, command: Command, out: &mut impl Write) -> io::Result<Flow> {
    match command {
        Command::Register(form) => match state.session.submit_registration(&form).await {
            Ok(outcome) => on_authenticated(state, "Registration", outcome, out).await?,
            Err(errors) => {
                writeln!(out, "Please fix the following:")?;
                write!(out, "{}", render::format_registration_errors(&errors))?;
            }
        },
        Command::Login(credentials) => match state.session.submit_login(&credentials).await {
            Ok(outcome) => on_authenticated(state, "Login", outcome, out).await?,
            Err(errors) => {
                writeln!(out, "Please fix the following:")?;
                write!(out, "{}", render::format_login_errors(&errors))?;
            }
        },
        Command::Logout => {
            state.events.stop();
            state.session.sign_out().await;
            writeln!(out, "Signed out.")?;
        }
        Command::WhoAmI => match state.session.current_user().await {
            Some(user) => writeln!(out, "Hello, {} ({})", user.greeting_name(), user.email)?,
            None => writeln!(out, "Not signed in.")?,
        },
        Command::List => {
            if state.events.owner().is_none() {
                writeln!(out, "Sign in to see your events.")?;
            } else {
                write!(out, "{}", render::format_events(&state.events.snapshot()))?;
            }
        }
        Command::Add(draft) => match state.events.add(draft).await {
            Ok(Some(id)) => writeln!(out, "Event saved ({id}).")?,
            Ok(None) => writeln!(out, "Sign in to add events.")?,
            Err(e) => writeln!(out, "Could not save the event: {e}")?,
        },
        Command::Edit { id, draft } => match state.events.update(&id, draft).await {
            Ok(true) => writeln!(out, "Event updated.")?,
            Ok(false) => writeln!(out, "Sign in to edit events.")?,
            Err(e) => writeln!(out, "Could not update the event: {e}")?,
        },
        Command::Delete(id) => match state.events.delete(&id).await {
            Ok(true) => writeln!(out, "Event deleted.")?,
            Ok(false) => writeln!(out, "Sign in to delete events.")?,
            Err(e) => writeln!(out, "Could not delete the event: {e}")?,
        },
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

async fn on_authenticated(
    state: &AppState,
    action: &str,
    outcome: AuthState,
    out: &mut impl Write,
) -> io::Result<()> {
    match outcome {
        AuthState::Authenticated(true) => {
            let name = state
                .session
                .current_user()
                .await
                .map(|user| user.greeting_name().to_string())
                .unwrap_or_else(|| "User".to_string());
            writeln!(out, "Welcome, {name}!")?;

            if let Err(e) = state.events.start_for_current_user().await {
                tracing::error!(error = %e, "Could not subscribe to events");
                writeln!(out, "Could not load your events: {e}")?;
            }
        }
        AuthState::Failed(message) => writeln!(out, "{action} failed: {message}")?,
        other => tracing::debug!(?other, "Unexpected session state after submit"),
    }
    Ok(())
}
