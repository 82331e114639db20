//! Text rendering of sessions, field errors and event lists.

use tokio::task::JoinHandle;

use agenda_core::domain::Event;
use agenda_core::error::ValidationError;
use agenda_core::validation::{LoginErrors, RegistrationErrors};

use crate::state::AppState;

pub fn format_events(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events yet. Use `add <title> | <date> | <description>` to create one.\n"
            .to_string();
    }

    let mut out = format!("Your events ({}):\n", events.len());
    for (index, event) in events.iter().enumerate() {
        out.push_str(&format!(
            "  {}. [{}] {}  {}\n",
            index + 1,
            event.id,
            event.date,
            event.title
        ));
        if !event.description.is_empty() {
            out.push_str(&format!("       {}\n", event.description));
        }
    }
    out
}

fn field_lines(fields: &[(&str, Option<ValidationError>)]) -> String {
    fields
        .iter()
        .filter_map(|(name, error)| error.map(|e| format!("  {name}: {e}\n")))
        .collect()
}

pub fn format_registration_errors(errors: &RegistrationErrors) -> String {
    field_lines(&[
        ("email", errors.email),
        ("password", errors.password),
        ("confirm", errors.confirmation),
    ])
}

pub fn format_login_errors(errors: &LoginErrors) -> String {
    field_lines(&[("email", errors.email), ("password", errors.password)])
}

/// Re-render the list on every pushed snapshot while someone is signed in.
///
/// Write failures are reported by the command that caused them, not here.
pub fn spawn_renderer(state: AppState) -> JoinHandle<()> {
    let mut snapshots = state.events.subscribe();

    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let events = snapshots.borrow_and_update().clone();
            if state.events.owner().is_some() {
                print!("\n{}> ", format_events(&events));
            }
        }
        tracing::debug!("Renderer stopped");
    })
}
