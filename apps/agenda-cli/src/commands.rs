//! Prompt command parsing.

use agenda_core::domain::{Credentials, EventDraft};
use agenda_core::validation::RegistrationForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register(RegistrationForm),
    Login(Credentials),
    Logout,
    WhoAmI,
    List,
    Add(EventDraft),
    Edit { id: String, draft: EventDraft },
    Delete(String),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command `{0}`. Type `help` for the list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parse one prompt line. Blank lines yield `None`.
///
/// Credentials are split on whitespace and missing ones are left empty, so the
/// validator gets to report them. Event fields are separated by `|`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(name, rest)| (name, rest.trim()));

    let command = match name.to_lowercase().as_str() {
        "register" | "signup" => {
            let mut args = rest.split_whitespace();
            let email = args.next().unwrap_or_default();
            let password = args.next().unwrap_or_default();
            let confirm = args.next().unwrap_or_default();
            Command::Register(RegistrationForm::new(email, password, confirm))
        }
        "login" => {
            let mut args = rest.split_whitespace();
            let email = args.next().unwrap_or_default();
            let password = args.next().unwrap_or_default();
            Command::Login(Credentials::new(email, password))
        }
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "list" | "ls" => Command::List,
        "add" => Command::Add(parse_draft(rest)),
        "edit" => {
            let (id, fields) = rest
                .split_once(char::is_whitespace)
                .ok_or(ParseError::Usage("edit <id> <title> | <date> | <description>"))?;
            Command::Edit {
                id: id.to_string(),
                draft: parse_draft(fields),
            }
        }
        "delete" | "rm" => {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                return Err(ParseError::Usage("delete <id>"));
            }
            Command::Delete(rest.to_string())
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn parse_draft(fields: &str) -> EventDraft {
    let mut parts = fields.splitn(3, '|').map(str::trim);
    EventDraft::new(
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}
