//! Parsing of incoming text and callback payloads.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::presentation::{FilterAffordance, SizeFilter};

use super::BotError;

static SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/select_([0-9A-Za-z]+)_([0-9A-Za-z]+)(?:@\w+)?$").unwrap());

static FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/file_([0-9A-Za-z]+)_([0-9A-Za-z]+)_([0-9A-Za-z]+)(?:@\w+)?$").unwrap()
});

static START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/start(?:@\w+)?(?:\s.*)?$").unwrap());

/// A parsed user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Select {
        fingerprint: String,
        item_id: String,
    },
    File {
        fingerprint: String,
        item_id: String,
        file_id: String,
    },
    Search(String),
    Filter {
        filter: SizeFilter,
        fingerprint: String,
    },
}

/// Parse a text message. Anything not starting with `/` is a search.
pub fn parse_text(text: &str) -> Result<Command, BotError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BotError::InvalidCommand("empty message".to_string()));
    }

    if !text.starts_with('/') {
        return Ok(Command::Search(text.to_string()));
    }

    if START.is_match(text) {
        return Ok(Command::Start);
    }

    if let Some(caps) = SELECT.captures(text) {
        return Ok(Command::Select {
            fingerprint: caps[1].to_string(),
            item_id: caps[2].to_string(),
        });
    }

    if let Some(caps) = FILE.captures(text) {
        return Ok(Command::File {
            fingerprint: caps[1].to_string(),
            item_id: caps[2].to_string(),
            file_id: caps[3].to_string(),
        });
    }

    Err(BotError::InvalidCommand(text.to_string()))
}

/// Parse callback data attached to a control.
pub fn parse_callback(data: &str) -> Result<Command, BotError> {
    FilterAffordance::parse_command(data)
        .map(|(filter, fingerprint)| Command::Filter {
            filter,
            fingerprint: fingerprint.to_string(),
        })
        .ok_or_else(|| BotError::InvalidCommand(data.to_string()))
}
