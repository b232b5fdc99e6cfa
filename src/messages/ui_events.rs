//! UI events - messages from UI layer to App layer

use crate::models::{HttpMethod, Protocol};

/// Editable text field of the draft
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EditField {
    Name,
    Url,
    Headers,
    Body,
    Query,
    Messages,
    Listen,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Draft editing
    SwitchProtocol(Protocol),
    SetMethod(HttpMethod),
    SetField(EditField, String),
    SetCache(bool),
    ClearDraft,

    // Request actions
    SendRequest,
    SaveRequest,

    // Saved requests
    ListSaved,
    LoadSaved(String),
    DeleteSaved(String),

    // History (1-based positions, oldest first)
    ListHistory,
    LoadHistory(usize),
    Replay(usize),

    // Views
    ShowDraft,
    ToggleHelp,

    // System
    Quit,
}

/// Parse one input line into an event.
///
/// Blank lines yield `Ok(None)`. Field values may use `\n` for newlines.
pub fn parse_command(line: &str) -> Result<Option<UiEvent>, String> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_end()),
        None => (line.trim_end(), ""),
    };
    let arg = rest.trim();

    let event = match command.to_ascii_lowercase().as_str() {
        "protocol" | "p" => UiEvent::SwitchProtocol(arg.parse()?),
        "method" | "m" => UiEvent::SetMethod(arg.parse()?),
        "name" => UiEvent::SetField(EditField::Name, unescape(rest)),
        "url" | "u" => UiEvent::SetField(EditField::Url, unescape(rest)),
        "headers" | "h" => UiEvent::SetField(EditField::Headers, unescape(rest)),
        "body" | "b" | "variables" | "vars" => UiEvent::SetField(EditField::Body, unescape(rest)),
        "query" | "q" => UiEvent::SetField(EditField::Query, unescape(rest)),
        "messages" | "msgs" => UiEvent::SetField(EditField::Messages, unescape(rest)),
        "listen" => UiEvent::SetField(EditField::Listen, arg.to_string()),
        "cache" => UiEvent::SetCache(toggle(arg)?),
        "clear" => UiEvent::ClearDraft,
        "send" | "s" => UiEvent::SendRequest,
        "save" => UiEvent::SaveRequest,
        "saved" => UiEvent::ListSaved,
        "load" => UiEvent::LoadSaved(required(arg, "load <id>")?),
        "delete" | "rm" => UiEvent::DeleteSaved(required(arg, "delete <id>")?),
        "history" => {
            if arg.is_empty() {
                UiEvent::ListHistory
            } else {
                UiEvent::LoadHistory(position(arg)?)
            }
        }
        "replay" | "r" => UiEvent::Replay(position(arg)?),
        "show" => UiEvent::ShowDraft,
        "help" | "?" => UiEvent::ToggleHelp,
        "quit" | "exit" => UiEvent::Quit,
        other => return Err(format!("Unknown command: {} (try 'help')", other)),
    };

    Ok(Some(event))
}

fn required(arg: &str, usage: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(arg.to_string())
    }
}

fn toggle(arg: &str) -> Result<bool, String> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err("Usage: cache <on|off>".to_string()),
    }
}

fn position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Expected a history position (1, 2, ...), got '{}'", arg)),
    }
}

/// Expand `\n`, `\t` and `\\` escapes
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_commands() {
        assert_eq!(
            parse_command("url https://example.com/posts").unwrap(),
            Some(UiEvent::SetField(EditField::Url, "https://example.com/posts".to_string()))
        );
        assert_eq!(
            parse_command(r#"headers {"Accept": "application/json"}"#).unwrap(),
            Some(UiEvent::SetField(
                EditField::Headers,
                r#"{"Accept": "application/json"}"#.to_string()
            ))
        );
        assert_eq!(
            parse_command("method post").unwrap(),
            Some(UiEvent::SetMethod(HttpMethod::POST))
        );
        assert_eq!(
            parse_command("protocol ws").unwrap(),
            Some(UiEvent::SwitchProtocol(Protocol::WebSocket))
        );
    }

    #[test]
    fn test_messages_expand_newlines() {
        assert_eq!(
            parse_command(r"messages ping\n\nhello").unwrap(),
            Some(UiEvent::SetField(EditField::Messages, "ping\n\nhello".to_string()))
        );
    }

    #[test]
    fn test_escaped_backslash_is_kept() {
        assert_eq!(unescape(r#"{"re": "a\\nb"}"#), r#"{"re": "a\nb"}"#);
        assert_eq!(unescape(r"\q"), r"\q");
    }

    #[test]
    fn test_empty_field_value_clears() {
        assert_eq!(
            parse_command("body").unwrap(),
            Some(UiEvent::SetField(EditField::Body, String::new()))
        );
    }

    #[test]
    fn test_history_and_replay_positions() {
        assert_eq!(parse_command("history").unwrap(), Some(UiEvent::ListHistory));
        assert_eq!(parse_command("history 3").unwrap(), Some(UiEvent::LoadHistory(3)));
        assert_eq!(parse_command("replay 1").unwrap(), Some(UiEvent::Replay(1)));
        assert!(parse_command("replay 0").is_err());
        assert!(parse_command("replay").is_err());
    }

    #[test]
    fn test_cache_and_listen_commands() {
        assert_eq!(parse_command("cache on").unwrap(), Some(UiEvent::SetCache(true)));
        assert_eq!(parse_command("cache OFF").unwrap(), Some(UiEvent::SetCache(false)));
        assert!(parse_command("cache").is_err());
        assert_eq!(
            parse_command("listen 2").unwrap(),
            Some(UiEvent::SetField(EditField::Listen, "2".to_string()))
        );
    }

    #[test]
    fn test_blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("launch").is_err());
        assert!(parse_command("load").is_err());
        assert!(parse_command("method TRACE").is_err());
    }
}
