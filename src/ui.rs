//! Terminal rendering - turns a [`RenderState`] into styled text

use std::fmt::Write;

use crossterm::style::{Color, Stylize};

use crate::app::state::Phase;
use crate::messages::{NoticeLevel, RenderState, View};
use crate::models::{HistoryItem, Protocol, RawFields, Response, SavedRequest};

pub const HELP: &str = r#"Commands:
────────────────────────────
  protocol <http|ws|graphql>   Select protocol
  method <GET|POST|...>        HTTP method
  url <url>                    Target URL
  name <name>                  Request name (defaults to URL)
  headers <json>               Headers object (HTTP, GraphQL)
  body <json>                  Body (HTTP) or variables (GraphQL)
  query <text>                 GraphQL query
  messages <a\nb>              WebSocket messages, one per line
  listen <secs>                WebSocket listen window (blank: 5)
  cache <on|off>               Reuse successful GET replies
  send                         Validate and send
  save | saved                 Save draft / list saved
  load <id> | delete <id>      Load or delete a saved request
  history [n]                  List history / load entry n
  replay <n>                   Load history entry n and send it
  show | clear                 Show / reset the draft
  quit
────────────────────────────
Use \n inside values for newlines."#;

/// Status code color
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Red,
        500..=599 => Color::Magenta,
        _ => Color::Yellow,
    }
}

/// Method color
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Yellow,
        "PUT" => Color::Blue,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

/// Render everything the state asks for; empty when there is nothing to show
pub fn render(state: &RenderState) -> String {
    let mut out = String::new();

    if let Some(notice) = &state.notice {
        let text = match notice.level {
            NoticeLevel::Info => notice.text.clone().dark_grey(),
            NoticeLevel::Error => notice.text.clone().red(),
        };
        let _ = writeln!(out, "{}", text);
    }

    match &state.view {
        View::Nothing => {}
        View::Draft => render_draft(&mut out, state.protocol, &state.fields),
        View::Outcome => render_phase(&mut out, &state.phase),
        View::History(items) => render_history(&mut out, items),
        View::Saved(items) => render_saved(&mut out, items),
        View::Help => {
            let _ = writeln!(out, "{}", HELP);
        }
    }

    out
}

/// Prompt showing protocol and in-flight count
pub fn prompt(state: &RenderState) -> String {
    if state.in_flight > 0 {
        format!("{} [{} in flight]> ", state.protocol, state.in_flight)
    } else {
        format!("{}> ", state.protocol)
    }
}

fn render_draft(out: &mut String, protocol: Protocol, fields: &RawFields) {
    let _ = writeln!(out, "{} {}", "protocol".bold(), protocol);
    if protocol == Protocol::Http {
        let method = fields.method.as_str();
        let _ = writeln!(out, "{}   {}", "method".bold(), method.with(method_color(method)));
    }
    let _ = writeln!(out, "{}     {}", "name".bold(), fields.name);
    let _ = writeln!(out, "{}      {}", "url".bold(), fields.url);

    match protocol {
        Protocol::Http => {
            write_block(out, "headers", &fields.headers);
            write_block(out, "body", &fields.body);
            let cache = if fields.use_cache { "on" } else { "off" };
            let _ = writeln!(out, "{}    {}", "cache".bold(), cache);
        }
        Protocol::GraphQL => {
            write_block(out, "query", &fields.query);
            write_block(out, "headers", &fields.headers);
            write_block(out, "variables", &fields.body);
        }
        Protocol::WebSocket => {
            write_block(out, "messages", &fields.messages);
            let listen = match fields.listen.trim() {
                "" => "default".to_string(),
                secs => format!("{} s", secs),
            };
            let _ = writeln!(out, "{}   {}", "listen".bold(), listen);
        }
    }
}

fn write_block(out: &mut String, label: &str, text: &str) {
    if text.is_empty() {
        let _ = writeln!(out, "{} {}", label.bold(), "(empty)".dark_grey());
    } else {
        let _ = writeln!(out, "{}", label.bold());
        for line in text.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
}

fn render_phase(out: &mut String, phase: &Phase) {
    match phase {
        Phase::Draft => {}
        Phase::Dispatched { id } => {
            let _ = writeln!(out, "#{} in flight", id);
        }
        Phase::Completed {
            id,
            request,
            response,
        } => {
            let _ = writeln!(out, "#{} {}", id, request.label());
            render_response(out, response);
        }
        Phase::Failed { id, message } => {
            let _ = writeln!(out, "#{} {}", id, message.clone().red());
        }
    }
}

fn render_response(out: &mut String, response: &Response) {
    let status = response.status.to_string().with(status_color(response.status)).bold();
    if response.cached {
        let _ = writeln!(out, "{}  {:.0} ms  {}", status, response.duration_ms, "(cached)".dark_grey());
    } else {
        let _ = writeln!(out, "{}  {:.0} ms", status, response.duration_ms);
    }

    if let Some(headers) = &response.headers {
        for (name, value) in headers {
            let _ = writeln!(out, "{}: {}", name.clone().dark_grey(), value);
        }
    }

    let body = serde_json::to_string_pretty(&response.body).unwrap_or_default();
    let _ = writeln!(out, "{}", body);
}

fn render_history(out: &mut String, items: &[HistoryItem]) {
    if items.is_empty() {
        let _ = writeln!(out, "{}", "History is empty".dark_grey());
        return;
    }
    for (i, item) in items.iter().enumerate() {
        let status = item.response.status;
        let _ = writeln!(
            out,
            "{:>2}. {} {} {:>5.0} ms  {}",
            i + 1,
            item.timestamp.format("%H:%M:%S"),
            status.to_string().with(status_color(status)),
            item.response.duration_ms,
            item.request.label()
        );
    }
}

fn render_saved(out: &mut String, items: &[SavedRequest]) {
    if items.is_empty() {
        let _ = writeln!(out, "{}", "No saved requests".dark_grey());
        return;
    }
    for saved in items {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            saved.id.clone().dark_grey(),
            saved.request.name.clone().bold(),
            saved.request.label()
        );
    }
}
