//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::Phase;
use crate::models::{HistoryItem, Protocol, RawFields, SavedRequest};

/// Severity of a one-line notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// What the UI should print in response to the last event
#[derive(Debug, Clone, Default)]
pub enum View {
    #[default]
    Nothing,
    Draft,
    Outcome,
    History(Vec<HistoryItem>),
    Saved(Vec<SavedRequest>),
    Help,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub protocol: Protocol,
    pub fields: RawFields,
    pub phase: Phase,
    pub in_flight: usize,
    pub notice: Option<Notice>,
    pub view: View,
}
