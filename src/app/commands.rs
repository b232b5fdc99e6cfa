//! Command handlers - business logic for processing UI events

use crate::app::state::{AppState, Phase};
use crate::builder::{build, populate};
use crate::messages::{EditField, Notice, NetworkCommand, NetworkResponse, View};
use crate::models::{HttpMethod, Protocol, Request};

impl AppState {
    // ========================
    // Draft editing
    // ========================

    pub fn switch_protocol(&mut self, protocol: Protocol) {
        self.protocol = protocol;
        self.notice = Some(Notice::info(format!("Protocol: {}", protocol)));
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.fields.method = method;
    }

    pub fn set_field(&mut self, field: EditField, value: String) {
        let target = match field {
            EditField::Name => &mut self.fields.name,
            EditField::Url => &mut self.fields.url,
            EditField::Headers => &mut self.fields.headers,
            EditField::Body => &mut self.fields.body,
            EditField::Query => &mut self.fields.query,
            EditField::Messages => &mut self.fields.messages,
            EditField::Listen => &mut self.fields.listen,
        };
        *target = value;
    }

    pub fn set_cache(&mut self, enabled: bool) {
        self.fields.use_cache = enabled;
        let state = if enabled { "on" } else { "off" };
        self.notice = Some(Notice::info(format!("Response cache: {}", state)));
    }

    pub fn clear_draft(&mut self) {
        self.fields = Default::default();
        self.phase = Phase::Draft;
        self.view = View::Draft;
    }

    pub fn show_draft(&mut self) {
        self.view = View::Draft;
    }

    pub fn toggle_help(&mut self) {
        self.view = View::Help;
    }

    // ========================
    // Sending
    // ========================

    /// Validate the draft. Failures become an error notice.
    fn build_draft(&mut self) -> Option<Request> {
        match build(self.protocol, &self.fields) {
            Ok(request) => Some(request),
            Err(err) => {
                tracing::debug!(field = %err.field, "Draft failed validation");
                self.notice = Some(Notice::error(err.to_string()));
                None
            }
        }
    }

    /// Build the draft and hand it to the network layer
    pub fn prepare_request(&mut self) -> Option<NetworkCommand> {
        let request = self.build_draft()?;
        Some(self.dispatch(request))
    }

    fn dispatch(&mut self, request: Request) -> NetworkCommand {
        let id = self.next_id();
        self.in_flight.insert(id, request.clone());
        self.phase = Phase::Dispatched { id };
        self.notice = Some(Notice::info(format!("#{} {} ...", id, request.label())));
        NetworkCommand::Dispatch { id, request }
    }

    /// Apply a dispatch outcome. Only completions are recorded.
    pub fn handle_response(&mut self, response: NetworkResponse) {
        let Some(request) = self.in_flight.remove(&response.id()) else {
            tracing::warn!(id = response.id(), "Outcome for unknown request");
            return;
        };

        match response {
            NetworkResponse::Completed { id, response } => {
                self.history.record(request.clone(), response.clone());
                self.phase = Phase::Completed {
                    id,
                    request,
                    response,
                };
            }
            NetworkResponse::Failed { id, error } => {
                self.phase = Phase::Failed {
                    id,
                    message: error.to_string(),
                };
            }
        }
        self.view = View::Outcome;
    }

    // ========================
    // Saved requests
    // ========================

    pub fn save_request(&mut self) {
        if let Some(request) = self.build_draft() {
            let saved = self.saved.save(request);
            self.notice = Some(Notice::info(format!(
                "Saved '{}' as {}",
                saved.request.name, saved.id
            )));
        }
    }

    pub fn list_saved(&mut self) {
        self.view = View::Saved(self.saved.list().to_vec());
    }

    pub fn load_saved(&mut self, id: &str) {
        match self.saved.get(id).map(|saved| saved.request.clone()) {
            Some(request) => self.load_into_draft(&request),
            None => self.notice = Some(Notice::error(format!("No saved request with id {}", id))),
        }
    }

    pub fn delete_saved(&mut self, id: &str) {
        self.notice = Some(if self.saved.delete(id) {
            Notice::info(format!("Deleted {}", id))
        } else {
            Notice::error(format!("No saved request with id {}", id))
        });
    }

    // ========================
    // History
    // ========================

    pub fn list_history(&mut self) {
        self.view = View::History(self.history.list().to_vec());
    }

    fn history_request(&mut self, position: usize) -> Option<Request> {
        let request = position
            .checked_sub(1)
            .and_then(|index| self.history.get(index))
            .map(|item| item.request.clone());
        if request.is_none() {
            self.notice = Some(Notice::error(format!(
                "No history entry {} ({} recorded)",
                position,
                self.history.len()
            )));
        }
        request
    }

    /// Copy a history entry into the draft
    pub fn load_history(&mut self, position: usize) {
        if let Some(request) = self.history_request(position) {
            self.load_into_draft(&request);
        }
    }

    /// Copy a history entry into the draft and send it again
    pub fn replay(&mut self, position: usize) -> Option<NetworkCommand> {
        let request = self.history_request(position)?;
        self.load_into_draft(&request);
        self.prepare_request()
    }

    fn load_into_draft(&mut self, request: &Request) {
        self.protocol = request.protocol();
        self.fields = populate(request);
        self.phase = Phase::Draft;
        self.view = View::Draft;
    }
}
