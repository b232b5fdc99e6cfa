//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses.
///
/// Both stores live in its state, so every history write and saved-request
/// change happens on this one loop, in arrival order.
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        break;
                    }
                    self.render();
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    self.render();
                }
                else => break,
            }
        }

        // Let in-flight dispatches land in history before shutting down
        let _ = self.network_tx.send(NetworkCommand::Shutdown);
        while !self.state.in_flight.is_empty() {
            match net_rx.recv().await {
                Some(response) => {
                    self.state.handle_response(response);
                    self.render();
                }
                None => break,
            }
        }
    }

    fn render(&mut self) {
        let _ = self.render_tx.send(self.state.take_render_state());
    }

    fn send_command(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Draft editing
            UiEvent::SwitchProtocol(protocol) => self.state.switch_protocol(protocol),
            UiEvent::SetMethod(method) => self.state.set_method(method),
            UiEvent::SetField(field, value) => self.state.set_field(field, value),
            UiEvent::SetCache(enabled) => self.state.set_cache(enabled),
            UiEvent::ClearDraft => self.state.clear_draft(),

            // Request actions
            UiEvent::SendRequest => {
                let cmd = self.state.prepare_request();
                self.send_command(cmd);
            }
            UiEvent::SaveRequest => self.state.save_request(),

            // Saved requests
            UiEvent::ListSaved => self.state.list_saved(),
            UiEvent::LoadSaved(id) => self.state.load_saved(&id),
            UiEvent::DeleteSaved(id) => self.state.delete_saved(&id),

            // History
            UiEvent::ListHistory => self.state.list_history(),
            UiEvent::LoadHistory(position) => self.state.load_history(position),
            UiEvent::Replay(position) => {
                let cmd = self.state.replay(position);
                self.send_command(cmd);
            }

            // Views
            UiEvent::ShowDraft => self.state.show_draft(),
            UiEvent::ToggleHelp => self.state.toggle_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
