//! apiprobe - actor-based request workbench
//!
//! Architecture:
//! - UI Layer - reads command lines, prints render states
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async dispatch execution

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use apiprobe::config::BackendMode;
use apiprobe::messages::ui_events::parse_command;
use apiprobe::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use apiprobe::storage::{FileStore, SharedStore};
use apiprobe::{ui, AppActor, AppState, Backend, Config, LocalBackend, NetworkActor, RemoteBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(&data_dir, config.log_file());
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    tracing::info!(data_dir = %data_dir.display(), mode = ?config.backend.mode, "Starting");

    let store: SharedStore = Arc::new(FileStore::new(&data_dir));
    let state = AppState::new(store);

    match config.backend.mode {
        BackendMode::Local => run(LocalBackend::new(), state).await,
        BackendMode::Remote => run(RemoteBackend::new(config.backend.base_url.clone()), state).await,
    }
}

/// Wire the actors together and drive the terminal loop until quit
async fn run<B: Backend + 'static>(backend: B, state: AppState) -> anyhow::Result<()> {
    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(backend, net_resp_tx);
    let network = tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(state, net_cmd_tx, render_tx);
    let app = tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    println!("{}", ui::HELP);
    run_ui_loop(ui_tx, &mut render_rx).await?;

    app.await?;
    network.await?;
    // Flush renders produced while draining in-flight requests
    while let Ok(state) = render_rx.try_recv() {
        print!("{}", ui::render(&state));
    }
    Ok(())
}

/// Read command lines and print render states as they arrive
async fn run_ui_loop(
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current_state = RenderState::default();
    show_prompt(&current_state)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = ui_tx.send(UiEvent::Quit);
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(UiEvent::Quit)) => {
                        let _ = ui_tx.send(UiEvent::Quit);
                        break;
                    }
                    Ok(Some(event)) => {
                        let _ = ui_tx.send(event);
                    }
                    Ok(None) => show_prompt(&current_state)?,
                    Err(message) => {
                        println!("{}", message);
                        show_prompt(&current_state)?;
                    }
                }
            }
            Some(state) = render_rx.recv() => {
                print!("{}", ui::render(&state));
                current_state = state;
                show_prompt(&current_state)?;
            }
        }
    }

    Ok(())
}

fn show_prompt(state: &RenderState) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", ui::prompt(state))?;
    stdout.flush()?;
    Ok(())
}
