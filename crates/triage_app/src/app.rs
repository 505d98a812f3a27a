use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use triage_core::{update, AppState, Msg};
use triage_engine::{ClientSettings, EngineConfig};
use triage_logging::triage_info;

use crate::effects::EffectRunner;
use crate::input::{self, Input};
use crate::persistence;
use crate::render;

const ENV_SERVICE_URL: &str = "TRIAGE_SERVICE_URL";
const DOWNLOAD_DIR: &str = "downloads";

/// How long the loop waits for input before draining engine events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) fn run() -> anyhow::Result<()> {
    let work_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let prefs = persistence::load_prefs(&work_dir);

    let mut client = ClientSettings::default();
    if let Ok(url) = std::env::var(ENV_SERVICE_URL) {
        client.base_url = url;
    }
    triage_info!("analysis service at {}", client.base_url);

    let config = EngineConfig {
        client,
        output_dir: work_dir.join(DOWNLOAD_DIR),
        timestamp: Arc::new(|| Local::now().format("%Y%m%d_%H%M%S").to_string()),
    };

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config, work_dir, input_tx.clone())
        .context("failed to start the analysis engine")?;
    spawn_stdin_reader(input_tx);

    let mut state = AppState::new();
    state = dispatch(
        state,
        Msg::PrefsLoaded {
            dark_mode: prefs.dark_mode,
        },
        &runner,
    );
    state.consume_dirty();
    print_view(&state);

    loop {
        match input_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Input::Quit) => break,
            Ok(Input::Empty) => {
                // Empty line doubles as an escape key for open dialogs.
                if state.open_modal_kind().is_some() {
                    state = dispatch(state, Msg::ModalClosed, &runner);
                }
            }
            Ok(Input::Unknown(line)) => {
                println!("Unknown command: {line} (try `help`)");
            }
            Ok(Input::Msg(msg)) => {
                state = dispatch(state, msg, &runner);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        while let Some(msg) = runner.poll_event() {
            state = dispatch(state, msg, &runner);
        }

        if state.consume_dirty() {
            print_view(&state);
        }
    }

    triage_info!("shutting down");
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.run(effects);
    state
}

fn print_view(state: &AppState) {
    print!("{}", render::render(&state.view()));
    print!("triage> ");
    let _ = io::stdout().flush();
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(input::parse(&line)).is_err() {
                return;
            }
        }
        // EOF on stdin ends the session.
        let _ = input_tx.send(Input::Quit);
    });
}
