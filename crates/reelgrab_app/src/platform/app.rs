use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use reelgrab_core::{update, AppState, AppViewModel, Msg, SessionState};
use reelgrab_logging::{rg_debug, rg_info, rg_warn};

use super::cli::Cli;
use super::effects::EffectRunner;
use super::render::TerminalRenderer;

/// Nothing to download was given.
pub const EXIT_NO_TARGETS: u8 = 2;
/// Setup failed or the batch could not start.
pub const EXIT_FATAL: u8 = 1;

const POLL_INTERVAL: Duration = Duration::from_millis(120);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    reelgrab_logging::initialize(cli.log.into(), cli.level_filter());

    let items_text = cli.read_items()?;
    let engine = Arc::new(cli.engine()?);
    rg_info!("engine program {}", engine.program().display());

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let mut app = App {
        state: AppState::new(),
        effects: EffectRunner::new(engine, msg_tx.clone()),
    };
    // Unlocked: the terminal logger on the runner thread shares stdout.
    let stdout = io::stdout();
    let interactive = stdout.is_terminal();
    let mut renderer = TerminalRenderer::new(stdout, interactive);

    for msg in cli.form_messages(items_text) {
        app.dispatch(msg);
    }
    listen_for_interrupt(msg_tx)?;
    app.dispatch(Msg::StartClicked);

    loop {
        for msg in msg_rx.try_iter() {
            app.dispatch(msg);
        }
        let progress = app.effects.poll();
        for msg in progress {
            app.dispatch(msg);
        }
        if app.state.consume_dirty() {
            renderer.render(&app.state.view())?;
        }
        if app.state.session() == SessionState::Idle {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }
    renderer.finish()?;

    if let Some(summary) = app.effects.finish() {
        rg_info!("batch summary: {}", summary);
    }
    Ok(ExitCode::from(exit_status(&app.state.view())))
}

struct App {
    state: AppState,
    effects: EffectRunner,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        rg_debug!("dispatch {:?}", msg);
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        self.effects.run(effects);
    }
}

/// A batch that ran counts as success even when some items failed.
fn exit_status(view: &AppViewModel) -> u8 {
    if view.batches_finished > 0 {
        0
    } else if view.notice.is_some() {
        EXIT_NO_TARGETS
    } else {
        EXIT_FATAL
    }
}

/// Ctrl-C becomes a cancel click; the batch then winds down on its own.
fn listen_for_interrupt(msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;
    thread::Builder::new()
        .name("reelgrab-signal".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    rg_warn!("interrupt received, cancelling");
                    if msg_tx.send(Msg::CancelClicked).is_err() {
                        break;
                    }
                }
            })
        })
        .context("spawning signal thread")?;
    Ok(())
}
