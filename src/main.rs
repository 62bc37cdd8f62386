//! Terminal match-3 runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `match3-term`.
//! Logs go to a file (`MATCH3_LOG_PATH`, default `match3.log`) so they never
//! draw over the board.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use tracing::{debug, error, info, warn};

use match3::cli::{parse_args, USAGE};
use match3::core::{ClickOutcome, EngineConfig, EngineSnapshot, EventLog, SwapController};
use match3::input::{handle_key_event, should_quit, Cursor};
use match3::term::{FrameBuffer, GameView, Overlay, TerminalRenderer, Viewport};
use match3::types::{Coord, GameAction, TICK_MS};

/// How long an engine message stays in the side panel
const MESSAGE_TTL_MS: u32 = 1500;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = cli.apply(EngineConfig::from_env());
    config.validate()?;
    init_logging()?;
    info!(?config, "starting match3");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        error!(error = %e, "match3 exited with an error");
    }
    result
}

fn init_logging() -> Result<()> {
    let path = std::env::var("MATCH3_LOG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "match3.log".to_string());
    let log_file =
        std::fs::File::create(&path).with_context(|| format!("cannot create log file {}", path))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Front-end state that is not part of the engine
struct Session {
    cursor: Cursor,
    hint: Option<(Coord, Coord)>,
    message: Option<String>,
    message_ms: u32,
}

impl Session {
    fn new(size: u8) -> Self {
        Self {
            cursor: Cursor::new(size),
            hint: None,
            message: None,
            message_ms: 0,
        }
    }

    fn show(&mut self, message: String) {
        self.message = Some(message);
        self.message_ms = MESSAGE_TTL_MS;
    }

    fn tick(&mut self, elapsed_ms: u32) {
        if self.message_ms > 0 {
            self.message_ms = self.message_ms.saturating_sub(elapsed_ms);
            if self.message_ms == 0 {
                self.message = None;
            }
        }
    }
}

fn run(term: &mut TerminalRenderer, config: EngineConfig) -> Result<()> {
    let mut game = SwapController::new(config, EventLog::new())?;
    let mut session = Session::new(game.board().size());

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = EngineSnapshot::default();

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        game.snapshot_into(&mut snap);
        let overlay = Overlay {
            cursor: Some(session.cursor.coord()),
            hint: session.hint,
            message: session.message.as_deref(),
        };
        view.render_into(&snap, &overlay, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if should_quit(key) {
                        info!(score = game.score(), "quit");
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        apply_action(&mut game, &mut session, action)?;
                    }
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(c) = view.cell_at(snap.size, viewport, mouse.column, mouse.row) {
                        session.cursor.set(c);
                        apply_action(&mut game, &mut session, GameAction::Click)?;
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            session.tick(TICK_MS);

            if let Err(e) = game.tick(TICK_MS) {
                // The controller has already started a fresh round.
                warn!(error = %e, "engine fault, round restarted");
                session.cursor.resize(game.board().size());
                session.hint = None;
                session.show("Board reset".to_string());
            }
        }

        drain_events(&mut game, &mut session);
    }
}

fn apply_action(
    game: &mut SwapController<EventLog>,
    session: &mut Session,
    action: GameAction,
) -> Result<()> {
    match action {
        GameAction::MoveUp
        | GameAction::MoveDown
        | GameAction::MoveLeft
        | GameAction::MoveRight => {
            session.cursor.apply(action);
        }
        GameAction::Click => {
            let outcome = game.click(session.cursor.coord())?;
            if !matches!(outcome, ClickOutcome::Ignored | ClickOutcome::Selected) {
                session.hint = None;
            }
            debug!(?outcome, "click");
        }
        GameAction::Hint => {
            session.hint = game.hint();
            if let Some((a, _)) = session.hint {
                session.cursor.set(a);
            }
        }
        GameAction::Restart => {
            game.force_reset()?;
            session.cursor.resize(game.board().size());
            session.hint = None;
        }
    }
    Ok(())
}

/// Move engine notifications into the side panel
fn drain_events(game: &mut SwapController<EventLog>, session: &mut Session) {
    let log = game.observer_mut();
    for effect in log.take_effects() {
        debug!(effect = effect.as_str(), "effect");
    }
    if let Some(message) = log.take_messages().pop() {
        session.show(message);
    }
    log.clear();
}
