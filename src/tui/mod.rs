//! Terminal client for `play`.

mod ui;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use ui::Overlay;
use word_trinity::{
    command_for, dispatch, share_message, BoardView, Command, GameStatus, PuzzleBackend,
    PuzzleSession, SessionError, Statistics, StatsSubject,
};

/// Results delivered by background tasks.
enum Update {
    Submitted(Result<GameStatus, SessionError>),
    Stats(StatsSubject, Result<Statistics, SessionError>),
}

/// Loads the puzzle and runs the interactive loop until Esc. F5 reloads.
#[instrument(skip_all)]
pub async fn run<B: PuzzleBackend + 'static>(session: PuzzleSession<B>) -> Result<()> {
    info!("Starting terminal client");
    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, session).await;
    ratatui::restore();

    if let Err(err) = &result {
        error!(error = ?err, "Terminal client failed");
    }
    result
}

async fn run_loop<B: PuzzleBackend + 'static>(
    terminal: &mut DefaultTerminal,
    session: PuzzleSession<B>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut overlay = Overlay::default();

    match session.load().await {
        Ok(status) if status.is_terminal() => {
            overlay.notice = share_message(status, turns_used(&session));
            fetch_stats(&session, &tx);
        }
        Ok(_) => {}
        Err(err) => overlay.notice = Some(err.to_string()),
    }

    loop {
        while let Ok(update) = rx.try_recv() {
            match update {
                Update::Submitted(Ok(status)) if status.is_terminal() => {
                    overlay.notice = share_message(status, turns_used(&session));
                    fetch_stats(&session, &tx);
                }
                Update::Submitted(Ok(_)) => overlay.notice = None,
                Update::Submitted(Err(err)) => show(&mut overlay, err),
                Update::Stats(subject, Ok(stats)) => overlay.stats.push((subject, stats)),
                Update::Stats(_, Err(err)) => show(&mut overlay, err),
            }
        }

        overlay.submitting = session.is_submitting();
        let board = session.with_engine(BoardView::from_engine);
        terminal.draw(|frame| ui::draw(frame, board.as_ref(), &overlay))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.code == KeyCode::Esc {
            info!("User quit");
            return Ok(());
        }
        if key.code == KeyCode::F(5) {
            overlay = Overlay::default();
            if let Err(err) = session.reload().await {
                show(&mut overlay, err);
            }
            continue;
        }
        let Some(command) = command_for(&key) else {
            continue;
        };
        debug!(?command, "Key mapped");

        match command {
            Command::Submit(_) => {
                let session = session.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = dispatch(&session, command).await;
                    let _ = tx.send(Update::Submitted(result));
                });
            }
            _ => {
                if let Err(err) = dispatch(&session, command).await {
                    show(&mut overlay, err);
                }
            }
        }
    }
}

fn turns_used<B: PuzzleBackend>(session: &PuzzleSession<B>) -> u32 {
    session.with_engine(|engine| engine.turns_used()).unwrap_or_default()
}

fn show(overlay: &mut Overlay, err: SessionError) {
    if err.is_user_facing() {
        overlay.notice = Some(err.to_string());
    } else {
        debug!(error = %err, "Suppressed error");
    }
}

fn fetch_stats<B: PuzzleBackend + 'static>(
    session: &PuzzleSession<B>,
    tx: &mpsc::UnboundedSender<Update>,
) {
    for subject in [StatsSubject::User, StatsSubject::Population] {
        let session = session.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = session.statistics(subject).await;
            if tx.send(Update::Stats(subject, result)).is_err() {
                warn!(%subject, "Statistics arrived after exit");
            }
        });
    }
}
