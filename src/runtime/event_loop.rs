use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::app::{App, Screen};
use crate::config;
use crate::controller::{AttachOutcome, PlayerController};
use crate::error::PlayerError;
use crate::library::Track;
use crate::mpris::ControlCmd;
use crate::ui;

use super::service::ServiceHost;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Main terminal event loop: handles input, UI drawing, progress polling and
/// MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    host: &mut ServiceHost,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = PlayerController::from_settings(settings);
    let notice_ttl = Duration::from_millis(settings.ui.notice_ms);

    loop {
        let now = Instant::now();
        host.sync_mpris();

        if app.screen == Screen::Player {
            controller.drain_status(now);
            controller.tick(now);
            if !host.is_running() {
                // The engine hit a fatal media error and the service exited.
                controller.detach();
                app.back_to_list();
                app.show_notice("playback stopped", now, notice_ttl);
            }
        }

        terminal.draw(|f| ui::draw(f, app, &controller, now))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if cmd == ControlCmd::Quit {
                return Ok(());
            }
            if host.handle_remote(&cmd).is_ok() && controller.is_attached() {
                controller.drain_status(Instant::now());
            }
        }

        // Wake up in time for a pending progress read.
        let wait = controller
            .poll()
            .remaining(Instant::now())
            .map_or(INPUT_POLL, |left| left.min(INPUT_POLL));
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let quit = match app.screen {
                    Screen::List => handle_list_key(key, app, host, &mut controller, notice_ttl),
                    Screen::Player => handle_player_key(key, app, &mut controller, notice_ttl),
                };
                if quit {
                    break;
                }
            }
        }
    }

    controller.detach();
    Ok(())
}

fn handle_list_key(
    key: KeyEvent,
    app: &mut App,
    host: &mut ServiceHost,
    controller: &mut PlayerController,
    notice_ttl: Duration,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('g') | KeyCode::Home => app.first(),
        KeyCode::Char('G') | KeyCode::End => app.last(),
        KeyCode::Enter => {
            if let Some(track) = app.selected_track().cloned() {
                open_player(app, host, controller, Some(track), notice_ttl);
            }
        }
        KeyCode::Char('p') => {
            // Back to whatever is loaded, without requesting a new track.
            if host.is_running() {
                open_player(app, host, controller, None, notice_ttl);
            }
        }
        _ => {}
    }
    false
}

fn open_player(
    app: &mut App,
    host: &mut ServiceHost,
    controller: &mut PlayerController,
    request: Option<Track>,
    notice_ttl: Duration,
) {
    let now = Instant::now();
    match controller.attach(host.bind(), request, now) {
        AttachOutcome::Started | AttachOutcome::Resynced => app.open_player(),
        AttachOutcome::Failed(notice) => {
            app.back_to_list();
            app.show_notice(notice, now, notice_ttl);
        }
    }
}

fn handle_player_key(
    key: KeyEvent,
    app: &mut App,
    controller: &mut PlayerController,
    notice_ttl: Duration,
) -> bool {
    let result = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc | KeyCode::Char('b') => {
            controller.detach();
            app.back_to_list();
            Ok(())
        }
        KeyCode::Char(' ') => controller.toggle_play_pause(),
        KeyCode::Char('h') | KeyCode::Left => controller.step(-1),
        KeyCode::Char('l') | KeyCode::Right => controller.step(1),
        KeyCode::Char('r') => controller.toggle_looping(),
        KeyCode::Char(c @ '0'..='9') => {
            let progress = jump_target(c, controller.progress_max());
            controller.seek_to_progress(progress, Instant::now())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        leave_player(app, controller, &e, notice_ttl);
    }
    false
}

/// Digit `n` jumps to `n` tenths of the track.
fn jump_target(digit: char, progress_max: u32) -> u32 {
    let tenths = digit.to_digit(10).unwrap_or(0);
    progress_max * tenths / 10
}

fn leave_player(
    app: &mut App,
    controller: &mut PlayerController,
    error: &PlayerError,
    notice_ttl: Duration,
) {
    warn!(error = %error, "player command failed");
    controller.detach();
    app.back_to_list();
    app.show_notice(error.to_string(), Instant::now(), notice_ttl);
}
