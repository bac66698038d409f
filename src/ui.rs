//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::controller::{PlayerController, PlayerView};

const LIST_CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("g/G", "top/bottom"),
    ("enter", "play selected song"),
    ("p", "now playing"),
    ("q", "quit"),
];

/// Render the controls help text for `screen`.
fn controls_text(screen: Screen, step: u32) -> String {
    match screen {
        Screen::List => LIST_CONTROLS
            .iter()
            .map(|(k, v)| format!("[{k}] {v}"))
            .collect::<Vec<_>>()
            .join(" | "),
        Screen::Player => [
            "[space] play/pause".to_string(),
            format!("[h/l] skip -/+{step}"),
            "[0-9] jump".to_string(),
            "[r] loop".to_string(),
            "[esc/b] back".to_string(),
            "[q] quit".to_string(),
        ]
        .join(" | "),
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Gauge fill for `progress` out of `max`, in `[0, 1]`.
fn progress_ratio(progress: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    (f64::from(progress) / f64::from(max)).clamp(0.0, 1.0)
}

fn gauge_label(view: &PlayerView) -> String {
    match view.duration {
        Some(total) => format!("{} / {}", format_mmss(view.position), format_mmss(total)),
        None => format_mmss(view.position),
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    controller: &PlayerController,
    now: Instant,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header_text = app.current_dir.as_deref().unwrap_or("");
    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" andante ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    match app.screen {
        Screen::List => draw_list(frame, app, chunks[1]),
        Screen::Player => draw_player(frame, controller, chunks[1]),
    }

    let mut footer_text = controls_text(app.screen, controller.step_size());
    if let Some(notice) = app.notice(now) {
        footer_text = format!("{notice}\n{footer_text}");
    }
    let footer = Paragraph::new(footer_text)
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    if !app.has_tracks() {
        let empty = Paragraph::new("No music found").block(padded(" tracks "));
        frame.render_widget(empty, area);
        return;
    }

    // Only build ListItems for the visible window, centered on the selection.
    let total = app.tracks.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = if total <= height || height == 0 {
        (0, total)
    } else {
        let half = height / 2;
        let start = app.selected.saturating_sub(half).min(total - height);
        (start, start + height)
    };

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .map(|t| ListItem::new(t.title()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.selected - start));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_player(frame: &mut Frame, controller: &PlayerController, area: Rect) {
    let view = controller.view();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let loop_text = if view.looping { "loop: on" } else { "loop: off" };
    let info = Paragraph::new(format!("{}\n{} • {}", view.title, view.status, loop_text))
        .bold()
        .block(padded(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, rows[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .ratio(progress_ratio(view.progress, controller.progress_max()))
        .label(gauge_label(view));
    frame.render_widget(gauge, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_millis(61_900)), "01:01");
        assert_eq!(format_mmss(Duration::from_secs(3600)), "60:00");
    }

    #[test]
    fn progress_ratio_is_clamped() {
        assert_eq!(progress_ratio(50, 100), 0.5);
        assert_eq!(progress_ratio(150, 100), 1.0);
        assert_eq!(progress_ratio(1, 0), 0.0);
    }

    #[test]
    fn player_controls_mention_step_size() {
        let text = controls_text(Screen::Player, 7);
        assert!(text.contains("skip -/+7"));
        assert!(text.contains("[0-9] jump"));
        assert!(!controls_text(Screen::List, 7).contains("skip"));
    }

    #[test]
    fn gauge_label_without_duration_shows_position_only() {
        let view = PlayerView {
            position: Duration::from_secs(5),
            ..PlayerView::default()
        };
        assert_eq!(gauge_label(&view), "00:05");

        let view = PlayerView {
            position: Duration::from_secs(5),
            duration: Some(Duration::from_secs(200)),
            ..PlayerView::default()
        };
        assert_eq!(gauge_label(&view), "00:05 / 03:20");
    }
}
