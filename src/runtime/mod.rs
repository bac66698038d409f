use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::library::scan;
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod service;
mod settings;

use service::ServiceHost;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();
    let log_file = logging::init(&settings);
    if let Some(msg) = settings_warning {
        warn!("{msg}");
        if log_file.is_none() {
            eprintln!("andante: {msg}");
        }
    }

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.music_dir());
    info!(dir = %dir.display(), "starting");

    let tracks = scan(&dir, &settings.library);
    let mut app = App::new(tracks);
    app.set_current_dir(dir.display().to_string());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    let mut host = ServiceHost::new(settings.playback.play_mode.into(), mpris);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut host, &control_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    host.shutdown();
    info!("bye");
    run_result
}
