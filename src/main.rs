mod app;
mod braille;
mod render;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, KeyCode,
    KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vector_globe::controls::input::KeyDirection;
use vector_globe::GlobeConfig;

/// Filter directives for the log file; unset means no logging
const LOG_ENV: &str = "VECTOR_GLOBE_LOG";
const LOG_FILE: &str = "vector-globe.log";

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging() -> Result<()> {
    let Ok(directives) = std::env::var(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(LOG_FILE).with_context(|| format!("creating {LOG_FILE}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(directives).context("parsing VECTOR_GLOBE_LOG")?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture, EnableFocusChange)?;

    let result = run(&mut terminal);

    let _ = execute!(std::io::stdout(), DisableMouseCapture, DisableFocusChange);
    ratatui::restore();

    result
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);
    let (col, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll(col, row, 0.0, -1.0),
        MouseEventKind::ScrollDown => app.scroll(col, row, 0.0, 1.0),
        MouseEventKind::ScrollLeft => app.scroll(col, row, -1.0, 0.0),
        MouseEventKind::ScrollRight => app.scroll(col, row, 1.0, 0.0),
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(col, row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(col, row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(col, row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, GlobeConfig::default());
    app.load(Path::new("data"));

    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    KeyCode::Left | KeyCode::Char('h') => app.key(KeyDirection::Left),
                    KeyCode::Right | KeyCode::Char('l') => app.key(KeyDirection::Right),
                    KeyCode::Up | KeyCode::Char('k') => app.key(KeyDirection::Up),
                    KeyCode::Down | KeyCode::Char('j') => app.key(KeyDirection::Down),

                    KeyCode::Char('z') | KeyCode::Char('Z') => app.toggle_zoom(),
                    KeyCode::Char('f') | KeyCode::Char('F') => app.fly_to_next(),
                    KeyCode::Char('t') | KeyCode::Char('T') => app.toggle_tilt(),
                    KeyCode::Char('a') | KeyCode::Char('A') => app.toggle_auto_rotate(),
                    KeyCode::Char('g') | KeyCode::Char('G') => app.renderer.toggle_graticule(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),
                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                Event::FocusGained => app.set_focused(true),
                Event::FocusLost => app.set_focused(false),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
