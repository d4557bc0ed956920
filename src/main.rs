use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tui_sky::app::App;
use tui_sky::sky::projection::center_to_view;
use tui_sky::{data, sky, ui};

/// Interactive celestial footprint viewer
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Footprint catalog: a GeoJSON file or a directory of them
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Initial view center, right ascension in degrees
    #[arg(long)]
    ra: Option<f64>,

    /// Initial view center, declination in degrees
    #[arg(long)]
    dec: Option<f64>,

    /// Initial zoom scale
    #[arg(long)]
    zoom: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &cli);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Load the footprint catalog from the CLI argument, the default data
/// directory, or fall back to the built-in demo sky.
fn load_footprints(cli: &Cli) -> Vec<sky::Footprint> {
    let loaded = match &cli.catalog {
        Some(path) if path.is_dir() => data::load_catalog_dir(path),
        Some(path) => data::load_catalog(path),
        None => {
            let default_dir = Path::new("data");
            if default_dir.is_dir() {
                data::load_catalog_dir(default_dir)
            } else {
                Ok(Vec::new())
            }
        }
    };

    match loaded {
        Ok(footprints) if !footprints.is_empty() => footprints,
        Ok(_) => data::generate_demo_sky(),
        Err(e) => {
            eprintln!("Warning: failed to load catalog: {e}");
            data::generate_demo_sky()
        }
    }
}

/// Handle mouse events for panning, zooming, hover and selection
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel for zooming
        MouseEventKind::ScrollUp => app.wheel_zoom_in(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.wheel_zoom_out(mouse.column, mouse.row),
        // Click and drag to pan; a short press is a selection click
        MouseEventKind::Down(MouseButton::Left) => app.pointer_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(mouse.column, mouse.row),
        // Plain motion drives hover
        MouseEventKind::Moved => app.pointer_hover(mouse.column, mouse.row),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.clear_selection(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.nudge(12.0, 0.0),
        KeyCode::Right | KeyCode::Char('l') => app.nudge(-12.0, 0.0),
        KeyCode::Up | KeyCode::Char('k') => app.nudge(0.0, 12.0),
        KeyCode::Down | KeyCode::Char('j') => app.nudge(0.0, -12.0),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Selection
        KeyCode::Tab => app.select_step(1),
        KeyCode::BackTab => app.select_step(-1),
        KeyCode::Char('g') => app.go_to_selected(),

        // Toggles and reset
        KeyCode::Char('G') => app.renderer.show_grid = !app.renderer.show_grid,
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, cli: &Cli) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);
    app.set_footprints(load_footprints(cli));

    if cli.ra.is_some() || cli.dec.is_some() || cli.zoom.is_some() {
        let (yaw, pitch) = center_to_view(cli.ra.unwrap_or(90.0), cli.dec.unwrap_or(0.0));
        let scale = cli.zoom.unwrap_or(app.store.get().scale);
        app.store.set(yaw, pitch, scale);
    }

    // ~60fps target
    const FRAME: Duration = Duration::from_millis(16);
    let mut last_frame = Instant::now();

    // Within each frame: input first, then the simulation tick, then the
    // draw, so the render pass never sees a half-updated view.
    loop {
        if event::poll(FRAME)? {
            loop {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        handle_key(&mut app, key.code);
                    }
                    Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                    Event::Resize(width, height) => {
                        app.resize(width as usize, height as usize);
                    }
                    _ => {}
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        // Inertia step, scaled to nominal display frames; clamp the step
        // so a stall doesn't fling the view.
        let now = Instant::now();
        let frame_dt = now.duration_since(last_frame).as_secs_f64() / FRAME.as_secs_f64();
        last_frame = now;
        app.tick(frame_dt.min(4.0));

        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
