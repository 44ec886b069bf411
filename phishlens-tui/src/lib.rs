use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use phishlens_client::Classifier;
use phishlens_core::clipboard::ClipboardChain;
use phishlens_core::config::Settings;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io;
use std::time::{Duration, Instant};

pub mod app;
pub mod widgets;

pub use app::{App, AppMessage};

/// Frame interval while the risk marker animates.
const TICK: Duration = Duration::from_millis(50);

/// Runs the interactive client until the user quits. Must be called from
/// within a tokio runtime; requests are spawned onto it.
pub fn run<C>(classifier: C, settings: &Settings) -> Result<()>
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        classifier,
        ClipboardChain::default(),
        settings.report_path.clone(),
    );

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B, C>(terminal: &mut Terminal<B>, app: &mut App<C>) -> Result<()>
where
    B: ratatui::backend::Backend,
    C: Classifier + Clone + Send + Sync + 'static,
{
    loop {
        app.process_messages();
        terminal.draw(|f| widgets::draw(f, app, Instant::now()))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break;
                    }
                    app.handle_key(key);
                }
                Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                    let size = terminal.size()?;
                    app.handle_click(
                        mouse.column,
                        mouse.row,
                        Rect::new(0, 0, size.width, size.height),
                    );
                }
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
