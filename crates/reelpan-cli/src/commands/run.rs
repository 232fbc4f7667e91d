use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableFocusChange, DisableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, layout::{Constraint, Direction, Layout}, Terminal};
use tracing::info;

use reelpan_core::AppConfig;
use reelpan_tui::{
    app::split_screen,
    event::{AppEvent, EventHandler},
    widgets::{GalleryWidget, HelpWidget, InfoWidget, StatusBarWidget},
    App,
};

pub async fn run(config: AppConfig) -> Result<()> {
    let event_handler = EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        SetTitle("Reelpan")
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, &event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: AppConfig,
    event_handler: &EventHandler,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::with_size(config, size.width, size.height)?;
    app.start().await;

    // Checked at the end of each iteration to pick the next poll interval
    let mut needs_fast_update = app.needs_fast_update();

    loop {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(area);
            let (gallery_area, info_area) = split_screen(area);

            GalleryWidget::render(frame, gallery_area, &app);
            if let Some(info_area) = info_area {
                InfoWidget::render(frame, info_area, &app);
            }
            StatusBarWidget::render(frame, rows[1], &app);

            if app.show_help {
                HelpWidget::render(frame, &app);
            }
        })?;

        // Poll at the frame interval while anything is moving
        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => app.handle_key(key),
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
                AppEvent::Resize(w, h) => app.resize(w, h),
                AppEvent::FocusLost => app.focus_lost(),
                AppEvent::Tick => {}
            }
        }

        needs_fast_update = app.needs_fast_update();

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    info!("Gallery closed");
    Ok(())
}
