//! Terminal host for the demo: raw mode, alternate screen and the UI loop

mod events;

pub use events::{Event, EventHandler};

use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use hookdialog::{DialogHandle, DialogRejection, DialogService};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use serde_json::Value;
use std::io;
use std::time::Duration;
use tracing::info;

pub type Backend = CrosstermBackend<io::Stdout>;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const HINT: &str = "Tab/Shift+Tab: move  Enter/Space: press  Esc: cancel  Ctrl+C: quit";

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Show the service's dialogs until `handle` settles
pub async fn run_dialog(
    service: &DialogService,
    handle: DialogHandle,
) -> Result<Result<Value, DialogRejection>> {
    let mut terminal = init_terminal()?;
    let mut events = EventHandler::new(TICK_INTERVAL);

    let result = run_loop(&mut terminal, service, handle, &mut events).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<Backend>,
    service: &DialogService,
    mut handle: DialogHandle,
    events: &mut EventHandler,
) -> Result<Result<Value, DialogRejection>> {
    loop {
        terminal.draw(|frame| draw(frame, service))?;

        tokio::select! {
            outcome = &mut handle => return Ok(outcome),
            event = events.next() => match event {
                Some(Event::Terminal(event)) if is_interrupt(&event) => {
                    let cancelled = service.cancel_all(true);
                    info!("Interrupted, cancelled {} open dialogs", cancelled);
                }
                Some(Event::Terminal(event)) => {
                    service.handle_event(&event);
                }
                Some(Event::Tick) => {}
                None => {
                    info!("Terminal input closed, cancelling dialog {}", handle.id());
                    service.force_cancel(handle.id(), true);
                }
            },
        }
    }
}

fn draw(frame: &mut Frame, service: &DialogService) {
    let area = frame.size();
    let hint = Paragraph::new(HINT)
        .style(Style::default().add_modifier(Modifier::DIM))
        .alignment(Alignment::Center);
    frame.render_widget(hint, area);
    service.render(frame, area);
}

fn is_interrupt(event: &CrosstermEvent) -> bool {
    matches!(
        event,
        CrosstermEvent::Key(key)
            if key.kind == KeyEventKind::Press
                && key.code == KeyCode::Char('c')
                && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}
