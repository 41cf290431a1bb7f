use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame, Terminal,
};
use std::{io, time::Duration};

use curio::app::{App, ViewMode};
use curio::handlers::{handle_key_event, KeyAction};
use curio::ui::{
    render_browse_view, render_detail_view, render_notifications_view, render_prompt,
    render_status_bar, render_wishlist_view,
};

#[tokio::main]
async fn main() -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
            eprintln!("Failed to initialize app: {}", e);
            return Err(e);
        }
    };

    let res = run_app(&mut terminal, &mut app).await;

    app.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        app.drain_notifications();

        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match handle_key_event(app, key).await {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Continue => {}
                }
            }
        }
    }
}

fn render_ui(f: &mut Frame, app: &App) {
    let mut constraints = vec![Constraint::Length(3)];
    if app.show_debug {
        constraints.push(Constraint::Percentage(60));
        constraints.push(Constraint::Percentage(25));
    } else {
        constraints.push(Constraint::Min(10));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());

    let header_text = format!(
        "Curio - {}",
        match app.view_mode {
            ViewMode::Browse => "Browse",
            ViewMode::Detail => "Detail",
            ViewMode::Wishlist => "Wishlist",
            ViewMode::Notifications => "Notifications",
        }
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(header, chunks[0]);

    let content_area = chunks[1];
    match app.view_mode {
        ViewMode::Browse => render_browse_view(f, app, content_area),
        ViewMode::Detail => render_detail_view(f, app, content_area),
        ViewMode::Wishlist => render_wishlist_view(f, app, content_area),
        ViewMode::Notifications => render_notifications_view(f, app, content_area),
    }

    if app.show_debug {
        let log: Vec<ratatui::text::Line> = app
            .debug_log
            .iter()
            .map(|line| ratatui::text::Line::raw(line.as_str()))
            .collect();
        let debug_panel = Paragraph::new(log)
            .block(Block::default().borders(Borders::ALL).title("Debug Log"));
        f.render_widget(debug_panel, chunks[2]);
    }

    render_status_bar(f, app, chunks[chunks.len() - 1]);

    render_prompt(f, app, f.area());
}
