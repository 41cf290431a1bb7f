use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::state::Prompt;
use crate::app::App;

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_prompt(f: &mut Frame, app: &App, area: Rect) {
    let Some(prompt) = &app.prompt else {
        return;
    };

    match prompt {
        Prompt::Bid { input } => {
            let rect = centered_rect(44, 3, area);
            f.render_widget(Clear, rect);
            let widget = Paragraph::new(format!("{input}_")).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Bid amount [Enter: submit | Esc: cancel]")
                    .border_style(Style::default().fg(Color::Yellow)),
            );
            f.render_widget(widget, rect);
        }
        Prompt::Login {
            email,
            password,
            password_focused,
        } => {
            let rect = centered_rect(48, 4, area);
            f.render_widget(Clear, rect);
            let masked: String = "*".repeat(password.chars().count());
            let (email_cursor, password_cursor) = if *password_focused {
                ("", "_")
            } else {
                ("_", "")
            };
            let lines = vec![
                Line::raw(format!("Email:    {email}{email_cursor}")),
                Line::raw(format!("Password: {masked}{password_cursor}")),
            ];
            let widget = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Sign in [Tab: switch | Enter: next | Esc: cancel]")
                    .border_style(Style::default().fg(Color::Cyan)),
            );
            f.render_widget(widget, rect);
        }
    }
}
