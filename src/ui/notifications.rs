use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::store::Notification;

fn notification_line(n: &Notification) -> String {
    let marker = if n.read { " " } else { "●" };
    let when = n
        .created_at
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!("{} [{:>6}] {} {}", marker, n.kind.label(), n.message, when)
}

pub fn render_notifications_view(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<ListItem> = app
        .notifications
        .entries()
        .iter()
        .map(|n| {
            let line = ListItem::new(notification_line(n));
            if n.read {
                line.style(Style::default().fg(Color::DarkGray))
            } else {
                line
            }
        })
        .collect();

    let title = format!(
        "Notifications ({} unread) [j/k: move | Enter/r: read | R: read all]",
        app.notifications.unread_count()
    );
    let widget = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    let count = app.notifications.entries().len();
    if count > 0 {
        state.select(Some(app.selected_notification.min(count - 1)));
    }
    f.render_stateful_widget(widget, area, &mut state);
}
