use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let account = match app.auth.user() {
        Some(user) => user.nickname.clone(),
        None => "not signed in".to_string(),
    };
    let unread = app.notifications.unread_count();

    let mut spans = vec![
        Span::styled(
            format!(" {account} "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("| ♥{} ", app.wish.count())),
        Span::raw(if unread > 0 {
            format!("| {unread} unread ")
        } else {
            String::new()
        }),
        Span::raw("| 1: browse 2: wishlist 3: notifications q: quit "),
    ];

    if let Some(message) = &app.status_message {
        let style = if message.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        spans.push(Span::styled(format!("| {}", message.text), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
