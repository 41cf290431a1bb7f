use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::format::{format_price, format_time_remaining, seconds_remaining};
use crate::service::AuctionStatus;

pub fn render_detail_view(f: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.current_detail else {
        let empty = Paragraph::new("No listing open")
            .block(Block::default().borders(Borders::ALL).title("Detail"));
        f.render_widget(empty, area);
        return;
    };

    let countdown = match (detail.auction_end_at, detail.auction_status) {
        (_, AuctionStatus::Completed | AuctionStatus::Stopped) => "ended".to_string(),
        (Some(end_at), _) => format_time_remaining(seconds_remaining(end_at, Utc::now())),
        (None, _) => "-".to_string(),
    };

    let wish_marker = if detail.wished { "♥ wished" } else { "♡" };

    let mut lines = vec![
        Line::from(Span::styled(
            detail.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::raw("Price: "),
            Span::styled(
                format_price(detail.display_price()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!("  (start {})", format_price(detail.start_price))),
        ]),
        Line::raw(format!(
            "Status: {}   Time left: {}",
            detail.auction_status, countdown
        )),
        Line::raw(format!(
            "{}  ♥{}   Seller: {}",
            wish_marker,
            detail.wish_count,
            detail.seller_nickname.as_deref().unwrap_or("unknown"),
        )),
    ];

    if let Some(category) = &detail.category {
        lines.push(Line::raw(format!("Category: {category}")));
    }
    if let Some(description) = &detail.description {
        lines.push(Line::raw(""));
        lines.push(Line::raw(description.clone()));
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Detail [w: wish | b: bid | Esc: back]"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
