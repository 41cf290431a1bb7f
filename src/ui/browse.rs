use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::format::format_price;
use crate::service::ListingItem;

fn listing_line(item: &ListingItem, show_category: bool) -> String {
    let wish_marker = if item.wished { "♥" } else { " " };
    let category = if show_category {
        item.category
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default()
    } else {
        String::new()
    };
    format!(
        "{} {:<32} {:>14} [{}] ♥{}{}",
        wish_marker,
        truncate(&item.title, 32),
        format_price(item.display_price()),
        item.auction_status,
        item.wish_count,
        category,
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(max.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}

pub fn render_browse_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
        .split(area);

    // Main listing table for the current page
    let (start, end) = app.pagination.page_bounds();
    let rows: Vec<ListItem> = app.listings[start..end.min(app.listings.len())]
        .iter()
        .map(|item| ListItem::new(listing_line(item, app.config.ui.show_categories)))
        .collect();

    let pager: Vec<String> = app
        .pagination
        .page_window()
        .into_iter()
        .map(|page| {
            if page == app.pagination.current_page() {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    let title = format!(
        "Listings {} [j/k: move | h/l: page | Enter: open | w: wish | r: reload]",
        pager.join(" "),
    );
    let listing_widget = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !app.listings.is_empty() {
        list_state.select(Some(app.selected_listing.saturating_sub(start)));
    }
    f.render_stateful_widget(listing_widget, chunks[0], &mut list_state);

    // Featured rows are separate copies of listing items; wish toggles
    // patch this list in place as well.
    let featured: Vec<ListItem> = app
        .featured
        .iter()
        .map(|item| {
            let marker = if item.wished { "♥" } else { " " };
            ListItem::new(format!(
                "{} {} ♥{}",
                marker,
                truncate(&item.title, 20),
                item.wish_count
            ))
        })
        .collect();

    let featured_widget = List::new(featured).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Most wished")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(featured_widget, chunks[1]);
}
