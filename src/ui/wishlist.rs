use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::format::format_price;

pub fn render_wishlist_view(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<ListItem> = app
        .wish
        .entries()
        .iter()
        .map(|entry| {
            ListItem::new(format!(
                "♥ {:<32} {:>14} ♥{}",
                entry.title,
                format_price(entry.price),
                entry.wish_count,
            ))
        })
        .collect();

    let title = format!(
        "Wishlist ({}) [j/k: move | w: un-wish | r: reload]",
        app.wish.count()
    );
    let widget = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if app.wish.count() > 0 {
        state.select(Some(app.selected_wish.min(app.wish.count() - 1)));
    }
    f.render_stateful_widget(widget, area, &mut state);
}
