use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Prompt, ViewMode};

pub enum KeyAction {
    Continue,
    Quit,
}

pub async fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    // Prompts capture all input first
    if app.prompt.is_some() {
        return handle_prompt_input(app, key).await;
    }

    // View switching and global commands
    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('1') => {
            app.view_mode = ViewMode::Browse;
            return KeyAction::Continue;
        }
        KeyCode::Char('2') => {
            app.view_mode = ViewMode::Wishlist;
            app.refresh_wishlist().await;
            return KeyAction::Continue;
        }
        KeyCode::Char('3') => {
            app.view_mode = ViewMode::Notifications;
            return KeyAction::Continue;
        }
        KeyCode::Char('L') => {
            app.prompt = Some(Prompt::login());
            return KeyAction::Continue;
        }
        KeyCode::Char('O') => {
            app.logout();
            return KeyAction::Continue;
        }
        KeyCode::Char('D') => {
            app.show_debug = !app.show_debug;
            return KeyAction::Continue;
        }
        _ => {}
    }

    match app.view_mode {
        ViewMode::Browse => handle_browse_keys(app, key).await,
        ViewMode::Detail => handle_detail_keys(app, key).await,
        ViewMode::Wishlist => handle_wishlist_keys(app, key).await,
        ViewMode::Notifications => handle_notification_keys(app, key).await,
    }

    KeyAction::Continue
}

async fn handle_browse_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let (_, end) = app.pagination.page_bounds();
            if app.selected_listing + 1 < end {
                app.selected_listing += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let (start, _) = app.pagination.page_bounds();
            if app.selected_listing > start {
                app.selected_listing -= 1;
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.pagination.prev();
            app.selected_listing = app.pagination.page_bounds().0;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.pagination.next();
            app.selected_listing = app.pagination.page_bounds().0;
        }
        KeyCode::Enter => app.open_selected_detail().await,
        KeyCode::Char('w') => app.toggle_wish_under_cursor().await,
        KeyCode::Char('r') => app.load_listings().await,
        _ => {}
    }
}

async fn handle_detail_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('h') => app.close_detail(),
        KeyCode::Char('w') => app.toggle_wish_under_cursor().await,
        KeyCode::Char('b') => {
            if app.current_detail.is_some() {
                app.prompt = Some(Prompt::bid());
            }
        }
        _ => {}
    }
}

async fn handle_wishlist_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.selected_wish + 1 < app.wish.count() {
                app.selected_wish += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.selected_wish = app.selected_wish.saturating_sub(1);
        }
        KeyCode::Char('w') => app.toggle_wish_under_cursor().await,
        KeyCode::Char('r') => app.refresh_wishlist().await,
        _ => {}
    }
}

async fn handle_notification_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.selected_notification + 1 < app.notifications.entries().len() {
                app.selected_notification += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.selected_notification = app.selected_notification.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('r') => app.mark_selected_notification_read().await,
        KeyCode::Char('R') => app.mark_all_notifications_read().await,
        _ => {}
    }
}

async fn handle_prompt_input(app: &mut App, key: KeyEvent) -> KeyAction {
    let Some(prompt) = app.prompt.clone() else {
        return KeyAction::Continue;
    };

    match prompt {
        Prompt::Bid { mut input } => match key.code {
            KeyCode::Enter => {
                app.submit_bid(&input).await;
            }
            KeyCode::Esc => {
                app.prompt = None;
            }
            KeyCode::Backspace => {
                input.pop();
                app.prompt = Some(Prompt::Bid { input });
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                input.push(c);
                app.prompt = Some(Prompt::Bid { input });
            }
            _ => {}
        },
        Prompt::Login {
            mut email,
            mut password,
            password_focused,
        } => match key.code {
            KeyCode::Enter => {
                if password_focused {
                    app.submit_login(&email, &password).await;
                } else {
                    app.prompt = Some(Prompt::Login {
                        email,
                        password,
                        password_focused: true,
                    });
                }
            }
            KeyCode::Tab => {
                app.prompt = Some(Prompt::Login {
                    email,
                    password,
                    password_focused: !password_focused,
                });
            }
            KeyCode::Esc => {
                app.prompt = None;
            }
            KeyCode::Backspace => {
                if password_focused {
                    password.pop();
                } else {
                    email.pop();
                }
                app.prompt = Some(Prompt::Login {
                    email,
                    password,
                    password_focused,
                });
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if password_focused {
                    password.push(c);
                } else {
                    email.push(c);
                }
                app.prompt = Some(Prompt::Login {
                    email,
                    password,
                    password_focused,
                });
            }
            _ => {}
        },
    }

    KeyAction::Continue
}
