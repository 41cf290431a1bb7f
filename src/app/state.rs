//! View-layer state owned by [`super::App`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Browse,
    Detail,
    Wishlist,
    Notifications,
}

/// Modal text prompts layered over the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Bid amount entry for the open detail record.
    Bid { input: String },
    /// Sign-in form.
    Login {
        email: String,
        password: String,
        password_focused: bool,
    },
}

impl Prompt {
    pub fn bid() -> Self {
        Prompt::Bid {
            input: String::new(),
        }
    }

    pub fn login() -> Self {
        Prompt::Login {
            email: String::new(),
            password: String::new(),
            password_focused: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}
