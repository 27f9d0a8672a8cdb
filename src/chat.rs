//! Styled chat lines and the fixed player-facing strings.
//!
//! The host renders a [`ChatLine`] with its own text component system; the core only
//! decides the words, the color and the bold/italic flags.

/// Prefix for a satisfied restriction or completed objective.
pub const CHECKED: &str = "☑";
/// Prefix for an unmet restriction or pending objective.
pub const UNCHECKED: &str = "☐";

pub const GREETING: &str = "Welcome to Weekly World!";
pub const RESTRICTIONS_HEADER: &str = "Restrictions:";
pub const WARN_COMMANDS_ENABLED: &str = "Objectives cannot be completed while commands are enabled.";
pub const WARN_RESTRICTIONS_NOT_MET: &str =
    "Some restrictions are not met. Objectives cannot be completed until they are.";
pub const WEEK_COMPLETED: &str = "Congratulations! You have completed all objectives!";
pub const COMPLETION_RECORDED: &str = "Completion recorded successfully!";
pub const REGISTRATION_PROMPT: &str = "Please make an account at https://weeklyworld.net";
pub const SERVER_ERROR: &str = "A server error has occurred.";
pub const NO_LONGER_OPERATOR: &str = "You are no longer an operator. Objectives can now be completed.";
pub const STATUS_PENDING: &str = "(Completion status will be updated shortly…)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    White,
    Gold,
    Green,
    Red,
    Yellow,
    Gray,
}

/// One line of chat text sent to a player (or used as a disconnect reason).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub text: String,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

impl ChatLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::White,
            bold: false,
            italic: false,
        }
    }

    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            color,
            ..Self::plain(text)
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// `☑ label` or `☐ label`.
    pub fn checklist(done: bool, label: &str) -> Self {
        Self::plain(format!("{} {}", if done { CHECKED } else { UNCHECKED }, label))
    }

    /// `Objective:` for a single objective, `Objectives:` otherwise.
    pub fn objectives_header(count: usize) -> Self {
        Self::plain(format!("Objective{}:", if count == 1 { "" } else { "s" })).bold()
    }

    pub fn greeting() -> Self {
        Self::colored(GREETING, Color::Gold).bold()
    }

    pub fn commands_enabled_warning() -> Self {
        Self::colored(WARN_COMMANDS_ENABLED, Color::Red)
    }

    pub fn restrictions_warning() -> Self {
        Self::colored(WARN_RESTRICTIONS_NOT_MET, Color::Red)
    }
}
