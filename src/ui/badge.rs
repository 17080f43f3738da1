//! Unread-notification badge

/// Badge visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeDisplay {
    #[default]
    Hidden,
    Flex,
}

/// Unread count shown on the notification bell.
///
/// The displayed text is the source of truth, like the widget it models:
/// `increment` re-reads it and treats anything unparseable as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeCounter {
    text: String,
    display: BadgeDisplay,
}

impl BadgeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, by: i64) {
        let count = self.text.trim().parse::<i64>().unwrap_or(0) + by;
        self.text = count.to_string();
        self.display = if count > 0 {
            BadgeDisplay::Flex
        } else {
            BadgeDisplay::Hidden
        };
    }

    pub fn count(&self) -> i64 {
        self.text.trim().parse().unwrap_or(0)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn display(&self) -> BadgeDisplay {
        self.display
    }

    pub fn is_visible(&self) -> bool {
        self.display == BadgeDisplay::Flex
    }
}
