//! User actions read from the terminal

/// Interaction with the dashboard controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// New value of the risk filter control
    SetFilter(String),
    Refresh,
    Quit,
}

impl UserAction {
    /// Parse one input line: `filter <value>` (or `f`), `refresh` (or `r`), `quit` (or `q`, `exit`).
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_lowercase();
        match command.as_str() {
            "filter" | "f" => Some(UserAction::SetFilter(parts.next().unwrap_or("all").to_string())),
            "refresh" | "r" => Some(UserAction::Refresh),
            "quit" | "q" | "exit" => Some(UserAction::Quit),
            _ => None,
        }
    }
}
