use std::fmt::Display;

use console::{style, StyledObject};

/// Role a piece of terminal text plays, mapped to one colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Section titles and labels that need no colour
    Heading,
    /// Work still running, or a limit that was hit
    Pending,
    Done,
    Failed,
    /// File names
    Path,
    Muted,
    Banner,
}

pub fn paint(tone: Tone, text: impl Display) -> StyledObject<String> {
    let styled = style(text.to_string());
    match tone {
        Tone::Heading => styled.bright(),
        Tone::Pending => styled.bright().yellow(),
        Tone::Done => styled.bright().green(),
        Tone::Failed => styled.bright().red(),
        Tone::Path => styled.cyan(),
        Tone::Muted => styled.dim(),
        Tone::Banner => styled.magenta().bold(),
    }
}
