use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ANSI reverse-video attribute
pub const REVERSE: &str = "\x1b[7m";

/// A named terminal color, as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TermColor {
    Black,
    Red,
    Green,
    Brown,
    Blue,
    Purple,
    Cyan,
    LightGrey,
    DarkGrey,
    LightRed,
    LightGreen,
    Yellow,
    LightBlue,
    LightPurple,
    LightCyan,
    White,
    Bold,
    Default,
}

const ALL: [TermColor; 18] = [
    TermColor::Black,
    TermColor::Red,
    TermColor::Green,
    TermColor::Brown,
    TermColor::Blue,
    TermColor::Purple,
    TermColor::Cyan,
    TermColor::LightGrey,
    TermColor::DarkGrey,
    TermColor::LightRed,
    TermColor::LightGreen,
    TermColor::Yellow,
    TermColor::LightBlue,
    TermColor::LightPurple,
    TermColor::LightCyan,
    TermColor::White,
    TermColor::Bold,
    TermColor::Default,
];

impl TermColor {
    /// The escape sequence that switches the terminal to this color
    pub fn ansi(self) -> &'static str {
        match self {
            TermColor::Black => "\x1b[0;30m",
            TermColor::Red => "\x1b[0;31m",
            TermColor::Green => "\x1b[0;32m",
            TermColor::Brown => "\x1b[0;33m",
            TermColor::Blue => "\x1b[0;34m",
            TermColor::Purple => "\x1b[0;35m",
            TermColor::Cyan => "\x1b[0;36m",
            TermColor::LightGrey => "\x1b[0;37m",
            TermColor::DarkGrey => "\x1b[1;30m",
            TermColor::LightRed => "\x1b[1;31m",
            TermColor::LightGreen => "\x1b[1;32m",
            TermColor::Yellow => "\x1b[1;33m",
            TermColor::LightBlue => "\x1b[1;34m",
            TermColor::LightPurple => "\x1b[1;35m",
            TermColor::LightCyan => "\x1b[1;36m",
            TermColor::White => "\x1b[1;37m",
            TermColor::Bold => "\x1b[1m",
            TermColor::Default => "\x1b[0m",
        }
    }

    /// The config-file name, e.g. `light blue`
    pub fn name(self) -> &'static str {
        match self {
            TermColor::Black => "black",
            TermColor::Red => "red",
            TermColor::Green => "green",
            TermColor::Brown => "brown",
            TermColor::Blue => "blue",
            TermColor::Purple => "purple",
            TermColor::Cyan => "cyan",
            TermColor::LightGrey => "light grey",
            TermColor::DarkGrey => "dark grey",
            TermColor::LightRed => "light red",
            TermColor::LightGreen => "light green",
            TermColor::Yellow => "yellow",
            TermColor::LightBlue => "light blue",
            TermColor::LightPurple => "light purple",
            TermColor::LightCyan => "light cyan",
            TermColor::White => "white",
            TermColor::Bold => "bold",
            TermColor::Default => "default",
        }
    }
}

impl fmt::Display for TermColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TermColor {
    type Err = String;

    /// Names are case-insensitive; `_` and `-` may stand in for the space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        ALL.iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| format!("unknown color \"{}\"", s))
    }
}

impl TryFrom<String> for TermColor {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TermColor> for String {
    fn from(c: TermColor) -> String {
        c.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("yellow".parse::<TermColor>(), Ok(TermColor::Yellow));
        assert_eq!("light blue".parse::<TermColor>(), Ok(TermColor::LightBlue));
        assert_eq!("LIGHT_BLUE".parse::<TermColor>(), Ok(TermColor::LightBlue));
        assert_eq!("dark-grey".parse::<TermColor>(), Ok(TermColor::DarkGrey));
        assert!("mauve".parse::<TermColor>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for c in ALL {
            assert_eq!(c.name().parse::<TermColor>(), Ok(c));
        }
    }

    #[test]
    fn test_ansi_codes() {
        assert_eq!(TermColor::Yellow.ansi(), "\x1b[1;33m");
        assert_eq!(TermColor::Default.ansi(), "\x1b[0m");
    }
}
