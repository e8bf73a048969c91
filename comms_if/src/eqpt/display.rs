//! # Text display interface
//!
//! The control core never drives display hardware. It produces two fixed width line buffers which
//! the display collaborator copies out whenever the refresh counter changes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of characters on each display line.
pub const DISPLAY_WIDTH: usize = 16;

/// Number of lines on the display.
pub const DISPLAY_ROWS: usize = 2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Contents of the two line display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLines {
    /// The lines, always exactly [`DISPLAY_WIDTH`] characters.
    lines: [String; DISPLAY_ROWS],

    /// Incremented on every refresh, even if the text did not change.
    pub refresh_count: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DisplayLines {
    pub fn new() -> Self {
        Self {
            lines: [fit(""), fit("")],
            refresh_count: 0,
        }
    }

    /// Replace both lines and count a refresh.
    pub fn show(&mut self, top: &str, bottom: &str) {
        self.lines = [fit(top), fit(bottom)];
        self.refresh_count += 1;
    }

    /// Get one line of the display, rows past the bottom give an empty string.
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|s| s.as_str()).unwrap_or("")
    }
}

impl Default for DisplayLines {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Pad or truncate text to exactly one display line.
pub fn fit(text: &str) -> String {
    let mut line: String = text.chars().take(DISPLAY_WIDTH).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(DISPLAY_WIDTH - len));
    line
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit(""), "                ");
        assert_eq!(fit("Next       Play!"), "Next       Play!");
        assert_eq!(fit("Test Motor  -step"), "Test Motor  -ste");
        assert_eq!(fit("S=12").len(), DISPLAY_WIDTH);
    }

    #[test]
    fn test_show() {
        let mut d = DisplayLines::new();
        assert_eq!(d.refresh_count, 0);

        d.show(" Rocket Lander! ", "Next");
        assert_eq!(d.line(0), " Rocket Lander! ");
        assert_eq!(d.line(1), "Next            ");
        assert_eq!(d.line(2), "");
        assert_eq!(d.refresh_count, 1);
    }
}
