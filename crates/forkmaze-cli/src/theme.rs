use crossterm::style::Color;

/// Colors for the board printout
#[derive(Debug, Clone)]
pub struct Theme {
    /// Grid border color
    pub border: Color,
    pub wall: Color,
    pub path: Color,
    /// Unmarked cell dot
    pub empty: Color,
    /// Revealed dead ends
    pub dead_end: Color,
    pub vault: Color,
    /// Cells decided in a lower layer
    pub locked: Color,
    /// Background behind hinted cells
    pub highlight_bg: Color,
    /// Clue still short of its target
    pub clue: Color,
    /// Clue exactly met
    pub clue_done: Color,
    /// Clue exceeded
    pub error: Color,
    pub success: Color,
    /// Status line text
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            wall: Color::Rgb { r: 130, g: 140, b: 170 },
            path: Color::Rgb { r: 80, g: 180, b: 255 },
            empty: Color::Rgb { r: 70, g: 75, b: 90 },
            dead_end: Color::Rgb { r: 255, g: 255, b: 255 },
            vault: Color::Rgb { r: 255, g: 210, b: 100 },
            locked: Color::Rgb { r: 140, g: 150, b: 180 },
            highlight_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            clue: Color::Rgb { r: 230, g: 230, b: 240 },
            clue_done: Color::Rgb { r: 90, g: 255, b: 130 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
        }
    }

    pub fn light() -> Self {
        Self {
            border: Color::Rgb { r: 180, g: 180, b: 195 },
            wall: Color::Rgb { r: 60, g: 60, b: 80 },
            path: Color::Rgb { r: 30, g: 100, b: 200 },
            empty: Color::Rgb { r: 180, g: 180, b: 195 },
            dead_end: Color::Rgb { r: 0, g: 0, b: 0 },
            vault: Color::Rgb { r: 200, g: 120, b: 20 },
            locked: Color::Rgb { r: 130, g: 130, b: 150 },
            highlight_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            clue: Color::Rgb { r: 30, g: 30, b: 40 },
            clue_done: Color::Rgb { r: 40, g: 160, b: 60 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
        }
    }

    /// No colors at all, for pipes and dumb terminals.
    pub fn mono() -> Self {
        Self {
            border: Color::Reset,
            wall: Color::Reset,
            path: Color::Reset,
            empty: Color::Reset,
            dead_end: Color::Reset,
            vault: Color::Reset,
            locked: Color::Reset,
            highlight_bg: Color::Reset,
            clue: Color::Reset,
            clue_done: Color::Reset,
            error: Color::Reset,
            success: Color::Reset,
            info: Color::Reset,
        }
    }

    pub fn is_mono(&self) -> bool {
        self.highlight_bg == Color::Reset
    }
}
