use colored::{Color, Colorize};

use crate::cli::output::current_preferences;
use crate::ledger::ProgressBand;

const MIN_BAR: usize = 10;
const MAX_BAR: usize = 40;

#[derive(Clone, Debug)]
pub struct UiStyle {
    pub use_color: bool,
    pub horizontal: char,
    pub bar_width: usize,
}

impl UiStyle {
    pub fn detect() -> Self {
        let prefs = current_preferences();
        let columns = crossterm::terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(80);
        Self {
            use_color: prefs.color_enabled,
            horizontal: '-',
            bar_width: (columns / 3).clamp(MIN_BAR, MAX_BAR),
        }
    }

    pub fn plain(bar_width: usize) -> Self {
        Self {
            use_color: false,
            horizontal: '-',
            bar_width,
        }
    }

    pub fn horizontal_line(&self, width: usize) -> String {
        self.horizontal.to_string().repeat(width)
    }

    pub fn header(&self, text: &str) -> String {
        if self.use_color {
            text.color(Color::BrightBlue).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn band_color(band: ProgressBand) -> Color {
        match band {
            ProgressBand::Normal => Color::Green,
            ProgressBand::Warning => Color::Yellow,
            ProgressBand::Critical => Color::Red,
        }
    }

    /// `[#####-----]`, filled proportionally to `percent` and tinted by band.
    pub fn progress_bar(&self, percent: f64, band: ProgressBand) -> String {
        let ratio = (percent / 100.0).clamp(0.0, 1.0);
        let filled = ((self.bar_width as f64) * ratio).round() as usize;
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            "-".repeat(self.bar_width - filled)
        );
        let bar = if self.use_color {
            bar.color(Self::band_color(band)).to_string()
        } else {
            bar
        };
        format!("[{bar}]")
    }
}
