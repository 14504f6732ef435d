use serde::{Deserialize, Serialize};

/// Colour band of the spending progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressBand {
    Normal,
    Warning,
    Critical,
}

impl ProgressBand {
    pub fn label(self) -> &'static str {
        match self {
            ProgressBand::Normal => "normal",
            ProgressBand::Warning => "warning",
            ProgressBand::Critical => "critical",
        }
    }
}

/// Percent-of-budget limits above which the band escalates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            warning: 70.0,
            critical: 90.0,
        }
    }
}

impl BandThresholds {
    pub fn classify(&self, percent: f64) -> ProgressBand {
        if percent > self.critical {
            ProgressBand::Critical
        } else if percent > self.warning {
            ProgressBand::Warning
        } else {
            ProgressBand::Normal
        }
    }
}
