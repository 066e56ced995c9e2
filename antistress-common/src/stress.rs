//! Stress level classes

use crate::messages::Locale;

/// Classifier output class
///
/// Class indices are fixed by the trained model: 0 low, 1 medium, 2 high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub const ALL: [StressLevel; 3] = [StressLevel::Low, StressLevel::Medium, StressLevel::High];

    /// Map a raw class index; `None` outside `0..=2`
    pub fn from_class_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(StressLevel::Low),
            1 => Some(StressLevel::Medium),
            2 => Some(StressLevel::High),
            _ => None,
        }
    }

    pub fn class_index(self) -> usize {
        match self {
            StressLevel::Low => 0,
            StressLevel::Medium => 1,
            StressLevel::High => 2,
        }
    }

    /// User-facing label; these strings are stored and returned verbatim
    pub fn label(self, locale: Locale) -> &'static str {
        locale.stress_labels()[self.class_index()]
    }
}
