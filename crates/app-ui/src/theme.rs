//! Brand palette and gradients
//!
//! # Usage
//!
//! ```rust
//! use app_ui::theme::{brand, Gradients};
//!
//! let gradients = Gradients::default();
//! assert_eq!(gradients.background.colors(), vec![brand::PRIMARY, brand::SECONDARY]);
//! ```

use serde::{Deserialize, Serialize};

/// A color represented as a hex string (e.g., "#FFFFFF")
pub type Color = String;

// =============================================================================
// Brand Colors
// =============================================================================

/// Brand colors
pub mod brand {
    /// Deep teal, gradient start and unfocused tab tint
    pub const PRIMARY: &str = "#006073";

    /// Light teal, gradient end and form button fill
    pub const SECONDARY: &str = "#1fc2a6";

    /// Signal orange, focused tab tint
    pub const ACCENT: &str = "#EA4623";

    /// Icon orange used on the landing dashboard and logout button
    pub const ICON: &str = "#F3742F";

    /// Card and form background
    pub const SURFACE: &str = "#FFFFFF";

    /// Landing page background
    pub const BACKGROUND: &str = "#F9F9F9";

    /// Body text
    pub const TEXT: &str = "#333333";

    /// Input placeholder text
    pub const PLACEHOLDER: &str = "#B0B0B0";
}

// =============================================================================
// Gradients
// =============================================================================

/// A color stop in a gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position from 0.0 to 1.0
    pub position: f32,
    /// Color at this position
    pub color: Color,
}

/// A linear gradient definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Gradient stops
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Create a gradient with evenly spaced stops
    pub fn even(colors: &[&str]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        Self {
            stops: colors
                .iter()
                .enumerate()
                .map(|(i, color)| GradientStop {
                    position: i as f32 / last,
                    color: color.to_string(),
                })
                .collect(),
        }
    }

    /// Colors in stop order
    pub fn colors(&self) -> Vec<&str> {
        self.stops.iter().map(|stop| stop.color.as_str()).collect()
    }
}

/// Gradient presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradients {
    /// Screen backgrounds, landing card and secondary buttons
    pub background: Gradient,
    /// Onboarding "Sign Up" button
    pub call_to_action: Gradient,
}

impl Default for Gradients {
    fn default() -> Self {
        Self {
            background: Gradient::even(&[brand::PRIMARY, brand::SECONDARY]),
            call_to_action: Gradient::even(&[
                "#EA4623", "#EF3828", "#F27D30", "#F3742F", "#D67E37",
            ]),
        }
    }
}
