//! User interface layer for the member app
//!
//! This crate provides the navigation shell, the brand theme, the screen
//! view-models and the [`AppShell`] controller that wires them together.
//!
//! # Modules
//!
//! - [`navigation`] - Stack routes, landing tabs and the tab icon table
//! - [`theme`] - Brand palette and gradients
//! - [`screens`] - Screen view-models
//! - [`shell`] - Event handling and screen transitions
//!
//! # Example
//!
//! ```rust
//! use app_ui::navigation::{tab_icon, NavigationState, Route};
//!
//! let mut nav = NavigationState::new(Route::Onboarding);
//! nav.navigate(Route::Login);
//! assert_eq!(nav.current_route(), Route::Login);
//! assert_eq!(tab_icon("Home"), "home");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;
pub mod screens;
pub mod shell;
pub mod theme;

// Re-export commonly used types
pub use navigation::{
    tab_icon, tab_tint, LandingTab, NavigationStack, NavigationState, Route, StackEntry,
    TabScreen, TAB_ACTIVE_COLOR, TAB_INACTIVE_COLOR,
};

pub use screens::{
    CarouselItem, LandingScreen, LoginScreen, MembershipCard, OnboardingScreen, ProfileScreen,
    QrCodeScreen, SignUpScreen,
};

pub use shell::{missing_profile_alert, AppShell};

pub use theme::{brand, Gradient, GradientStop, Gradients};
