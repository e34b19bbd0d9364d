//! Navigation shell for the member app
//!
//! This module provides:
//! - The fixed set of stack routes
//! - The landing tab group and its icon table
//! - A navigation stack with stack-navigator semantics

use serde::{Deserialize, Serialize};

// =============================================================================
// Route Definitions
// =============================================================================

/// All full-screen routes in the outer stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Route {
    /// Onboarding splash with sign-up and log-in buttons
    #[default]
    Onboarding,
    /// Login form
    Login,
    /// Sign-up form
    SignUp,
    /// Landing tab group
    Landing,
}

impl Route {
    /// Registered screen name
    pub fn name(&self) -> &'static str {
        match self {
            Route::Onboarding => "StartingScreen",
            Route::Login => "LoginScreen",
            Route::SignUp => "Signin",
            Route::Landing => "LandingPage",
        }
    }
}

// =============================================================================
// Landing Tabs
// =============================================================================

/// Icon tint of the focused tab
pub const TAB_ACTIVE_COLOR: &str = "#EA4623";

/// Icon tint of unfocused tabs
pub const TAB_INACTIVE_COLOR: &str = "#006073";

/// Icon used for tab names missing from the table
pub const DEFAULT_TAB_ICON: &str = "circle";

/// Icon for a tab name
///
/// Keyed by the [`LandingTab`] names. The tabs were first registered as
/// `Prfile` (rocket), `Profile` (qrcode) and `Proile` (list-ul); those old
/// names are no longer in the table and get [`DEFAULT_TAB_ICON`].
pub fn tab_icon(name: &str) -> &'static str {
    match name {
        "Home" => "home",
        "Services" => "rocket",
        "QrCode" => "qrcode",
        "Account" => "list-ul",
        _ => DEFAULT_TAB_ICON,
    }
}

/// Icon tint for a tab
pub fn tab_tint(focused: bool) -> &'static str {
    if focused {
        TAB_ACTIVE_COLOR
    } else {
        TAB_INACTIVE_COLOR
    }
}

/// Tabs nested under [`Route::Landing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LandingTab {
    /// Landing dashboard
    #[default]
    Home,
    /// Services, rendered with the landing dashboard
    Services,
    /// Membership QR code
    QrCode,
    /// Profile and logout
    Account,
}

/// Screen a tab renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabScreen {
    /// Landing dashboard
    Landing,
    /// QR code display
    QrCode,
    /// Profile page
    Profile,
}

impl LandingTab {
    /// Registered tab name
    pub fn name(&self) -> &'static str {
        match self {
            LandingTab::Home => "Home",
            LandingTab::Services => "Services",
            LandingTab::QrCode => "QrCode",
            LandingTab::Account => "Account",
        }
    }

    /// Get icon name for this tab
    pub fn icon(&self) -> &'static str {
        tab_icon(self.name())
    }

    /// Get the screen this tab renders
    pub fn screen(&self) -> TabScreen {
        match self {
            LandingTab::Home | LandingTab::Services => TabScreen::Landing,
            LandingTab::QrCode => TabScreen::QrCode,
            LandingTab::Account => TabScreen::Profile,
        }
    }

    /// Get all tabs in order
    pub fn all() -> [LandingTab; 4] {
        [
            LandingTab::Home,
            LandingTab::Services,
            LandingTab::QrCode,
            LandingTab::Account,
        ]
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The route
    pub route: Route,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self {
            route,
            key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Outer navigation stack
///
/// Always holds at least the root entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StackEntries")]
pub struct NavigationStack {
    /// Stack entries (bottom to top)
    entries: Vec<StackEntry>,
}

/// Unchecked wire form of [`NavigationStack`]
#[derive(Deserialize)]
struct StackEntries {
    entries: Vec<StackEntry>,
}

impl TryFrom<StackEntries> for NavigationStack {
    type Error = &'static str;

    fn try_from(raw: StackEntries) -> Result<Self, Self::Error> {
        if raw.entries.is_empty() {
            return Err("navigation stack has no root entry");
        }
        Ok(Self {
            entries: raw.entries,
        })
    }
}

impl NavigationStack {
    /// Create a new navigation stack with a root route
    pub fn new(root: Route) -> Self {
        Self {
            entries: vec![StackEntry::new(root)],
        }
    }

    /// Push a route onto the stack
    pub fn push(&mut self, route: Route) {
        self.entries.push(StackEntry::new(route));
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn pop(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    /// Position of the topmost entry for `route`
    pub fn position(&self, route: Route) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.route == route)
    }

    /// Pop everything above the topmost entry for `route`.
    ///
    /// Returns false, leaving the stack untouched, if `route` is not on it.
    pub fn pop_to(&mut self, route: Route) -> bool {
        match self.position(route) {
            Some(index) => {
                self.entries.truncate(index + 1);
                true
            }
            None => false,
        }
    }

    /// Get the current route
    pub fn current(&self) -> Route {
        self.current_entry().route
    }

    /// Get the current entry
    pub fn current_entry(&self) -> &StackEntry {
        // Non-empty: the root is never popped and empty stacks never deserialize
        &self.entries[self.entries.len() - 1]
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Get all entries
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Reset to a new root
    pub fn reset(&mut self, route: Route) {
        self.entries = vec![StackEntry::new(route)];
    }
}

// =============================================================================
// Navigation State
// =============================================================================

/// Complete navigation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Outer route stack
    stack: NavigationStack,
    /// Selected tab inside the landing group
    active_tab: LandingTab,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl NavigationState {
    /// Create a navigation state opened on `initial`
    pub fn new(initial: Route) -> Self {
        Self {
            stack: NavigationStack::new(initial),
            active_tab: LandingTab::default(),
        }
    }

    /// Get the route stack
    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// Get the current route
    pub fn current_route(&self) -> Route {
        self.stack.current()
    }

    /// Get the selected landing tab
    pub fn active_tab(&self) -> LandingTab {
        self.active_tab
    }

    /// Navigate to a route
    ///
    /// A route already on the stack is returned to by popping the entries
    /// above it; otherwise it is pushed.
    pub fn navigate(&mut self, route: Route) {
        if self.current_route() == route {
            return;
        }
        if !self.stack.pop_to(route) {
            self.stack.push(route);
            if route == Route::Landing {
                self.active_tab = LandingTab::default();
            }
        }
        tracing::debug!(route = route.name(), depth = self.stack.depth(), "navigated");
    }

    /// Replace the whole stack with `route`
    pub fn reset(&mut self, route: Route) {
        self.stack.reset(route);
        self.active_tab = LandingTab::default();
        tracing::debug!(route = route.name(), "navigation reset");
    }

    /// Go back
    pub fn go_back(&mut self) -> bool {
        self.stack.pop()
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.stack.can_go_back()
    }

    /// Switch to a landing tab
    ///
    /// Ignored unless the landing group is showing.
    pub fn switch_tab(&mut self, tab: LandingTab) -> bool {
        if self.current_route() != Route::Landing {
            return false;
        }
        self.active_tab = tab;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_names() {
        assert_eq!(Route::Onboarding.name(), "StartingScreen");
        assert_eq!(Route::Login.name(), "LoginScreen");
        assert_eq!(Route::SignUp.name(), "Signin");
        assert_eq!(Route::Landing.name(), "LandingPage");
    }

    #[test]
    fn test_tab_icons() {
        assert_eq!(tab_icon("Home"), "home");
        assert_eq!(tab_icon("QrCode"), "qrcode");
        assert_eq!(tab_icon("Services"), "rocket");
        assert_eq!(tab_icon("Account"), "list-ul");
        assert_eq!(tab_icon("Unknown"), "circle");
        assert_eq!(tab_icon(""), "circle");
        assert_eq!(tab_icon("Profile"), "circle");

        for tab in LandingTab::all() {
            assert_ne!(tab.icon(), DEFAULT_TAB_ICON);
        }
    }

    #[test]
    fn test_tab_tint() {
        assert_eq!(tab_tint(true), "#EA4623");
        assert_eq!(tab_tint(false), "#006073");
    }

    #[test]
    fn test_tab_screens() {
        assert_eq!(LandingTab::Home.screen(), TabScreen::Landing);
        assert_eq!(LandingTab::Services.screen(), TabScreen::Landing);
        assert_eq!(LandingTab::QrCode.screen(), TabScreen::QrCode);
        assert_eq!(LandingTab::Account.screen(), TabScreen::Profile);
    }

    #[test]
    fn test_stack_push_pop() {
        let mut stack = NavigationStack::new(Route::Onboarding);
        assert!(!stack.can_go_back());
        assert!(!stack.pop());

        stack.push(Route::Login);
        assert_eq!(stack.current(), Route::Login);
        assert_eq!(stack.depth(), 2);

        assert!(stack.pop());
        assert_eq!(stack.current(), Route::Onboarding);
    }

    #[test]
    fn test_stack_entries_have_unique_keys() {
        let mut stack = NavigationStack::new(Route::Onboarding);
        stack.push(Route::Login);
        let entries = stack.entries();
        assert_ne!(entries[0].key, entries[1].key);
    }

    #[test]
    fn test_navigate_pushes_new_route() {
        let mut nav = NavigationState::new(Route::Onboarding);
        nav.navigate(Route::SignUp);
        assert_eq!(nav.current_route(), Route::SignUp);
        assert!(nav.can_go_back());
    }

    #[test]
    fn test_navigate_returns_to_existing_route() {
        let mut nav = NavigationState::new(Route::Onboarding);
        nav.navigate(Route::Login);
        nav.navigate(Route::SignUp);
        nav.navigate(Route::Login);

        assert_eq!(nav.current_route(), Route::Login);
        assert_eq!(nav.stack().depth(), 2);
    }

    #[test]
    fn test_navigate_to_current_is_noop() {
        let mut nav = NavigationState::new(Route::Landing);
        nav.navigate(Route::Landing);
        assert_eq!(nav.stack().depth(), 1);
    }

    #[test]
    fn test_reset_and_go_back() {
        let mut nav = NavigationState::new(Route::Onboarding);
        nav.navigate(Route::Login);
        nav.navigate(Route::Landing);

        nav.reset(Route::Onboarding);
        assert_eq!(nav.current_route(), Route::Onboarding);
        assert!(!nav.go_back());
    }

    #[test]
    fn test_switch_tab_only_on_landing() {
        let mut nav = NavigationState::new(Route::Onboarding);
        assert!(!nav.switch_tab(LandingTab::QrCode));
        assert_eq!(nav.active_tab(), LandingTab::Home);

        nav.navigate(Route::Landing);
        assert!(nav.switch_tab(LandingTab::QrCode));
        assert_eq!(nav.active_tab(), LandingTab::QrCode);
    }

    #[test]
    fn test_fresh_landing_starts_on_home_tab() {
        let mut nav = NavigationState::new(Route::Landing);
        nav.switch_tab(LandingTab::Account);
        nav.reset(Route::Onboarding);
        nav.navigate(Route::Landing);
        assert_eq!(nav.active_tab(), LandingTab::Home);
    }

    #[test]
    fn test_state_serialization() {
        let nav = NavigationState::new(Route::Landing);
        let json = serde_json::to_string(&nav).unwrap();
        let restored: NavigationState = serde_json::from_str(&json).unwrap();
        assert_eq!(nav, restored);
    }

    #[test]
    fn test_empty_stack_does_not_deserialize() {
        let result = serde_json::from_str::<NavigationStack>(r#"{"entries":[]}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<NavigationState>(
            r#"{"stack":{"entries":[]},"active_tab":"Home"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stack_deserializes_with_root() {
        let stack: NavigationStack = serde_json::from_str(
            r#"{"entries":[{"route":"Onboarding","key":"a"},{"route":"Login","key":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(stack.current(), Route::Login);
        assert_eq!(stack.current_entry().key, "b");
    }
}
