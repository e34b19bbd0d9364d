//! Screen view-models
//!
//! Each screen exposes the state and text it renders and the route its
//! buttons lead to. Rendering itself is left to the host.

use app_core::{Alert, Package, ProfileRecord, SignInForm, SignUpForm};
use app_state::{Carousel, CarouselTicker, ScrollTarget, TickerHandle};
use firebase_client::Uid;
use std::sync::Arc;
use std::time::Duration;

use crate::navigation::Route;
use crate::theme::{Gradient, Gradients};

/// Placeholder image shown for promotions and news
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/80";

/// Default QR code payload
pub const DEFAULT_QR_PAYLOAD: &str = "https://yourwebsite.com";

/// QR code edge length in points
pub const QR_CODE_SIZE: u32 = 200;

/// Fixed notifications in the landing dropdown
pub const NOTIFICATIONS: [&str; 5] = [
    "Notification 1",
    "Notification 2",
    "Notification 3",
    "Notification 4",
    "Notification 5",
];

// =============================================================================
// Onboarding
// =============================================================================

/// Onboarding splash
#[derive(Debug, Clone, Default)]
pub struct OnboardingScreen;

impl OnboardingScreen {
    /// Target of the "Sign Up" button
    pub fn sign_up(&self) -> Route {
        Route::SignUp
    }

    /// Target of the "Log in" button
    pub fn log_in(&self) -> Route {
        Route::Login
    }

    /// Gradients of the two buttons, "Sign Up" first
    pub fn button_gradients(&self) -> (Gradient, Gradient) {
        let gradients = Gradients::default();
        (gradients.call_to_action, gradients.background)
    }
}

// =============================================================================
// Login
// =============================================================================

/// Login form screen
#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    /// Form contents
    pub form: SignInForm,
}

impl LoginScreen {
    /// Screen title
    pub const TITLE: &'static str = "Log in";
    /// Text under the title
    pub const DESCRIPTION: &'static str = "Enter your email and password";

    /// Update the username field
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.form.username = username.into();
    }

    /// Update the password field
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.form.password = password.into();
    }

    /// Target of the "Create an account" link
    pub fn create_account(&self) -> Route {
        Route::SignUp
    }
}

// =============================================================================
// Sign Up
// =============================================================================

/// Sign-up form screen
#[derive(Debug, Clone, Default)]
pub struct SignUpScreen {
    /// Form contents
    pub form: SignUpForm,
}

impl SignUpScreen {
    /// Screen title
    pub const TITLE: &'static str = "Create An Account";
    /// Text under the title
    pub const DESCRIPTION: &'static str = "Enter your details to sign up";
    /// Heading above the package buttons
    pub const PACKAGE_HEADING: &'static str = "Select Your Package";

    /// Package buttons in display order
    pub fn packages(&self) -> [Package; 4] {
        Package::ALL
    }

    /// Press a package button
    pub fn select_package(&mut self, package: Package) {
        self.form.select_package(package);
    }

    /// Whether `package` is the highlighted button
    pub fn is_selected(&self, package: Package) -> bool {
        self.form.package == Some(package)
    }

    /// Target of the "Already have an account? Log in" link
    pub fn log_in(&self) -> Route {
        Route::Login
    }
}

// =============================================================================
// Landing
// =============================================================================

/// An image tile with a caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselItem {
    /// Image URL
    pub image: &'static str,
    /// Caption
    pub text: String,
}

fn placeholder_items(label: &str) -> Vec<CarouselItem> {
    (1..=5)
        .map(|n| CarouselItem {
            image: PLACEHOLDER_IMAGE,
            text: format!("{} {}", label, n),
        })
        .collect()
}

/// Membership card on the landing dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipCard {
    /// Holder name, empty when unknown
    pub name: String,
    /// Package name, empty when unknown
    pub package: String,
    /// Balance line
    pub balance: &'static str,
    /// Card number
    pub number: &'static str,
    /// Action labels along the bottom of the card
    pub actions: [&'static str; 3],
}

/// Landing dashboard
pub struct LandingScreen {
    uid: Option<Uid>,
    profile: Option<ProfileRecord>,
    alert: Option<Alert>,
    show_notifications: bool,
    promotions: Vec<CarouselItem>,
    news: Vec<CarouselItem>,
    news_carousel: Carousel,
    ticker: Option<TickerHandle>,
}

impl Default for LandingScreen {
    fn default() -> Self {
        let news = placeholder_items("News");
        Self {
            uid: None,
            profile: None,
            alert: None,
            show_notifications: false,
            promotions: placeholder_items("Promo"),
            news_carousel: Carousel::new(news.len()),
            news,
            ticker: None,
        }
    }
}

impl LandingScreen {
    /// Service tiles
    pub const SERVICES: [&'static str; 4] = ["Services", "Fasttrack", "Recovery", "Fuel"];

    /// Create an empty landing screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the session identifier
    pub fn set_uid(&mut self, uid: Uid) {
        self.uid = Some(uid);
    }

    /// Record the freshly fetched profile
    pub fn set_profile(&mut self, profile: ProfileRecord) {
        self.profile = Some(profile);
    }

    /// Show an alert on top of the dashboard
    pub fn set_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    /// Take the pending alert, if any
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    /// Session identifier line at the bottom of the dashboard
    pub fn uid_text(&self) -> String {
        match &self.uid {
            Some(uid) => format!("User UID: {}", uid),
            None => "Loading UID...".to_string(),
        }
    }

    /// Profile shown on the card, if fetched
    pub fn profile(&self) -> Option<&ProfileRecord> {
        self.profile.as_ref()
    }

    /// Membership card contents
    pub fn card(&self) -> MembershipCard {
        let profile = self.profile.clone().unwrap_or_default();
        MembershipCard {
            name: profile.name.clone().unwrap_or_default(),
            package: profile.package_label().to_string(),
            balance: "Total Balance: $511",
            number: "1234 5678 9012 3456",
            actions: ["Earn", "Burn", "Send"],
        }
    }

    /// Bell button; returns whether the dropdown is now open
    pub fn toggle_notifications(&mut self) -> bool {
        self.show_notifications = !self.show_notifications;
        self.show_notifications
    }

    /// Dropdown contents, empty while closed
    pub fn notifications(&self) -> &[&'static str] {
        if self.show_notifications {
            &NOTIFICATIONS
        } else {
            &[]
        }
    }

    /// Promotion tiles
    pub fn promotions(&self) -> &[CarouselItem] {
        &self.promotions
    }

    /// News tiles
    pub fn news(&self) -> &[CarouselItem] {
        &self.news
    }

    /// Index of the news tile in view
    pub fn news_index(&self) -> usize {
        self.news_carousel.current()
    }

    /// Start auto-advancing the news carousel
    pub fn start_news_ticker(&mut self, interval: Duration, target: Arc<dyn ScrollTarget>) {
        self.ticker = Some(CarouselTicker::start(
            self.news_carousel.clone(),
            interval,
            target,
        ));
    }

    /// Stop the news carousel
    pub fn stop_news_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    /// Whether the news carousel is advancing
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickerHandle::is_running)
    }
}

// =============================================================================
// QR Code
// =============================================================================

/// Membership QR code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCodeScreen {
    /// Encoded text
    pub payload: String,
    /// Edge length in points
    pub size: u32,
}

impl QrCodeScreen {
    /// Create a QR code screen for `payload`
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            size: QR_CODE_SIZE,
        }
    }
}

impl Default for QrCodeScreen {
    fn default() -> Self {
        Self::new(DEFAULT_QR_PAYLOAD)
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Profile page built from the cached profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileScreen {
    profile: ProfileRecord,
}

impl ProfileScreen {
    /// Label of the logout button
    pub const LOGOUT_LABEL: &'static str = "Logout";

    /// Create a profile screen; a missing profile shows placeholders
    pub fn new(profile: Option<ProfileRecord>) -> Self {
        Self {
            profile: profile.unwrap_or_default(),
        }
    }

    /// Name line
    pub fn name(&self) -> &str {
        self.profile.display_name()
    }

    /// Email line
    pub fn email(&self) -> &str {
        self.profile.display_email()
    }
}
