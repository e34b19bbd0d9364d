//! Application shell
//!
//! [`AppShell`] owns the navigation state and wires screen events to the
//! auth flows, the session and the profile cache.

use app_core::{Alert, AuthService, ProfileCache, SignInForm, SignUpForm};
use app_state::{LaunchDestination, ScrollTarget, SessionGate, SessionState, DEFAULT_TICK_INTERVAL};
use std::sync::Arc;
use std::time::Duration;

use crate::navigation::{NavigationState, Route};
use crate::screens::{LandingScreen, ProfileScreen, QrCodeScreen, DEFAULT_QR_PAYLOAD};

/// Alert shown when the landing page finds no profile record
pub fn missing_profile_alert() -> Alert {
    Alert::new("No Data Found", "User data not found in the database.")
}

/// Top-level controller driving navigation from user events
pub struct AppShell {
    auth: AuthService,
    gate: SessionGate,
    session: SessionState,
    profiles: ProfileCache,
    navigation: Option<NavigationState>,
    landing: Option<LandingScreen>,
    carousel_interval: Duration,
    qr_payload: String,
}

impl AppShell {
    /// Create a new shell; it stays in the loading state until [`AppShell::launch`]
    pub fn new(
        auth: AuthService,
        gate: SessionGate,
        session: SessionState,
        profiles: ProfileCache,
    ) -> Self {
        Self {
            auth,
            gate,
            session,
            profiles,
            navigation: None,
            landing: None,
            carousel_interval: DEFAULT_TICK_INTERVAL,
            qr_payload: DEFAULT_QR_PAYLOAD.to_string(),
        }
    }

    /// Use a different news carousel period
    pub fn with_carousel_interval(mut self, interval: Duration) -> Self {
        self.carousel_interval = interval;
        self
    }

    /// Use a different QR code payload
    pub fn with_qr_payload(mut self, payload: impl Into<String>) -> Self {
        self.qr_payload = payload.into();
        self
    }

    /// Whether the launch check is still pending
    pub fn is_loading(&self) -> bool {
        self.navigation.is_none()
    }

    /// Navigation state, once launched
    pub fn navigation(&self) -> Option<&NavigationState> {
        self.navigation.as_ref()
    }

    /// Current route, once launched
    pub fn current_route(&self) -> Option<Route> {
        self.navigation.as_ref().map(NavigationState::current_route)
    }

    /// Mounted landing screen, if any
    pub fn landing(&self) -> Option<&LandingScreen> {
        self.landing.as_ref()
    }

    /// Run the launch check and open the first screen
    ///
    /// A returning user also gets their auth session restored, so the landing
    /// page can read the profile. The route depends on the stored identifier
    /// alone.
    pub async fn launch(&mut self) -> Route {
        let route = match self.gate.resolve().await {
            LaunchDestination::Landing => {
                self.auth.restore_session().await;
                Route::Landing
            }
            LaunchDestination::Onboarding => Route::Onboarding,
        };

        tracing::info!(route = route.name(), "launched");
        self.navigation = Some(NavigationState::new(route));
        route
    }

    /// Follow a button or link to `route`
    pub fn navigate(&mut self, route: Route) {
        match self.navigation.as_mut() {
            Some(navigation) => navigation.navigate(route),
            None => tracing::warn!(route = route.name(), "navigation before launch ignored"),
        }
    }

    /// Submit the login form
    ///
    /// Returns the alert to show on failure; on success the shell moves to
    /// the landing group.
    pub async fn submit_login(&mut self, form: &SignInForm) -> Option<Alert> {
        match self.auth.sign_in(form).await {
            Ok(_) => {
                self.navigate(Route::Landing);
                None
            }
            Err(e) => Some(e.sign_in_alert()),
        }
    }

    /// Submit the sign-up form
    ///
    /// Returns the welcome alert on success, the failure alert otherwise.
    pub async fn submit_sign_up(&mut self, form: &SignUpForm) -> Alert {
        match self.auth.sign_up(form).await {
            Ok(outcome) => {
                self.navigate(Route::Landing);
                outcome.welcome
            }
            Err(e) => e.sign_up_alert(),
        }
    }

    /// Mount the landing dashboard
    ///
    /// Reads the session identifier, fetches the profile and starts the news
    /// carousel. Failures are logged; the dashboard falls back to placeholders.
    pub async fn mount_landing(&mut self, target: Arc<dyn ScrollTarget>) -> &mut LandingScreen {
        self.unmount_landing();
        let mut screen = LandingScreen::new();

        match self.session.current_uid().await {
            Ok(Some(uid)) => {
                match self.profiles.refresh(&uid).await {
                    Ok(Some(profile)) => screen.set_profile(profile),
                    Ok(None) => screen.set_alert(missing_profile_alert()),
                    Err(e) => tracing::error!("Failed to fetch user data: {}", e),
                }
                screen.set_uid(uid);
            }
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to retrieve UID: {}", e),
        }

        screen.start_news_ticker(self.carousel_interval, target);
        self.landing.insert(screen)
    }

    /// Tear down the landing dashboard and its carousel
    pub fn unmount_landing(&mut self) {
        if let Some(mut screen) = self.landing.take() {
            screen.stop_news_ticker();
        }
    }

    /// Build the QR code tab
    pub fn qr_code(&self) -> QrCodeScreen {
        QrCodeScreen::new(self.qr_payload.clone())
    }

    /// Build the profile tab from the cached profile
    pub async fn open_profile(&self) -> ProfileScreen {
        ProfileScreen::new(self.profiles.cached().await)
    }

    /// Log out and return to onboarding
    ///
    /// The auth session is ended as well. A storage failure is logged; the
    /// shell still returns to onboarding.
    pub async fn logout(&mut self) {
        if let Err(e) = self.session.logout().await {
            tracing::error!("Error logging out: {}", e);
        }
        self.auth.sign_out().await;

        self.unmount_landing();
        match self.navigation.as_mut() {
            Some(navigation) => navigation.reset(Route::Onboarding),
            None => self.navigation = Some(NavigationState::new(Route::Onboarding)),
        }
    }
}
