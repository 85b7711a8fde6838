//! Page-load fan-out for the account dashboard.

use serde::Serialize;

use crate::api::AdGenApi;
use crate::models::{CreditsBalance, Profile, Subscription};

/// Whatever account data could be loaded.
///
/// Each section is independent; a failed request leaves its field empty
/// and adds a message to `errors`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub credits: Option<CreditsBalance>,
    pub subscription: Option<Subscription>,
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl DashboardSnapshot {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Load credits, subscription and profile concurrently.
///
/// Never fails as a whole; see [`DashboardSnapshot`].
pub async fn load_dashboard(api: &AdGenApi) -> DashboardSnapshot {
    let (credits, subscription, profile) =
        futures::join!(api.credits_balance(), api.subscription(), api.profile());

    let mut snapshot = DashboardSnapshot::default();

    match credits {
        Ok(c) => snapshot.credits = Some(c),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load credits balance");
            snapshot.errors.push(format!("credits: {}", e.user_message()));
        }
    }
    match subscription {
        Ok(s) => snapshot.subscription = Some(s),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load subscription");
            snapshot
                .errors
                .push(format!("subscription: {}", e.user_message()));
        }
    }
    match profile {
        Ok(p) => snapshot.profile = Some(p),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load profile");
            snapshot.errors.push(format!("profile: {}", e.user_message()));
        }
    }

    snapshot
}
