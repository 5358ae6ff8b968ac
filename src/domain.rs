use serde::{Deserialize, Serialize};

/// Moderation state of a location's business license, derived from the
/// location record. The raw status field only counts once a license document
/// is actually on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl LicenseStatus {
    pub fn from_record(uploaded: bool, status: Option<&str>) -> Self {
        if !uploaded {
            return Self::None;
        }
        match status {
            Some(s) if s.eq_ignore_ascii_case("approved") => Self::Approved,
            Some(s) if s.eq_ignore_ascii_case("rejected") => Self::Rejected,
            // Uploaded but not yet moderated (or unknown status value).
            _ => Self::Pending,
        }
    }

    pub fn is_approved(self) -> bool {
        self == Self::Approved
    }

    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

/// One unfinished onboarding step, in dashboard priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupStep {
    License,
    Kitchens,
    Availability,
    Requirements,
    Payouts,
}

impl SetupStep {
    /// Operator-facing wording used by the dashboard checklist.
    pub fn label(self) -> &'static str {
        match self {
            Self::License => "Upload your business license",
            Self::Kitchens => "Add your first kitchen",
            Self::Availability => "Set kitchen availability",
            Self::Requirements => "Configure booking requirements",
            Self::Payouts => "Finish payout setup",
        }
    }
}

/// Raw readiness inputs for one location, collected from the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OnboardingSignals {
    pub stripe_complete: bool,
    pub license: LicenseStatus,
    pub license_uploaded: bool,
    pub has_kitchens: bool,
    pub has_availability: bool,
    pub has_requirements: bool,
    /// Persisted completion milestone on the operator profile.
    pub marked_complete: bool,
}

/// What the dashboard shows for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub is_onboarding_complete: bool,
    pub is_ready_for_bookings: bool,
    pub show_setup_banner: bool,
    pub show_license_review_banner: bool,
    pub missing_steps: Vec<SetupStep>,
}

/// Lifecycle stage of a booking relative to some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingPhase {
    Upcoming,
    Active,
    Past,
}
