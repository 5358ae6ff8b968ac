//! Onboarding readiness: collects the raw signals for a location and derives
//! what the operator dashboard shows.
//!
//! Collection is fail-closed. A sub-fetch that errors degrades its signal to
//! "not satisfied" and the evaluation still produces a report, so a flaky
//! backend reads as incomplete setup rather than a crashed dashboard.

use anyhow::Result;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::backend::BackendApi;
use crate::domain::{LicenseStatus, OnboardingSignals, ReadinessReport, SetupStep};

/// Pure decision table from raw signals to the dashboard report.
///
/// The persisted completion milestone (`marked_complete`) short-circuits the
/// checklist: once set, only a license regression can pull readiness back,
/// and the setup banner stays hidden. The license review banner tracks the
/// moderation queue and shows whenever an uploaded license awaits a verdict.
pub fn derive_readiness(signals: &OnboardingSignals) -> ReadinessReport {
    let all_signals = signals.stripe_complete
        && signals.license.is_approved()
        && signals.has_kitchens
        && signals.has_availability
        && signals.has_requirements;

    let is_onboarding_complete = all_signals || signals.marked_complete;

    let is_ready_for_bookings = if signals.marked_complete {
        signals.license.is_approved()
    } else {
        all_signals
    };

    let show_setup_banner = !signals.marked_complete && !all_signals;
    let show_license_review_banner = signals.license_uploaded && signals.license.is_pending();

    let mut missing_steps = Vec::new();
    if !signals.marked_complete {
        if !signals.license.is_approved() {
            missing_steps.push(SetupStep::License);
        }
        if !signals.has_kitchens {
            missing_steps.push(SetupStep::Kitchens);
        }
        if !signals.has_availability {
            missing_steps.push(SetupStep::Availability);
        }
        if !signals.has_requirements {
            missing_steps.push(SetupStep::Requirements);
        }
        if !signals.stripe_complete {
            missing_steps.push(SetupStep::Payouts);
        }
    }

    ReadinessReport {
        is_onboarding_complete,
        is_ready_for_bookings,
        show_setup_banner,
        show_license_review_banner,
        missing_steps,
    }
}

pub struct ReadinessEvaluator<A> {
    api: A,
}

impl<A: BackendApi> ReadinessEvaluator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Evaluates a location. Never fails; see the module notes on degradation.
    pub async fn evaluate(&self, location_id: &str) -> ReadinessReport {
        let signals = self.collect_signals(location_id).await;
        debug!(?signals, "readiness.signals");
        derive_readiness(&signals)
    }

    async fn collect_signals(&self, location_id: &str) -> OnboardingSignals {
        let (profile, location) = tokio::join!(
            self.api.fetch_profile(),
            self.api.fetch_location(location_id),
        );
        let profile = fail_closed("profile", profile);
        let location = fail_closed("location", location);

        let marked_complete = profile.onboarding_completed;
        debug!(
            marked_complete,
            skipped = profile.onboarding_skipped,
            welcome_seen = profile.welcome_seen,
            "readiness.profile"
        );

        let license_uploaded = location.license_url.as_deref().is_some_and(|u| !u.is_empty());
        let license = LicenseStatus::from_record(license_uploaded, location.license_status.as_deref());

        if marked_complete {
            // Milestone on file: trust the checklist and skip the expensive
            // fetches. The license still gets re-checked above because
            // moderation can revoke it after the fact.
            return OnboardingSignals {
                stripe_complete: true,
                license,
                license_uploaded,
                has_kitchens: true,
                has_availability: true,
                has_requirements: true,
                marked_complete,
            };
        }

        let (payment, kitchens, requirements) = tokio::join!(
            self.api.fetch_payment_status(location_id),
            self.api.fetch_kitchens(location_id),
            self.api.fetch_requirements(location_id),
        );
        let payment = fail_closed("payment_status", payment);
        let kitchens = fail_closed("kitchens", kitchens);
        let requirements = fail_closed("requirements", requirements);

        let stripe_complete = payment.is_complete();
        debug!(status = %payment.status, stripe_complete, "readiness.payment");

        // One availability round-trip per kitchen; the kitchen list is the
        // only data dependency between sub-fetches.
        let per_kitchen = join_all(kitchens.iter().map(|k| self.api.fetch_availability(k.id))).await;

        let mut has_availability = false;
        for (kitchen, days) in kitchens.iter().zip(per_kitchen) {
            let days = fail_closed("availability", days);
            let open: Vec<&str> = days
                .iter()
                .filter(|d| d.is_available)
                .map(|d| d.day.as_str())
                .collect();
            debug!(kitchen = %kitchen.name, open_days = ?open, "readiness.kitchen_availability");
            has_availability = has_availability || !open.is_empty();
        }

        OnboardingSignals {
            stripe_complete,
            license,
            license_uploaded,
            has_kitchens: !kitchens.is_empty(),
            has_availability,
            has_requirements: requirements.is_configured(),
            marked_complete,
        }
    }
}

fn fail_closed<T: Default>(fetch: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(fetch, error = ?err, "readiness.fetch_degraded");
            T::default()
        }
    }
}
