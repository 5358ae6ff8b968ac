//! Dashboard feed: readiness plus schedule snapshots for one location,
//! either once or on a refresh loop in watch mode.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::backend::{BackendApi, BackendClient};
use crate::bookings::{self, SchedulePartition};
use crate::clock;
use crate::config::Config;
use crate::readiness::ReadinessEvaluator;

pub async fn run(cfg: Config) -> Result<()> {
    let zone = cfg.zone()?;
    let client = BackendClient::new(&cfg)?;
    let evaluator = ReadinessEvaluator::new(client.clone());

    info!(
        api = %cfg.api_base_url,
        location = %cfg.location_id,
        tz = %cfg.tz,
        watch = cfg.watch,
        refresh_secs = cfg.refresh_secs,
        "feed.start"
    );

    loop {
        snapshot(&client, &evaluator, &cfg, zone).await;
        if !cfg.watch {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(cfg.refresh_secs)).await;
    }
}

async fn snapshot(
    api: &BackendClient,
    evaluator: &ReadinessEvaluator<BackendClient>,
    cfg: &Config,
    zone: Tz,
) {
    let now = Utc::now();

    let report = evaluator.evaluate(&cfg.location_id).await;
    let missing: Vec<&str> = report.missing_steps.iter().map(|s| s.label()).collect();
    info!(
        complete = report.is_onboarding_complete,
        ready = report.is_ready_for_bookings,
        setup_banner = report.show_setup_banner,
        license_review = report.show_license_review_banner,
        missing = ?missing,
        "feed.readiness"
    );

    let mut records = match api.fetch_bookings(&cfg.location_id).await {
        Ok(records) => records,
        Err(err) => {
            // Same fail-closed bias as the readiness signals: an empty
            // schedule this cycle, never a crash.
            warn!(error = ?err, "feed.bookings_unavailable");
            Vec::new()
        }
    };
    records.retain(|b| !b.is_cancelled());

    let schedule = bookings::partition(records, now);
    log_schedule(&schedule, zone, now);
}

fn log_schedule(schedule: &SchedulePartition, zone: Tz, now: DateTime<Utc>) {
    for (id, err) in &schedule.invalid {
        warn!(booking = *id, error = %err, "feed.booking_invalid");
    }

    info!(
        upcoming = schedule.upcoming.len(),
        active = schedule.active.len(),
        past = schedule.past.len(),
        invalid = schedule.invalid.len(),
        "feed.schedule"
    );

    if let Some(current) = schedule.active.first() {
        info!(
            booking = current.booking.id,
            kitchen = current.booking.kitchen_id,
            ends_in_hours = current.ends_in_hours(now),
            "feed.active_booking"
        );
    }

    if let Some(next) = schedule.upcoming.first() {
        // Shown in the operator's reporting zone, not the booking's own.
        let (date, time) = clock::local_civil(next.starts_at, zone);
        info!(
            booking = next.booking.id,
            kitchen = next.booking.kitchen_id,
            starts_in_hours = next.starts_in_hours(now),
            date = %date,
            time = %time,
            "feed.next_booking"
        );
    }
}
