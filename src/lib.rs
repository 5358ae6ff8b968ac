pub mod backend;
pub mod bookings;
pub mod clock;
pub mod config;
pub mod domain;
pub mod feed;
pub mod monitoring;
pub mod readiness;
