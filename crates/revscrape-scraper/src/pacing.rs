//! Randomized pacing between requests.
//!
//! Every outbound request and page transition is preceded by a pause drawn
//! uniformly from a configured [`DelayRange`]. Requests are never issued in
//! parallel, so these pauses are the only rate control the scraper applies.

use std::time::Duration;

use rand::Rng;
use revscrape_core::DelayRange;

/// Draws a pause length in seconds from `range`.
///
/// Degenerate ranges (`min >= max`) return `min` without touching the RNG.
#[must_use]
pub fn sample_secs(range: DelayRange) -> f64 {
    if range.min_secs >= range.max_secs {
        return range.min_secs.max(0.0);
    }
    rand::rng().random_range(range.min_secs..=range.max_secs)
}

/// Sleeps for a random duration drawn from `range`.
///
/// The RNG is released before the await point so the returned future stays `Send`.
pub async fn pause(range: DelayRange) {
    if range.is_zero() {
        return;
    }
    let secs = sample_secs(range);
    if secs <= 0.0 {
        return;
    }
    tracing::trace!(delay_secs = secs, "pacing pause");
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}
