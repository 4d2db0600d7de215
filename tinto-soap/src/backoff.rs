//! The fixed retry schedule for SOAP calls (§4.8): 1s, 2s, 5s, 10s, 30s,
//! capped at 5 total attempts.
//!
//! Grounded on the teacher's `common::backoff::get_backoff_iter` — an
//! explicit, auditable iterator of [`Duration`]s rather than a generic retry
//! middleware — but DIAN's retry schedule is a fixed literal sequence, not an
//! exponential formula, so this iterator just walks the literal array.

use std::time::Duration;

/// The delay before each retry attempt, in order. Five values are named in
/// §4.8, but a 5-attempt cap only ever needs the first four as *gaps*
/// between attempts — the last (30s) is kept here so the schedule matches
/// the spec literally even though [`MAX_ATTEMPTS`] never consumes it.
pub const BACKOFF_STEPS_SECS: [u64; 5] = [1, 2, 5, 10, 30];

/// Maximum number of attempts (the first try plus up to 4 retries).
pub const MAX_ATTEMPTS: usize = 5;

pub fn get_backoff_iter() -> impl Iterator<Item = Duration> {
    BACKOFF_STEPS_SECS.iter().copied().map(Duration::from_secs)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn schedule_matches_4_8() {
        let durations: Vec<Duration> = get_backoff_iter().collect();
        assert_eq!(
            durations,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(30),
            ]
        );
    }
}
