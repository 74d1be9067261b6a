//! Time-based auction curves.
//!
//! Two independent curves, both pure functions of the supplied timestamp:
//!
//! ```text
//!  rate bump (Dutch auction)            cancellation premium
//!  initial ─┐                           max            ┌───────
//!           │╲                                        ╱
//!           │  ╲__ points                            ╱
//!           │      ╲                                ╱
//!        0  └───────╲────▶ t           0 ──────────┘──────────▶ t
//!         start     start+duration              expiration  +duration
//! ```

use escrowswap_types::AuctionTerms;

/// Rate bump in effect at `now`, in units of 1/`RATE_BUMP_BASE`.
///
/// - `now <= start`: the initial bump
/// - `now >= start + duration`: zero
/// - otherwise linear between consecutive points, starting from the
///   initial bump at `start` and ending at zero at `start + duration`
///
/// Non-increasing in `now` whenever the points are non-increasing, which
/// order validation guarantees.
#[must_use]
pub fn rate_bump(now: u32, auction: &AuctionTerms) -> u64 {
    let now = u64::from(now);
    let start = u64::from(auction.start_time);
    if now <= start {
        return u64::from(auction.initial_rate_bump);
    }
    let finish = auction.end_time();
    if now >= finish {
        return 0;
    }

    let mut current_bump = u64::from(auction.initial_rate_bump);
    let mut current_time = start;
    for point in &auction.points {
        let next_bump = u64::from(point.rate_bump);
        let delta = u64::from(point.time_delta);
        let next_time = current_time + delta;
        if now <= next_time {
            // now > current_time here, so delta > 0
            return ((now - current_time) * next_bump + (next_time - now) * current_bump) / delta;
        }
        current_bump = next_bump;
        current_time = next_time;
    }

    // now > current_time and now < finish, so the span is nonzero
    (finish - now) * current_bump / (finish - current_time)
}

/// Cancellation premium a resolver may claim at `now`.
///
/// Zero at or before `expiration`, `max_premium` once `duration` seconds
/// have passed, linear (rounded down) in between. Non-decreasing in `now`.
#[must_use]
pub fn cancellation_premium(now: u32, expiration: u32, duration: u32, max_premium: u64) -> u64 {
    if now <= expiration {
        return 0;
    }
    let elapsed = now - expiration;
    if elapsed >= duration {
        return max_premium;
    }
    // elapsed < duration, so the quotient is below max_premium
    let scaled = u128::from(elapsed) * u128::from(max_premium) / u128::from(duration);
    u64::try_from(scaled).unwrap_or(max_premium)
}

#[cfg(test)]
mod tests {
    use escrowswap_types::RatePoint;
    use rand::Rng;

    use super::*;

    const START: u32 = 1_000;

    fn linear(initial: u16, duration: u32) -> AuctionTerms {
        AuctionTerms {
            start_time: START,
            duration,
            initial_rate_bump: initial,
            points: Vec::new(),
        }
    }

    fn with_points() -> AuctionTerms {
        AuctionTerms {
            start_time: START,
            duration: 100,
            initial_rate_bump: 10_000,
            points: vec![
                RatePoint {
                    rate_bump: 8_000,
                    time_delta: 20,
                },
                RatePoint {
                    rate_bump: 2_000,
                    time_delta: 30,
                },
            ],
        }
    }

    #[test]
    fn initial_bump_before_start() {
        let auction = linear(5_000, 100);
        assert_eq!(rate_bump(0, &auction), 5_000);
        assert_eq!(rate_bump(START, &auction), 5_000);
    }

    #[test]
    fn zero_after_end() {
        let auction = linear(5_000, 100);
        assert_eq!(rate_bump(START + 100, &auction), 0);
        assert_eq!(rate_bump(u32::MAX, &auction), 0);
    }

    #[test]
    fn straight_line_without_points() {
        let auction = linear(5_000, 100);
        assert_eq!(rate_bump(START + 50, &auction), 2_500);
        assert_eq!(rate_bump(START + 25, &auction), 3_750);
    }

    #[test]
    fn interpolates_between_points() {
        let auction = with_points();
        // first segment: 10_000 → 8_000 over 20s
        assert_eq!(rate_bump(START + 10, &auction), 9_000);
        assert_eq!(rate_bump(START + 20, &auction), 8_000);
        // second segment: 8_000 → 2_000 over 30s
        assert_eq!(rate_bump(START + 35, &auction), 5_000);
        assert_eq!(rate_bump(START + 50, &auction), 2_000);
        // tail: 2_000 → 0 over the remaining 50s
        assert_eq!(rate_bump(START + 75, &auction), 1_000);
    }

    #[test]
    fn zero_duration_is_a_step() {
        let auction = linear(5_000, 0);
        assert_eq!(rate_bump(START, &auction), 5_000);
        assert_eq!(rate_bump(START + 1, &auction), 0);
    }

    #[test]
    fn rate_bump_is_non_increasing() {
        let auction = with_points();
        let mut previous = rate_bump(START, &auction);
        for t in START..=START + 110 {
            let bump = rate_bump(t, &auction);
            assert!(bump <= previous, "bump rose at t={t}: {previous} -> {bump}");
            previous = bump;
        }
    }

    #[test]
    fn random_curves_are_non_increasing() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let initial: u16 = rng.r#gen();
            let mut bump = initial;
            let mut points = Vec::new();
            let mut total = 0u32;
            for _ in 0..rng.gen_range(0..5) {
                bump = rng.gen_range(0..=bump);
                let delta: u16 = rng.gen_range(0..200);
                total += u32::from(delta);
                points.push(RatePoint {
                    rate_bump: bump,
                    time_delta: delta,
                });
            }
            let auction = AuctionTerms {
                start_time: START,
                duration: total + rng.gen_range(0..200),
                initial_rate_bump: initial,
                points,
            };
            auction.validate(8).unwrap();

            let mut previous = rate_bump(START, &auction);
            assert_eq!(previous, u64::from(initial));
            let end = u32::try_from(auction.end_time()).unwrap();
            for t in START..=end {
                let current = rate_bump(t, &auction);
                assert!(current <= previous);
                previous = current;
            }
            if auction.duration > 0 {
                assert_eq!(rate_bump(end, &auction), 0);
            }
        }
    }

    #[test]
    fn premium_zero_until_expiration() {
        assert_eq!(cancellation_premium(0, 500, 100, 1_000), 0);
        assert_eq!(cancellation_premium(500, 500, 100, 1_000), 0);
    }

    #[test]
    fn premium_caps_at_max() {
        assert_eq!(cancellation_premium(600, 500, 100, 1_000), 1_000);
        assert_eq!(cancellation_premium(u32::MAX, 500, 100, 1_000), 1_000);
    }

    #[test]
    fn premium_linear_in_between() {
        assert_eq!(cancellation_premium(550, 500, 100, 100), 50);
        assert_eq!(cancellation_premium(501, 500, 3, 10), 3);
    }

    #[test]
    fn premium_zero_duration_is_immediate() {
        assert_eq!(cancellation_premium(501, 500, 0, 77), 77);
    }

    #[test]
    fn premium_large_max_does_not_overflow() {
        assert_eq!(
            cancellation_premium(550, 500, 100, u64::MAX),
            u64::MAX / 2
        );
    }

    #[test]
    fn premium_is_non_decreasing() {
        let mut previous = 0;
        for t in 400..800 {
            let premium = cancellation_premium(t, 500, 137, 9_999);
            assert!(premium >= previous);
            previous = premium;
        }
        assert_eq!(previous, 9_999);
    }
}
