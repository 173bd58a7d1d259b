use crate::Time;
use crate::random::Cdf;
use crate::random::Source;

/// a peripheral event source: a lazy sequence of future tick times.
///
/// each external generator (births, contacts) owns one clock and one
/// reserved pseudo slot in the event queue; its handler performs the
/// external action, ticks the clock, and reinstalls the next wake.
pub enum Clock {
    /// waiting times drawn from an arbitrary cumulative distribution
    General { wait: Cdf, next: Time },
    /// a poisson process at a fixed rate
    Exponential { rate: f64, next: Time },
    /// periodic at the given rate with uniform jitter of relative width
    /// rel: the next tick falls in [target + 1/rate - rel/rate, target + 1/rate]
    Periodic { rate: f64, rel: f64, target: Time, next: Time },
}

impl Clock {
    pub fn general(wait: Cdf) -> Self {
        Clock::General { wait, next: 0.0 }
    }

    pub fn exponential(rate: f64) -> Self {
        assert!(rate > 0.0, "clock rate must be positive");
        Clock::Exponential { rate, next: 0.0 }
    }

    pub fn periodic(rate: f64, rel: f64) -> Self {
        assert!(rate > 0.0, "clock rate must be positive");
        assert!((0.0..=1.0).contains(&rel), "relative width outside [0, 1]");
        Clock::Periodic { rate, rel, target: 0.0, next: 0.0 }
    }

    /// advance to the next tick time.
    ///
    /// for the periodic kind the target is clamped forward to the
    /// present before advancing; without the clamp, accumulated
    /// rounding could ask for a tick in the past.
    pub fn tick(&mut self, now: Time, rng: &mut Source) -> Time {
        match self {
            Clock::General { wait, next } => {
                *next = now + wait.draw(rng, 0.0);
                *next
            }
            Clock::Exponential { rate, next } => {
                *next = now + rng.expon(*rate);
                *next
            }
            Clock::Periodic { rate, rel, target, next } => {
                let w = match *rel > 0.0 {
                    true => *rel * rng.uniform(),
                    false => 0.0,
                };
                if *target < now {
                    *target = now;
                }
                let period = 1.0 / *rate;
                *target += period;
                *next = *target - period * w;
                *next
            }
        }
    }

    pub fn next(&self) -> Time {
        match self {
            Clock::General { next, .. } => *next,
            Clock::Exponential { next, .. } => *next,
            Clock::Periodic { next, .. } => *next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// the jitter slack (target - next) of a fully jittered unit-rate
    /// clock is uniform on [0, 1], so its mean settles near 0.5
    #[test]
    fn periodic_jitter_slack_is_uniform() {
        let mut rng = Source::from_seed(17);
        let mut clock = Clock::periodic(1.0, 1.0);
        let mut now = 0.0;
        let n = 10_000;
        let mut sum = 0.0;
        for _ in 0..n {
            now = clock.tick(now, &mut rng);
            let slack = match clock {
                Clock::Periodic { target, next, .. } => target - next,
                _ => unreachable!(),
            };
            assert!((0.0..=1.0).contains(&slack));
            sum += slack;
        }
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.025, "mean slack {} far from 0.5", mean);
    }

    /// renewal gaps of the same clock are bounded by (0, 2) periods
    /// around a mean of one period
    #[test]
    fn periodic_gaps_average_one_period() {
        let mut rng = Source::from_seed(29);
        let mut clock = Clock::periodic(1.0, 1.0);
        let mut now = 0.0;
        let n = 10_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let next = clock.tick(now, &mut rng);
            let gap = next - now;
            assert!(gap > 0.0 && gap < 2.0, "gap {} outside (0, 2)", gap);
            sum += gap;
            now = next;
        }
        let mean = sum / n as f64;
        assert!((mean - 1.0).abs() < 0.05, "mean gap {} far from 1", mean);
    }

    #[test]
    fn target_clamps_forward_when_time_has_overtaken_it() {
        let mut rng = Source::from_seed(1);
        let mut clock = Clock::periodic(2.0, 0.0);
        let next = clock.tick(1000.0, &mut rng);
        assert!(next == 1000.5);
    }

    #[test]
    fn unjittered_clock_is_exactly_periodic() {
        let mut rng = Source::from_seed(1);
        let mut clock = Clock::periodic(4.0, 0.0);
        let mut now = 10.0;
        for i in 1..=8 {
            now = clock.tick(now, &mut rng);
            assert!((now - (10.0 + i as f64 * 0.25)).abs() < 1e-9);
        }
    }

    #[test]
    fn exponential_ticks_always_advance() {
        let mut rng = Source::from_seed(5);
        let mut clock = Clock::exponential(3.0);
        let mut now = 0.0;
        for _ in 0..1_000 {
            let next = clock.tick(now, &mut rng);
            assert!(next >= now);
            now = next;
        }
    }

    #[test]
    #[should_panic]
    fn relative_width_beyond_one_is_fatal() {
        Clock::periodic(1.0, 1.5);
    }

    #[test]
    #[should_panic]
    fn nonpositive_rate_is_fatal() {
        Clock::exponential(0.0);
    }
}
