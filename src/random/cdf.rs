use super::source::Source;

/// an empirical cumulative distribution over a piecewise-linear table.
///
/// xs are the abscissae and ys the cumulative probabilities at them.
/// construction audits both sequences for monotonicity; a table that
/// decreases anywhere is unusable and the audit is fatal. bracketed()
/// additionally requires ys to run from exactly 0 to exactly 1, which
/// is how the cohort life tables are loaded.
#[derive(Clone, Debug)]
pub struct Cdf {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Cdf {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        assert!(xs.len() == ys.len(), "mismatched table lengths");
        assert!(xs.len() >= 2, "table too short");
        for w in xs.windows(2) {
            assert!(w[0] <= w[1], "abscissae decrease");
        }
        for w in ys.windows(2) {
            assert!(w[0] <= w[1], "cumulative table decreases");
        }
        Self { xs, ys }
    }

    pub fn bracketed(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        let this = Self::new(xs, ys);
        assert!(this.ys[0] == 0.0, "cumulative table does not begin at 0");
        assert!(*this.ys.last().expect("nonempty") == 1.0, "cumulative table does not end at 1");
        this
    }

    pub fn support(&self) -> (f64, f64) {
        (self.xs[0], *self.xs.last().expect("nonempty"))
    }

    /// cumulative probability at x, by linear interpolation
    pub fn at(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        let i = self.xs.partition_point(|&w| w <= x);
        let (x0, y0) = (self.xs[i - 1], self.ys[i - 1]);
        let (x1, y1) = (self.xs[i], self.ys[i]);
        match x1 == x0 {
            true => y1,
            false => y0 + (y1 - y0) * (x - x0) / (x1 - x0),
        }
    }

    /// smallest x reaching cumulative probability p
    pub fn invert(&self, p: f64) -> f64 {
        let p = p.clamp(self.ys[0], *self.ys.last().expect("nonempty"));
        let i = self.ys.partition_point(|&y| y < p);
        if i == 0 {
            return self.xs[0];
        }
        let (x0, y0) = (self.xs[i - 1], self.ys[i - 1]);
        let (x1, y1) = (self.xs[i], self.ys[i]);
        match y1 == y0 {
            true => x1,
            false => x0 + (x1 - x0) * (p - y0) / (y1 - y0),
        }
    }

    /// sample the distribution left-truncated at floor, returning the
    /// excess beyond it
    pub fn draw(&self, rng: &mut Source, floor: f64) -> f64 {
        let f0 = self.at(floor);
        let top = *self.ys.last().expect("nonempty");
        let u = f0 + rng.uniform() * (top - f0);
        (self.invert(u) - floor).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform() -> Cdf {
        Cdf::bracketed(vec![0.0, 1.0], vec![0.0, 1.0])
    }

    #[test]
    fn inversion_round_trips() {
        let cdf = uniform();
        for p in [0.0, 0.25, 0.5, 0.99, 1.0] {
            assert!((cdf.at(cdf.invert(p)) - p).abs() < 1e-12);
        }
    }

    #[test]
    fn interpolation_is_linear_between_knots() {
        let cdf = Cdf::new(vec![0.0, 2.0, 4.0], vec![0.0, 0.5, 1.0]);
        assert!((cdf.at(1.0) - 0.25).abs() < 1e-12);
        assert!((cdf.at(3.0) - 0.75).abs() < 1e-12);
        assert!(cdf.at(-1.0) == 0.0);
        assert!(cdf.at(9.0) == 1.0);
    }

    #[test]
    fn truncated_draws_stay_beyond_the_floor() {
        let cdf = uniform();
        let mut rng = Source::from_seed(3);
        for _ in 0..1_000 {
            let excess = cdf.draw(&mut rng, 0.5);
            assert!((0.0..=0.5).contains(&excess));
        }
    }

    #[test]
    #[should_panic]
    fn decreasing_table_is_fatal() {
        Cdf::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.8, 0.7]);
    }

    #[test]
    #[should_panic]
    fn unbracketed_table_is_fatal() {
        Cdf::bracketed(vec![0.0, 1.0], vec![0.1, 1.0]);
    }
}
