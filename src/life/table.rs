use crate::Time;
use crate::cohort::Sex;
use crate::random::Cdf;
use crate::random::Source;

/// age classes spanned by each mortality slice
pub const AGES: usize = 122;

/// cohort life tables: the cumulative probability of death by a given
/// (birth cohort, sex, age).
///
/// a draw is conditional on having survived to the present age and
/// returns the remaining lifetime. cohorts born after the last table
/// fall back to exponential mortality at the configured baseline, as
/// no empirical slice exists for them yet.
pub struct Life {
    tables: Vec<Cdf>,
    first_cohort: i32,
    fallback: f64,
}

impl Life {
    pub fn new(tables: Vec<Cdf>, first_cohort: i32, fallback: f64) -> Self {
        assert!(!tables.is_empty() && tables.len() % 2 == 0, "cohort tables come in sex pairs");
        assert!(fallback > 0.0, "baseline mortality must be positive");
        Self { tables, first_cohort, fallback }
    }

    pub fn cohorts(&self) -> usize {
        self.tables.len() / 2
    }

    /// remaining lifetime for an individual of the given birth year,
    /// sex, and present age
    pub fn draw(&self, rng: &mut Source, birth_year: Time, sex: Sex, age: Time) -> Time {
        let cohort = birth_year.floor() as i64 - self.first_cohort as i64;
        if cohort >= self.cohorts() as i64 {
            return rng.expon(self.fallback);
        }
        let cohort = cohort.max(0) as usize;
        self.tables[cohort * 2 + sex.index()].draw(rng, age)
    }

    /// a single-cohort table uniform on [0, 1], for calibration
    pub fn uniform() -> Self {
        let cdf = Cdf::bracketed(vec![0.0, 1.0], vec![0.0, 1.0]);
        Self::new(vec![cdf.clone(), cdf], 0, 0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a uniform life table must produce uniform lifetimes: the
    /// empirical distribution stays within tight KS distance
    #[test]
    fn uniform_table_draws_uniform_lifetimes() {
        let life = Life::uniform();
        let mut rng = Source::from_seed(41);
        let n = 100_000;
        let mut draws = (0..n)
            .map(|_| life.draw(&mut rng, 0.4, Sex::Female, 0.0))
            .collect::<Vec<Time>>();
        draws.sort_by(|a, b| a.total_cmp(b));
        let ks = draws
            .iter()
            .enumerate()
            .map(|(i, &x)| ((i + 1) as f64 / n as f64 - x).abs().max((x - i as f64 / n as f64).abs()))
            .fold(0.0, f64::max);
        assert!(ks < 0.02, "KS distance {} too large", ks);
    }

    #[test]
    fn conditional_draws_never_exceed_the_remaining_support() {
        let life = Life::uniform();
        let mut rng = Source::from_seed(43);
        for _ in 0..1_000 {
            let w = life.draw(&mut rng, 0.0, Sex::Male, 0.75);
            assert!((0.0..=0.25).contains(&w));
        }
    }

    #[test]
    fn cohorts_beyond_the_tables_fall_back_to_exponential() {
        let life = Life::uniform();
        let mut rng = Source::from_seed(47);
        let n = 20_000;
        let mean = (0..n)
            .map(|_| life.draw(&mut rng, 1.0, Sex::Female, 0.0))
            .sum::<Time>()
            / n as f64;
        assert!((mean - 100.0).abs() < 3.0, "fallback mean {} far from 100", mean);
    }

    #[test]
    #[should_panic]
    fn odd_table_counts_are_rejected() {
        let cdf = Cdf::bracketed(vec![0.0, 1.0], vec![0.0, 1.0]);
        Life::new(vec![cdf], 0, 0.01);
    }
}
