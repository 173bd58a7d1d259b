use crate::Group;
use crate::Time;
use crate::cohort::State;

/// running population counts: per-group per-state occupancy, cumulative
/// births, and the tallies cleared at every report.
#[derive(Clone, Debug)]
pub struct Census {
    counts: Vec<[usize; State::N]>,
    pub population: usize,
    /// cumulative over the whole run
    pub births: usize,
    /// cleared at each report
    pub deaths: usize,
    pub deaths_tb: usize,
    pub progressions: usize,
    pub regressions: usize,
    pub infections: usize,
    pub events: usize,
    age_sum: f64,
    age_squares: f64,
    age_count: f64,
}

impl Census {
    pub fn new(groups: usize) -> Self {
        Self {
            counts: vec![[0; State::N]; groups],
            population: 0,
            births: 0,
            deaths: 0,
            deaths_tb: 0,
            progressions: 0,
            regressions: 0,
            infections: 0,
            events: 0,
            age_sum: 0.0,
            age_squares: 0.0,
            age_count: 0.0,
        }
    }

    pub fn arrive(&mut self, k: Group, s: State) {
        self.counts[k][s.index()] += 1;
        self.population += 1;
    }

    pub fn depart(&mut self, k: Group, s: State, age: Time) {
        self.counts[k][s.index()] -= 1;
        self.population -= 1;
        self.age_sum += age;
        self.age_squares += age * age;
        self.age_count += 1.0;
    }

    pub fn shift(&mut self, k: Group, from: State, to: State) {
        self.counts[k][from.index()] -= 1;
        self.counts[k][to.index()] += 1;
    }

    pub fn migrate(&mut self, from: Group, to: Group, s: State) {
        self.counts[from][s.index()] -= 1;
        self.counts[to][s.index()] += 1;
    }

    pub fn group(&self, k: Group) -> usize {
        self.counts[k].iter().sum()
    }

    pub fn state(&self, s: State) -> usize {
        self.counts.iter().map(|c| c[s.index()]).sum()
    }

    /// clear the per-report tallies; occupancy and cumulative births stay
    pub fn clear(&mut self) {
        self.deaths = 0;
        self.deaths_tb = 0;
        self.progressions = 0;
        self.regressions = 0;
        self.infections = 0;
        self.events = 0;
    }

    /// mean and root-variance of age at death, when any deaths occurred
    pub fn mean_age(&self) -> Option<(f64, f64)> {
        match self.age_count > 0.0 {
            false => None,
            true => {
                let mean = self.age_sum / self.age_count;
                let variance = self.age_squares / self.age_count - mean * mean;
                Some((mean, variance.max(0.0).sqrt()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_tracks_arrivals_departures_and_shifts() {
        let mut census = Census::new(2);
        census.arrive(0, State::Uninfected);
        census.arrive(0, State::Uninfected);
        census.arrive(1, State::Latent);
        assert!(census.population == 3);
        assert!(census.group(0) == 2);
        assert!(census.state(State::Uninfected) == 2);
        census.shift(0, State::Uninfected, State::Latent);
        assert!(census.state(State::Latent) == 2);
        census.migrate(1, 0, State::Latent);
        assert!(census.group(0) == 3);
        assert!(census.group(1) == 0);
        census.depart(0, State::Latent, 62.0);
        assert!(census.population == 2);
        let (mean, spread) = census.mean_age().expect("one death");
        assert!(mean == 62.0 && spread == 0.0);
    }

    #[test]
    fn clearing_keeps_cumulative_births() {
        let mut census = Census::new(1);
        census.births = 7;
        census.deaths = 3;
        census.events = 40;
        census.clear();
        assert!(census.births == 7);
        assert!(census.deaths == 0);
        assert!(census.events == 0);
    }
}
