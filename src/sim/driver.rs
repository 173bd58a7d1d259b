use super::census::Census;
use super::report::Report;
use super::settings::Policy;
use super::settings::Settings;
use super::steps::Steps;
use crate::Slot;
use crate::Strain;
use crate::Time;
use crate::bindings::Pool;
use crate::cohort::Cohort;
use crate::cohort::Event;
use crate::cohort::Sex;
use crate::cohort::State;
use crate::life::INITIAL_AGES;
use crate::life::REGIONS;
use crate::life::SEXES;
use crate::life::Tables;
use crate::random::Source;
use crate::schedule::Clock;
use anyhow::Context;

/// recorded contacts per individual are capped within the trailing
/// window; encounters beyond the cap still transmit but go unrecorded
const MAX_CONTACTS: usize = 100;

/// events scheduled exactly at the present are nudged this far forward
const FUTURE: Time = 1e-10;

/// one replicate: the population and its side structures, the clock
/// generators, and the dispatch loop that drives them.
pub struct Simulation {
    settings: Settings,
    cohort: Cohort,
    pool: Pool,
    rng: Source,
    tables: Tables,
    census: Census,
    steps: Steps,
    births: Clock,
    contacts: Clock,
    report: Report,
    strains: Strain,
}

impl Simulation {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        anyhow::ensure!(settings.groups >= REGIONS, "fewer groups than regions of birth");
        anyhow::ensure!(settings.birth_group < settings.groups, "birth group out of range");
        anyhow::ensure!(settings.t1 > settings.t0, "empty horizon");
        let rng = match settings.seed() {
            Some(seed) => Source::from_seed(seed),
            None => Source::arbitrary(),
        };
        let tables = match settings.synthetic {
            true => Tables::synthetic(settings.t0, settings.t1, settings.mortality),
            false => {
                let dir = settings.data.as_deref().context("either --data or --synthetic is required")?;
                Tables::load(dir, settings.t0, settings.t1, settings.mortality)?
            }
        };
        let report = Report::new(&settings, rng.seed())?;
        let mut cohort = Cohort::new(settings.capacity, settings.groups);
        cohort.start(settings.t0);
        let pool = Pool::new(settings.capacity * settings.bind_factor.max(1) + 1);
        let yearly = tables.births(0) * settings.scale;
        let rate = match yearly > f64::EPSILON {
            true => yearly,
            false => 1.0 / (settings.years().max(1) as f64 * 100.0),
        };
        Ok(Self {
            census: Census::new(settings.groups),
            steps: Steps::new(),
            births: Clock::periodic(rate, 1.0),
            contacts: match settings.contacts > 0.0 {
                true => Clock::exponential(settings.contacts),
                false => Clock::exponential(1.0),
            },
            strains: 0,
            settings,
            cohort,
            pool,
            rng,
            tables,
            report,
        })
    }

    pub fn cohort(&self) -> &Cohort {
        &self.cohort
    }

    pub fn census(&self) -> &Census {
        &self.census
    }

    pub fn steps(&self) -> &Steps {
        &self.steps
    }

    /// seed, prime the generators, then dispatch events in time order
    /// until the horizon, reporting every tgap of simulated time
    pub fn run(&mut self) -> anyhow::Result<Summary> {
        let begin = std::time::Instant::now();
        self.seed();
        self.fire_births();
        if self.settings.contacts > 0.0 {
            self.fire_contacts()?;
        }
        let mut reported = self.settings.t0;
        self.review()?;
        loop {
            let previous = self.cohort.now();
            let Some((n, now)) = self.cohort.next() else { break };
            if now > self.settings.t1 {
                break;
            }
            self.steps.push(now - previous);
            self.census.events += 1;
            match self.cohort[n].pending {
                Event::Death => self.death(n),
                Event::Progress => self.progress(n),
                Event::Regress => self.regress(n),
                Event::DeathTb => self.death_tb(n),
                Event::Births => self.fire_births(),
                Event::Contacts => self.fire_contacts()?,
            }
            if self.cohort.now() - reported >= self.settings.tgap {
                reported = self.cohort.now();
                if self.settings.policy == Policy::Open {
                    self.control();
                }
                self.review()?;
            }
        }
        self.review()?;
        self.report.flush()?;
        Ok(self.close(begin.elapsed()))
    }

    /// walk the initial-population table, scaled, assigning each
    /// individual an age within its year and a latent infection at the
    /// configured prevalence
    fn seed(&mut self) {
        let regions = REGIONS.min(self.settings.groups);
        for age in 0..INITIAL_AGES {
            for sex in 0..SEXES {
                for region in 0..regions {
                    let count = (self.tables.initial(age, sex, region) * self.settings.scale) as usize;
                    for _ in 0..count {
                        let n = self
                            .cohort
                            .add(region, 1.0)
                            .expect("initial population within capacity");
                        let years = age as Time + self.rng.uniform();
                        let state = match self.rng.chance(self.settings.prevalence) {
                            true => State::Latent,
                            false => State::Uninfected,
                        };
                        self.basic(n, years, Sex::from(sex), state);
                    }
                }
            }
        }
        log::info!(
            "{:<32}{} individuals in {} groups",
            "seeded",
            self.cohort.len(),
            self.settings.groups
        );
    }

    /// shared initialisation for seeding and birth: identity, vital
    /// attributes, a life-table death draw, and the first schedule
    fn basic(&mut self, n: Slot, age: Time, sex: Sex, state: State) {
        let now = self.cohort.now();
        let born = now - age;
        let region = self.cohort[n].group;
        let span = self.tables.life.draw(&mut self.rng, born, sex, age);
        let death = now + span.max(FUTURE);
        let strain = match state == State::Latent {
            true => self.strain(),
            false => 0,
        };
        let progress = match state == State::Latent {
            true => now + self.rng.expon(self.settings.progression),
            false => 0.0,
        };
        self.cohort.induct(n);
        let who = &mut self.cohort[n];
        who.sex = sex;
        who.region = region;
        who.born = born;
        who.state = state;
        who.strain = strain;
        who.times = [0.0; Event::CANDIDATES];
        who.times[Event::Death.index()] = death;
        who.times[Event::Progress.index()] = progress;
        self.census.arrive(region, state);
        self.cohort.check_all(n);
    }

    /// a fresh strain identifier for a seeded infection
    fn strain(&mut self) -> Strain {
        self.strains += 1;
        self.strains
    }

    /// the birth generator: deliver one newborn, tick the clock, and
    /// reinstall the next wake on the reserved slot
    fn fire_births(&mut self) {
        let n = self
            .cohort
            .add(self.settings.birth_group, 1.0)
            .expect("population capacity exhausted");
        self.birth(n);
        let next = self.births.tick(self.cohort.now(), &mut self.rng);
        self.cohort.alarm(self.cohort.pseudo(0), Event::Births, next);
    }

    /// initialise a newborn in the given reserved slot
    fn birth(&mut self, n: Slot) {
        self.census.births += 1;
        let year = (self.cohort.now() - self.settings.t0).max(0.0) as usize;
        let sex = match self.rng.chance(self.tables.pmale(year)) {
            true => Sex::Male,
            false => Sex::Female,
        };
        self.basic(n, 0.0, sex, State::Uninfected);
    }

    /// the contact generator: one random encounter, then the next wake
    fn fire_contacts(&mut self) -> anyhow::Result<()> {
        self.encounter()?;
        let next = self.contacts.tick(self.cohort.now(), &mut self.rng);
        self.cohort.alarm(self.cohort.pseudo(1), Event::Contacts, next);
        Ok(())
    }

    /// select a random individual from a random group; when an active
    /// case meets a distinct partner the contact is recorded in both
    /// binding lists, and an uninfected partner acquires the strain
    fn encounter(&mut self) -> anyhow::Result<()> {
        let Some(n) = self.pick() else { return Ok(()) };
        if self.cohort[n].state != State::Active {
            return Ok(());
        }
        let Some(m) = self.pick() else { return Ok(()) };
        if m == n {
            return Ok(());
        }
        let now = self.cohort.now();
        let from = self.cohort[n].id;
        let to = self.cohort[m].id;
        let strain = self.cohort[n].strain;
        let mut given = self.cohort[n].given;
        if self.pool.recent(&given, now, self.settings.window) < MAX_CONTACTS {
            self.pool.append(&mut given, to, now, strain);
            self.cohort[n].given = given;
            let mut taken = self.cohort[m].taken;
            self.pool.append(&mut taken, from, now, strain);
            self.cohort[m].taken = taken;
            self.report.contact(now, from, to)?;
        }
        if self.cohort[m].state == State::Uninfected {
            self.census.infections += 1;
            self.census.shift(self.cohort[m].group, State::Uninfected, State::Latent);
            let progress = now + self.rng.expon(self.settings.progression);
            let who = &mut self.cohort[m];
            who.state = State::Latent;
            who.strain = strain;
            who.times[Event::Progress.index()] = progress;
            self.cohort.check_all(m);
        }
        Ok(())
    }

    fn pick(&mut self) -> Option<Slot> {
        let k = self.rng.below(self.settings.groups);
        self.cohort.select(k, &mut self.rng)
    }

    fn death(&mut self, n: Slot) {
        self.census.deaths += 1;
        self.retire(n);
    }

    fn death_tb(&mut self, n: Slot) {
        self.census.deaths += 1;
        self.census.deaths_tb += 1;
        self.retire(n);
    }

    /// remove an individual, releasing both contact lists; under the
    /// constant policy the loss is immediately made good by a newborn
    fn retire(&mut self, n: Slot) {
        let now = self.cohort.now();
        let group = self.cohort[n].group;
        let state = self.cohort[n].state;
        let age = self.cohort[n].age(now);
        self.census.depart(group, state, age);
        let mut given = self.cohort[n].given;
        self.pool.release(&mut given);
        self.cohort[n].given = given;
        let mut taken = self.cohort[n].taken;
        self.pool.release(&mut taken);
        self.cohort[n].taken = taken;
        self.cohort.delete(group, n);
        if self.settings.policy == Policy::Constant {
            let m = self
                .cohort
                .add(self.settings.birth_group, 1.0)
                .expect("population capacity exhausted");
            self.birth(m);
        }
    }

    /// latent to active: disease mortality and remission both become
    /// live candidates; the sooner of them and natural death pends
    fn progress(&mut self, n: Slot) {
        self.census.progressions += 1;
        let now = self.cohort.now();
        self.census.shift(self.cohort[n].group, State::Latent, State::Active);
        let doom = now + self.rng.expon(self.settings.virulence);
        let remit = now + self.rng.expon(self.settings.regression);
        let who = &mut self.cohort[n];
        who.state = State::Active;
        who.times[Event::Progress.index()] = 0.0;
        who.times[Event::DeathTb.index()] = doom;
        who.times[Event::Regress.index()] = remit;
        self.cohort.check_all(n);
    }

    /// active to dormant: the disease candidates clear and natural
    /// death alone remains
    fn regress(&mut self, n: Slot) {
        self.census.regressions += 1;
        self.census.shift(self.cohort[n].group, State::Active, State::Dormant);
        let who = &mut self.cohort[n];
        who.state = State::Dormant;
        who.times[Event::Regress.index()] = 0.0;
        who.times[Event::DeathTb.index()] = 0.0;
        self.cohort.check_all(n);
    }

    /// open-policy controller: births close a shortfall against the
    /// target; an excess is trimmed by dispatching random victims.
    /// the shortfall branch never runs backwards.
    fn control(&mut self) {
        let Some(target) = self.settings.target else { return };
        let have = self.census.population;
        if have < target {
            for _ in 0..target - have {
                let n = self
                    .cohort
                    .add(self.settings.birth_group, 1.0)
                    .expect("population capacity exhausted");
                self.birth(n);
            }
        }
        if have > target {
            for _ in 0..have - target {
                let n = loop {
                    if let Some(n) = self.pick() {
                        break n;
                    }
                };
                self.cohort.cancel(n);
                self.death(n);
            }
        }
    }

    fn review(&mut self) -> anyhow::Result<()> {
        let sizes = (0..self.settings.groups)
            .map(|k| self.cohort.group_size(k))
            .collect::<Vec<usize>>();
        self.report.row(self.cohort.now(), &self.census, &sizes)?;
        self.census.clear();
        Ok(())
    }

    fn close(&mut self, elapsed: std::time::Duration) -> Summary {
        log::info!("{:<32}{}", "time steps", self.steps);
        if let Some((mean, spread)) = self.census.mean_age() {
            log::info!("{:<32}mean {:.1}, sd {:.1}", "age at death", mean, spread);
        }
        Summary {
            seed: self.rng.seed(),
            events: self.steps.count(),
            population: self.census.population,
            births: self.census.births,
            elapsed,
        }
    }
}

/// what a finished replicate reports back
pub struct Summary {
    pub seed: u64,
    pub events: usize,
    pub population: usize,
    pub births: usize,
    pub elapsed: std::time::Duration,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "seed {}, events {}, population {}, births {}, {:.2?} elapsed",
            self.seed, self.events, self.population, self.births, self.elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(tag: &str) -> Settings {
        let dir = std::env::temp_dir().join("microsim-runs");
        std::fs::create_dir_all(&dir).expect("temp dir");
        Settings {
            synthetic: true,
            capacity: 4_000,
            scale: 0.04,
            t1: 1987.0,
            contacts: 300.0,
            prevalence: 0.3,
            progression: 0.5,
            stem: dir.join(tag).to_string_lossy().into_owned(),
            ..Settings::default()
        }
    }

    #[test]
    fn a_short_run_leaves_every_structure_consistent() {
        let mut sim = Simulation::new(settings("consistent")).expect("simulation");
        let summary = sim.run().expect("clean run");
        assert!(summary.events > 0);
        assert!(summary.births > 0);
        sim.cohort().audit();
        assert!(sim.census().population == sim.cohort().len());
        let sizes = (0..2).map(|k| sim.cohort().group_size(k)).sum::<usize>();
        assert!(sizes == sim.census().population);
        // every live individual plus both generators holds one queue
        // entry, less the single past-horizon event popped at the end
        let expected = sim.census().population + crate::NPSEUDO;
        assert!(expected - sim.cohort().scheduled() <= 1);
    }

    #[test]
    fn dispatched_times_never_run_backwards() {
        let mut sim = Simulation::new(settings("monotone")).expect("simulation");
        sim.run().expect("clean run");
        assert!(sim.steps().count() > 0);
        assert!(sim.steps().min() >= 0.0);
    }

    #[test]
    fn fixed_seeds_reproduce_the_run() {
        let mut a = Simulation::new(settings("rerun-a")).expect("simulation");
        let mut b = Simulation::new(settings("rerun-b")).expect("simulation");
        let left = a.run().expect("clean run");
        let right = b.run().expect("clean run");
        assert!(left.seed == right.seed);
        assert!(left.events == right.events);
        assert!(left.population == right.population);
        assert!(left.births == right.births);
    }

    #[test]
    fn constant_policy_never_shrinks_the_population() {
        let mut sim = Simulation::new(settings("constant")).expect("simulation");
        let seeded = {
            let mut probe = Simulation::new(settings("constant-probe")).expect("simulation");
            probe.seed();
            probe.census().population
        };
        let summary = sim.run().expect("clean run");
        assert!(summary.population >= seeded);
    }

    #[test]
    fn open_policy_tracks_the_target() {
        let mut base = settings("open");
        base.policy = Policy::Open;
        base.target = Some(300);
        let mut sim = Simulation::new(base).expect("simulation");
        let summary = sim.run().expect("clean run");
        assert!(
            (summary.population as i64 - 300).unsigned_abs() < 60,
            "population {} drifted from the target",
            summary.population
        );
    }

    #[test]
    fn disease_flows_through_the_compartments() {
        let mut sim = Simulation::new(settings("flows")).expect("simulation");
        sim.run().expect("clean run");
        let census = sim.census();
        let states = [State::Uninfected, State::Latent, State::Active, State::Dormant]
            .iter()
            .map(|&s| census.state(s))
            .sum::<usize>();
        assert!(states == census.population);
    }
}
