use super::table::AGES;
use super::table::Life;
use crate::Time;
use crate::random::Cdf;
use anyhow::Context;
use std::path::Path;

/// ages spanned by the initial-population table
pub const INITIAL_AGES: usize = 121;
/// regions of birth
pub const REGIONS: usize = 2;
pub const SEXES: usize = 2;
/// first and last birth cohorts covered by the mortality tables
pub const FIRST_COHORT: i32 = 1870;
pub const LAST_COHORT: i32 = 2010;

/// the demographic inputs: births per year, proportion male per year,
/// initial population counts, and the cohort life tables.
pub struct Tables {
    births: Vec<f64>,
    pmale: Vec<f64>,
    initial: Vec<f64>,
    pub life: Life,
}

impl Tables {
    /// load the whitespace-delimited tables from a directory. a missing
    /// or malformed file is fatal at startup; a non-monotone mortality
    /// slice fails its audit inside Cdf construction.
    pub fn load(dir: &Path, t0: Time, t1: Time, fallback: f64) -> anyhow::Result<Self> {
        let years = (t1 - t0) as usize;
        let births = floats(&dir.join("births.txt"))?;
        anyhow::ensure!(births.len() >= years, "births table shorter than the horizon: {} < {}", births.len(), years);
        let pmale = floats(&dir.join("propmale.txt"))?;
        anyhow::ensure!(pmale.len() >= years, "propmale table shorter than the horizon: {} < {}", pmale.len(), years);
        anyhow::ensure!(pmale.iter().all(|p| (0.0..=1.0).contains(p)), "propmale outside [0, 1]");
        let initial = floats(&dir.join("initial.txt"))?;
        anyhow::ensure!(
            initial.len() == INITIAL_AGES * SEXES * REGIONS,
            "initial table holds {} values, expected {}",
            initial.len(),
            INITIAL_AGES * SEXES * REGIONS
        );
        let mort = floats(&dir.join("mort.txt"))?;
        let cohorts = (LAST_COHORT - FIRST_COHORT + 1) as usize;
        anyhow::ensure!(
            mort.len() == cohorts * SEXES * AGES,
            "mortality table holds {} values, expected {}",
            mort.len(),
            cohorts * SEXES * AGES
        );
        let ages = (0..AGES).map(|a| a as f64).collect::<Vec<f64>>();
        let slices = mort
            .chunks(AGES)
            .map(|ys| Cdf::bracketed(ages.clone(), ys.to_vec()))
            .collect::<Vec<Cdf>>();
        log::info!("{:<32}{:<32}", "loading     tables", dir.display());
        log::info!("{:<32}{} cohorts x {} ages", "mortality", cohorts, AGES);
        Ok(Self {
            births,
            pmale,
            initial,
            life: Life::new(slices, FIRST_COHORT, fallback),
        })
    }

    /// a self-consistent synthetic set for tests and --synthetic runs:
    /// steady births, balanced sexes, a flat age pyramid to age 90, and
    /// a smooth mortality ramp over the full cohort range
    pub fn synthetic(t0: Time, t1: Time, fallback: f64) -> Self {
        let years = (t1 - t0) as usize + 7;
        let cohorts = (LAST_COHORT - FIRST_COHORT + 1) as usize;
        let ages = (0..AGES).map(|a| a as f64).collect::<Vec<f64>>();
        let ramp = (0..AGES)
            .map(|a| (a as f64 / (AGES - 1) as f64).powi(2))
            .collect::<Vec<f64>>();
        let slice = Cdf::bracketed(ages, ramp);
        let initial = (0..INITIAL_AGES * SEXES * REGIONS)
            .map(|i| match i / (SEXES * REGIONS) < 90 {
                true => 25.0,
                false => 0.0,
            })
            .collect::<Vec<f64>>();
        Self {
            births: vec![120.0; years],
            pmale: vec![0.5; years],
            initial,
            life: Life::new(vec![slice; cohorts * SEXES], FIRST_COHORT, fallback),
        }
    }

    /// births per year at the start of the run
    pub fn births(&self, year: usize) -> f64 {
        self.births[year.min(self.births.len() - 1)]
    }

    /// proportion of newborns that are male in the given year offset
    pub fn pmale(&self, year: usize) -> f64 {
        self.pmale[year.min(self.pmale.len() - 1)]
    }

    /// initial count for (age, sex, region)
    pub fn initial(&self, age: usize, sex: usize, region: usize) -> f64 {
        self.initial[(age * SEXES + sex) * REGIONS + region]
    }
}

fn floats(path: &Path) -> anyhow::Result<Vec<f64>> {
    std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?
        .split_whitespace()
        .map(|w| {
            w.parse::<f64>()
                .with_context(|| format!("malformed value {:?} in {}", w, path.display()))
        })
        .collect()
}
