use crate::Time;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// what happens to a slot when its individual dies
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum Policy {
    /// every death immediately seeds a replacement birth
    Constant,
    /// deaths delete; the controller tops the population up to the
    /// target at each reporting tick
    Open,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Policy::Constant => write!(f, "constant"),
            Policy::Open => write!(f, "open"),
        }
    }
}

/// all run parameters. command-line flags override the defaults; the
/// resolved set is logged as one json line at startup.
#[derive(Clone, Debug, Parser, Serialize)]
#[command(name = "microsim", about = "discrete-event microsimulation of TB in a grouped population")]
pub struct Settings {
    /// random sequence; negative draws an arbitrary seed
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub randseq: i64,
    /// numeric tag carried into output file names
    #[arg(long, default_value_t = 12)]
    pub fnumber: u32,
    /// run counter within a batch
    #[arg(long, default_value_t = 0)]
    pub currentrun: u32,
    /// replicate identity within a batch
    #[arg(long, default_value_t = 0)]
    pub my_id_0: u32,
    /// independently seeded replicates to run in parallel
    #[arg(long, default_value_t = 1)]
    pub replicates: u32,
    /// starting year
    #[arg(long, default_value_t = 1981.0)]
    pub t0: Time,
    /// ending year; the run stops before reaching it
    #[arg(long, default_value_t = 2050.0)]
    pub t1: Time,
    /// years between report rows
    #[arg(long, default_value_t = 1.0)]
    pub tgap: Time,
    /// maximum population size
    #[arg(long, default_value_t = 200_000)]
    pub capacity: usize,
    /// number of region-of-birth groups
    #[arg(long, default_value_t = 2)]
    pub groups: usize,
    /// group receiving local births
    #[arg(long, default_value_t = 1)]
    pub birth_group: usize,
    /// scale applied to the initial-population counts
    #[arg(long, default_value_t = 0.1)]
    pub scale: f64,
    /// binding-pool nodes per head of capacity
    #[arg(long, default_value_t = 4)]
    pub bind_factor: usize,
    /// slot policy at death
    #[arg(long, value_enum, default_value_t = Policy::Constant)]
    pub policy: Policy,
    /// population target for the open-policy controller
    #[arg(long)]
    pub target: Option<usize>,
    /// fraction of the initial population seeded latent
    #[arg(long, default_value_t = 0.25)]
    pub prevalence: f64,
    /// latent-to-active progressions per year
    #[arg(long, default_value_t = 0.03)]
    pub progression: f64,
    /// active-to-dormant regressions per year
    #[arg(long, default_value_t = 0.2)]
    pub regression: f64,
    /// deaths from active disease per year
    #[arg(long, default_value_t = 0.12)]
    pub virulence: f64,
    /// population-wide contact events per year; 0 disables the generator
    #[arg(long, default_value_t = 5_000.0)]
    pub contacts: f64,
    /// trailing window for the per-individual contact cap, years
    #[arg(long, default_value_t = 2.0)]
    pub window: Time,
    /// baseline mortality beyond the life tables, per year
    #[arg(long, default_value_t = 0.01)]
    pub mortality: f64,
    /// directory holding the demographic tables
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// run from synthetic tables instead of files
    #[arg(long, default_value_t = false)]
    pub synthetic: bool,
    /// output file stem
    #[arg(long, default_value = "summary")]
    pub stem: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::parse_from(["microsim"])
    }
}

impl Settings {
    /// years the run spans
    pub fn years(&self) -> usize {
        (self.t1 - self.t0).max(0.0) as usize
    }

    /// the same run re-identified as replicate i of the batch
    pub fn replicate(&self, i: u32) -> Self {
        Self { my_id_0: i, ..self.clone() }
    }

    /// the seed for this replicate, following the batch convention
    /// seed = randseq + my_id_0 + currentrun * replicates; None asks
    /// for an arbitrary seed
    pub fn seed(&self) -> Option<u64> {
        match self.randseq < 0 {
            true => None,
            false => Some(
                self.randseq as u64
                    + self.my_id_0 as u64
                    + self.currentrun as u64 * self.replicates.max(1) as u64,
            ),
        }
    }
}
