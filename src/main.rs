use clap::Parser;
use colored::Colorize;
use microsim::sim::Settings;
use microsim::sim::Simulation;
use rayon::prelude::*;

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    microsim::init();
    log::info!("{:<32}{}", "settings", serde_json::to_string(&settings)?);
    match settings.replicates {
        0 | 1 => {
            let mut sim = Simulation::new(settings)?;
            let summary = sim.run()?;
            println!("{} {}", "done".green(), summary);
        }
        n => {
            let summaries = (0..n)
                .into_par_iter()
                .map(|i| Simulation::new(settings.replicate(i))?.run())
                .collect::<anyhow::Result<Vec<_>>>()?;
            for (i, summary) in summaries.iter().enumerate() {
                println!("{} {}", format!("replicate {}", i).green(), summary);
            }
        }
    }
    Ok(())
}
