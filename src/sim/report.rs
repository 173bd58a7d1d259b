use super::census::Census;
use super::settings::Settings;
use crate::Id;
use crate::Time;
use anyhow::Context;
use std::io::Write;

/// the per-run output: a report file with one row per interval and a
/// trace file with one line per recorded contact.
///
/// files are named <stem>_<fnumber><seed>.txt so that replicate runs
/// never collide.
pub struct Report {
    out: std::io::BufWriter<std::fs::File>,
    trace: std::io::BufWriter<std::fs::File>,
    groups: usize,
    quiet: bool,
    first: bool,
}

impl Report {
    pub fn new(settings: &Settings, seed: u64) -> anyhow::Result<Self> {
        let name = format!("{}_{}{}.txt", settings.stem, settings.fnumber, seed);
        let tname = format!("{}_contacts_{}{}.txt", settings.stem, settings.fnumber, seed);
        let out = std::fs::File::create(&name).with_context(|| format!("create {}", name))?;
        let trace = std::fs::File::create(&tname).with_context(|| format!("create {}", tname))?;
        log::info!("{:<32}{:<32}", "writing     report", name);
        Ok(Self {
            out: std::io::BufWriter::new(out),
            trace: std::io::BufWriter::new(trace),
            groups: settings.groups,
            quiet: settings.replicates > 1,
            first: true,
        })
    }

    /// one row per reporting interval: time, population, progressions
    /// and deaths since the last row, cumulative births, group sizes
    pub fn row(&mut self, t: Time, census: &Census, sizes: &[usize]) -> anyhow::Result<()> {
        if self.first {
            self.first = false;
            let head = (0..self.groups).map(|k| format!("g{}", k)).collect::<Vec<_>>().join("\t");
            writeln!(self.out, "t\tN\tprogressions\tdeaths\tbirths\t{}", head)?;
            if !self.quiet {
                println!("t\tN\tprogressions\tdeaths\tbirths\t{}", head);
            }
        }
        let tail = sizes.iter().map(usize::to_string).collect::<Vec<_>>().join("\t");
        writeln!(
            self.out,
            "{:.1}\t{}\t{}\t{}\t{}\t{}",
            t, census.population, census.progressions, census.deaths, census.births, tail
        )?;
        if !self.quiet {
            println!(
                "{:.1}\t{}\t{}\t{}\t{}\t{}",
                t, census.population, census.progressions, census.deaths, census.births, tail
            );
        }
        Ok(())
    }

    /// one line per recorded contact: time, infector, infectee
    pub fn contact(&mut self, t: Time, from: Id, to: Id) -> anyhow::Result<()> {
        writeln!(self.trace, "{:.4}\t{}\t{}", t, from, to)?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        self.trace.flush()?;
        Ok(())
    }
}
