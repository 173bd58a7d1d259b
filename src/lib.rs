pub mod bindings;
pub mod cohort;
pub mod life;
pub mod random;
pub mod schedule;
pub mod sim;

/// dimensional analysis types
pub type Time = f64;
pub type Slot = usize;
pub type Id = u64;
pub type Group = usize;
pub type Strain = u32;

/// slot 0 of every arena-backed structure is a reserved sentinel
pub const NIL: Slot = 0;

/// reserved slots above the population, one per clock-driven generator
pub const NPSEUDO: usize = 2;

/// initialize logging
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
