mod census;
mod driver;
mod report;
mod settings;
mod steps;

pub use census::Census;
pub use driver::Simulation;
pub use driver::Summary;
pub use report::Report;
pub use settings::Policy;
pub use settings::Settings;
pub use steps::Steps;
