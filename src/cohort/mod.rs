mod cohort;
mod event;
mod individual;
mod ledger;
mod state;

pub use cohort::Cohort;
pub use event::Event;
pub use individual::Individual;
pub use ledger::Ledger;
pub use state::Sex;
pub use state::State;
