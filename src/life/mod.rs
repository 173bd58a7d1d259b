mod table;
mod tables;

pub use table::AGES;
pub use table::Life;
pub use tables::FIRST_COHORT;
pub use tables::INITIAL_AGES;
pub use tables::LAST_COHORT;
pub use tables::REGIONS;
pub use tables::SEXES;
pub use tables::Tables;
