mod cdf;
mod source;

pub use cdf::Cdf;
pub use source::Source;
