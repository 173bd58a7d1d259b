mod chain;
mod pool;

pub use chain::Chain;
pub use pool::Links;
pub use pool::Node;
pub use pool::Pool;
