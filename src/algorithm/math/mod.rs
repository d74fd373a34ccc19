mod percentile;
mod region;

pub use percentile::*;
pub use region::*;
