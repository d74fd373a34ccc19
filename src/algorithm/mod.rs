mod math;

pub use math::*;
