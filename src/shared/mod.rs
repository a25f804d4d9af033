pub mod fuzzy;
pub mod geo;
pub mod time;
pub mod zh;

pub use geo::*;
pub use time::*;
