mod graph_path;
mod leg;
mod realtime;

pub use graph_path::*;
pub use leg::*;
pub use realtime::*;

use thiserror::Error as ThisError;

/// How a query weighs the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pure ride time, no waiting.
    Theory,
    /// Ride time plus expected waiting from route headways.
    Waiting,
    /// Connection scan over scheduled departures.
    Realtime,
}

/// Query outcomes a renderer needs to tell apart. The first three are
/// recoverable: bad input, an actually disconnected pair, and a scan that
/// ran out of wall-clock budget.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Station name did not match any station")]
    StationUnresolved,
    #[error("No path between the stations")]
    NoPath,
    #[error("Pathfinding timed out")]
    Timeout,
    #[error(transparent)]
    Data(#[from] crate::model::Error),
}
