use std::time::{Duration, Instant};

use thiserror::Error as ThisError;

use crate::timetable::Connection;

const NONE: u32 = u32::MAX;
/// Wall-clock sampling period of the hot loop, a power of two so the check
/// compiles to a mask.
const TIMEOUT_STRIDE: usize = 16 * 1024;

#[derive(ThisError, Debug)]
#[error("connection scan exceeded its wall-clock budget")]
pub struct ScanTimeout;

/// Connection Scan over a departure-time-sorted connection list.
///
/// Operates on packed station codes so bookkeeping is two flat arrays. The
/// only precondition is the sort order of `connections`.
pub struct Csa<'a> {
    connections: &'a [Connection],
    station_count: usize,
    timeout: Duration,
}

impl<'a> Csa<'a> {
    pub fn new(connections: &'a [Connection], station_count: usize, timeout: Duration) -> Self {
        Self {
            connections,
            station_count,
            timeout,
        }
    }

    /// Earliest-arrival scan from `departure` station code to `arrival`,
    /// boarding no earlier than `departure_time`. Returns the chronological
    /// indices of the connections used, empty when the destination was
    /// never reached.
    pub fn compute(
        &self,
        departure: u32,
        arrival: u32,
        departure_time: u32,
    ) -> Result<Vec<usize>, ScanTimeout> {
        let mut earliest_arrival = vec![NONE; self.station_count];
        let mut in_connection = vec![NONE; self.station_count];

        let (dep, arr) = (departure as usize, arrival as usize);
        if dep >= self.station_count || arr >= self.station_count {
            return Ok(vec![]);
        }
        earliest_arrival[dep] = departure_time;

        let started = Instant::now();
        let mut earliest = NONE;
        let mut until_check = TIMEOUT_STRIDE;
        for (i, connection) in self.connections.iter().enumerate() {
            until_check -= 1;
            if until_check == 0 {
                until_check = TIMEOUT_STRIDE;
                if started.elapsed() > self.timeout {
                    return Err(ScanTimeout);
                }
            }

            let c_dep = connection.dep as usize;
            let c_arr = connection.arr as usize;
            if connection.dep_time >= earliest_arrival[c_dep]
                && connection.arr_time < earliest_arrival[c_arr]
            {
                earliest_arrival[c_arr] = connection.arr_time;
                in_connection[c_arr] = i as u32;
                if c_arr == arr {
                    earliest = earliest.min(connection.arr_time);
                }
            } else if connection.dep_time >= earliest {
                break;
            }
        }

        let mut path = Vec::new();
        let mut at = in_connection[arr];
        while at != NONE {
            path.push(at as usize);
            at = in_connection[self.connections[at as usize].dep as usize];
        }
        path.reverse();
        Ok(path)
    }
}
