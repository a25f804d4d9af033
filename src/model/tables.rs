use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::model::{Error, Network};

/// Average headway per route name, seconds. Only consulted by waiting-mode
/// queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intervals(HashMap<String, u32>);

impl Intervals {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read(path)?;
        Ok(Self(serde_json::from_slice(&raw)?))
    }

    pub fn get(&self, route_name: &str) -> Option<u32> {
        self.0.get(route_name).copied()
    }

    pub fn set(&mut self, route_name: &str, seconds: u32) {
        self.0.insert(route_name.to_string(), seconds);
    }

    pub fn contains(&self, route_name: &str) -> bool {
        self.0.contains_key(route_name)
    }
}

impl FromIterator<(String, u32)> for Intervals {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Scheduled dispatch times per route id, ascending seconds of day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Departures(HashMap<String, Vec<u32>>);

impl Departures {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read(path)?;
        Ok(Self(serde_json::from_slice(&raw)?))
    }

    pub fn get(&self, route_id: &str) -> Option<&[u32]> {
        self.0.get(route_id).map(Vec::as_slice)
    }

    pub fn insert(&mut self, route_id: &str, times: Vec<u32>) {
        self.0.insert(route_id.to_string(), times);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.0.iter().map(|(id, times)| (id.as_str(), times.as_slice()))
    }
}

/// Rounds a headway to the nearest ten seconds with a ten-second floor.
pub fn round_ten(n: f64) -> u32 {
    let rounded = ((n / 10.0).round() * 10.0) as i64;
    if rounded > 0 { rounded as u32 } else { 10 }
}

/// Derives a headway table from scheduled departures: the low median of the
/// circular gaps between consecutive dispatches across one day, per route.
/// Route ids missing from the network are skipped.
pub fn intervals_from_departures(departures: &Departures, network: &Network) -> Intervals {
    let mut intervals = Intervals::default();
    for (route_id, times) in departures.iter() {
        if times.is_empty() {
            continue;
        }
        let Some(route) = network.route_by_id(route_id) else {
            continue;
        };

        let mut gaps: Vec<u32> = Vec::with_capacity(times.len());
        for (i, &dep) in times.iter().enumerate() {
            let next = if i + 1 == times.len() {
                times[0] + crate::shared::time::SECONDS_PER_DAY
            } else {
                times[i + 1]
            };
            gaps.push(next - dep);
        }
        gaps.sort_unstable();
        let median = gaps[(gaps.len() - 1) / 2];
        intervals.set(&route.name, round_ten(median as f64));
    }
    intervals
}

#[test]
fn round_ten_nearest() {
    assert_eq!(round_ten(94.0), 90);
    assert_eq!(round_ten(95.0), 100);
    assert_eq!(round_ten(120.0), 120);
}

#[test]
fn round_ten_floors_at_ten() {
    assert_eq!(round_ten(0.0), 10);
    assert_eq!(round_ten(3.0), 10);
}
