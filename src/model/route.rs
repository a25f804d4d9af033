use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::zh;

/// The eight transport kinds a route can run as. Nominal speeds are only
/// used to synthesise a hop duration when the recorded one is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    TrainNormal,
    TrainLightRail,
    TrainHighSpeed,
    BoatNormal,
    BoatLightRail,
    BoatHighSpeed,
    CableCarNormal,
    AirplaneNormal,
}

impl TransportType {
    /// Nominal cruise speed in blocks per second.
    pub const fn nominal_speed(&self) -> f64 {
        match self {
            TransportType::TrainNormal => 14.0,
            TransportType::TrainLightRail => 11.0,
            TransportType::TrainHighSpeed => 40.0,
            TransportType::BoatNormal => 10.0,
            TransportType::BoatLightRail => 10.0,
            TransportType::BoatHighSpeed => 13.0,
            TransportType::CableCarNormal => 8.0,
            TransportType::AirplaneNormal => 70.0,
        }
    }

    pub const fn is_boat(&self) -> bool {
        matches!(
            self,
            TransportType::BoatNormal | TransportType::BoatLightRail | TransportType::BoatHighSpeed
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TransportType::TrainNormal => "train_normal",
            TransportType::TrainLightRail => "train_light_rail",
            TransportType::TrainHighSpeed => "train_high_speed",
            TransportType::BoatNormal => "boat_normal",
            TransportType::BoatLightRail => "boat_light_rail",
            TransportType::BoatHighSpeed => "boat_high_speed",
            TransportType::CableCarNormal => "cable_car_normal",
            TransportType::AirplaneNormal => "airplane_normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Circular {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "cw")]
    Clockwise,
    #[serde(rename = "ccw")]
    Anticlockwise,
}

impl Circular {
    pub const fn is_circular(&self) -> bool {
        !matches!(self, Circular::None)
    }
}

/// One scheduled visit of a route at a station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStop {
    /// Station arena index.
    pub station: u32,
    pub platform: Arc<str>,
    /// Dwell time at this stop, seconds.
    pub dwell: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Arc<str>,
    /// Raw name: `|`-separated localisations, with an optional `||` splitting
    /// the human name from an internal branch tag.
    pub name: Arc<str>,
    pub number: Arc<str>,
    /// 24-bit packed colour.
    pub color: u32,
    pub circular: Circular,
    pub kind: TransportType,
    pub stops: Vec<RouteStop>,
    /// Per-hop ride durations in seconds; `durations.len() == stops.len() - 1`.
    pub durations: Vec<f64>,
    pub index: u32,
}

impl Route {
    /// `number` plus the name before any `||` branch tag, separators
    /// flattened, the way legs display a route.
    pub fn display_name(&self) -> String {
        let base = self.name.split("||").next().unwrap_or(&self.name);
        format!("{} {}", self.number, base)
            .trim()
            .replace('|', " ")
    }

    pub fn color_hex(&self) -> String {
        format!("#{:06x}", self.color & 0xff_ff_ff)
    }

    /// Arena index of the final stop.
    pub fn terminus(&self) -> u32 {
        self.stops[self.stops.len() - 1].station
    }

    /// The stop visited directly after the first visit of `station`, if any.
    pub fn next_after(&self, station: u32) -> Option<u32> {
        let at = self.stops.iter().position(|s| s.station == station)?;
        if at + 1 < self.stops.len() {
            Some(self.stops[at + 1].station)
        } else {
            None
        }
    }

    /// Spellings a route filter entry may refer to this route by: the full
    /// name, the part before the first `|`, the part before `||`, the
    /// embedded English name, and each of those suffixed with the number.
    pub fn filter_names(&self) -> Vec<String> {
        let n: &str = &self.name;
        let mut names = vec![
            n.to_string(),
            n.split('|').next().unwrap_or(n).to_string(),
            n.split("||").next().unwrap_or(n).to_string(),
        ];

        let pipes = n.matches('|').count();
        let has_tag = n.contains("||");
        if (has_tag && pipes > 2) || (!has_tag && pipes > 0) {
            let eng = n.split('|').nth(1).unwrap_or("");
            if !eng.is_empty() {
                names.push(eng.to_string());
            }
        }

        let number: &str = &self.number;
        if !number.trim().is_empty() {
            let with_number: Vec<String> = names[1..]
                .iter()
                .map(|name| format!("{} {}", name, number))
                .collect();
            names.extend(with_number);
        }

        names
            .into_iter()
            .map(|name| name.to_lowercase().trim().to_string())
            .collect()
    }

    /// Whether a filter configuration drops this route. `only` acts as a
    /// whitelist and suppresses `ignored` when non-empty. Both lists must
    /// already be lowercased and trimmed.
    pub fn is_excluded(&self, ignored: &[String], only: &[String]) -> bool {
        let targets = if only.is_empty() { ignored } else { only };
        if targets.is_empty() {
            return !only.is_empty();
        }
        let hit = self
            .filter_names()
            .iter()
            .any(|name| zh::matches_any(name, targets));
        if only.is_empty() { hit } else { !hit }
    }
}

#[test]
fn display_name_strips_branch_tag() {
    let route = test_route("观塘线||分支A|Kwun Tong Line", "KTL");
    assert_eq!(route.display_name(), "KTL 观塘线");
}

#[test]
fn filter_names_include_number_forms() {
    let route = test_route("环线|Loop Line", "7");
    let names = route.filter_names();
    assert!(names.contains(&"环线|loop line".to_string()));
    assert!(names.contains(&"环线".to_string()));
    assert!(names.contains(&"loop line".to_string()));
    assert!(names.contains(&"loop line 7".to_string()));
}

#[test]
fn excluded_by_simplified_equivalence() {
    let route = test_route("環線|Loop Line", "");
    let ignored = vec!["环线".to_string()];
    assert!(route.is_excluded(&ignored, &[]));
}

#[test]
fn only_lines_whitelist_inverts() {
    let route = test_route("环线|Loop Line", "");
    let only = vec!["loop line".to_string()];
    assert!(!route.is_excluded(&[], &only));
    assert!(route.is_excluded(&[], &["other".to_string()]));
}

#[cfg(test)]
fn test_route(name: &str, number: &str) -> Route {
    Route {
        id: "r1".into(),
        name: name.into(),
        number: number.into(),
        color: 0xff0000,
        circular: Circular::None,
        kind: TransportType::TrainNormal,
        stops: vec![],
        durations: vec![],
        index: 0,
    }
}
