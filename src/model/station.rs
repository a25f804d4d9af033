use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::geo::Position;

/// One physical station of the network.
///
/// Display names follow the map convention: `|` separates localisations
/// (primary Chinese name first), and a trailing segment may itself hold a
/// `/`-separated short form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: Arc<str>,
    pub name: Arc<str>,
    /// Absent for stations that never appear on a route; such stations are
    /// unusable for pathfinding.
    pub position: Option<Position>,
    /// Arena indices of stations reachable by a declared interchange walk.
    pub connections: Vec<u32>,
    /// Short numeric code assigned at ingest, used to pack station ids into
    /// fixed-width integers for the timetable algorithm.
    pub station_num: u32,
    pub index: u32,
}

impl Station {
    /// Name segment before the first `|`.
    pub fn primary_name(&self) -> &str {
        self.name.split('|').next().unwrap_or(&self.name)
    }

    /// Second name segment, falling back to the primary when the name has a
    /// single segment.
    pub fn alt_name(&self) -> &str {
        let mut split = self.name.split('|');
        let first = split.next().unwrap_or(&self.name);
        split.next().unwrap_or(first)
    }

    /// Full name with separators flattened to spaces, for leg endpoints.
    pub fn display_name(&self) -> String {
        self.name.replace('|', " ")
    }

    /// The candidate spellings a user-entered name is matched against:
    /// the full name, the segment after the last `|`, the short form after
    /// the last `/` within it, and the segment before the first `|`.
    pub fn name_candidates(&self) -> [&str; 4] {
        let full: &str = &self.name;
        let after_pipe = full.rsplit('|').next().unwrap_or(full);
        let after_slash = after_pipe.rsplit('/').next().unwrap_or(after_pipe);
        let before_pipe = full.split('|').next().unwrap_or(full);
        [full, after_pipe, after_slash, before_pipe]
    }
}

#[test]
fn name_candidates_cover_all_variants() {
    let station = Station {
        id: "s1".into(),
        name: "新京报亭|Xinjing Kiosk/XJK".into(),
        position: None,
        connections: vec![],
        station_num: 0,
        index: 0,
    };
    let [full, after_pipe, after_slash, before_pipe] = station.name_candidates();
    assert_eq!(full, "新京报亭|Xinjing Kiosk/XJK");
    assert_eq!(after_pipe, "Xinjing Kiosk/XJK");
    assert_eq!(after_slash, "XJK");
    assert_eq!(before_pipe, "新京报亭");
}

#[test]
fn alt_name_falls_back_to_primary() {
    let station = Station {
        id: "s1".into(),
        name: "Solo".into(),
        position: None,
        connections: vec![],
        station_num: 0,
        index: 0,
    };
    assert_eq!(station.alt_name(), "Solo");
}
