use serde::Serialize;

use crate::model::{Circular, Network, Route, Station, TransportType};

pub const WALK_COLOR: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CircularKind {
    Clockwise,
    Anticlockwise,
}

impl CircularKind {
    pub fn from_circular(circular: Circular) -> Option<Self> {
        match circular {
            Circular::None => None,
            Circular::Clockwise => Some(Self::Clockwise),
            Circular::Anticlockwise => Some(Self::Anticlockwise),
        }
    }

    const fn prefix(&self) -> &'static str {
        match self {
            Self::Clockwise => "(顺时针)",
            Self::Anticlockwise => "(逆时针)",
        }
    }

    const fn suffix(&self) -> &'static str {
        match self {
            Self::Clockwise => "(Clockwise)",
            Self::Anticlockwise => "(Anticlockwise)",
        }
    }
}

/// Direction signage for a leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Terminus {
    /// Plain terminus of a linear route (or of a walk, where `alt` is just
    /// "Walk").
    Linear { primary: String, alt: String },
    /// Circular service named after its terminus.
    Circular {
        kind: CircularKind,
        primary: String,
        alt: String,
    },
    /// Circular service named after the next station it continues via.
    CircularVia {
        kind: CircularKind,
        primary: String,
        alt: String,
    },
}

impl Terminus {
    /// The two display strings the renderer prints, prefixes applied.
    pub fn render(&self) -> (String, String) {
        match self {
            Terminus::Linear { primary, alt } => (primary.clone(), alt.clone()),
            Terminus::Circular { kind, primary, alt } => (
                format!("{} {}", kind.prefix(), primary),
                format!("{} {}", alt, kind.suffix()),
            ),
            Terminus::CircularVia { kind, primary, alt } => (
                format!("{} 经由{}", kind.prefix(), primary),
                format!("{} Via {}", kind.suffix(), alt),
            ),
        }
    }
}

/// One rendered step of a journey. Walk legs leave `kind` and `platform`
/// unset and use the black walk colour.
#[derive(Debug, Clone, Serialize)]
pub struct Leg {
    pub from: String,
    pub to: String,
    pub color: String,
    pub route: String,
    pub terminus: Terminus,
    pub ride_seconds: f64,
    pub waiting_seconds: f64,
    pub interval: Option<u32>,
    pub kind: Option<TransportType>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Journey {
    pub legs: Vec<Leg>,
    pub total_seconds: u32,
    pub riding_seconds: u32,
    pub waiting_seconds: u32,
}

/// Terminus name pair of a station: the segment before the first `|` and
/// the second segment.
pub(crate) fn terminus_names(station: &Station) -> (String, String) {
    if !station.name.contains('|') {
        let name = station.name.to_string();
        (name.clone(), name)
    } else {
        (
            station.primary_name().to_string(),
            station.alt_name().to_string(),
        )
    }
}

/// Signage for boarding `route` at `from_station`. Graph-mode legs label a
/// circular service by the next station it continues via; a circular route
/// boarded at its own final stop falls back to the terminus form.
pub(crate) fn ride_terminus(
    network: &Network,
    route: &Route,
    from_station: u32,
    allow_via: bool,
) -> Terminus {
    let terminus_station = &network.stations[route.terminus() as usize];
    let (primary, alt) = terminus_names(terminus_station);
    let Some(kind) = CircularKind::from_circular(route.circular) else {
        return Terminus::Linear { primary, alt };
    };
    if allow_via && let Some(next) = route.next_after(from_station) {
        let (via_primary, via_alt) = terminus_names(&network.stations[next as usize]);
        return Terminus::CircularVia {
            kind,
            primary: via_primary,
            alt: via_alt,
        };
    }
    Terminus::Circular { kind, primary, alt }
}

/// Ordering piece for natural sorting: digit runs compare numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum NaturalPiece {
    Number(u64),
    Text(String),
}

pub(crate) fn natural_key(s: &str) -> Vec<NaturalPiece> {
    let mut pieces = Vec::new();
    let mut digits = String::new();
    let mut text = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                pieces.push(NaturalPiece::Text(std::mem::take(&mut text)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                let number = digits.parse().unwrap_or(u64::MAX);
                pieces.push(NaturalPiece::Number(number));
                digits.clear();
            }
            text.push(c);
        }
    }
    if !text.is_empty() {
        pieces.push(NaturalPiece::Text(text));
    }
    if !digits.is_empty() {
        pieces.push(NaturalPiece::Number(digits.parse().unwrap_or(u64::MAX)));
    }
    pieces
}

#[test]
fn natural_key_orders_numbers_numerically() {
    assert!(natural_key("Line 2") < natural_key("Line 10"));
    assert!(natural_key("Line 10") < natural_key("Line 10a"));
}

#[test]
fn terminus_render_circular_via() {
    let terminus = Terminus::CircularVia {
        kind: CircularKind::Clockwise,
        primary: "中环".to_string(),
        alt: "Central".to_string(),
    };
    let (primary, alt) = terminus.render();
    assert_eq!(primary, "(顺时针) 经由中环");
    assert_eq!(alt, "(Clockwise) Via Central");
}

#[test]
fn terminus_render_circular() {
    let terminus = Terminus::Circular {
        kind: CircularKind::Anticlockwise,
        primary: "中环".to_string(),
        alt: "Central".to_string(),
    };
    let (primary, alt) = terminus.render();
    assert_eq!(primary, "(逆时针) 中环");
    assert_eq!(alt, "Central (Anticlockwise)");
}
