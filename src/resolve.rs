use std::{
    collections::HashMap,
    sync::RwLock,
};

use tracing::debug;

use crate::{
    model::Network,
    shared::{fuzzy, zh},
};

const FUZZY_CUTOFF: f64 = 0.2;

/// Maps free-form user input to a station arena index.
///
/// Matching goes exact-first over every display-name variant of stations
/// that have coordinates, with spelling variants generated by
/// simplified/traditional conversion, then falls back to a fuzzy scan.
/// Positive results are memoised for the lifetime of the resolver; a stale
/// hit is acceptable, the map is never invalidated.
pub struct Resolver {
    aliases: HashMap<String, String>,
    cache: RwLock<HashMap<String, u32>>,
}

impl Resolver {
    pub fn new(aliases: &HashMap<String, String>) -> Self {
        let aliases = aliases
            .iter()
            .map(|(nick, real)| (nick.to_lowercase(), real.to_lowercase()))
            .collect();
        Self {
            aliases,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, network: &Network, input: &str) -> Option<u32> {
        self.resolve_with(network, input, true)
    }

    pub fn resolve_with(&self, network: &Network, input: &str, fuzzy_compare: bool) -> Option<u32> {
        let mut wanted = input.to_lowercase();
        if let Some(real) = self.aliases.get(&wanted) {
            wanted = real.clone();
        }

        if let Ok(cache) = self.cache.read()
            && let Some(&index) = cache.get(&wanted)
        {
            return Some(index);
        }

        let mut variants: Vec<String> = vec![wanted.clone()];
        let traditional = zh::to_traditional(&wanted);
        if !variants.contains(&traditional) {
            variants.push(traditional);
        }
        let simplified = zh::to_simplified(&wanted);
        if !variants.contains(&simplified) {
            variants.push(simplified);
        }

        let mut output = None;
        'stations: for station in network.stations.iter() {
            if station.position.is_none() {
                continue;
            }
            for candidate in station.name_candidates() {
                let candidate = candidate.to_lowercase();
                if variants.iter().any(|variant| *variant == candidate) {
                    output = Some(station.index);
                    break 'stations;
                }
            }
        }

        if output.is_none() && fuzzy_compare {
            output = self.fuzzy_match(network, &variants);
        }

        if let Some(index) = output
            && let Ok(mut cache) = self.cache.write()
        {
            cache.insert(wanted, index);
        }

        output
    }

    /// Best normalized-similarity match over full station names, subject to
    /// the cutoff. The first station encountered wins at equal ratio.
    fn fuzzy_match(&self, network: &Network, variants: &[String]) -> Option<u32> {
        let mut best: Option<(f64, u32)> = None;
        for variant in variants {
            for station in network.stations.iter() {
                if station.position.is_none() {
                    continue;
                }
                let ratio = fuzzy::score(variant, &station.name.to_lowercase());
                if ratio < FUZZY_CUTOFF {
                    continue;
                }
                let improved = match best {
                    Some((best_ratio, _)) => ratio > best_ratio,
                    None => true,
                };
                if improved {
                    best = Some((ratio, station.index));
                }
            }
        }
        if let Some((ratio, index)) = best {
            debug!(ratio, "fuzzy name fallback used");
            return Some(index);
        }
        None
    }
}
