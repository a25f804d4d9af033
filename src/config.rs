use std::{collections::HashMap, env, path::PathBuf, time::Duration};

/// Everything a query run can be tuned by. Defaults mirror a plain
/// interactive query: boats and high-speed rail allowed, no cross-country
/// walking, nothing avoided.
#[derive(Debug, Clone)]
pub struct Config {
    /// Route names to drop, any spelling variant, case-insensitive, with
    /// simplified/traditional equivalence.
    pub ignored_lines: Vec<String>,
    /// Routes the operator has permanently closed off; always dropped, and
    /// part of the cache key.
    pub permanent_ignored_lines: Vec<String>,
    /// Whitelist for realtime queries; suppresses the ignore lists when
    /// non-empty.
    pub only_lines: Vec<String>,
    /// Station names (resolved like query endpoints) that act as if absent.
    pub avoid_stations: Vec<String>,
    pub calculate_high_speed: bool,
    pub calculate_boat: bool,
    pub calculate_walking_wild: bool,
    pub only_lrt: bool,
    /// Cap on cross-country walk length, blocks.
    pub max_wild_blocks: f64,
    /// Realtime search horizon, hours.
    pub max_hour: u32,
    /// Extra declared interchange pairs, by station display name.
    pub transfer_addition: HashMap<String, Vec<String>>,
    /// Extra cross-country pairs, by station display name.
    pub wild_addition: HashMap<String, Vec<String>>,
    /// User nickname -> canonical station name, both lowercased at use.
    pub aliases: HashMap<String, String>,
    /// Keep forced platform splits as separate realtime legs.
    pub detail: bool,
    /// Wall-clock budget for the realtime scan.
    pub timeout: Duration,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignored_lines: vec![],
            permanent_ignored_lines: vec![],
            only_lines: vec![],
            avoid_stations: vec![],
            calculate_high_speed: true,
            calculate_boat: true,
            calculate_walking_wild: false,
            only_lrt: false,
            max_wild_blocks: 1500.0,
            max_hour: 3,
            transfer_addition: HashMap::new(),
            wild_addition: HashMap::new(),
            aliases: HashMap::new(),
            detail: false,
            timeout: Duration::from_secs(120),
            cache_dir: env::temp_dir().join("railwise"),
            use_cache: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_ignored_lines(mut self, lines: Vec<String>) -> Self {
        self.ignored_lines = lines;
        self
    }

    pub fn with_permanent_ignored_lines(mut self, lines: Vec<String>) -> Self {
        self.permanent_ignored_lines = lines;
        self
    }

    pub fn with_only_lines(mut self, lines: Vec<String>) -> Self {
        self.only_lines = lines;
        self
    }

    pub fn with_avoid_stations(mut self, stations: Vec<String>) -> Self {
        self.avoid_stations = stations;
        self
    }

    pub fn with_high_speed(mut self, allowed: bool) -> Self {
        self.calculate_high_speed = allowed;
        self
    }

    pub fn with_boat(mut self, allowed: bool) -> Self {
        self.calculate_boat = allowed;
        self
    }

    pub fn with_walking_wild(mut self, allowed: bool) -> Self {
        self.calculate_walking_wild = allowed;
        self
    }

    pub fn with_only_lrt(mut self, only: bool) -> Self {
        self.only_lrt = only;
        self
    }

    pub fn with_max_wild_blocks(mut self, blocks: f64) -> Self {
        self.max_wild_blocks = blocks;
        self
    }

    pub fn with_max_hour(mut self, hours: u32) -> Self {
        self.max_hour = hours;
        self
    }

    pub fn with_transfer_addition(mut self, addition: HashMap<String, Vec<String>>) -> Self {
        self.transfer_addition = addition;
        self
    }

    pub fn with_wild_addition(mut self, addition: HashMap<String, Vec<String>>) -> Self {
        self.wild_addition = addition;
        self
    }

    pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_detail(mut self, detail: bool) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// The user and permanent ignore lists combined, lowercased and trimmed,
    /// empties dropped, ready for route matching.
    pub fn effective_ignored(&self) -> Vec<String> {
        self.ignored_lines
            .iter()
            .chain(self.permanent_ignored_lines.iter())
            .map(|line| line.to_lowercase().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn effective_only(&self) -> Vec<String> {
        self.only_lines
            .iter()
            .map(|line| line.to_lowercase().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Whether a build with this configuration may be memoised: every
    /// filter must be at its default apart from the two booleans that are
    /// part of the cache key.
    pub fn cacheable(&self) -> bool {
        self.use_cache
            && self.ignored_lines.is_empty()
            && self.only_lines.is_empty()
            && self.avoid_stations.is_empty()
            && self.calculate_boat
            && !self.only_lrt
    }
}
