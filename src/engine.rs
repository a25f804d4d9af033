use std::{
    path::Path,
    time::Instant,
};

use tracing::info;

use crate::{
    cache::{self, CacheKey},
    config::Config,
    graph::{self, GraphBuild},
    model::{self, Departures, Intervals, Network, Snapshot},
    query::{self, Journey, Mode, journey_from_connections, journey_from_path},
    resolve::Resolver,
    shared::time::{SECONDS_PER_DAY, Time},
    timetable::{self, Csa, Timetable},
};

/// The engine facade: a loaded network plus its tables, answering route
/// queries. Queries take `&self`; the only shared mutable state is the
/// resolver's memo, which is internally locked.
pub struct Pathfinder {
    config: Config,
    resolver: Resolver,
    network: Option<Network>,
    snapshot_version: Option<String>,
    intervals: Option<Intervals>,
    intervals_version: Option<String>,
    departures: Option<Departures>,
    departures_version: Option<String>,
}

impl Pathfinder {
    pub fn new(config: Config) -> Self {
        let resolver = Resolver::new(&config.aliases);
        Self {
            config,
            resolver,
            network: None,
            snapshot_version: None,
            intervals: None,
            intervals_version: None,
            departures: None,
            departures_version: None,
        }
    }

    /// Loads and normalises a station-and-route snapshot. Routes with
    /// missing hop durations are repaired from nominal speeds and the
    /// repaired snapshot is written back, so later loads are pure lookups.
    pub fn with_snapshot<P: AsRef<Path>>(mut self, path: P) -> Result<Self, model::Error> {
        let path = path.as_ref();
        let now = Instant::now();
        let mut snapshot = Snapshot::load(path)?;
        if snapshot.synthesize_durations() > 0 {
            snapshot.save(path)?;
        }
        let network = Network::from_snapshot(&snapshot, self.config.max_wild_blocks)?;
        info!(
            stations = network.stations.len(),
            routes = network.routes.len(),
            took = ?now.elapsed(),
            "loaded snapshot"
        );
        self.snapshot_version = cache::version_string(path);
        self.network = Some(network);
        Ok(self)
    }

    pub fn with_intervals<P: AsRef<Path>>(mut self, path: P) -> Result<Self, model::Error> {
        let path = path.as_ref();
        self.intervals = Some(Intervals::load(path)?);
        self.intervals_version = cache::version_string(path);
        Ok(self)
    }

    pub fn with_departures<P: AsRef<Path>>(mut self, path: P) -> Result<Self, model::Error> {
        let path = path.as_ref();
        self.departures = Some(Departures::load(path)?);
        self.departures_version = cache::version_string(path);
        Ok(self)
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Answers a route query. Realtime queries depart now; use
    /// [`Pathfinder::query_at`] for an explicit departure time.
    pub fn query(&self, start: &str, end: &str, mode: Mode) -> Result<Journey, query::Error> {
        match mode {
            Mode::Realtime => self.realtime(start, end, Time::now()),
            _ => self.graph_query(start, end, mode),
        }
    }

    /// Realtime query departing at an explicit time of day.
    pub fn query_at(&self, start: &str, end: &str, departure: Time) -> Result<Journey, query::Error> {
        self.realtime(start, end, departure)
    }

    fn endpoints(&self, network: &Network, start: &str, end: &str) -> Result<(u32, u32), query::Error> {
        let start = self
            .resolver
            .resolve(network, start)
            .ok_or(query::Error::StationUnresolved)?;
        let end = self
            .resolver
            .resolve(network, end)
            .ok_or(query::Error::StationUnresolved)?;
        if start == end {
            return Err(query::Error::StationUnresolved);
        }
        Ok((start, end))
    }

    fn graph_query(&self, start: &str, end: &str, mode: Mode) -> Result<Journey, query::Error> {
        let network = self.network.as_ref().ok_or(model::Error::MissingSnapshot)?;
        if mode == Mode::Waiting && self.intervals.is_none() {
            return Err(model::Error::MissingIntervals.into());
        }
        let (start, end) = self.endpoints(network, start, end)?;

        let build = self.graph_build(network, mode);
        let from = build.graph.node_index(start).ok_or(query::Error::NoPath)?;
        let to = build.graph.node_index(end).ok_or(query::Error::NoPath)?;
        let (total, path) =
            graph::shortest_path(&build.graph.graph, from, to).ok_or(query::Error::NoPath)?;

        let fallback = Intervals::default();
        let intervals = self.intervals.as_ref().unwrap_or(&fallback);
        Ok(journey_from_path(network, &build, intervals, &path, total))
    }

    fn graph_build(&self, network: &Network, mode: Mode) -> GraphBuild {
        let key = self.graph_cache_key(mode);
        if let Some(key) = &key
            && let Some(build) = cache::load::<GraphBuild>(&self.config.cache_dir, key)
        {
            return build;
        }

        let now = Instant::now();
        let build = graph::build_graph(
            network,
            &self.config,
            self.intervals.as_ref(),
            &self.resolver,
            mode,
        );
        info!(took = ?now.elapsed(), "graph build finished");

        if let Some(key) = &key {
            cache::store(&self.config.cache_dir, key, &build);
        }
        build
    }

    fn graph_cache_key(&self, mode: Mode) -> Option<CacheKey> {
        if mode != Mode::Waiting || !self.config.cacheable() {
            return None;
        }
        Some(CacheKey {
            prefix: '3',
            high_speed: self.config.calculate_high_speed,
            walking_wild: self.config.calculate_walking_wild,
            version1: self.snapshot_version.clone()?,
            version2: self.intervals_version.clone()?,
            permanent_ignored: self.config.permanent_ignored_lines.clone(),
        })
    }

    fn realtime(&self, start: &str, end: &str, departure: Time) -> Result<Journey, query::Error> {
        let network = self.network.as_ref().ok_or(model::Error::MissingSnapshot)?;
        let departures = self
            .departures
            .as_ref()
            .ok_or(model::Error::MissingDepartures)?;
        let (start, end) = self.endpoints(network, start, end)?;
        let departure_time = departure.as_seconds() % SECONDS_PER_DAY;

        let timetable = self.timetable_build(network, departures);
        let expansion = timetable::expand(
            network,
            &timetable,
            departures,
            &self.config,
            start,
            departure_time,
        );

        let station_count = network
            .stations
            .iter()
            .map(|station| station.station_num as usize + 1)
            .max()
            .unwrap_or_default();
        let scan = Csa::new(&expansion.connections, station_count, self.config.timeout);
        let start_num = network.stations[start as usize].station_num;
        let end_num = network.stations[end as usize].station_num;
        let path = scan
            .compute(start_num, end_num, departure_time)
            .map_err(|_| query::Error::Timeout)?;
        if path.is_empty() {
            return Err(query::Error::NoPath);
        }

        Ok(journey_from_connections(
            network,
            &expansion.connections,
            &path,
            &expansion.trips,
            departure_time,
            self.config.detail,
        ))
    }

    fn timetable_build(&self, network: &Network, departures: &Departures) -> Timetable {
        let key = self.timetable_cache_key();
        if let Some(key) = &key
            && let Some(timetable) = cache::load::<Timetable>(&self.config.cache_dir, key)
        {
            return timetable;
        }

        let now = Instant::now();
        let timetable =
            timetable::build_templates(network, departures, &self.config, &self.resolver);
        info!(took = ?now.elapsed(), "timetable build finished");

        if let Some(key) = &key {
            cache::store(&self.config.cache_dir, key, &timetable);
        }
        timetable
    }

    fn timetable_cache_key(&self) -> Option<CacheKey> {
        if !self.config.cacheable() {
            return None;
        }
        Some(CacheKey {
            prefix: '4',
            high_speed: self.config.calculate_high_speed,
            walking_wild: self.config.calculate_walking_wild,
            version1: self.snapshot_version.clone()?,
            version2: self.departures_version.clone()?,
            permanent_ignored: self.config.permanent_ignored_lines.clone(),
        })
    }
}
