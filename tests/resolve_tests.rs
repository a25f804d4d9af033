mod common;

use std::collections::HashMap;

use railwise::resolve::Resolver;

fn fixture() -> railwise::model::Network {
    common::network(&common::snapshot(
        &[
            ("central", "中环|Central", 0.0, 0.0, &[]),
            ("eastgate", "东门|East Gate/EG", 500.0, 0.0, &[]),
            ("harbor", "海港城|Harbor City", 0.0, 500.0, &[]),
        ],
        vec![],
    ))
}

fn resolver() -> Resolver {
    Resolver::new(&HashMap::new())
}

#[test]
fn resolves_primary_name() {
    let network = fixture();
    let index = resolver().resolve(&network, "中环").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "central");
}

#[test]
fn resolves_full_name() {
    let network = fixture();
    let index = resolver().resolve(&network, "东门|East Gate/EG").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "eastgate");
}

#[test]
fn resolves_segment_after_pipe() {
    let network = fixture();
    let index = resolver().resolve(&network, "east gate/eg").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "eastgate");
}

#[test]
fn resolves_short_form_after_slash() {
    let network = fixture();
    let index = resolver().resolve(&network, "EG").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "eastgate");
}

#[test]
fn resolves_case_insensitively() {
    let network = fixture();
    let index = resolver().resolve(&network, "CENTRAL").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "central");
}

#[test]
fn resolves_traditional_spelling_of_simplified_name() {
    let network = fixture();
    let index = resolver().resolve(&network, "東門").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "eastgate");
}

#[test]
fn resolves_through_alias() {
    let network = fixture();
    let mut aliases = HashMap::new();
    aliases.insert("hc".to_string(), "harbor city".to_string());
    let resolver = Resolver::new(&aliases);
    let index = resolver.resolve(&network, "HC").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "harbor");
}

#[test]
fn fuzzy_fallback_catches_typos() {
    let network = fixture();
    let index = resolver().resolve(&network, "harbor cty").unwrap();
    assert_eq!(&*network.stations[index as usize].id, "harbor");
}

#[test]
fn empty_input_stays_unresolved() {
    let network = fixture();
    assert!(resolver().resolve(&network, "").is_none());
}

#[test]
fn disabling_fuzzy_requires_exact_match() {
    let network = fixture();
    assert!(
        resolver()
            .resolve_with(&network, "harbor cty", false)
            .is_none()
    );
}

#[test]
fn resolution_is_idempotent_over_station_names() {
    let network = fixture();
    let resolver = resolver();
    for station in network.stations.iter() {
        let index = resolver.resolve(&network, &station.name).unwrap();
        assert_eq!(index, station.index);
    }
}

#[test]
fn memoised_lookup_matches_first_answer() {
    let network = fixture();
    let resolver = resolver();
    let first = resolver.resolve(&network, "harbor cty");
    let second = resolver.resolve(&network, "harbor cty");
    assert_eq!(first, second);
}

#[test]
fn station_num_round_trips_to_id() {
    let network = fixture();
    for station in network.stations.iter() {
        let found = network.station_by_num(station.station_num).unwrap();
        assert_eq!(found.id, station.id);
    }
}
