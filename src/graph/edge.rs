use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::geo::round_blocks;

/// What a multigraph edge is ridden as: one named route, or the set of
/// parallel services (possibly including a walking alternative) that a
/// waiting-mode build combined into a single edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Single(Arc<str>),
    Parallel(Vec<Arc<str>>),
}

impl Label {
    pub fn names(&self) -> &[Arc<str>] {
        match self {
            Label::Single(name) => std::slice::from_ref(name),
            Label::Parallel(names) => names,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| &**n == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideEdge {
    /// Ride plus expected waiting, seconds.
    pub weight: f64,
    /// The waiting share of `weight`.
    pub waiting: f64,
    pub label: Label,
}

/// Label of a declared interchange walk.
pub fn transfer_walk_label(blocks: f64) -> Arc<str> {
    format!("出站换乘步行 Walk {}m", round_blocks(blocks)).into()
}

/// Label of a cross-country walk.
pub fn wild_walk_label(blocks: f64) -> Arc<str> {
    format!("步行 Walk {}m", round_blocks(blocks)).into()
}

#[test]
fn labels_render_distance() {
    assert_eq!(&*transfer_walk_label(21.585), "出站换乘步行 Walk 21.58m");
    assert_eq!(&*wild_walk_label(100.0), "步行 Walk 100m");
}

#[test]
fn parallel_label_contains() {
    let label = Label::Parallel(vec!["R1".into(), "R2".into()]);
    assert!(label.contains("R2"));
    assert!(!label.contains("R3"));
}
