// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ancestor-chain name matching and floor-number extraction
//!
//! Building-model exporters inconsistently place semantic names on the mesh
//! itself, on a wrapping group, or in metadata. Matching walks the full
//! ancestor chain so every convention is caught without per-model
//! configuration.

use crate::scene::{NodeId, SceneSnapshot};
use regex::Regex;
use std::sync::OnceLock;

/// Test `node` and each of its ancestors against `patterns`.
///
/// Both the node name and the metadata name are tested at every level.
/// Returns on the first match; pure function of the graph and pattern set.
pub fn matches_any(snapshot: &SceneSnapshot, node: NodeId, patterns: &[Regex]) -> bool {
    for id in snapshot.ancestors(node) {
        let n = snapshot.node(id);
        if patterns.iter().any(|p| p.is_match(&n.name)) {
            return true;
        }
        if let Some(user_name) = &n.user_data_name {
            if patterns.iter().any(|p| p.is_match(user_name)) {
                return true;
            }
        }
    }
    false
}

/// Naming conventions a floor number can be extracted from, in priority order
fn floor_number_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)floor[\s_-]*(\d+)").expect("valid pattern"),
            Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)?[\s_-]*floor").expect("valid pattern"),
            Regex::new(r"(?i)level[\s_-]*(\d+)").expect("valid pattern"),
            Regex::new(r"(\d+)$").expect("valid pattern"),
        ]
    })
}

/// Extract a floor number from a node name.
///
/// Tries each naming convention in order and takes the first match's
/// captured digits. Returns `None` when no convention applies, in which
/// case grouping falls back to the full name as key.
pub fn floor_number(name: &str) -> Option<u32> {
    for pattern in floor_number_patterns() {
        if let Some(caps) = pattern.captures(name) {
            if let Some(digits) = caps.get(1) {
                if let Ok(n) = digits.as_str().parse() {
                    return Some(n);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    fn compile(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[test]
    fn matches_own_name() {
        let mut snapshot = SceneSnapshot::new();
        let node = snapshot.push(SceneNode {
            name: "Entrance_Door_Frame".into(),
            is_mesh: true,
            ..Default::default()
        });
        assert!(matches_any(&snapshot, node, &compile(&["(?i)door"])));
        assert!(!matches_any(&snapshot, node, &compile(&["(?i)window"])));
    }

    #[test]
    fn matches_ancestor_name() {
        let mut snapshot = SceneSnapshot::new();
        let group = snapshot.push(SceneNode {
            name: "Windows_North".into(),
            ..Default::default()
        });
        let mesh = snapshot.push(SceneNode {
            name: "Mesh_017".into(),
            parent: Some(group),
            is_mesh: true,
            ..Default::default()
        });
        assert!(matches_any(&snapshot, mesh, &compile(&["(?i)window"])));
    }

    #[test]
    fn matches_user_data_name() {
        let mut snapshot = SceneSnapshot::new();
        let mesh = snapshot.push(SceneNode {
            name: "Object_3".into(),
            user_data_name: Some("door_leaf".into()),
            is_mesh: true,
            ..Default::default()
        });
        assert!(matches_any(&snapshot, mesh, &compile(&["(?i)door"])));
    }

    #[test]
    fn floor_number_conventions() {
        assert_eq!(floor_number("Floor_1_Wall"), Some(1));
        assert_eq!(floor_number("floor 12"), Some(12));
        assert_eq!(floor_number("2nd_floor"), Some(2));
        assert_eq!(floor_number("Level-3"), Some(3));
        assert_eq!(floor_number("Storey7"), Some(7));
        assert_eq!(floor_number("GroundFloor"), None);
        assert_eq!(floor_number(""), None);
    }

    #[test]
    fn floor_prefix_wins_over_trailing_digits() {
        // "floor" patterns are tried before the bare trailing-number fallback
        assert_eq!(floor_number("Floor_2_Section_9"), Some(2));
    }
}
