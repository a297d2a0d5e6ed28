// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component type classifier
//!
//! Independent of floor grouping: a node may belong to several component
//! types at once, and classification never removes a node from its floor.

use crate::config::ComponentTypeSpec;
use crate::patterns::matches_any;
use crate::scene::{NodeId, SceneSnapshot};
use serde::{Deserialize, Serialize};

/// A component category with at least one matched node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentTypeDescriptor {
    /// Display label
    pub label: String,
    /// Stable key from the configured type
    pub key: String,
    /// Matched mesh nodes, in traversal order
    pub nodes: Vec<NodeId>,
}

/// Classify every mesh node against the configured component types.
///
/// Emits one descriptor per type with at least one match, preserving
/// configured type order.
pub fn classify_components(
    snapshot: &SceneSnapshot,
    types: &[ComponentTypeSpec],
) -> Vec<ComponentTypeDescriptor> {
    let mut buckets: Vec<Vec<NodeId>> = vec![Vec::new(); types.len()];
    for id in snapshot.mesh_ids() {
        for (bucket, spec) in buckets.iter_mut().zip(types) {
            if matches_any(snapshot, id, &spec.patterns) {
                bucket.push(id);
            }
        }
    }

    types
        .iter()
        .zip(buckets)
        .filter(|(_, nodes)| !nodes.is_empty())
        .map(|(spec, nodes)| ComponentTypeDescriptor {
            label: spec.label.clone(),
            key: spec.key.clone(),
            nodes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::scene::SceneNode;

    fn mesh(name: &str) -> SceneNode {
        SceneNode {
            name: name.into(),
            is_mesh: true,
            ..Default::default()
        }
    }

    fn snapshot_of(nodes: Vec<SceneNode>) -> SceneSnapshot {
        let mut snapshot = SceneSnapshot::new();
        for node in nodes {
            snapshot.push(node);
        }
        snapshot
    }

    #[test]
    fn classifies_default_types() {
        let snapshot = snapshot_of(vec![
            mesh("Entrance_Door_Frame"),
            mesh("Window_North"),
            mesh("Wall_A"),
        ]);
        let config = DetectorConfig::default();
        let types = classify_components(&snapshot, &config.component_types);

        // Configured order: windows before doors
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].key, "window");
        assert_eq!(types[0].nodes.len(), 1);
        assert_eq!(types[1].key, "door");
        assert_eq!(types[1].nodes.len(), 1);
    }

    #[test]
    fn node_may_match_several_types() {
        let snapshot = snapshot_of(vec![mesh("Window_Door_Combo")]);
        let config = DetectorConfig::default();
        let types = classify_components(&snapshot, &config.component_types);

        assert_eq!(types.len(), 2);
        assert_eq!(types[0].nodes, types[1].nodes);
    }

    #[test]
    fn matches_through_parent_group() {
        let mut snapshot = SceneSnapshot::new();
        let group = snapshot.push(SceneNode {
            name: "Doors".into(),
            ..Default::default()
        });
        snapshot.push(SceneNode {
            name: "Mesh_042".into(),
            parent: Some(group),
            is_mesh: true,
            ..Default::default()
        });

        let config = DetectorConfig::default();
        let types = classify_components(&snapshot, &config.component_types);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].key, "door");
    }

    #[test]
    fn unmatched_types_are_omitted() {
        let snapshot = snapshot_of(vec![mesh("Wall_A"), mesh("Wall_B")]);
        let config = DetectorConfig::default();
        assert!(classify_components(&snapshot, &config.component_types).is_empty());
    }

    #[test]
    fn classification_is_idempotent() {
        let snapshot = snapshot_of(vec![mesh("Door_1"), mesh("Window_1"), mesh("Wall")]);
        let config = DetectorConfig::default();
        let first = classify_components(&snapshot, &config.component_types);
        let second = classify_components(&snapshot, &config.component_types);
        assert_eq!(first, second);
    }

    #[test]
    fn custom_types_need_no_classifier_change() {
        let snapshot = snapshot_of(vec![mesh("Spiral_Stair"), mesh("Wall")]);
        let types = vec![
            crate::config::ComponentTypeSpec::new("Stairs", "stair", &["(?i)stair"]).unwrap()
        ];
        let result = classify_components(&snapshot, &types);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].key, "stair");
    }
}
