// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor grouping engine
//!
//! Partitions the mesh nodes of a scene into floor buckets with a three-step
//! fallback chain:
//!
//! 1. name-based grouping of floor-tagged nodes, keyed by extracted number
//! 2. affiliation of every remaining mesh to a floor, by naming convention
//!    first and Y-axis proximity second
//! 3. uniform Y slicing when the model names no floors at all
//!
//! Every mesh ends up in at most one floor; assignment is first-claimed-wins
//! in floor-key order and is never reconsidered.

use crate::bounds::Aabb;
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::patterns::floor_number;
use crate::scene::{NodeId, SceneNode, SceneSnapshot};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Extra Y allowance (model units) when affiliating a node to a floor by position
const Y_AFFILIATION_MARGIN: f32 = 5.0;

/// One detected floor and the meshes assigned to it
///
/// Descriptors are created fresh on every detection pass and never mutated
/// once emitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorDescriptor {
    /// Display label
    pub label: String,
    /// Grouping key, unique within one detection pass
    pub key: String,
    /// Parsed floor number, when the name carried one
    pub floor_number: Option<u32>,
    /// Nodes whose own name matched a floor keyword under this key
    pub primary_nodes: Vec<NodeId>,
    /// Every node affiliated with this floor; superset of `primary_nodes`
    pub component_nodes: Vec<NodeId>,
}

/// Partition all mesh nodes of `snapshot` into floors.
///
/// An empty scene yields an empty list. Fails only on invalid
/// configuration.
pub fn group_floors(
    snapshot: &SceneSnapshot,
    config: &DetectorConfig,
) -> Result<Vec<FloorDescriptor>> {
    config.validate()?;

    let mesh_ids: Vec<NodeId> = snapshot.mesh_ids().collect();
    if mesh_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut tagged: Vec<NodeId> = mesh_ids
        .iter()
        .copied()
        .filter(|&id| is_floor_tagged(snapshot.node(id), &config.floor_keywords))
        .collect();

    if tagged.is_empty() {
        return Ok(slice_by_height(snapshot, &mesh_ids, config.floor_height));
    }

    // Deterministic grouping order regardless of traversal order
    tagged.sort_by(|&a, &b| snapshot.node(a).name.cmp(&snapshot.node(b).name));

    let groups = group_tagged_nodes(snapshot, &tagged);
    let component_sets = affiliate_nodes(snapshot, &groups, &mesh_ids);

    let mut floors: Vec<FloorDescriptor> = groups
        .into_iter()
        .zip(component_sets)
        .map(|(group, component_nodes)| FloorDescriptor {
            label: match group.number {
                Some(n) => format!("Floor {n}"),
                None => group.source_name.clone(),
            },
            key: group.key,
            floor_number: group.number,
            primary_nodes: group.nodes,
            component_nodes,
        })
        .collect();

    // Numbered floors ascending, unnumbered after them by label
    floors.sort_by(|a, b| match (a.floor_number, b.floor_number) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.label.cmp(&b.label),
    });

    Ok(floors)
}

fn is_floor_tagged(node: &SceneNode, keywords: &[String]) -> bool {
    let name = node.name.to_lowercase();
    keywords.iter().any(|kw| name.contains(&kw.to_lowercase()))
}

/// A keyed group of floor-tagged nodes, before affiliation
struct FloorGroup {
    key: String,
    source_name: String,
    number: Option<u32>,
    nodes: Vec<NodeId>,
}

/// Group floor-tagged nodes sharing a key, preserving sorted insertion order
fn group_tagged_nodes(snapshot: &SceneSnapshot, tagged: &[NodeId]) -> Vec<FloorGroup> {
    let mut groups: Vec<FloorGroup> = Vec::new();
    for &id in tagged {
        let name = &snapshot.node(id).name;
        let number = floor_number(name);
        let key = match number {
            Some(n) => format!("floor_{n}"),
            None => name.to_lowercase(),
        };
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.nodes.push(id),
            None => groups.push(FloorGroup {
                key,
                source_name: name.clone(),
                number,
                nodes: vec![id],
            }),
        }
    }
    groups
}

/// Assign every mesh node to at most one floor's component set.
///
/// Floors claim nodes in group order; a claimed node is skipped by later
/// floors. Each group's own tagged nodes are claimed for it up front, so a
/// floor can never lose its primary nodes to an earlier neighbor.
fn affiliate_nodes(
    snapshot: &SceneSnapshot,
    groups: &[FloorGroup],
    mesh_ids: &[NodeId],
) -> Vec<Vec<NodeId>> {
    let mut claimed: FxHashSet<NodeId> = FxHashSet::default();
    let mut component_sets: Vec<Vec<NodeId>> = Vec::with_capacity(groups.len());
    for group in groups {
        claimed.extend(group.nodes.iter().copied());
        component_sets.push(group.nodes.clone());
    }

    for (set, group) in component_sets.iter_mut().zip(groups) {
        let probes = group.number.map(affiliation_probes);
        let ordinal = group.number.map(ordinal_floor_pattern);
        let floor_bounds = snapshot.bounds_of(group.nodes.iter().copied());

        for &id in mesh_ids {
            if claimed.contains(&id) {
                continue;
            }
            let node = snapshot.node(id);
            let matched = name_affiliated(node, probes.as_deref(), ordinal.as_ref())
                || spatially_affiliated(node, floor_bounds.as_ref());
            if matched {
                claimed.insert(id);
                set.push(id);
            }
        }
    }

    component_sets
}

/// Substrings that tie a node name to floor number `n`
fn affiliation_probes(n: u32) -> Vec<String> {
    vec![
        format!("floor{n}"),
        format!("floor_{n}"),
        format!("floor {n}"),
        format!("level{n}"),
        format!("level_{n}"),
        format!("level {n}"),
        format!("f{n}_"),
        format!("f{n}"),
    ]
}

/// Ordinal convention for floor number `n`, e.g. "2nd Floor"
fn ordinal_floor_pattern(n: u32) -> Regex {
    Regex::new(&format!(r"(?i){n}(?:st|nd|rd|th)?[\s_-]*floor")).expect("valid pattern")
}

fn name_affiliated(node: &SceneNode, probes: Option<&[String]>, ordinal: Option<&Regex>) -> bool {
    let Some(probes) = probes else {
        // Only numbered floors have naming conventions to probe
        return false;
    };
    let name = node.name.to_lowercase();
    probes.iter().any(|p| name.contains(p.as_str()))
        || ordinal.is_some_and(|re| re.is_match(&node.name))
}

/// Y-proximity fallback: within the floor's own Y extent plus a margin
fn spatially_affiliated(node: &SceneNode, floor_bounds: Option<&Aabb>) -> bool {
    let (Some(node_aabb), Some(bounds)) = (node.world_aabb, floor_bounds) else {
        return false;
    };
    let tolerance = bounds.size().y + Y_AFFILIATION_MARGIN;
    (node_aabb.center().y - bounds.center().y).abs() <= tolerance
}

/// Fallback for models with no floor-named nodes: uniform Y slicing.
///
/// Slice count is `ceil((maxY - minY) / thickness)`, at least 1, over mesh
/// centers. Nodes at the exact top edge fall into the last slice; empty
/// slices are dropped but keep their positional numbering.
fn slice_by_height(
    snapshot: &SceneSnapshot,
    mesh_ids: &[NodeId],
    floor_height: f32,
) -> Vec<FloorDescriptor> {
    let centers: Vec<(NodeId, f32)> = mesh_ids
        .iter()
        .filter_map(|&id| snapshot.node(id).world_aabb.map(|b| (id, b.center().y)))
        .collect();
    if centers.is_empty() {
        return Vec::new();
    }

    let min_y = centers.iter().map(|(_, y)| *y).fold(f32::INFINITY, f32::min);
    let max_y = centers
        .iter()
        .map(|(_, y)| *y)
        .fold(f32::NEG_INFINITY, f32::max);
    let count = (((max_y - min_y) / floor_height).ceil() as usize).max(1);

    let mut slices: Vec<Vec<NodeId>> = vec![Vec::new(); count];
    for (id, y) in centers {
        let index = (((y - min_y) / floor_height).floor() as usize).min(count - 1);
        slices[index].push(id);
    }

    slices
        .into_iter()
        .enumerate()
        .filter(|(_, nodes)| !nodes.is_empty())
        .map(|(i, nodes)| FloorDescriptor {
            label: format!("Floor {}", i + 1),
            key: format!("floor_{}", i + 1),
            floor_number: Some((i + 1) as u32),
            primary_nodes: Vec::new(),
            component_nodes: nodes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn mesh_at(name: &str, y: f32) -> SceneNode {
        SceneNode {
            name: name.into(),
            is_mesh: true,
            world_aabb: Some(Aabb::from_center_size(
                Point3::new(0.0, y, 0.0),
                Vector3::new(1.0, 1.0, 1.0),
            )),
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

    fn names(snapshot: &SceneSnapshot, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| snapshot.node(id).name.clone()).collect()
    }

    #[test]
    fn groups_by_extracted_number() {
        let snapshot = snapshot_of(vec![
            mesh_at("Floor_1_Wall", 0.0),
            mesh_at("Floor_1_Window", 0.5),
            mesh_at("Floor_2_Wall", 3.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        assert_eq!(floors.len(), 2);
        assert_eq!(floors[0].key, "floor_1");
        assert_eq!(floors[0].floor_number, Some(1));
        assert_eq!(
            names(&snapshot, &floors[0].component_nodes),
            vec!["Floor_1_Wall", "Floor_1_Window"]
        );
        assert_eq!(floors[1].key, "floor_2");
        assert_eq!(names(&snapshot, &floors[1].component_nodes), vec!["Floor_2_Wall"]);
    }

    #[test]
    fn untagged_nodes_join_by_name_affiliation() {
        let snapshot = snapshot_of(vec![
            mesh_at("Floor_1_Slab", 0.0),
            mesh_at("f1_column", 1.0),
            mesh_at("Floor_2_Slab", 30.0),
            mesh_at("f2_railing", 31.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        assert_eq!(floors.len(), 2);
        assert!(names(&snapshot, &floors[0].component_nodes).contains(&"f1_column".to_string()));
        assert!(names(&snapshot, &floors[1].component_nodes).contains(&"f2_railing".to_string()));
    }

    #[test]
    fn untagged_nodes_join_by_y_proximity() {
        // No floor digits in "Handrail", so only the spatial fallback applies
        let snapshot = snapshot_of(vec![
            mesh_at("Floor_1_Slab", 0.0),
            mesh_at("Handrail", 2.0),
            mesh_at("Floor_2_Slab", 30.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        assert!(names(&snapshot, &floors[0].component_nodes).contains(&"Handrail".to_string()));
        assert!(!names(&snapshot, &floors[1].component_nodes).contains(&"Handrail".to_string()));
    }

    #[test]
    fn every_mesh_claimed_at_most_once() {
        // Y-ranges overlap enough that both floors could claim the rail
        let snapshot = snapshot_of(vec![
            mesh_at("Floor_1_Slab", 0.0),
            mesh_at("Floor_2_Slab", 4.0),
            mesh_at("Rail", 2.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        let total: usize = floors.iter().map(|f| f.component_nodes.len()).sum();
        assert_eq!(total, 3);
        // Earlier floor key wins
        assert!(names(&snapshot, &floors[0].component_nodes).contains(&"Rail".to_string()));
    }

    #[test]
    fn component_nodes_superset_of_primary() {
        let snapshot = snapshot_of(vec![
            mesh_at("Floor_1_Slab", 0.0),
            // Close enough to floor 1 that its spatial pass could claim it first
            mesh_at("Floor_2_Slab", 2.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        for floor in &floors {
            for id in &floor.primary_nodes {
                assert!(floor.component_nodes.contains(id));
            }
        }
        assert_eq!(floors[1].component_nodes.len(), 1);
    }

    #[test]
    fn unnumbered_floors_sort_after_numbered() {
        let snapshot = snapshot_of(vec![
            mesh_at("Mezzanine Floor", 5.0),
            mesh_at("Floor_2", 3.0),
            mesh_at("Attic Floor", 9.0),
            mesh_at("Floor_1", 0.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        let keys: Vec<&str> = floors.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["floor_1", "floor_2", "attic floor", "mezzanine floor"]);
        assert_eq!(floors[2].label, "Attic Floor");
        assert_eq!(floors[2].floor_number, None);
    }

    #[test]
    fn level_keyword_tags_floors() {
        let snapshot = snapshot_of(vec![mesh_at("Level_3_Deck", 9.0)]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].key, "floor_3");
    }

    #[test]
    fn slices_by_height_without_tagged_nodes() {
        let snapshot = snapshot_of(vec![mesh_at("Wall_A", 0.5), mesh_at("Wall_B", 4.2)]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        assert_eq!(floors.len(), 2);
        assert_eq!(floors[0].label, "Floor 1");
        assert_eq!(names(&snapshot, &floors[0].component_nodes), vec!["Wall_A"]);
        assert_eq!(floors[1].label, "Floor 2");
        assert_eq!(names(&snapshot, &floors[1].component_nodes), vec!["Wall_B"]);
    }

    #[test]
    fn slicing_covers_top_edge_node() {
        // Center exactly at maxY must land in the last slice, not be dropped
        let snapshot = snapshot_of(vec![
            mesh_at("A", 0.0),
            mesh_at("B", 3.0),
            mesh_at("C", 6.0),
        ]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();

        let total: usize = floors.iter().map(|f| f.component_nodes.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn flat_model_yields_single_slice() {
        let snapshot = snapshot_of(vec![mesh_at("A", 1.0), mesh_at("B", 1.0)]);
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].component_nodes.len(), 2);
    }

    #[test]
    fn empty_scene_yields_no_floors() {
        let snapshot = SceneSnapshot::new();
        let floors = group_floors(&snapshot, &DetectorConfig::default()).unwrap();
        assert!(floors.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let snapshot = snapshot_of(vec![mesh_at("Wall", 0.0)]);
        let mut config = DetectorConfig::default();
        config.floor_height = 0.0;
        assert!(group_floors(&snapshot, &config).is_err());
    }

    #[test]
    fn detection_is_deterministic() {
        let build = || {
            snapshot_of(vec![
                mesh_at("Floor_2_Slab", 3.0),
                mesh_at("Floor_1_Slab", 0.0),
                mesh_at("Beam", 1.0),
            ])
        };
        let a = group_floors(&build(), &DetectorConfig::default()).unwrap();
        let b = group_floors(&build(), &DetectorConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
