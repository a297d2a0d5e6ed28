// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only snapshot of an externally owned scene graph
//!
//! The rendering library owns the live node hierarchy. Detection works on a
//! flattened copy of the information it needs: names, metadata strings,
//! parent links, mesh flags, and world-space extents. The snapshot never
//! mutates the source graph and is rebuilt from scratch on every load.

use crate::bounds::Aabb;
use serde::{Deserialize, Serialize};

/// Index of a node within a [`SceneSnapshot`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// One node of the flattened scene graph
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    /// Identifying name (possibly empty)
    pub name: String,
    /// Free-form metadata name, when the exporter wrote one
    pub user_data_name: Option<String>,
    /// Parent node; `None` for roots
    pub parent: Option<NodeId>,
    /// Whether this node carries renderable geometry
    pub is_mesh: bool,
    /// World-space extent, when geometry is present
    pub world_aabb: Option<Aabb>,
}

/// Flattened scene graph captured once per loaded model
///
/// Nodes are stored parent-before-child, which keeps the graph acyclic by
/// construction: a node can only reference an already-pushed parent.
#[derive(Clone, Debug, Default)]
pub struct SceneSnapshot {
    nodes: Vec<SceneNode>,
}

impl SceneSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id
    ///
    /// # Panics
    /// Panics if `node.parent` refers to a node that has not been pushed yet.
    pub fn push(&mut self, node: SceneNode) -> NodeId {
        if let Some(parent) = node.parent {
            assert!(
                parent.0 < self.nodes.len(),
                "parent {:?} pushed after child",
                parent
            );
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Get a node by id, panicking on an invalid id
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the snapshot holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate all nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Ids of all mesh nodes, in traversal order
    pub fn mesh_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().filter(|(_, n)| n.is_mesh).map(|(id, _)| id)
    }

    /// Walk upward from `id` through its ancestor chain, starting at `id`
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            snapshot: self,
            current: Some(id),
        }
    }

    /// Union bounds over all mesh nodes (model-level bounds)
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::union_all(self.mesh_ids().filter_map(|id| self.node(id).world_aabb))
    }

    /// Union bounds over a set of nodes
    pub fn bounds_of(&self, ids: impl IntoIterator<Item = NodeId>) -> Option<Aabb> {
        Aabb::union_all(
            ids.into_iter()
                .filter_map(|id| self.get(id).and_then(|n| n.world_aabb)),
        )
    }
}

/// Iterator over a node and its ancestors, child to root
pub struct Ancestors<'a> {
    snapshot: &'a SceneSnapshot,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.snapshot.get(id).and_then(|n| n.parent);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn ancestors_walk_to_root() {
        let mut snapshot = SceneSnapshot::new();
        let root = snapshot.push(SceneNode {
            name: "Root".into(),
            ..Default::default()
        });
        let group = snapshot.push(SceneNode {
            name: "Group".into(),
            parent: Some(root),
            ..Default::default()
        });
        let mesh = snapshot.push(SceneNode {
            name: "Mesh".into(),
            parent: Some(group),
            is_mesh: true,
            ..Default::default()
        });

        let chain: Vec<NodeId> = snapshot.ancestors(mesh).collect();
        assert_eq!(chain, vec![mesh, group, root]);
    }

    #[test]
    fn mesh_ids_skip_groups() {
        let mut snapshot = SceneSnapshot::new();
        snapshot.push(SceneNode {
            name: "Group".into(),
            ..Default::default()
        });
        let mesh = snapshot.push(SceneNode {
            name: "Wall".into(),
            is_mesh: true,
            ..Default::default()
        });
        assert_eq!(snapshot.mesh_ids().collect::<Vec<_>>(), vec![mesh]);
    }

    #[test]
    fn bounds_union_over_meshes() {
        let mut snapshot = SceneSnapshot::new();
        snapshot.push(SceneNode {
            name: "A".into(),
            is_mesh: true,
            world_aabb: Some(Aabb::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
            )),
            ..Default::default()
        });
        snapshot.push(SceneNode {
            name: "B".into(),
            is_mesh: true,
            world_aabb: Some(Aabb::new(
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(1.0, 5.0, 1.0),
            )),
            ..Default::default()
        });

        let bounds = snapshot.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 5.0, 1.0));
    }

    #[test]
    fn empty_snapshot_has_no_bounds() {
        assert!(SceneSnapshot::new().bounds().is_none());
    }
}
