//! Scene graph capture
//!
//! Walks the spawned glTF hierarchy and flattens it into the
//! [`SceneSnapshot`] the detection core consumes. Capture happens after
//! transform propagation so mesh bounds are in world space.

use bevy::camera::primitives::MeshAabb;
use bevy::gltf::GltfExtras;
use bevy::prelude::*;
use floorscope_model::{Aabb, NodeId, SceneNode, SceneSnapshot};
use nalgebra::Point3;

/// Query row for one scene graph entity
pub type NodeQuery<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static Name>,
        Option<&'static GltfExtras>,
        Option<&'static Mesh3d>,
        Option<&'static GlobalTransform>,
        Option<&'static Children>,
    ),
>;

/// Flatten the hierarchy below `root` into a snapshot.
///
/// Returns the snapshot plus the entity for each [`NodeId`], index-aligned,
/// so descriptor node ids can be mapped back to ECS entities. Traversal is
/// depth-first in child order, which keeps capture deterministic for a given
/// asset.
pub fn capture(root: Entity, nodes: &NodeQuery, meshes: &Assets<Mesh>) -> (SceneSnapshot, Vec<Entity>) {
    let mut snapshot = SceneSnapshot::new();
    let mut entities = Vec::new();
    visit(root, None, nodes, meshes, &mut snapshot, &mut entities);
    (snapshot, entities)
}

fn visit(
    entity: Entity,
    parent: Option<NodeId>,
    nodes: &NodeQuery,
    meshes: &Assets<Mesh>,
    snapshot: &mut SceneSnapshot,
    entities: &mut Vec<Entity>,
) {
    let Ok((name, extras, mesh, global, children)) = nodes.get(entity) else {
        return;
    };

    let world_aabb = match (mesh, global) {
        (Some(mesh3d), Some(global)) => meshes
            .get(&mesh3d.0)
            .and_then(|m| world_bounds(m, global)),
        _ => None,
    };

    let id = snapshot.push(SceneNode {
        name: name.map(|n| n.as_str().to_string()).unwrap_or_default(),
        user_data_name: extras.and_then(extras_name),
        parent,
        is_mesh: mesh.is_some(),
        world_aabb,
    });
    entities.push(entity);

    if let Some(children) = children {
        for child in children.iter() {
            visit(child, Some(id), nodes, meshes, snapshot, entities);
        }
    }
}

/// World-space bounds of a mesh: local AABB corners pushed through the
/// global transform. Exact for axis-aligned content, conservative otherwise.
fn world_bounds(mesh: &Mesh, global: &GlobalTransform) -> Option<Aabb> {
    let local = mesh.compute_aabb()?;
    let center: Vec3 = local.center.into();
    let half: Vec3 = local.half_extents.into();

    let corners = (0..8).map(|i| {
        let corner = center
            + Vec3::new(
                if i & 1 == 0 { -half.x } else { half.x },
                if i & 2 == 0 { -half.y } else { half.y },
                if i & 4 == 0 { -half.z } else { half.z },
            );
        let world = global.transform_point(corner);
        Point3::new(world.x, world.y, world.z)
    });

    Aabb::from_points(corners)
}

/// Pull the `name` field out of a glTF extras payload.
///
/// Extras arrive as a raw JSON string; anything unparseable or missing the
/// field is treated as absent rather than an error.
fn extras_name(extras: &GltfExtras) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(&extras.value).ok()?;
    value.get("name")?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extras_name_reads_name_field() {
        let extras = GltfExtras {
            value: r#"{"name": "Floor_2_Slab", "id": 17}"#.to_string(),
        };
        assert_eq!(extras_name(&extras), Some("Floor_2_Slab".to_string()));
    }

    #[test]
    fn extras_name_tolerates_garbage() {
        let extras = GltfExtras {
            value: "not json".to_string(),
        };
        assert_eq!(extras_name(&extras), None);

        let extras = GltfExtras {
            value: r#"{"other": 1}"#.to_string(),
        };
        assert_eq!(extras_name(&extras), None);
    }
}
