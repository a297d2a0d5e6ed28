//! Selection highlighting
//!
//! One selection at a time: a floor or a component type, never both.
//! Highlighting swaps mesh material handles for a shared translucent
//! highlight material and restores the recorded originals first on every
//! change, so repeated toggling can never lose a source material.

use crate::detect::{DetectionFinishedEvent, ModelData};
use crate::DetectorSettings;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use floorscope_model::NodeId;
use rustc_hash::FxHashMap;

pub struct HighlightPlugin;

impl Plugin for HighlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Selection>()
            .init_resource::<OriginalMaterials>()
            .add_systems(Startup, setup_highlight_materials)
            .add_systems(Update, (record_original_materials, apply_selection).chain());
    }
}

/// Active selection, driving both highlight and the side panel
#[derive(Resource, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Selection {
    #[default]
    None,
    /// Index into [`ModelData::floors`]
    Floor(usize),
    /// Index into [`ModelData::component_types`]
    ComponentType(usize),
}

impl Selection {
    /// Toggle semantics: selecting the current selection clears it
    pub fn toggled(self, next: Selection) -> Selection {
        if self == next {
            Selection::None
        } else {
            next
        }
    }
}

/// Material handles as loaded, keyed by mesh entity.
///
/// Recorded once per detection pass; restoring a highlight always writes
/// these handles back.
#[derive(Resource, Default)]
pub struct OriginalMaterials {
    map: FxHashMap<Entity, Handle<StandardMaterial>>,
}

impl OriginalMaterials {
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Which of the two highlight materials a selection maps to
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HighlightKind {
    Floor,
    ComponentType,
}

/// Shared translucent highlight materials
#[derive(Resource)]
pub struct HighlightMaterials {
    pub floor: Handle<StandardMaterial>,
    pub component_type: Handle<StandardMaterial>,
}

impl HighlightMaterials {
    pub fn handle(&self, kind: HighlightKind) -> &Handle<StandardMaterial> {
        match kind {
            HighlightKind::Floor => &self.floor,
            HighlightKind::ComponentType => &self.component_type,
        }
    }
}

/// Resolve a selection to the node set it highlights.
///
/// Pure function of the selection and the detection results: the same
/// inputs always yield the same node set, which is what makes repeated
/// application of [`apply_selection`] a no-op. Out-of-range indices and
/// `Selection::None` resolve to nothing.
pub fn selection_nodes(
    selection: Selection,
    data: &ModelData,
) -> Option<(&[NodeId], HighlightKind)> {
    match selection {
        Selection::None => None,
        Selection::Floor(i) => data
            .floors
            .get(i)
            .map(|floor| (floor.component_nodes.as_slice(), HighlightKind::Floor)),
        Selection::ComponentType(i) => data
            .component_types
            .get(i)
            .map(|ct| (ct.nodes.as_slice(), HighlightKind::ComponentType)),
    }
}

fn setup_highlight_materials(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<DetectorSettings>,
) {
    let colors = &settings.0.highlight_colors;
    commands.insert_resource(HighlightMaterials {
        floor: materials.add(highlight_material(colors.floor)),
        component_type: materials.add(highlight_material(colors.component_type)),
    });
}

fn highlight_material(rgba: [f32; 4]) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3]),
        alpha_mode: AlphaMode::Blend,
        // Translucent highlight reads better without specular response
        perceptual_roughness: 1.0,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

/// Record every mesh entity's source material after a detection pass
fn record_original_materials(
    mut finished: MessageReader<DetectionFinishedEvent>,
    data: Res<ModelData>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut originals: ResMut<OriginalMaterials>,
) {
    if finished.read().next().is_none() {
        return;
    }

    originals.clear();
    for &entity in &data.entities {
        if let Ok(material) = mesh_materials.get(entity) {
            originals.map.insert(entity, material.0.clone());
        }
    }
    log::debug!(
        "[Highlight] Recorded {} source materials",
        originals.map.len()
    );
}

/// Restore-then-apply on every selection change.
///
/// Restoring everything first makes the system idempotent: switching
/// directly from one floor to another never leaves stale highlights behind.
fn apply_selection(
    selection: Res<Selection>,
    data: Res<ModelData>,
    originals: Res<OriginalMaterials>,
    highlights: Option<Res<HighlightMaterials>>,
    mut mesh_materials: Query<&mut MeshMaterial3d<StandardMaterial>>,
) {
    if !selection.is_changed() && !data.is_changed() {
        return;
    }
    let Some(highlights) = highlights else {
        return;
    };

    for (&entity, original) in &originals.map {
        if let Ok(mut material) = mesh_materials.get_mut(entity) {
            material.0 = original.clone();
        }
    }

    let Some((nodes, kind)) = selection_nodes(*selection, &data) else {
        return;
    };
    let handle = highlights.handle(kind);

    let mut applied = 0;
    for entity in data.entities_of(nodes) {
        if let Ok(mut material) = mesh_materials.get_mut(entity) {
            material.0 = handle.clone();
            applied += 1;
        }
    }
    log::debug!("[Highlight] Highlighted {} meshes", applied);
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorscope_model::{ComponentTypeDescriptor, FloorDescriptor, NodeId};

    fn sample_data() -> ModelData {
        ModelData {
            floors: vec![
                FloorDescriptor {
                    label: "Floor 1".into(),
                    key: "floor_1".into(),
                    floor_number: Some(1),
                    primary_nodes: vec![NodeId(0)],
                    component_nodes: vec![NodeId(0), NodeId(1)],
                },
                FloorDescriptor {
                    label: "Floor 2".into(),
                    key: "floor_2".into(),
                    floor_number: Some(2),
                    primary_nodes: vec![NodeId(2)],
                    component_nodes: vec![NodeId(2)],
                },
            ],
            component_types: vec![ComponentTypeDescriptor {
                label: "Windows".into(),
                key: "window".into(),
                nodes: vec![NodeId(1)],
            }],
            loaded: true,
            ..Default::default()
        }
    }

    #[test]
    fn floor_selection_resolves_to_component_nodes() {
        let data = sample_data();
        let (nodes, kind) = selection_nodes(Selection::Floor(0), &data).unwrap();
        assert_eq!(nodes, &[NodeId(0), NodeId(1)]);
        assert_eq!(kind, HighlightKind::Floor);

        let (nodes, kind) = selection_nodes(Selection::ComponentType(0), &data).unwrap();
        assert_eq!(nodes, &[NodeId(1)]);
        assert_eq!(kind, HighlightKind::ComponentType);
    }

    #[test]
    fn repeated_resolution_is_unchanged() {
        // Applying the same selection twice must target the same node set,
        // so restore-then-apply leaves materials exactly as after one pass
        let data = sample_data();
        for selection in [
            Selection::None,
            Selection::Floor(1),
            Selection::ComponentType(0),
        ] {
            let first = selection_nodes(selection, &data);
            let second = selection_nodes(selection, &data);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn none_and_out_of_range_resolve_to_nothing() {
        let data = sample_data();
        assert_eq!(selection_nodes(Selection::None, &data), None);
        assert_eq!(selection_nodes(Selection::Floor(7), &data), None);
        assert_eq!(selection_nodes(Selection::ComponentType(3), &data), None);
    }

    #[test]
    fn toggle_clears_active_selection_only() {
        let active = Selection::Floor(0);
        assert_eq!(active.toggled(Selection::Floor(0)), Selection::None);
        assert_eq!(active.toggled(Selection::Floor(1)), Selection::Floor(1));
        assert_eq!(
            active.toggled(Selection::ComponentType(0)),
            Selection::ComponentType(0)
        );
    }
}
