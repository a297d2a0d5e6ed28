//! Detection pass
//!
//! Runs floor grouping and component classification once per loaded model.
//! The glTF scene spawns asynchronously, so after a load the pass waits
//! until meshes exist under the model root and their global transforms have
//! propagated, then captures a snapshot and publishes [`ModelData`].

use crate::loader::{ModelLoadedEvent, ModelRoot};
use crate::snapshot::{self, NodeQuery};
use crate::DetectorSettings;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use floorscope_model::{
    classify_components, group_floors, Aabb, ComponentTypeDescriptor, FloorDescriptor, NodeId,
    SceneSnapshot,
};

/// Frames to wait for meshes before giving up and capturing anyway.
/// Covers meshless scenes, which still produce an (empty) result.
const DETECTION_TIMEOUT_FRAMES: u32 = 120;

pub struct DetectPlugin;

impl Plugin for DetectPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelData>()
            .init_resource::<DetectionState>()
            .add_message::<DetectionFinishedEvent>()
            .add_systems(Update, (arm_detection, run_detection).chain());
    }
}

/// Message emitted after a detection pass completes
#[derive(Message)]
pub struct DetectionFinishedEvent;

/// Detection results for the currently loaded model
#[derive(Resource, Default)]
pub struct ModelData {
    /// Display name of the loaded file
    pub model_name: String,
    /// Detected floors, bottom to top
    pub floors: Vec<FloorDescriptor>,
    /// Per-floor combined bounds (primary + affiliated meshes)
    pub floor_bounds: Vec<Option<Aabb>>,
    /// Detected component types, in configured order
    pub component_types: Vec<ComponentTypeDescriptor>,
    /// Whole-model bounds
    pub bounds: Option<Aabb>,
    /// Entity for each snapshot node, index-aligned with [`NodeId`]
    pub entities: Vec<Entity>,
    /// Whether a model is loaded
    pub loaded: bool,
}

impl ModelData {
    /// Resolve descriptor node ids to their scene entities
    pub fn entities_of<'a>(&'a self, ids: &'a [NodeId]) -> impl Iterator<Item = Entity> + 'a {
        ids.iter().filter_map(|id| self.entities.get(id.0).copied())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Gate between a scene spawn and the detection pass
#[derive(Resource, Default)]
pub struct DetectionState {
    pending: bool,
    /// Set once meshes are visible; capture runs the frame after, so
    /// propagated global transforms are in place.
    ready: bool,
    frames_waited: u32,
}

impl DetectionState {
    pub fn arm(&mut self) {
        self.pending = true;
        self.ready = false;
        self.frames_waited = 0;
    }

    pub fn disarm(&mut self) {
        self.pending = false;
        self.ready = false;
        self.frames_waited = 0;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

fn arm_detection(
    mut loaded: MessageReader<ModelLoadedEvent>,
    mut state: ResMut<DetectionState>,
    mut data: ResMut<ModelData>,
) {
    for event in loaded.read() {
        data.clear();
        data.model_name = event.display_name.clone();
        state.arm();
        log::info!("[Detect] Awaiting scene spawn for {}", event.display_name);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_detection(
    mut state: ResMut<DetectionState>,
    mut data: ResMut<ModelData>,
    settings: Res<DetectorSettings>,
    roots: Query<Entity, With<ModelRoot>>,
    mesh_entities: Query<(), With<Mesh3d>>,
    nodes: NodeQuery,
    meshes: Res<Assets<Mesh>>,
    mut finished: MessageWriter<DetectionFinishedEvent>,
) {
    if !state.pending {
        return;
    }
    let Ok(root) = roots.single() else {
        return;
    };

    if !state.ready {
        state.frames_waited += 1;
        if !mesh_entities.is_empty() || state.frames_waited >= DETECTION_TIMEOUT_FRAMES {
            // One more frame so GlobalTransform propagation has run over
            // the freshly spawned hierarchy
            state.ready = true;
        }
        return;
    }
    state.disarm();

    let (snapshot, entities) = snapshot::capture(root, &nodes, &meshes);
    log::info!(
        "[Detect] Captured {} nodes ({} meshes)",
        snapshot.len(),
        snapshot.mesh_ids().count()
    );

    let floors = match group_floors(&snapshot, &settings.0) {
        Ok(floors) => floors,
        Err(e) => {
            log::error!("[Detect] Floor grouping failed: {}", e);
            return;
        }
    };
    let component_types = classify_components(&snapshot, &settings.0.component_types);

    data.floor_bounds = floors
        .iter()
        .map(|f| floor_bounds(&snapshot, f))
        .collect();
    data.bounds = snapshot.bounds();
    data.entities = entities;
    data.loaded = true;

    log::info!(
        "[Detect] {} floors, {} component types",
        floors.len(),
        component_types.len()
    );
    for floor in &floors {
        log::debug!(
            "[Detect] {}: {} primary, {} total meshes",
            floor.label,
            floor.primary_nodes.len(),
            floor.component_nodes.len()
        );
    }

    data.floors = floors;
    data.component_types = component_types;
    finished.write(DetectionFinishedEvent);
}

/// Combined bounds of everything assigned to a floor.
///
/// Uses the affiliated set, not just the tagged meshes, so flying to a
/// floor frames its walls and fittings too. Sliced floors carry no
/// primaries and fall back to the same set.
fn floor_bounds(snapshot: &SceneSnapshot, floor: &FloorDescriptor) -> Option<Aabb> {
    snapshot.bounds_of(floor.component_nodes.iter().copied())
}
