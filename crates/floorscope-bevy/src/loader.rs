//! Model loading - handles file dialog, drag-and-drop, and scene spawning

use crate::detect::{DetectionState, ModelData};
use crate::highlight::{OriginalMaterials, Selection};
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
#[cfg(all(
    not(target_arch = "wasm32"),
    not(target_os = "ios"),
    not(target_os = "macos")
))]
use bevy::tasks::IoTaskPool;
use bevy::tasks::Task;
use std::path::PathBuf;

/// Plugin for model loading functionality
pub struct LoaderPlugin;

impl Plugin for LoaderPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<LoadModelEvent>()
            .add_message::<ModelLoadedEvent>()
            .add_message::<OpenFileDialogRequest>()
            .init_resource::<FileDialogState>()
            .add_systems(
                Update,
                (
                    handle_open_dialog_request,
                    poll_file_dialog,
                    handle_load_model_event,
                    handle_file_drop,
                ),
            );
    }
}

/// Marker for the root entity of the loaded model scene
#[derive(Component)]
pub struct ModelRoot;

/// Message to request opening a file dialog
#[derive(Message)]
pub struct OpenFileDialogRequest;

/// State for tracking async file dialog
#[derive(Resource, Default)]
pub struct FileDialogState {
    task: Option<Task<Option<PathBuf>>>,
}

/// Message to trigger model loading (from button, drop, or CLI)
#[derive(Message)]
pub struct LoadModelEvent {
    pub path: PathBuf,
}

/// Message emitted once the scene asset has been queued for spawning
#[derive(Message)]
pub struct ModelLoadedEvent {
    pub path: PathBuf,
    pub display_name: String,
}

/// System to handle request to open file dialog (spawns async task)
#[cfg(all(
    not(target_arch = "wasm32"),
    not(target_os = "ios"),
    not(target_os = "macos")
))]
fn handle_open_dialog_request(
    mut requests: MessageReader<OpenFileDialogRequest>,
    mut state: ResMut<FileDialogState>,
) {
    for _ in requests.read() {
        // Don't spawn another dialog if one is already pending
        if state.task.is_some() {
            log::debug!("[Loader] File dialog already open");
            continue;
        }

        log::info!("[Loader] Opening file dialog...");

        let task_pool = IoTaskPool::get();
        let task = task_pool.spawn(async {
            use rfd::AsyncFileDialog;

            let file = AsyncFileDialog::new()
                .add_filter("glTF Models", &["glb", "gltf"])
                .set_title("Open Building Model")
                .pick_file()
                .await;

            file.map(|f| f.path().to_path_buf())
        });

        state.task = Some(task);
    }
}

/// Stub for platforms that don't support rfd (WASM, iOS, macOS)
#[cfg(any(target_arch = "wasm32", target_os = "ios", target_os = "macos"))]
fn handle_open_dialog_request(
    mut _requests: MessageReader<OpenFileDialogRequest>,
    mut _state: ResMut<FileDialogState>,
) {
    // File dialog handled by native UI on these platforms
}

/// System to poll async file dialog result
fn poll_file_dialog(
    mut state: ResMut<FileDialogState>,
    mut load_events: MessageWriter<LoadModelEvent>,
) {
    if let Some(ref mut task) = state.task {
        if let Some(result) = bevy::tasks::block_on(bevy::tasks::poll_once(task)) {
            if let Some(path) = result {
                log::info!("[Loader] File selected: {:?}", path);
                load_events.write(LoadModelEvent { path });
            } else {
                log::debug!("[Loader] File dialog cancelled");
            }
            state.task = None;
        }
    }
}

/// System to handle model load events.
///
/// Replaces any previously loaded model wholesale: the old scene tree is
/// despawned and all derived state is reset before the new asset is queued.
#[allow(clippy::too_many_arguments)]
fn handle_load_model_event(
    mut events: MessageReader<LoadModelEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    existing: Query<Entity, With<ModelRoot>>,
    mut data: ResMut<ModelData>,
    mut selection: ResMut<Selection>,
    mut originals: ResMut<OriginalMaterials>,
    mut detection: ResMut<DetectionState>,
    mut loaded_events: MessageWriter<ModelLoadedEvent>,
) {
    // Only the last queued load matters
    let Some(event) = events.read().last() else {
        return;
    };

    log::info!("[Loader] Loading model: {:?}", event.path);

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    data.clear();
    *selection = Selection::None;
    originals.clear();
    detection.disarm();

    let display_name = event
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| event.path.display().to_string());

    // AssetServer resolves absolute paths as-is; relative paths resolve
    // against the assets root
    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(event.path.clone()));
    commands.spawn((SceneRoot(scene), ModelRoot, Name::new(display_name.clone())));

    loaded_events.write(ModelLoadedEvent {
        path: event.path.clone(),
        display_name,
    });
}

/// System to handle drag-and-drop files
fn handle_file_drop(
    mut file_drag_drop_events: MessageReader<bevy::window::FileDragAndDrop>,
    mut load_events: MessageWriter<LoadModelEvent>,
) {
    for event in file_drag_drop_events.read() {
        if let bevy::window::FileDragAndDrop::DroppedFile { path_buf, .. } = event {
            if let Some(ext) = path_buf.extension() {
                if ext.eq_ignore_ascii_case("glb") || ext.eq_ignore_ascii_case("gltf") {
                    log::info!("[Loader] File dropped: {:?}", path_buf);
                    load_events.write(LoadModelEvent {
                        path: path_buf.clone(),
                    });
                }
            }
        }
    }
}
