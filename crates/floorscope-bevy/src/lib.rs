//! Floorscope Bevy Viewer
//!
//! Bevy-based 3D viewer for GLB/glTF building models. Loads a model, runs
//! the floor grouping and component classification from `floorscope-model`
//! over the spawned scene graph, and exposes the results through a side
//! panel: click a floor to fly the camera to it, toggle a floor or a
//! component type to highlight its meshes.
//!
//! Rendering, asset parsing, camera projection, and input handling are all
//! Bevy's; this crate is the plumbing between the engine and the detection
//! core.

pub mod camera;
pub mod detect;
pub mod highlight;
pub mod loader;
pub mod snapshot;
pub mod ui;

use bevy::prelude::*;
use floorscope_model::DetectorConfig;

// Re-exports
pub use camera::{CameraController, CameraPlugin, FlyToRequest, FlyToState, MainCamera};
pub use detect::{DetectPlugin, DetectionState, ModelData};
pub use highlight::{HighlightPlugin, OriginalMaterials, Selection};
pub use loader::{LoadModelEvent, LoaderPlugin, ModelLoadedEvent, OpenFileDialogRequest};

/// Main viewer plugin - combines all subsystems
pub struct FloorViewerPlugin {
    config: DetectorConfig,
}

impl FloorViewerPlugin {
    /// Build the viewer with a validated detector configuration.
    ///
    /// Validation happens at setup time so a bad `floor_height` never
    /// reaches the detection pass.
    pub fn new(config: DetectorConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Default for FloorViewerPlugin {
    fn default() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }
}

impl Plugin for FloorViewerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DetectorSettings(self.config.clone()))
            .add_plugins((
                CameraPlugin,
                LoaderPlugin,
                DetectPlugin,
                HighlightPlugin,
                ui::ViewerUiPlugin,
            ));
    }
}

/// Detector configuration held for the lifetime of the app
#[derive(Resource)]
pub struct DetectorSettings(pub DetectorConfig);
