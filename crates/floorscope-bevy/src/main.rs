//! Floor viewer binary
//!
//! Usage: `floor-viewer [model.glb]` - with no argument, start empty and
//! load via the Open button or drag-and-drop.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use floorscope_bevy::{FloorViewerPlugin, LoadModelEvent};
use floorscope_model::DetectorConfig;
use std::path::PathBuf;

/// Model path handed over on the command line, loaded at startup
#[derive(Resource)]
struct StartupModel(PathBuf);

fn main() -> anyhow::Result<()> {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Floorscope Viewer".to_string(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(FloorViewerPlugin::new(DetectorConfig::default())?);

    if let Some(path) = std::env::args().nth(1) {
        app.insert_resource(StartupModel(PathBuf::from(path)))
            .add_systems(Startup, load_startup_model);
    }

    app.run();
    Ok(())
}

fn load_startup_model(
    startup: Res<StartupModel>,
    mut load_events: MessageWriter<LoadModelEvent>,
) {
    load_events.write(LoadModelEvent {
        path: startup.0.clone(),
    });
}
