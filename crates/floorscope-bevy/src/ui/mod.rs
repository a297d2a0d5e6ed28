//! Bevy UI components for the floor viewer
//!
//! Pure Bevy UI implementation - works on both web and native.

mod layout;
mod panel;
mod styles;
mod toolbar;

pub use layout::*;
pub use panel::*;
pub use styles::*;
pub use toolbar::{ButtonAction, ToolbarButton, ToolbarPlugin};

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::ui::{ComputedNode, ScrollPosition};

/// Main UI plugin - combines all UI components
pub struct ViewerUiPlugin;

impl Plugin for ViewerUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiState>()
            .add_plugins((LayoutPlugin, ToolbarPlugin, PanelPlugin))
            .add_systems(Update, ui_scroll_system);
    }
}

/// Marker for scrollable panels that need manual scroll handling
#[derive(Component)]
pub struct ScrollablePanel;

/// System to handle mouse wheel scrolling in UI panels
/// Uses cursor position to check if within scrollable panel bounds
fn ui_scroll_system(
    mut mouse_wheel: MessageReader<MouseWheel>,
    mut scrollable_query: Query<
        (&mut ScrollPosition, &ComputedNode, &GlobalTransform),
        With<ScrollablePanel>,
    >,
    windows: Query<&Window>,
) {
    const LINE_HEIGHT: f32 = 40.0;

    let Ok(window) = windows.single() else {
        return;
    };

    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };

    for ev in mouse_wheel.read() {
        let delta_y = -ev.y * LINE_HEIGHT;

        // Find scrollable panels under cursor
        for (mut scroll_pos, computed, global_transform) in scrollable_query.iter_mut() {
            let node_pos = global_transform.translation().truncate();
            let node_size = computed.size();
            let half_size = node_size / 2.0;

            let within = cursor_pos.x >= node_pos.x - half_size.x
                && cursor_pos.x <= node_pos.x + half_size.x
                && cursor_pos.y >= node_pos.y - half_size.y
                && cursor_pos.y <= node_pos.y + half_size.y;

            if within {
                scroll_pos.y = (scroll_pos.y + delta_y).max(0.0);
                // Only scroll one panel per event
                break;
            }
        }
    }
}

/// Global UI state
#[derive(Resource)]
pub struct UiState {
    /// Left panel (floors and components) visible
    pub show_panel: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { show_panel: true }
    }
}
