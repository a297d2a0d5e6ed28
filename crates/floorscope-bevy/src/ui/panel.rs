//! Side panel - floor list and component type list
//!
//! Rebuilt from [`ModelData`] whenever a detection pass publishes new
//! results. Clicking a floor row selects it and flies the camera to its
//! bounds; clicking a component type row toggles its highlight. Clicking
//! the active row again clears the selection.

use super::layout::{LeftPanel, StatusText};
use super::styles::{UiColors, UiSizes};
use crate::camera::FlyToRequest;
use crate::detect::ModelData;
use crate::highlight::Selection;
use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::ui::{
    widget::Button, AlignItems, BackgroundColor, BorderRadius, FlexDirection, Interaction, Node,
    UiRect, Val,
};

pub struct PanelPlugin;

impl Plugin for PanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_panel.after(super::layout::setup_layout))
            .add_systems(
                Update,
                (
                    update_panel,
                    handle_floor_click,
                    handle_component_click,
                    sync_row_colors,
                    update_status_text,
                ),
            );
    }
}

/// Marker for the floor list container
#[derive(Component)]
pub struct FloorListContent;

/// Marker for the component type list container
#[derive(Component)]
pub struct ComponentListContent;

/// Marker for rebuildable rows (cleanup marker)
#[derive(Component)]
pub struct PanelRow;

/// Floor row, carrying its index into [`ModelData::floors`]
#[derive(Component)]
pub struct FloorRow {
    pub index: usize,
}

/// Component type row, carrying its index into [`ModelData::component_types`]
#[derive(Component)]
pub struct ComponentRow {
    pub index: usize,
}

fn setup_panel(mut commands: Commands, panel_query: Query<Entity, With<LeftPanel>>) {
    let Ok(panel_entity) = panel_query.single() else {
        return;
    };

    commands.entity(panel_entity).with_children(|panel| {
        spawn_section_title(panel, "Floors");
        panel.spawn((
            FloorListContent,
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::NONE),
        ));

        spawn_section_title(panel, "Components");
        panel.spawn((
            ComponentListContent,
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::NONE),
        ));
    });
}

fn spawn_section_title(panel: &mut ChildSpawnerCommands, title: &str) {
    panel.spawn((
        Text::new(title),
        TextFont {
            font_size: UiSizes::FONT_SIZE_LG,
            ..default()
        },
        TextColor(UiColors::TEXT_PRIMARY),
        Node {
            margin: UiRect::vertical(Val::Px(UiSizes::PADDING)),
            ..default()
        },
    ));
}

/// Rebuild both lists when detection results change
fn update_panel(
    mut commands: Commands,
    data: Res<ModelData>,
    floor_content: Query<Entity, With<FloorListContent>>,
    component_content: Query<Entity, With<ComponentListContent>>,
    existing_rows: Query<Entity, With<PanelRow>>,
) {
    if !data.is_changed() {
        return;
    }
    let (Ok(floor_entity), Ok(component_entity)) =
        (floor_content.single(), component_content.single())
    else {
        return;
    };

    // Clear existing rows - despawn() is recursive in Bevy 0.18
    for entity in existing_rows.iter() {
        commands.entity(entity).despawn();
    }

    commands.entity(floor_entity).with_children(|content| {
        if data.floors.is_empty() {
            spawn_empty_label(content, "No floors detected");
        }
        for (index, floor) in data.floors.iter().enumerate() {
            let label = format!("{} ({})", floor.label, floor.component_nodes.len());
            spawn_row(content, &label, (PanelRow, FloorRow { index }));
        }
    });

    commands.entity(component_entity).with_children(|content| {
        if data.component_types.is_empty() {
            spawn_empty_label(content, "No components detected");
        }
        for (index, ct) in data.component_types.iter().enumerate() {
            let label = format!("{} ({})", ct.label, ct.nodes.len());
            spawn_row(content, &label, (PanelRow, ComponentRow { index }));
        }
    });
}

fn spawn_row(parent: &mut ChildSpawnerCommands, label: &str, markers: impl Bundle) {
    parent
        .spawn((
            markers,
            Button,
            Node {
                width: Val::Percent(100.0),
                padding: UiRect::all(Val::Px(UiSizes::PADDING_SM)),
                margin: UiRect::top(Val::Px(UiSizes::PADDING_SM)),
                border_radius: BorderRadius::all(Val::Px(UiSizes::BORDER_RADIUS)),
                flex_direction: FlexDirection::Row,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::NONE),
        ))
        .with_children(|row: &mut ChildSpawnerCommands| {
            row.spawn((
                Text::new(label),
                TextFont {
                    font_size: UiSizes::FONT_SIZE_SM,
                    ..default()
                },
                TextColor(UiColors::TEXT_PRIMARY),
            ));
        });
}

fn spawn_empty_label(parent: &mut ChildSpawnerCommands, label: &str) {
    parent.spawn((
        PanelRow,
        Text::new(label),
        TextFont {
            font_size: UiSizes::FONT_SIZE_SM,
            ..default()
        },
        TextColor(UiColors::TEXT_SECONDARY),
    ));
}

/// Resting color of a floor row under `selection`
fn floor_row_color(selection: Selection, index: usize) -> Color {
    if selection == Selection::Floor(index) {
        UiColors::FLOOR_SELECTED
    } else {
        Color::NONE
    }
}

/// Resting color of a component type row under `selection`
fn component_row_color(selection: Selection, index: usize) -> Color {
    if selection == Selection::ComponentType(index) {
        UiColors::COMPONENT_SELECTED
    } else {
        Color::NONE
    }
}

/// Repaint every row when the selection changes.
///
/// The interaction handlers only touch rows whose `Interaction` changed, so
/// without this pass a previously selected row would keep its tint until
/// the next hover. After it runs, exactly the selected row is tinted.
fn sync_row_colors(
    selection: Res<Selection>,
    mut floor_rows: Query<(&FloorRow, &mut BackgroundColor), Without<ComponentRow>>,
    mut component_rows: Query<(&ComponentRow, &mut BackgroundColor), Without<FloorRow>>,
) {
    if !selection.is_changed() {
        return;
    }
    for (row, mut bg_color) in floor_rows.iter_mut() {
        *bg_color = BackgroundColor(floor_row_color(*selection, row.index));
    }
    for (row, mut bg_color) in component_rows.iter_mut() {
        *bg_color = BackgroundColor(component_row_color(*selection, row.index));
    }
}

fn handle_floor_click(
    mut query: Query<(&Interaction, &FloorRow, &mut BackgroundColor), Changed<Interaction>>,
    mut selection: ResMut<Selection>,
    mut fly_requests: MessageWriter<FlyToRequest>,
    data: Res<ModelData>,
) {
    for (interaction, row, mut bg_color) in query.iter_mut() {
        match *interaction {
            Interaction::Pressed => {
                *selection = selection.toggled(Selection::Floor(row.index));
                *bg_color = BackgroundColor(UiColors::FLOOR_SELECTED);

                // Fly even when the click cleared the highlight, so a
                // second click still re-frames the floor
                if let Some(Some(bounds)) = data.floor_bounds.get(row.index) {
                    fly_requests.write(FlyToRequest { bounds: *bounds });
                }
            }
            Interaction::Hovered => {
                *bg_color = BackgroundColor(UiColors::HOVER);
            }
            Interaction::None => {
                *bg_color = BackgroundColor(floor_row_color(*selection, row.index));
            }
        }
    }
}

fn handle_component_click(
    mut query: Query<(&Interaction, &ComponentRow, &mut BackgroundColor), Changed<Interaction>>,
    mut selection: ResMut<Selection>,
) {
    for (interaction, row, mut bg_color) in query.iter_mut() {
        match *interaction {
            Interaction::Pressed => {
                *selection = selection.toggled(Selection::ComponentType(row.index));
                *bg_color = BackgroundColor(UiColors::COMPONENT_SELECTED);
            }
            Interaction::Hovered => {
                *bg_color = BackgroundColor(UiColors::HOVER);
            }
            Interaction::None => {
                *bg_color = BackgroundColor(component_row_color(*selection, row.index));
            }
        }
    }
}

fn update_status_text(
    data: Res<ModelData>,
    mut status: Query<&mut Text, With<StatusText>>,
) {
    if !data.is_changed() {
        return;
    }
    let Ok(mut text) = status.single_mut() else {
        return;
    };

    **text = if data.loaded {
        format!(
            "{} - {} floors, {} component types",
            data.model_name,
            data.floors.len(),
            data.component_types.len()
        )
    } else if data.model_name.is_empty() {
        "No model loaded - Open or drop a .glb/.gltf file".to_string()
    } else {
        format!("Loading {}...", data.model_name)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_floor_row_reads_selected() {
        let selection = Selection::Floor(1);
        let colors: Vec<Color> = (0..3).map(|i| floor_row_color(selection, i)).collect();
        assert_eq!(colors[1], UiColors::FLOOR_SELECTED);
        assert_eq!(colors[0], Color::NONE);
        assert_eq!(colors[2], Color::NONE);
    }

    #[test]
    fn switching_selection_untints_the_old_row() {
        // Row 0 selected, then the user clicks row 2
        assert_eq!(floor_row_color(Selection::Floor(0), 0), UiColors::FLOOR_SELECTED);
        assert_eq!(floor_row_color(Selection::Floor(2), 0), Color::NONE);
        assert_eq!(floor_row_color(Selection::Floor(2), 2), UiColors::FLOOR_SELECTED);
    }

    #[test]
    fn component_selection_never_tints_floor_rows() {
        let selection = Selection::ComponentType(0);
        assert_eq!(floor_row_color(selection, 0), Color::NONE);
        assert_eq!(component_row_color(selection, 0), UiColors::COMPONENT_SELECTED);
        assert_eq!(component_row_color(selection, 1), Color::NONE);
    }

    #[test]
    fn cleared_selection_untints_everything() {
        for i in 0..3 {
            assert_eq!(floor_row_color(Selection::None, i), Color::NONE);
            assert_eq!(component_row_color(Selection::None, i), Color::NONE);
        }
    }
}
