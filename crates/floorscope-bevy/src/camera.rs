//! Camera system with orbit, pan, and fly-to controls

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use floorscope_model::{Aabb, FlyToPath, Pose};
use nalgebra::Point3;

/// System set for camera input (for ordering)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraInputSet;

/// Camera controller plugin
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraController>()
            .init_resource::<FlyToState>()
            .add_message::<FlyToRequest>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    camera_input_system,
                    camera_keyboard_system,
                    fly_to_system,
                    camera_update_system,
                )
                    .chain()
                    .in_set(CameraInputSet),
            );
    }
}

/// Camera operating mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CameraMode {
    #[default]
    Orbit,
    Pan,
}

/// Camera controller resource
#[derive(Resource)]
pub struct CameraController {
    /// Current mode
    pub mode: CameraMode,
    /// Target point to orbit around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Azimuth angle (horizontal rotation)
    pub azimuth: f32,
    /// Elevation angle (vertical rotation)
    pub elevation: f32,
    /// Damping factor for smooth movement (0.0 = instant, 1.0 = never moves)
    pub damping: f32,
    /// Angular velocity for orbit inertia
    pub angular_velocity: Vec2,
    /// Animation target (for preset views)
    pub animation_target: Option<CameraAnimationTarget>,
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Orbit sensitivity
    pub orbit_sensitivity: f32,
    /// Pan sensitivity
    pub pan_sensitivity: f32,
    /// Zoom sensitivity
    pub zoom_sensitivity: f32,
    /// Is dragging (mouse down)
    pub is_dragging: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            mode: CameraMode::Orbit,
            target: Vec3::ZERO,
            distance: 20.0,   // Building models in meters
            azimuth: 0.785,   // 45 degrees
            elevation: 0.615, // ~35 degrees (isometric)
            damping: 0.92,
            angular_velocity: Vec2::ZERO,
            animation_target: None,
            fov: 45.0,
            near: 0.1,
            far: 10000.0,
            orbit_sensitivity: 0.005,
            pan_sensitivity: 0.01,
            zoom_sensitivity: 0.02,
            is_dragging: false,
        }
    }
}

impl CameraController {
    /// Get camera position from spherical coordinates
    pub fn get_position(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.sin();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Current pose in detection-core coordinates
    pub fn pose(&self) -> Pose {
        let position = self.get_position();
        Pose {
            position: Point3::new(position.x, position.y, position.z),
            target: Point3::new(self.target.x, self.target.y, self.target.z),
        }
    }

    /// Set spherical coordinates from an explicit eye and target.
    ///
    /// Keeps the orbit controller consistent when an external animation has
    /// moved the camera: the next drag continues from where the fly-to ended.
    pub fn set_pose(&mut self, pose: &Pose) {
        self.target = Vec3::new(pose.target.x, pose.target.y, pose.target.z);
        let offset = Vec3::new(
            pose.position.x - pose.target.x,
            pose.position.y - pose.target.y,
            pose.position.z - pose.target.z,
        );
        self.distance = offset.length().max(0.001);
        self.elevation = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.azimuth = offset.x.atan2(offset.z);
    }

    /// Set preset view
    pub fn set_preset_view(&mut self, azimuth: f32, elevation: f32) {
        self.animation_target = Some(CameraAnimationTarget {
            azimuth,
            elevation,
            distance: self.distance,
            target: self.target,
            duration: 0.5,
            elapsed: 0.0,
        });
    }

    /// Set home/isometric view
    pub fn home(&mut self) {
        self.set_preset_view(0.785, 0.615); // 45°, 35.264°
    }

    /// Fit all - zoom to show entire scene
    pub fn fit_bounds(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = max - min;
        let diagonal = size.length();

        // Calculate distance to fit the entire model
        let fov_rad = self.fov.to_radians();
        let distance = diagonal / (2.0 * (fov_rad / 2.0).tan());

        self.animation_target = Some(CameraAnimationTarget {
            azimuth: self.azimuth,
            elevation: self.elevation,
            distance: distance.max(0.1),
            target: center,
            duration: 0.5,
            elapsed: 0.0,
        });
    }
}

/// Animation target for smooth camera transitions
#[derive(Clone, Debug)]
pub struct CameraAnimationTarget {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub target: Vec3,
    pub duration: f32,
    pub elapsed: f32,
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Message requesting a fly-to animation framing `bounds`
#[derive(Message)]
pub struct FlyToRequest {
    pub bounds: Aabb,
}

/// In-flight fly-to path, if any.
///
/// A new request replaces the current path outright, so a superseded
/// animation can never move the camera again.
#[derive(Resource, Default)]
pub struct FlyToState {
    path: Option<FlyToPath>,
}

impl FlyToState {
    pub fn is_flying(&self) -> bool {
        self.path.is_some()
    }

    pub fn cancel(&mut self) {
        self.path = None;
    }
}

/// Setup the 3D camera
fn setup_camera(mut commands: Commands, controller: Res<CameraController>) {
    use bevy::render::view::Msaa;

    let position = controller.get_position();

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(position).looking_at(controller.target, Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: controller.fov.to_radians(),
            near: controller.near,
            far: controller.far,
            ..default()
        }),
        MainCamera,
        // Enable 4x MSAA for smoother edges
        Msaa::Sample4,
    ));

    // Ambient light - lower for more contrast
    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 80.0,
        affects_lightmapped_meshes: true,
    });

    // Key directional light from top-right-front
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(1.0, 0.99, 0.97),
            illuminance: 25000.0,
            shadows_enabled: false,
            affects_lightmapped_mesh_diffuse: true,
            ..default()
        },
        Transform::from_xyz(0.5, 1.0, 0.3).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Fill light from opposite side - subtle
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.85, 0.9, 1.0),
            illuminance: 8000.0,
            shadows_enabled: false,
            affects_lightmapped_mesh_diffuse: true,
            ..default()
        },
        Transform::from_xyz(-0.5, 0.3, -0.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Handle mouse input for camera control
fn camera_input_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mut controller: ResMut<CameraController>,
    mut fly_to: ResMut<FlyToState>,
    ui_interactions: Query<&Interaction, With<Node>>,
) {
    // Mouse over any UI element (hovered or pressed)?
    let mouse_over_ui = ui_interactions
        .iter()
        .any(|interaction| matches!(interaction, Interaction::Hovered | Interaction::Pressed));

    if mouse_button.just_pressed(MouseButton::Left) && !mouse_over_ui {
        controller.is_dragging = true;
        // Manual input takes over from any running animation
        fly_to.cancel();
        controller.animation_target = None;
    }
    if mouse_button.just_released(MouseButton::Left) {
        controller.is_dragging = false;
    }

    if controller.is_dragging {
        for ev in mouse_motion.read() {
            match controller.mode {
                CameraMode::Orbit => {
                    controller.azimuth -= ev.delta.x * controller.orbit_sensitivity;
                    controller.elevation -= ev.delta.y * controller.orbit_sensitivity;
                    // Clamp elevation to avoid gimbal lock
                    controller.elevation = controller.elevation.clamp(-1.5, 1.5);
                    controller.angular_velocity = ev.delta * controller.orbit_sensitivity;
                }
                CameraMode::Pan => {
                    let right = Vec3::new(controller.azimuth.cos(), 0.0, -controller.azimuth.sin());
                    let up = Vec3::Y;
                    let pan = right
                        * ev.delta.x
                        * controller.pan_sensitivity
                        * controller.distance
                        * 0.01
                        - up * ev.delta.y * controller.pan_sensitivity * controller.distance * 0.01;
                    controller.target += pan;
                }
            }
        }
    } else {
        // Apply damping to angular velocity when not dragging
        let damping = controller.damping;
        controller.angular_velocity *= damping;
        if controller.angular_velocity.length() > 0.0001 {
            controller.azimuth -= controller.angular_velocity.x;
            controller.elevation -= controller.angular_velocity.y;
            controller.elevation = controller.elevation.clamp(-1.5, 1.5);
        }
    }

    // Mouse wheel zoom - only when NOT over UI
    if !mouse_over_ui {
        for ev in mouse_wheel.read() {
            let zoom_delta = ev.y * controller.zoom_sensitivity;
            controller.distance = (controller.distance * (1.0 - zoom_delta)).clamp(0.1, 100000.0);
        }
    }
}

/// Handle keyboard input for camera control
fn camera_keyboard_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut controller: ResMut<CameraController>,
) {
    // Preset views (number keys)
    if keyboard.just_pressed(KeyCode::Digit1) {
        controller.set_preset_view(0.0, 0.0); // Front
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        controller.set_preset_view(std::f32::consts::PI, 0.0); // Back
    }
    if keyboard.just_pressed(KeyCode::Digit3) {
        controller.set_preset_view(-std::f32::consts::FRAC_PI_2, 0.0); // Left
    }
    if keyboard.just_pressed(KeyCode::Digit4) {
        controller.set_preset_view(std::f32::consts::FRAC_PI_2, 0.0); // Right
    }
    if keyboard.just_pressed(KeyCode::Digit5) {
        controller.set_preset_view(0.0, std::f32::consts::FRAC_PI_2 - 0.001); // Top
    }
    if keyboard.just_pressed(KeyCode::KeyH) {
        controller.home(); // Isometric
    }
}

/// Drive an active fly-to path, one pose per frame.
///
/// New requests replace the current path from the camera's live pose, so
/// clicking another floor mid-flight restarts the animation toward it.
fn fly_to_system(
    mut requests: MessageReader<FlyToRequest>,
    mut state: ResMut<FlyToState>,
    mut controller: ResMut<CameraController>,
) {
    for request in requests.read() {
        controller.animation_target = None;
        state.path = Some(FlyToPath::new(&request.bounds, controller.pose()));
    }

    let mut done = false;
    if let Some(path) = state.path.as_mut() {
        match path.next() {
            Some(pose) => {
                controller.set_pose(&pose);
                done = path.is_finished();
            }
            None => done = true,
        }
    }
    if done {
        state.path = None;
    }
}

/// Update camera transform
fn camera_update_system(
    mut controller: ResMut<CameraController>,
    fly_to: Res<FlyToState>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    // Preset-view animation (fly-to takes precedence and clears it)
    if controller.animation_target.is_some() {
        let animation_data = {
            let target = controller.animation_target.as_mut().unwrap();
            target.elapsed += dt;
            let t = (target.elapsed / target.duration).min(1.0);
            // Ease out cubic
            let t = 1.0 - (1.0 - t).powi(3);
            let completed = target.elapsed >= target.duration;
            (
                target.azimuth,
                target.elevation,
                target.distance,
                target.target,
                t,
                completed,
            )
        };

        let (target_azimuth, target_elevation, target_distance, target_pos, t, completed) =
            animation_data;

        controller.azimuth = lerp(controller.azimuth, target_azimuth, t);
        controller.elevation = lerp(controller.elevation, target_elevation, t);
        controller.distance = lerp(controller.distance, target_distance, t);
        controller.target = controller.target.lerp(target_pos, t);

        if completed {
            controller.animation_target = None;
        }
    }

    if let Ok(mut transform) = camera.single_mut() {
        let position = controller.get_position();

        if fly_to.is_flying() {
            // Fly-to poses are already interpolated; damping on top would
            // lag the final snap
            transform.translation = position;
        } else {
            transform.translation = transform
                .translation
                .lerp(position, 1.0 - controller.damping.powi(2));
        }
        transform.look_at(controller.target, Vec3::Y);
    }
}

/// Linear interpolation
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
