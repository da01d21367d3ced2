use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use bevy::prelude::*;
use bevy::window::FileDragAndDrop;
use crate::playback::PlaybackState;
use crate::skeleton::Skeleton;
use crate::types::*;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug,Resource)]
pub struct AppGlobalData {
    pub playback: PlaybackState,
    /// Copy of the skeleton as loaded, before any frame was applied.
    pub rest_skeleton: Option<Skeleton>,
    pub rest_pose_mode: bool,
    pub scale: f32,
    pub debug_text:bool
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Open a window that plays `playback` on its skeleton.
/// (use scale when the rig is in different units than meters, e.g. centimeters)
pub fn visualize_playback(playback: PlaybackState, scale:f32) {
    let rest_skeleton = playback.skeleton().cloned();

    App::new()
        .insert_resource(AppGlobalData {
            playback,
            rest_skeleton,
            rest_pose_mode: false,
            scale: 1.0 / scale,
            debug_text: false
        })
        .add_plugins(DefaultPlugins)
        .add_plugins(PanOrbitCameraPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (load_dropped_files, update_main, draw_skeleton, update_debug_text).chain())
        .run();
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// A unit struct to help identify the bone listing, since there may be many Text components
#[derive(Component)]
struct DebugText;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    //// Orbit camera
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(0., 1.5, 3.).looking_at(Vec3::new(0., 1., 0.), Vec3::Y),
            ..default()
        },
        PanOrbitCamera::default(),
    ));
    // draw plane
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(5.0, 5.0)),
        material: materials.add(StandardMaterial {
            base_color: Color::rgba(1.,1.,1., 0.5),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..default()
        }),
        ..default()
    });

    // draw instructions
    commands.spawn(
        TextBundle::from_section(
            "Press 'Space' to play or pause\n\
            Press 'Left' or 'Right' to step frames\n\
            Press 'R' to toggle rest pose mode\n\
            Press 'D' to toggle the bone listing\n\
            Drop a pose file or a rig (.json) on the window to load it\n\
            Hold 'Up' or 'Down' to change the line width\n",
            TextStyle {
                font_size: 15.,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        })
    );

    // draw bone listing
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 15.,
                color: Color::rgba(1.0, 1.0, 1.0, 0.7),
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            display: Display::Flex,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        })
        ,DebugText
    ));
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn to_vec3(position: &Position, scale: f32) -> Vec3 {
    Vec3::new(position.x as f32, position.y as f32, position.z as f32) / scale
}

/// Draw joint axes (red, green, blue) at the joint position.
fn draw_joint_axes(gizmos: &mut Gizmos, rotation: &Quaternion, position: &Position, scale:f32) {
    let position = to_vec3(position, scale);
    // convert quaternion to matrix 3x3
    let rotation: cgmath::Matrix3<f64> = cgmath::Matrix3::from(*rotation);
    let length = 0.05;
    let x_axis = Vec3::new(rotation.x.x as f32, rotation.x.y as f32, rotation.x.z as f32) * length + position;
    let y_axis = Vec3::new(rotation.y.x as f32, rotation.y.y as f32, rotation.y.z as f32) * length + position;
    let z_axis = Vec3::new(rotation.z.x as f32, rotation.z.y as f32, rotation.z.z as f32) * length + position;

    gizmos.line(position, x_axis, Color::RED);
    gizmos.line(position, y_axis, Color::GREEN);
    gizmos.line(position, z_axis, Color::BLUE);
}

/// Draw a sphere at the joint position.
fn draw_joint_sphere(gizmos: &mut Gizmos, position: &Position, scale:f32) {
    gizmos.sphere(to_vec3(position, scale), Quat::IDENTITY, 0.015, Color::WHITE);
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn draw_skeleton(
    mut gizmos: Gizmos,
    appdata: Res<AppGlobalData>,
) {
    let scale = appdata.scale;
    let skeleton = if appdata.rest_pose_mode {
        appdata.rest_skeleton.as_ref()
    } else {
        appdata.playback.skeleton()
    };
    let Some(skeleton) = skeleton else {
        return;
    };

    let world = skeleton.world_transforms();

    //// Draw the bones as lines from parent to child
    for bone in skeleton.bones() {
        if let Some(parent) = bone.parent {
            gizmos.line(to_vec3(&world[parent].disp, scale), to_vec3(&world[bone.index].disp, scale), Color::YELLOW);
        }
    }

    //// Draw the joints as spheres. Draw the axes of the joints.
    for transform in &world {
        draw_joint_sphere(&mut gizmos, &transform.disp, scale);
        draw_joint_axes(&mut gizmos, &transform.rot, &transform.disp, scale);
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Load whatever gets dropped on the window: `.json` files as rigs, anything else as pose data.
fn load_dropped_files(
    mut events: EventReader<FileDragAndDrop>,
    mut appdata: ResMut<AppGlobalData>,
) {
    for event in events.read() {
        let FileDragAndDrop::DroppedFile { path_buf, .. } = event else {
            continue;
        };
        let is_rig = path_buf.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_rig {
            match Skeleton::from_rig_file(path_buf) {
                Ok(skeleton) => {
                    appdata.rest_skeleton = Some(skeleton.clone());
                    appdata.playback.load_skeleton(skeleton);
                }
                Err(err) => log::warn!("failed to load rig {path_buf:?}: {err}"),
            }
        } else {
            // failures are logged by the loader; the previous animation keeps playing
            let _ = appdata.playback.load_pose_file(path_buf);
        }
    }
}

fn update_main(
    mut config_store: ResMut<GizmoConfigStore>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut appdata: ResMut<AppGlobalData>
) {

    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    if keyboard.pressed(KeyCode::ArrowUp) {
        config.line_width += 5. * time.delta_seconds();
        config.line_width = config.line_width.clamp(0., 50.);
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        config.line_width -= 5. * time.delta_seconds();
        config.line_width = config.line_width.clamp(0., 50.);
    }

    if keyboard.just_released(KeyCode::KeyR) {
        appdata.rest_pose_mode = !appdata.rest_pose_mode;
    }

    if keyboard.just_released(KeyCode::Space) {
        appdata.playback.toggle_playing();
    }

    if keyboard.just_released(KeyCode::ArrowRight) {
        appdata.playback.set_playing(false);
        appdata.playback.advance();
        appdata.playback.apply_current();
    }

    if keyboard.just_released(KeyCode::ArrowLeft) {
        appdata.playback.set_playing(false);
        appdata.playback.step_back();
        appdata.playback.apply_current();
    }

    if keyboard.just_released(KeyCode::KeyD) {
        appdata.debug_text = !appdata.debug_text;
    }

    appdata.playback.tick(time.delta());
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn update_debug_text(
    mut query: Query<&mut Text, With<DebugText>>,
    appdata: Res<AppGlobalData>
) {
    let playback = &appdata.playback;
    let mut t :String = "".to_string();
    t += &format!("Frame: {} / {}", playback.frame_index(), playback.frames().len());
    t += "\n";
    t += "=============== BONES ===============\n";
    if let Some(skeleton) = playback.skeleton() {
        for (name, bone) in skeleton.bone_names().iter().zip(skeleton.bones()) {
            t += &format!("{:.<32} {:6.2?}\n", name, bone.local_rotation);
        }
    }
    for mut text in &mut query {
        if appdata.debug_text {
            text.sections[0].value = t.clone();
        } else {
            text.sections[0].value = "".to_string();
        }
    }
}
