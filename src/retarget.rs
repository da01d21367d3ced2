use crate::resolve::{LogicalJoint, RigBinding};
use crate::schema::Part;
use crate::skeleton::Skeleton;
use crate::types::*;
use crate::utils::shortest_arc;
use serde::{Deserialize, Serialize};

///////////////////////////////////////////////////////////////////////////////////////////////////

/// How a frame is turned into bone transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Strategy {
    /// Rotate bound limb bones so they point along the keypoint segments.
    #[default]
    Rotation,
    /// Move one bone per keypoint, matched by keypoint name.
    DirectPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    pub strategy: Strategy,
    /// Size of the working space the unit keypoints are mapped into.
    pub scale: f64,
    /// Extra multiplier on top of `scale`.
    pub motion_gain: f64,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        RetargetConfig {
            strategy: Strategy::Rotation,
            scale: 1.0,
            motion_gain: 1.0,
        }
    }
}

/// Parent joint and the body keypoint its bone should point at.
pub const BONE_PAIRS: [(LogicalJoint, &str); 9] = [
    (LogicalJoint::Neck, "Nose"),
    (LogicalJoint::RShoulder, "RElbow"),
    (LogicalJoint::RElbow, "RWrist"),
    (LogicalJoint::LShoulder, "LElbow"),
    (LogicalJoint::LElbow, "LWrist"),
    (LogicalJoint::RHip, "RKnee"),
    (LogicalJoint::RKnee, "RAnkle"),
    (LogicalJoint::LHip, "LKnee"),
    (LogicalJoint::LKnee, "LAnkle"),
];

///////////////////////////////////////////////////////////////////////////////////////////////////

/// Map a unit-space keypoint into the 3D working space: centred on the image middle, y up, z = 0.
pub fn to_working_space(p: &Keypoint, config: &RetargetConfig) -> Position {
    let s = config.scale * config.motion_gain;
    Position::new((p.x - 0.5) * s, (0.5 - p.y) * s, 0.0)
}

/// Rotation strategy. Every bone is set from its rest snapshot, never from its current
/// rotation, so applying the same frame twice gives the same result.
/// Returns how many bones were updated.
pub fn apply_rotations(
    frame: &Frame,
    skeleton: &mut Skeleton,
    rig: &RigBinding,
    config: &RetargetConfig,
) -> usize {
    let mut updated = 0;
    for (parent, child) in BONE_PAIRS {
        let Some(bone) = rig.bone_for(parent) else {
            continue;
        };
        let Some(rest) = rig.rest(bone) else {
            continue;
        };
        let head = parent.body_index().and_then(|i| frame.get(Part::Body, i));
        let tail = Part::Body.index_of(child).and_then(|i| frame.get(Part::Body, i));
        let (Some(head), Some(tail)) = (head, tail) else {
            continue;
        };

        let direction = to_working_space(tail, config) - to_working_space(head, config);
        //// zero length segment: keep whatever the bone had
        let Some(delta) = shortest_arc(rest.direction, direction) else {
            continue;
        };
        if let Some(bone) = skeleton.bone_mut(bone) {
            bone.local_rotation = delta * rest.rotation;
            updated += 1;
        }
    }
    updated
}

/// Direct-position strategy. Keypoints are centred on their bounding box and scaled by its
/// larger side, then written into the x/y local position of the bone with the keypoint's name
/// ("Nose", "Left Wrist", "Face_12").
/// Returns how many bones were updated.
pub fn apply_positions(frame: &Frame, skeleton: &mut Skeleton) -> usize {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in frame.keypoints() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let scale = (max_x - min_x).max(max_y - min_y);
    if !(scale > 0.0 && scale.is_finite()) {
        return 0;
    }
    let center_x = (max_x + min_x) / 2.0;
    let center_y = (max_y + min_y) / 2.0;

    let mut updated = 0;
    for part in Part::ALL {
        for (i, p) in frame.group(part).iter().enumerate() {
            let (Some(p), Some(name)) = (p, part.keypoint_name(i)) else {
                continue;
            };
            let name = format!("{}{}", part.bone_prefix(), name);
            let Some(index) = skeleton.find_bone_index(&name) else {
                continue;
            };
            if let Some(bone) = skeleton.bone_mut(index) {
                bone.local_position.x = (p.x - center_x) / scale;
                bone.local_position.y = -(p.y - center_y) / scale;
                updated += 1;
            }
        }
    }
    updated
}

/// Apply one frame to the skeleton with the configured strategy.
pub fn apply_frame(
    frame: &Frame,
    skeleton: &mut Skeleton,
    rig: &RigBinding,
    config: &RetargetConfig,
) -> usize {
    match config.strategy {
        Strategy::Rotation => apply_rotations(frame, skeleton, rig, config),
        Strategy::DirectPosition => apply_positions(frame, skeleton),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn close(a: Position, b: Position) -> bool {
        (a - b).magnitude() < 1e-9
    }

    /// Hips -> Spine -> Neck -> Head, Spine -> RightArm -> RightForeArm -> RightHand
    fn upper_body() -> Skeleton {
        let mut s = Skeleton::new();
        let hips = s.add_bone("Hips", None, Position::new(0.0, 1.0, 0.0)).unwrap();
        let spine = s.add_bone("Spine", Some(hips), Position::new(0.0, 0.3, 0.0)).unwrap();
        let neck = s.add_bone("Neck", Some(spine), Position::new(0.0, 0.3, 0.0)).unwrap();
        s.add_bone("Head", Some(neck), Position::new(0.0, 0.1, 0.0)).unwrap();
        let arm = s.add_bone("RightArm", Some(spine), Position::new(-0.2, 0.25, 0.0)).unwrap();
        let fore = s.add_bone("RightForeArm", Some(arm), Position::new(-0.3, 0.0, 0.0)).unwrap();
        s.add_bone("RightHand", Some(fore), Position::new(-0.25, 0.0, 0.0)).unwrap();
        s
    }

    fn pose() -> Frame {
        let mut frame = Frame::default();
        frame.body[0] = Some(Keypoint::new(0.5, 0.2)); // Nose
        frame.body[1] = Some(Keypoint::new(0.5, 0.3)); // Neck
        frame.body[2] = Some(Keypoint::new(0.4, 0.3)); // RShoulder
        frame.body[3] = Some(Keypoint::new(0.3, 0.3)); // RElbow
        frame.body[4] = Some(Keypoint::new(0.3, 0.4)); // RWrist
        frame
    }

    #[test]
    fn bones_point_along_keypoint_segments() {
        let mut skeleton = upper_body();
        let rig = RigBinding::resolve(&skeleton);
        let updated = apply_rotations(&pose(), &mut skeleton, &rig, &RetargetConfig::default());
        assert_eq!(updated, 3);

        //// forearm rest direction is -x, the elbow->wrist segment points down
        let fore = skeleton.find_bone_by_name("RightForeArm").unwrap();
        assert!(close(fore.local_rotation * Position::new(-1.0, 0.0, 0.0), Position::new(0.0, -1.0, 0.0)));

        //// upper arm segment already points along -x
        let arm = skeleton.find_bone_by_name("RightArm").unwrap();
        assert!(close(arm.local_rotation * Position::unit_x(), Position::unit_x()));
    }

    #[test]
    fn applying_a_frame_twice_does_not_drift() {
        let mut skeleton = upper_body();
        let rig = RigBinding::resolve(&skeleton);
        let config = RetargetConfig::default();
        apply_frame(&pose(), &mut skeleton, &rig, &config);
        let first: Vec<Quaternion> = skeleton.bones().iter().map(|b| b.local_rotation).collect();
        apply_frame(&pose(), &mut skeleton, &rig, &config);
        let second: Vec<Quaternion> = skeleton.bones().iter().map(|b| b.local_rotation).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_keypoint_leaves_bones_alone() {
        let mut skeleton = upper_body();
        let rig = RigBinding::resolve(&skeleton);
        let before = skeleton.clone();
        let mut frame = pose();
        frame.body[3] = None;
        let updated = apply_rotations(&frame, &mut skeleton, &rig, &RetargetConfig::default());
        assert_eq!(updated, 1);
        for name in ["RightArm", "RightForeArm"] {
            let a = before.find_bone_by_name(name).unwrap();
            let b = skeleton.find_bone_by_name(name).unwrap();
            assert_eq!(a.local_rotation, b.local_rotation);
            assert_eq!(a.local_position, b.local_position);
        }
    }

    #[test]
    fn zero_length_segment_keeps_rotation() {
        let mut skeleton = upper_body();
        let rig = RigBinding::resolve(&skeleton);
        apply_rotations(&pose(), &mut skeleton, &rig, &RetargetConfig::default());
        let posed = skeleton.find_bone_by_name("RightForeArm").unwrap().local_rotation;

        let mut frame = pose();
        frame.body[4] = frame.body[3];
        apply_rotations(&frame, &mut skeleton, &rig, &RetargetConfig::default());
        assert_eq!(skeleton.find_bone_by_name("RightForeArm").unwrap().local_rotation, posed);
    }

    #[test]
    fn bones_without_rest_snapshot_are_skipped() {
        let mut skeleton = upper_body();
        let before = skeleton.clone();
        let updated = apply_rotations(&pose(), &mut skeleton, &RigBinding::default(), &RetargetConfig::default());
        assert_eq!(updated, 0);
        for (a, b) in before.bones().iter().zip(skeleton.bones()) {
            assert_eq!(a.local_rotation, b.local_rotation);
        }
    }

    #[test]
    fn working_space_is_centred_with_y_up() {
        let config = RetargetConfig {
            scale: 2.0,
            motion_gain: 1.5,
            ..RetargetConfig::default()
        };
        let p = to_working_space(&Keypoint::new(1.0, 0.0), &config);
        assert!(close(p, Position::new(1.5, 1.5, 0.0)));
    }

    #[test]
    fn positions_follow_bounding_box() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_bone("Root", None, Position::new(0.0, 0.0, 0.0)).unwrap();
        skeleton.add_bone("Nose", Some(root), Position::new(0.0, 0.0, 0.0)).unwrap();
        skeleton.add_bone("Left Wrist", Some(root), Position::new(0.0, 0.0, 0.0)).unwrap();

        let mut frame = Frame::default();
        frame.body[0] = Some(Keypoint::new(0.0, 0.0));
        frame.left_hand[0] = Some(Keypoint::new(1.0, 0.5));
        frame.right_hand[0] = Some(Keypoint::new(0.5, 0.5));

        let updated = apply_positions(&frame, &mut skeleton);
        assert_eq!(updated, 2);
        let nose = skeleton.find_bone_by_name("Nose").unwrap().local_position;
        assert!(close(nose, Position::new(-0.5, 0.25, 0.0)));
        let wrist = skeleton.find_bone_by_name("Left Wrist").unwrap().local_position;
        assert!(close(wrist, Position::new(0.5, -0.25, 0.0)));
    }

    #[test]
    fn positions_need_a_non_degenerate_frame() {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone("Nose", None, Position::new(0.0, 0.0, 0.0)).unwrap();
        let mut frame = Frame::default();
        frame.body[0] = Some(Keypoint::new(0.3, 0.3));
        assert_eq!(apply_positions(&frame, &mut skeleton), 0);
        assert_eq!(apply_positions(&Frame::default(), &mut skeleton), 0);
    }
}
