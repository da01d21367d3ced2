//! Binding of logical body joints to concrete bones, plus the rest snapshot retargeting starts from.

use crate::schema::Part;
use crate::skeleton::Skeleton;
use crate::types::*;
use crate::utils::safe_normalize;
use log::debug;
use std::collections::HashMap;

/// Joints of the body schema that retargeting drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalJoint {
    Neck,
    RShoulder,
    RElbow,
    RWrist,
    LShoulder,
    LElbow,
    LWrist,
    RHip,
    RKnee,
    RAnkle,
    LHip,
    LKnee,
    LAnkle,
}

impl LogicalJoint {
    pub const ALL: [LogicalJoint; 13] = [
        LogicalJoint::Neck,
        LogicalJoint::RShoulder,
        LogicalJoint::RElbow,
        LogicalJoint::RWrist,
        LogicalJoint::LShoulder,
        LogicalJoint::LElbow,
        LogicalJoint::LWrist,
        LogicalJoint::RHip,
        LogicalJoint::RKnee,
        LogicalJoint::RAnkle,
        LogicalJoint::LHip,
        LogicalJoint::LKnee,
        LogicalJoint::LAnkle,
    ];

    /// Body schema name of this joint.
    pub fn name(self) -> &'static str {
        match self {
            LogicalJoint::Neck => "Neck",
            LogicalJoint::RShoulder => "RShoulder",
            LogicalJoint::RElbow => "RElbow",
            LogicalJoint::RWrist => "RWrist",
            LogicalJoint::LShoulder => "LShoulder",
            LogicalJoint::LElbow => "LElbow",
            LogicalJoint::LWrist => "LWrist",
            LogicalJoint::RHip => "RHip",
            LogicalJoint::RKnee => "RKnee",
            LogicalJoint::RAnkle => "RAnkle",
            LogicalJoint::LHip => "LHip",
            LogicalJoint::LKnee => "LKnee",
            LogicalJoint::LAnkle => "LAnkle",
        }
    }

    /// Slot of this joint in a frame's body group.
    pub fn body_index(self) -> Option<Index> {
        Part::Body.index_of(self.name())
    }

    /// Candidate bone names, tried in order. Covers Character Creator, Unreal mannequin,
    /// Mixamo and plain Mixamo-style names.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LogicalJoint::Neck => &["CC_Base_NeckTwist01", "neck_01", "mixamorig:Neck", "Neck"],
            LogicalJoint::RShoulder => &["CC_Base_R_Upperarm", "upperarm_r", "mixamorig:RightArm", "RightArm"],
            LogicalJoint::RElbow => &["CC_Base_R_Forearm", "lowerarm_r", "mixamorig:RightForeArm", "RightForeArm"],
            LogicalJoint::RWrist => &["CC_Base_R_Hand", "hand_r", "mixamorig:RightHand", "RightHand"],
            LogicalJoint::LShoulder => &["CC_Base_L_Upperarm", "upperarm_l", "mixamorig:LeftArm", "LeftArm"],
            LogicalJoint::LElbow => &["CC_Base_L_Forearm", "lowerarm_l", "mixamorig:LeftForeArm", "LeftForeArm"],
            LogicalJoint::LWrist => &["CC_Base_L_Hand", "hand_l", "mixamorig:LeftHand", "LeftHand"],
            LogicalJoint::RHip => &["CC_Base_R_Thigh", "thigh_r", "mixamorig:RightUpLeg", "RightUpLeg"],
            LogicalJoint::RKnee => &["CC_Base_R_Calf", "calf_r", "mixamorig:RightLeg", "RightLeg"],
            LogicalJoint::RAnkle => &["CC_Base_R_Foot", "foot_r", "mixamorig:RightFoot", "RightFoot"],
            LogicalJoint::LHip => &["CC_Base_L_Thigh", "thigh_l", "mixamorig:LeftUpLeg", "LeftUpLeg"],
            LogicalJoint::LKnee => &["CC_Base_L_Calf", "calf_l", "mixamorig:LeftLeg", "LeftLeg"],
            LogicalJoint::LAnkle => &["CC_Base_L_Foot", "foot_l", "mixamorig:LeftFoot", "LeftFoot"],
        }
    }
}

/// Outcome of resolving one logical joint against a skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Bound(Index),
    Unbound,
}

/// A bone's orientation at load time: its local rotation and the world direction it points in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestBone {
    pub rotation: Quaternion,
    pub direction: Position,
}

/// Bindings and rest snapshot for one loaded skeleton.
#[derive(Debug, Clone, Default)]
pub struct RigBinding {
    bindings: HashMap<LogicalJoint, Binding>,
    rest: Vec<Option<RestBone>>,
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Rest direction of every bone: towards the first child, or the bone's own local Z axis in
/// world space for leaves (and for children sitting exactly on their parent).
fn __capture_rest(skeleton: &Skeleton) -> Vec<Option<RestBone>> {
    let world = skeleton.world_transforms();
    skeleton
        .bones()
        .iter()
        .map(|bone| {
            let here = &world[bone.index];
            let towards_child = bone
                .children
                .first()
                .and_then(|&child| safe_normalize(world[child].disp - here.disp));
            let direction = towards_child.or_else(|| safe_normalize(here.rot * Position::unit_z()))?;
            Some(RestBone {
                rotation: bone.local_rotation,
                direction,
            })
        })
        .collect()
}

fn __resolve_joint(skeleton: &Skeleton, joint: LogicalJoint) -> Binding {
    joint
        .aliases()
        .iter()
        .find_map(|alias| skeleton.find_bone_index(alias))
        .map_or(Binding::Unbound, Binding::Bound)
}

/////////////////////////////////////////////////////////////////////////////////////////////////

impl RigBinding {
    /// Capture the rest snapshot and resolve every logical joint. Call once per loaded skeleton,
    /// before any retargeting touches it.
    pub fn resolve(skeleton: &Skeleton) -> Self {
        let mut rig = RigBinding {
            bindings: HashMap::new(),
            rest: __capture_rest(skeleton),
        };
        rig.__resolve_bindings(skeleton);
        rig
    }

    fn __resolve_bindings(&mut self, skeleton: &Skeleton) {
        for joint in LogicalJoint::ALL {
            let binding = __resolve_joint(skeleton, joint);
            match binding {
                Binding::Bound(i) => debug!("{} -> {}", joint.name(), skeleton.bones()[i].name),
                Binding::Unbound => debug!("{} is unbound", joint.name()),
            }
            self.bindings.insert(joint, binding);
        }
    }

    pub fn binding(&self, joint: LogicalJoint) -> Binding {
        self.bindings
            .get(&joint)
            .copied()
            .unwrap_or(Binding::Unbound)
    }

    pub fn bone_for(&self, joint: LogicalJoint) -> Option<Index> {
        match self.binding(joint) {
            Binding::Bound(i) => Some(i),
            Binding::Unbound => None,
        }
    }

    pub fn rest(&self, bone: Index) -> Option<&RestBone> {
        self.rest.get(bone).and_then(Option::as_ref)
    }

    pub fn bound_count(&self) -> usize {
        self.bindings
            .values()
            .filter(|b| matches!(b, Binding::Bound(_)))
            .count()
    }
}
