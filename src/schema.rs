//! Fixed keypoint vocabularies. Order is significant: a keypoint's position in
//! its group is its index in the matching table below.

pub const BODY_LEN: usize = 25;
pub const HAND_LEN: usize = 21;
pub const FACE_LEN: usize = 70;

pub const BODY_KEYPOINTS: [&str; BODY_LEN] = [
    "Nose", "Neck", "RShoulder", "RElbow", "RWrist", "LShoulder", "LElbow", "LWrist", "MidHip",
    "RHip", "RKnee", "RAnkle", "LHip", "LKnee", "LAnkle", "REye", "LEye", "REar", "LEar",
    "LBigToe", "LSmallToe", "LHeel", "RBigToe", "RSmallToe", "RHeel",
];

pub const HAND_KEYPOINTS: [&str; HAND_LEN] = [
    "Wrist", "Thumb1", "Thumb2", "Thumb3", "Thumb4", "Index1", "Index2", "Index3", "Index4",
    "Middle1", "Middle2", "Middle3", "Middle4", "Ring1", "Ring2", "Ring3", "Ring4", "Pinky1",
    "Pinky2", "Pinky3", "Pinky4",
];

const FACE_PREFIX: &str = "Face_";

/// The four keypoint groups of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Body,
    LeftHand,
    RightHand,
    Face,
}

impl Part {
    pub const ALL: [Part; 4] = [Part::Body, Part::LeftHand, Part::RightHand, Part::Face];

    pub fn len(self) -> usize {
        match self {
            Part::Body => BODY_LEN,
            Part::LeftHand | Part::RightHand => HAND_LEN,
            Part::Face => FACE_LEN,
        }
    }

    /// Prefix bones of a per-keypoint rig carry for this group ("Left Wrist").
    pub fn bone_prefix(self) -> &'static str {
        match self {
            Part::LeftHand => "Left ",
            Part::RightHand => "Right ",
            Part::Body | Part::Face => "",
        }
    }

    /// Part named in a section header, e.g. "Left hand". Case-insensitive.
    pub fn from_header(label: &str) -> Option<Part> {
        match label.trim().to_lowercase().as_str() {
            "body" => Some(Part::Body),
            "left hand" => Some(Part::LeftHand),
            "right hand" => Some(Part::RightHand),
            "face" => Some(Part::Face),
            _ => None,
        }
    }

    /// Slot of `name` in this group, if the vocabulary knows it.
    /// Hand names may still carry their "Left "/"Right " prefix.
    pub fn index_of(self, name: &str) -> Option<usize> {
        let name = name.trim();
        match self {
            Part::Body => BODY_KEYPOINTS.iter().position(|&n| n == name),
            Part::LeftHand | Part::RightHand => {
                let name = name
                    .strip_prefix("Left ")
                    .or_else(|| name.strip_prefix("Right "))
                    .unwrap_or(name);
                HAND_KEYPOINTS.iter().position(|&n| n == name)
            }
            Part::Face => name
                .strip_prefix(FACE_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&i| i < FACE_LEN),
        }
    }

    /// Name of slot `index` in this group, without any side prefix.
    pub fn keypoint_name(self, index: usize) -> Option<String> {
        match self {
            Part::Body => BODY_KEYPOINTS.get(index).map(|n| n.to_string()),
            Part::LeftHand | Part::RightHand => HAND_KEYPOINTS.get(index).map(|n| n.to_string()),
            Part::Face => (index < FACE_LEN).then(|| format!("{FACE_PREFIX}{index}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_lookup_follows_table_order() {
        assert_eq!(Part::Body.index_of("Nose"), Some(0));
        assert_eq!(Part::Body.index_of("RElbow"), Some(3));
        assert_eq!(Part::Body.index_of("RHeel"), Some(24));
        assert_eq!(Part::Body.index_of("Tail"), None);
    }

    #[test]
    fn hand_lookup_strips_side_prefix() {
        assert_eq!(Part::LeftHand.index_of("Left Wrist"), Some(0));
        assert_eq!(Part::RightHand.index_of("Right Pinky4"), Some(20));
        assert_eq!(Part::RightHand.index_of("Index2"), Some(6));
    }

    #[test]
    fn face_names_are_generated() {
        assert_eq!(Part::Face.index_of("Face_0"), Some(0));
        assert_eq!(Part::Face.index_of("Face_69"), Some(69));
        assert_eq!(Part::Face.index_of("Face_70"), None);
        assert_eq!(Part::Face.keypoint_name(12).as_deref(), Some("Face_12"));
    }

    #[test]
    fn headers_are_case_insensitive() {
        assert_eq!(Part::from_header("LEFT HAND"), Some(Part::LeftHand));
        assert_eq!(Part::from_header("face"), Some(Part::Face));
        assert_eq!(Part::from_header("Tail"), None);
    }
}
