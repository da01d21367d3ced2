use cgmath::{Quaternion as CgQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::schema::Part;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Quaternion = CgQuaternion<f64>;
pub type Position = Vector3<f64>;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// A 2D keypoint. Coordinates are either pixel space (values above 1) or unit space
/// (\[0,1\], origin top-left, y pointing down). Stored on disk as `[x, y]` or `[x, y, confidence]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub confidence: Option<f64>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Keypoint {
            x,
            y,
            confidence: None,
        }
    }

    pub fn with_confidence(x: f64, y: f64, confidence: f64) -> Self {
        Keypoint {
            x,
            y,
            confidence: Some(confidence),
        }
    }
}

impl TryFrom<Vec<f64>> for Keypoint {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y] => Ok(Keypoint::new(*x, *y)),
            [x, y, c] => Ok(Keypoint::with_confidence(*x, *y, *c)),
            other => Err(format!(
                "keypoint must have 2 or 3 components, got {}",
                other.len()
            )),
        }
    }
}

impl From<Keypoint> for Vec<f64> {
    fn from(p: Keypoint) -> Self {
        match p.confidence {
            Some(c) => vec![p.x, p.y, c],
            None => vec![p.x, p.y],
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// One time step of keypoints. Every group always has its schema length; missing joints are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub body: Vec<Option<Keypoint>>,
    #[serde(default)]
    pub left_hand: Vec<Option<Keypoint>>,
    #[serde(default)]
    pub right_hand: Vec<Option<Keypoint>>,
    #[serde(default)]
    pub face: Vec<Option<Keypoint>>,
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            body: vec![None; Part::Body.len()],
            left_hand: vec![None; Part::LeftHand.len()],
            right_hand: vec![None; Part::RightHand.len()],
            face: vec![None; Part::Face.len()],
        }
    }
}

impl Frame {
    /// Pads (or truncates) every group to its schema length.
    pub fn padded(mut self) -> Self {
        for part in Part::ALL {
            self.group_mut(part).resize(part.len(), None);
        }
        self
    }

    pub fn group(&self, part: Part) -> &[Option<Keypoint>] {
        match part {
            Part::Body => &self.body,
            Part::LeftHand => &self.left_hand,
            Part::RightHand => &self.right_hand,
            Part::Face => &self.face,
        }
    }

    pub fn group_mut(&mut self, part: Part) -> &mut Vec<Option<Keypoint>> {
        match part {
            Part::Body => &mut self.body,
            Part::LeftHand => &mut self.left_hand,
            Part::RightHand => &mut self.right_hand,
            Part::Face => &mut self.face,
        }
    }

    /// Keypoint at `index` of `part`, if present.
    pub fn get(&self, part: Part, index: Index) -> Option<&Keypoint> {
        self.group(part).get(index).and_then(Option::as_ref)
    }

    /// Every present keypoint across all four groups.
    pub fn keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        Part::ALL
            .into_iter()
            .flat_map(move |part| self.group(part).iter().flatten())
    }

    pub fn keypoints_mut(&mut self) -> impl Iterator<Item = &mut Keypoint> {
        self.body
            .iter_mut()
            .chain(self.left_hand.iter_mut())
            .chain(self.right_hand.iter_mut())
            .chain(self.face.iter_mut())
            .flatten()
    }

    pub fn has_shape(&self) -> bool {
        Part::ALL
            .into_iter()
            .all(|part| self.group(part).len() == part.len())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub index: Index,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
    pub local_position: Position,
    pub local_rotation: Quaternion,
}
