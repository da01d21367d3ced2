use crate::types::Frame;
use serde::{Deserialize, Serialize};

/// Reference image size used to bring pixel coordinates into unit space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub reference_width: f64,
    pub reference_height: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        NormalizeConfig {
            reference_width: 1280.0,
            reference_height: 720.0,
        }
    }
}

/// Rescale pixel-space keypoints into unit space, in place.
///
/// Decided per point: a point with x or y above 1 is treated as pixels and divided by the
/// reference size, anything else is left alone. Running it again on unit data is a no-op.
pub fn normalize(frames: &mut [Frame], config: &NormalizeConfig) {
    for frame in frames.iter_mut() {
        for point in frame.keypoints_mut() {
            if point.x > 1.0 || point.y > 1.0 {
                point.x /= config.reference_width;
                point.y /= config.reference_height;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Part;
    use crate::types::Keypoint;

    fn frame_with(points: &[(usize, Keypoint)]) -> Frame {
        let mut frame = Frame::default();
        for &(i, p) in points {
            frame.body[i] = Some(p);
        }
        frame
    }

    #[test]
    fn pixel_point_becomes_unit() {
        let mut frames = vec![frame_with(&[(0, Keypoint::new(640.0, 360.0))])];
        normalize(&mut frames, &NormalizeConfig::default());
        assert_eq!(frames[0].get(Part::Body, 0), Some(&Keypoint::new(0.5, 0.5)));
    }

    #[test]
    fn unit_data_is_left_unchanged() {
        let original = vec![frame_with(&[
            (0, Keypoint::new(0.25, 0.75)),
            (1, Keypoint::with_confidence(1.0, 0.0, 0.9)),
        ])];
        let mut frames = original.clone();
        normalize(&mut frames, &NormalizeConfig::default());
        normalize(&mut frames, &NormalizeConfig::default());
        assert_eq!(frames, original);
    }

    #[test]
    fn each_point_is_judged_alone() {
        let mut frames = vec![frame_with(&[
            (0, Keypoint::new(0.4, 0.2)),
            (1, Keypoint::new(0.5, 72.0)),
        ])];
        normalize(&mut frames, &NormalizeConfig::default());
        assert_eq!(frames[0].get(Part::Body, 0), Some(&Keypoint::new(0.4, 0.2)));
        let p = frames[0].get(Part::Body, 1).copied().unwrap();
        assert_eq!((p.x, p.y), (0.5 / 1280.0, 0.1));
    }

    #[test]
    fn missing_points_are_skipped() {
        let mut frames = vec![Frame::default()];
        normalize(&mut frames, &NormalizeConfig::default());
        assert_eq!(frames[0], Frame::default());
    }
}
