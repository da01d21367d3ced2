use crate::types::{Position, Quaternion};
use cgmath::{InnerSpace, One, Rad, Rotation3};
use std::f64::consts::PI;

const EPSILON: f64 = 1e-12;
const PARALLEL: f64 = 0.999_999;

/// Unit vector in the direction of `v`, or `None` for a (near) zero vector.
pub fn safe_normalize(v: Position) -> Option<Position> {
    let len2 = v.magnitude2();
    if len2 < EPSILON || !len2.is_finite() {
        return None;
    }
    Some(v / len2.sqrt())
}

/// Smallest rotation taking the direction of `from` onto the direction of `to`.
/// `None` if either vector has no direction.
pub fn shortest_arc(from: Position, to: Position) -> Option<Quaternion> {
    let from = safe_normalize(from)?;
    let to = safe_normalize(to)?;
    let dot = from.dot(to).clamp(-1.0, 1.0);

    if dot > PARALLEL {
        return Some(Quaternion::one());
    }
    if dot < -PARALLEL {
        // half turn around any axis perpendicular to `from`
        let axis = safe_normalize(Position::unit_x().cross(from))
            .or_else(|| safe_normalize(Position::unit_y().cross(from)))?;
        return Some(Quaternion::from_axis_angle(axis, Rad(PI)));
    }

    let axis = from.cross(to).normalize();
    Some(Quaternion::from_axis_angle(axis, Rad(dot.acos())))
}
