use nalgebra::{Unit, UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Guidance: desired horizontal direction per cruise mode
// ---------------------------------------------------------------------------

/// Axis of the great circle through `position` tangent to `velocity`.
pub fn great_circle_axis(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    Unit::try_new(velocity.cross(position), 1e-9)
}

/// Axis of the great circle running from `position` to `target`.
pub fn axis_toward(position: &Vector3<f64>, target: &Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    Unit::try_new(target.cross(position), 1e-9)
}

/// Tangent of the great circle defined by `circle_axis` at the point whose
/// up vector is `normal`. Heading error doesn't enter: the vehicle is always
/// steered back onto the same circle.
pub fn level_flight_direction(
    normal: &Unit<Vector3<f64>>,
    circle_axis: &Unit<Vector3<f64>>,
) -> Option<Unit<Vector3<f64>>> {
    Unit::try_new(normal.cross(circle_axis), 1e-9)
}

/// Horizontal direction for a compass course (deg, clockwise from north).
///
/// Local north is the rotation axis projected onto the horizontal plane, so
/// this is undefined at the poles.
pub fn course_direction(
    normal: &Unit<Vector3<f64>>,
    rotation_axis: &Unit<Vector3<f64>>,
    course: f64,
) -> Option<Unit<Vector3<f64>>> {
    let north = rotation_axis.into_inner() - normal.into_inner() * rotation_axis.dot(normal);
    let north = Unit::try_new(north, 1e-9)?;
    // Positive rotation about "up" is counter-clockwise seen from above
    let rotation = UnitQuaternion::from_axis_angle(normal, -course.to_radians());
    Some(rotation * north)
}
