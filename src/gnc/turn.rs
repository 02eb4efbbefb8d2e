use nalgebra::{Unit, Vector3};

/// Largest heading offset commanded in one tick, deg.
pub const WIDE_TURN_ANGLE: f64 = 45.0;

/// Clamp a wide turn to [`WIDE_TURN_ANGLE`] off the current heading.
///
/// Geometric limit only: each tick may command at most the clamp angle away
/// from wherever the vehicle is pointing now. The turn side follows the
/// shorter rotation; an exact reversal turns right.
pub fn limit_wide_turn(
    horizontal_velocity: &Vector3<f64>,
    normal: &Unit<Vector3<f64>>,
    desired: Unit<Vector3<f64>>,
) -> Unit<Vector3<f64>> {
    let Some(heading) = Unit::try_new(*horizontal_velocity, 1e-6) else {
        return desired;
    };
    let max_offset = WIDE_TURN_ANGLE.to_radians();
    if heading.dot(&desired) >= max_offset.cos() {
        return desired;
    }

    let Some(right) = Unit::try_new(heading.cross(normal), 1e-9) else {
        return desired;
    };
    let side = right.dot(&desired);
    let sign = if side == 0.0 { 1.0 } else { side.signum() };

    Unit::new_normalize(right.into_inner() * sign * max_offset.tan() + heading.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up() -> Unit<Vector3<f64>> {
        Vector3::z_axis()
    }

    fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        (a.dot(b) / (a.norm() * b.norm())).clamp(-1.0, 1.0).acos().to_degrees()
    }

    #[test]
    fn reversal_is_clamped_to_45_deg() {
        let vel = Vector3::new(1.0, 0.0, 0.0);
        let desired = Unit::new_normalize(Vector3::new(-1.0, 0.0, 0.0));
        let out = limit_wide_turn(&vel, &up(), desired);
        assert!((angle_between(&out, &vel) - 45.0).abs() < 1e-9);
        // Exact reversal defaults to the right-hand side
        assert!(out.y < 0.0);
    }

    #[test]
    fn small_turn_passes_through() {
        let vel = Vector3::new(100.0, 0.0, 0.0);
        let desired = Unit::new_normalize(Vector3::new(1.0, 0.5, 0.0));
        let out = limit_wide_turn(&vel, &up(), desired);
        assert_eq!(out, desired);
    }

    #[test]
    fn turn_side_follows_shorter_rotation() {
        let vel = Vector3::new(100.0, 0.0, 0.0);
        // 120 deg to the left (north of east, x=east, y=north)
        let left = Unit::new_normalize(Vector3::new(-0.5, 0.866, 0.0));
        let out = limit_wide_turn(&vel, &up(), left);
        assert!(out.y > 0.0, "Should turn left");
        assert!((angle_between(&out, &vel) - 45.0).abs() < 1e-9);

        let right = Unit::new_normalize(Vector3::new(-0.5, -0.866, 0.0));
        let out = limit_wide_turn(&vel, &up(), right);
        assert!(out.y < 0.0, "Should turn right");
    }

    #[test]
    fn stationary_vehicle_is_not_limited() {
        let desired = Unit::new_normalize(Vector3::new(-1.0, 0.0, 0.0));
        let out = limit_wide_turn(&Vector3::zeros(), &up(), desired);
        assert_eq!(out, desired);
    }
}
