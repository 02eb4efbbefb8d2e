use nalgebra::{Unit, Vector3};

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665;
pub const EARTH_RADIUS: f64 = 6_371_000.0;
pub const MU_EARTH: f64 = 3.986_004_418e14; // m^3/s^2
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5; // rad/s

// ---------------------------------------------------------------------------
// Rotating spherical body
// ---------------------------------------------------------------------------

/// Spherical body spinning about its +Z axis.
///
/// Body-fixed frame: +Z along the rotation axis (north), +X through the
/// prime meridian, +Y through 90 deg east. Everything the autopilot sees is
/// expressed in this rotating frame.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub radius: f64,        // m
    pub mu: f64,            // m^3/s^2
    pub rotation_rate: f64, // rad/s
}

impl Body {
    pub fn earth() -> Self {
        Self {
            radius: EARTH_RADIUS,
            mu: MU_EARTH,
            rotation_rate: EARTH_ROTATION_RATE,
        }
    }

    pub fn rotation_axis(&self) -> Unit<Vector3<f64>> {
        Vector3::z_axis()
    }

    /// Surface gravity magnitude, m/s^2.
    pub fn surface_gravity(&self) -> f64 {
        self.mu / (self.radius * self.radius)
    }

    /// Inverse-square gravity at `pos` (relative to the body center).
    pub fn gravity_accel(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        let r = pos.norm();
        if r < 1.0 {
            return Vector3::zeros();
        }
        -pos * (self.mu / (r * r * r))
    }

    /// Centrifugal + Coriolis acceleration seen in the rotating frame.
    pub fn noninertial_accel(&self, pos: &Vector3<f64>, vel: &Vector3<f64>) -> Vector3<f64> {
        let omega = self.rotation_axis().into_inner() * self.rotation_rate;
        -omega.cross(&omega.cross(pos)) - 2.0 * omega.cross(vel)
    }

    /// Body-fixed position of a geodetic point (degrees) at `altitude` above the surface.
    pub fn surface_position(&self, latitude: f64, longitude: f64, altitude: f64) -> Vector3<f64> {
        let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
        let r = self.radius + altitude;
        Vector3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        )
    }

    /// Latitude and longitude (degrees) of a body-fixed position.
    pub fn geodetic(&self, pos: &Vector3<f64>) -> (f64, f64) {
        let r = pos.norm();
        if r < 1.0 {
            return (0.0, 0.0);
        }
        let lat = (pos.z / r).clamp(-1.0, 1.0).asin();
        let lon = pos.y.atan2(pos.x);
        (lat.to_degrees(), lon.to_degrees())
    }

    /// Local east and north unit vectors at a body-fixed position.
    /// Degenerate at the poles, where `None` is returned.
    pub fn local_east_north(
        &self,
        pos: &Vector3<f64>,
    ) -> Option<(Unit<Vector3<f64>>, Unit<Vector3<f64>>)> {
        let up = Unit::try_new(*pos, 1e-9)?;
        let east = Unit::try_new(self.rotation_axis().cross(&up), 1e-9)?;
        let north = Unit::new_normalize(up.cross(&east));
        Some((east, north))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_at_surface_matches_mu() {
        let body = Body::earth();
        let pos = Vector3::new(body.radius, 0.0, 0.0);
        let g = body.gravity_accel(&pos);
        assert!((g.norm() - body.surface_gravity()).abs() < 1e-9);
        assert!(g.x < 0.0, "Gravity should point toward the center");
    }

    #[test]
    fn geodetic_roundtrip() {
        let body = Body::earth();
        let pos = body.surface_position(45.0, -120.0, 3000.0);
        let (lat, lon) = body.geodetic(&pos);
        assert!((lat - 45.0).abs() < 1e-9);
        assert!((lon + 120.0).abs() < 1e-9);
        assert!((pos.norm() - body.radius - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn centrifugal_points_outward_at_equator() {
        let body = Body::earth();
        let pos = Vector3::new(body.radius, 0.0, 0.0);
        let a = body.noninertial_accel(&pos, &Vector3::zeros());
        assert!(a.x > 0.0);
        assert!(a.y.abs() < 1e-12 && a.z.abs() < 1e-12);
    }

    #[test]
    fn east_north_at_equator() {
        let body = Body::earth();
        let (east, north) = body
            .local_east_north(&Vector3::new(body.radius, 0.0, 0.0))
            .unwrap();
        assert!((east.into_inner() - Vector3::y()).norm() < 1e-12);
        assert!((north.into_inner() - Vector3::z()).norm() < 1e-12);
    }
}
