use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::TickSnapshot;

/// Chord lengths above this are converted to great-circle arc length, m.
pub const ARC_CORRECTION_THRESHOLD: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Waypoint
// ---------------------------------------------------------------------------

/// Geodetic target point, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl Waypoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

// ---------------------------------------------------------------------------
// Great-circle helpers
// ---------------------------------------------------------------------------

/// Convert a straight-line chord to surface arc length on a sphere of `radius`.
///
/// Short chords are returned unchanged; the chord formula only starts to
/// underestimate noticeably past [`ARC_CORRECTION_THRESHOLD`].
pub fn chord_to_arc(chord: f64, radius: f64) -> f64 {
    if chord <= ARC_CORRECTION_THRESHOLD || radius <= 0.0 {
        return chord;
    }
    let cos_angle = (1.0 - chord * chord / (2.0 * radius * radius)).clamp(-1.0, 1.0);
    cos_angle.acos() * radius
}

/// Body-centered position of `wp` at the vehicle's current radius.
///
/// Built by rotating the vehicle's own radial direction, so only the
/// snapshot's longitude is needed to anchor the meridian.
pub fn target_position(snap: &TickSnapshot, wp: &Waypoint) -> Option<Vector3<f64>> {
    let up = snap.normal()?;
    let north = snap.rotation_axis.into_inner();

    let equatorial = up.into_inner() - north * up.dot(&north);
    let meridian = match Unit::try_new(equatorial, 1e-9) {
        Some(m) => m.into_inner(),
        // At the pole any meridian will do
        None => Unit::try_new(north.cross(&Vector3::x()), 1e-9)
            .or_else(|| Unit::try_new(north.cross(&Vector3::y()), 1e-9))?
            .into_inner(),
    };
    let east = north.cross(&meridian);

    let dlon = (wp.longitude - snap.longitude).to_radians();
    let lat = wp.latitude.to_radians();
    let target_meridian = meridian * dlon.cos() + east * dlon.sin();
    let dir = target_meridian * lat.cos() + north * lat.sin();

    Some(dir * snap.position.norm())
}

/// Distance from the vehicle to `wp`, corrected to arc length for long legs.
pub fn distance_to(snap: &TickSnapshot, wp: &Waypoint) -> Option<f64> {
    let target = target_position(snap, wp)?;
    let chord = (target - snap.position).norm();
    Some(chord_to_arc(chord, snap.body_radius))
}
