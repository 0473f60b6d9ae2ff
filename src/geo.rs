use glam::{DVec2, DVec3};
use std::f64::consts::{PI, TAU};

/// Convert lon/lat (degrees) to a unit sphere vector.
///
/// Longitude is offset by -90° and z is flipped so that lon 0 / lat 0 faces
/// +z, matching the texture mapping of the sphere mesh.
#[inline(always)]
pub fn spherical_to_cartesian(lon: f64, lat: f64) -> DVec3 {
    let lambda = (lon - 90.0).to_radians();
    let phi = lat.to_radians();
    DVec3::new(
        phi.cos() * lambda.cos(),
        phi.sin(),
        -phi.cos() * lambda.sin(),
    )
}

/// Convert a vector to lon/lat degrees (`x` = lon, `y` = lat).
/// The input is normalized first; the zero vector maps to (0, 0).
#[inline(always)]
pub fn cartesian_to_spherical(v: DVec3) -> DVec2 {
    let v = v.normalize_or_zero();
    let lon = v.x.atan2(v.z).to_degrees();
    let lat = v.y.clamp(-1.0, 1.0).asin().to_degrees();
    DVec2::new(lon, lat)
}

/// Normalize an angle in radians into [-π, π].
#[inline(always)]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI && angle > 0.0 {
        PI
    } else {
        wrapped
    }
}

/// Interpolate along a great circle arc and call a visitor for each
/// subdivision point (the start point excluded, the end point included).
/// `step_deg` is the target angular length of one segment.
#[inline]
pub fn great_circle_points(a: DVec3, b: DVec3, step_deg: f64, mut visitor: impl FnMut(DVec3)) {
    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos();

    let steps = ((angle.to_degrees() / step_deg.max(1e-3)).ceil() as usize).max(1);
    let sin_angle = angle.sin();

    // Short, degenerate or antipodal arcs: just emit the endpoint
    if steps == 1 || sin_angle.abs() < 1e-10 {
        visitor(b);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        visitor(a * sa + b * sb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_reference_directions() {
        // lon 0 / lat 0 faces +z
        let v = spherical_to_cartesian(0.0, 0.0);
        assert!((v - DVec3::Z).length() < TOLERANCE);

        // lon 90 faces +x
        let v = spherical_to_cartesian(90.0, 0.0);
        assert!((v - DVec3::X).length() < TOLERANCE);

        // north pole is +y
        let v = spherical_to_cartesian(37.0, 90.0);
        assert!((v - DVec3::Y).length() < TOLERANCE);
    }

    #[test]
    fn test_round_trip() {
        for &(lon, lat) in &[
            (0.0, 0.0),
            (45.0, 30.0),
            (-120.5, -60.25),
            (179.0, 89.0),
            (-179.0, -89.0),
            (10.0, 0.001),
        ] {
            let p = cartesian_to_spherical(spherical_to_cartesian(lon, lat));
            assert!((p.x - lon).abs() < 1e-9, "lon {} -> {}", lon, p.x);
            assert!((p.y - lat).abs() < 1e-9, "lat {} -> {}", lat, p.y);
        }
    }

    #[test]
    fn test_poles_do_not_panic() {
        let north = cartesian_to_spherical(spherical_to_cartesian(0.0, 90.0));
        assert!((north.y - 90.0).abs() < 1e-9);
        assert!(north.x.is_finite());

        let south = cartesian_to_spherical(DVec3::new(0.0, -1.0, 0.0));
        assert!((south.y + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_unit_input_is_normalized() {
        let p = cartesian_to_spherical(spherical_to_cartesian(30.0, 20.0) * 4.5);
        assert!((p.x - 30.0).abs() < 1e-9);
        assert!((p.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(cartesian_to_spherical(DVec3::ZERO), DVec2::ZERO);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < TOLERANCE);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < TOLERANCE);
        assert!((wrap_angle(0.25) - 0.25).abs() < TOLERANCE);
        assert_eq!(wrap_angle(PI), PI);
    }

    #[test]
    fn test_great_circle_ends_on_target() {
        let a = spherical_to_cartesian(0.0, 0.0);
        let b = spherical_to_cartesian(90.0, 0.0);
        let mut points = Vec::new();
        great_circle_points(a, b, 2.0, |p| points.push(p));
        assert!((45..=46).contains(&points.len()));
        assert!((points[points.len() - 1] - b).length() < TOLERANCE);
        for p in points {
            assert!((p.length() - 1.0).abs() < 1e-9);
        }
    }
}
