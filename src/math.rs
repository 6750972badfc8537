//! Small geometry helpers shared by mesh construction and both simulations.

use glam::Vec3;

/// Linear interpolation between two scalars.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Angle between two unit vectors, with the dot product clamped so floating
/// point drift near parallel/antiparallel inputs never reaches `acos` out of
/// domain.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Great-circle distance between two points on a sphere of the given radius.
pub fn great_circle_distance(a: Vec3, b: Vec3, radius: f32) -> f32 {
    angle_between(a.normalize(), b.normalize()) * radius
}

/// Removes the component of `v` along the unit `normal`, leaving the part
/// tangent to the sphere at that normal.
pub fn project_onto_tangent(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Angle at `apex` in the triangle `(apex, a, b)`, via the law of cosines.
pub fn angle_at(apex: Vec3, a: Vec3, b: Vec3) -> f32 {
    let v1 = a - apex;
    let v2 = b - apex;
    let lengths = v1.length() * v2.length();
    if lengths == 0.0 {
        return 0.0;
    }
    (v1.dot(v2) / lengths).clamp(-1.0, 1.0).acos()
}

/// The `i`-th of `n` points of a spherical Fibonacci lattice on the unit
/// sphere. Gives near-even coverage without randomness.
pub fn fibonacci_sphere_point(i: usize, n: usize) -> Vec3 {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let z = 1.0 - (i as f32 + 0.5) * (2.0 / n as f32);
    let radial = (1.0 - z * z).sqrt();
    let theta = golden_angle * i as f32;
    Vec3::new(theta.cos() * radial, theta.sin() * radial, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_circle_distance() {
        let a = Vec3::X;
        let b = Vec3::Y;
        let distance = great_circle_distance(a * 2.0, b * 2.0, 2.0);
        assert!((distance - std::f32::consts::FRAC_PI_2 * 2.0).abs() < 1e-5);
    }

    #[test]
    fn tangent_projection_is_orthogonal_to_normal() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let tangent = project_onto_tangent(v, normal);
        assert!(tangent.dot(normal).abs() < 1e-6);
    }

    #[test]
    fn right_angle_at_apex() {
        let angle = angle_at(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn angle_clamps_near_parallel() {
        let a = Vec3::new(1.0, 1e-8, 0.0).normalize();
        let angle = angle_between(a, Vec3::X);
        assert!(angle.is_finite());
    }

    #[test]
    fn fibonacci_points_stay_on_unit_sphere() {
        for i in 0..32 {
            let p = fibonacci_sphere_point(i, 32);
            assert!((p.length() - 1.0).abs() < 1e-5, "point {i} off sphere");
        }
    }
}
