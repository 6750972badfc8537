//! Cyclone field generation and the prevailing-wind derivation.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::ClimateConfig;
use crate::math;
use crate::planet::Planet;
use crate::tools::stream_seed;

const CYCLONE_STREAM: u64 = 0xC0;

/// A transient wind-field generator: a point on the sphere with an influence
/// radius (along the surface) and a signed rotation speed, the sign being
/// the spin direction.
#[derive(Debug, Clone)]
pub struct CyclonePoint {
    pub position: Vec3,
    pub radius: f32,
    pub rotation_speed: f32,
}

/// Places the configured number of cyclones on a spherical Fibonacci
/// lattice, for even coverage rather than random clumping. Radii cover the
/// mean lattice cell (±50%); spin speed and direction are sampled per
/// cyclone from its own derived stream.
pub fn create_cyclone_points(
    config: &ClimateConfig,
    planet_radius: f32,
    seed: u64,
) -> Vec<CyclonePoint> {
    let count = config.cyclone_count;
    let base_radius =
        (4.0 * std::f32::consts::PI / count as f32).sqrt() * planet_radius * 0.7;

    (0..count)
        .map(|index| {
            let mut rng =
                ChaCha8Rng::seed_from_u64(stream_seed(seed, (index as u64) << 8 | CYCLONE_STREAM));
            let position = math::fibonacci_sphere_point(index, count) * planet_radius;
            let radius = rng.random_range(base_radius..base_radius * 1.5);
            let spin = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let rotation_speed =
                rng.random_range(config.min_wind_speed..config.max_wind_speed) * spin;
            CyclonePoint {
                position,
                radius,
                rotation_speed,
            }
        })
        .collect()
}

/// Derives the prevailing wind for every tile: a weighted sum over all
/// cyclones whose influence reaches the tile along the great circle, each
/// contributing its rotated radial direction projected onto the tile's
/// tangent plane. Tiles outside every cyclone get zero wind.
pub fn prevailing_winds(planet: &Planet, cyclones: &[CyclonePoint]) -> Vec<Vec3> {
    planet
        .tile_positions
        .par_iter()
        .map(|&tile_position| {
            let tile_normal = tile_position.normalize();
            let mut wind = Vec3::ZERO;
            let mut total_weight = 0.0;

            for cyclone in cyclones {
                let distance =
                    math::great_circle_distance(tile_position, cyclone.position, planet.radius);
                if distance > cyclone.radius {
                    continue;
                }
                let weight = 1.0 - distance / cyclone.radius;

                // Rotate the radial direction by the spin angle within the
                // cyclone's tangent frame. A tile at the exact center has no
                // radial direction and contributes nothing.
                let radial = (tile_position - cyclone.position).normalize_or_zero();
                if radial == Vec3::ZERO {
                    continue;
                }
                let up = cyclone.position.normalize();
                let tangent = up.cross(radial).normalize_or_zero();
                let binormal = radial.cross(tangent);
                let (sin, cos) = cyclone.rotation_speed.sin_cos();
                let local_wind = tangent * cos + binormal * sin;

                wind += math::project_onto_tangent(local_wind, tile_normal) * weight;
                total_weight += weight;
            }

            if total_weight > 0.0 {
                wind / total_weight
            } else {
                Vec3::ZERO
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icosahedron::seed_planet;
    use crate::subdivision::subdivide;

    fn test_config() -> ClimateConfig {
        ClimateConfig::default()
    }

    #[test]
    fn cyclones_sit_on_the_sphere_with_bounded_radii() {
        let config = test_config();
        let planet_radius = 20.0;
        let cyclones = create_cyclone_points(&config, planet_radius, 9);

        assert_eq!(cyclones.len(), config.cyclone_count);
        let base =
            (4.0 * std::f32::consts::PI / config.cyclone_count as f32).sqrt() * planet_radius * 0.7;
        for cyclone in &cyclones {
            assert!((cyclone.position.length() - planet_radius).abs() < 1e-3);
            assert!((base..base * 1.5).contains(&cyclone.radius));
            let speed = cyclone.rotation_speed.abs();
            assert!((config.min_wind_speed..config.max_wind_speed).contains(&speed));
        }
    }

    #[test]
    fn winds_are_tangent_to_the_sphere() {
        let planet = subdivide(&seed_planet(13));
        let cyclones = create_cyclone_points(&test_config(), planet.radius, planet.seed);
        let winds = prevailing_winds(&planet, &cyclones);

        for (tile, wind) in winds.iter().enumerate() {
            let normal = planet.tile_positions[tile].normalize();
            assert!(
                wind.dot(normal).abs() < 1e-3,
                "tile {tile} wind leaves the tangent plane"
            );
        }
    }

    #[test]
    fn no_cyclones_means_no_wind() {
        let planet = seed_planet(1);
        let winds = prevailing_winds(&planet, &[]);
        assert!(winds.iter().all(|&wind| wind == Vec3::ZERO));
    }

    #[test]
    fn out_of_reach_cyclone_leaves_far_tiles_calm() {
        let planet = seed_planet(1);
        // A single tiny cyclone at the north pole.
        let cyclone = CyclonePoint {
            position: Vec3::new(0.0, planet.radius, 0.0),
            radius: planet.radius * 0.1,
            rotation_speed: 30.0,
        };
        let winds = prevailing_winds(&planet, &[cyclone]);
        for (tile, wind) in winds.iter().enumerate() {
            let position = planet.tile_positions[tile];
            if position.y < 0.0 {
                assert_eq!(*wind, Vec3::ZERO, "southern tile {tile} should be calm");
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_field() {
        let config = test_config();
        let first = create_cyclone_points(&config, 15.0, 31);
        let second = create_cyclone_points(&config, 15.0, 31);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.radius, b.radius);
            assert_eq!(a.rotation_speed, b.rotation_speed);
        }
    }
}
