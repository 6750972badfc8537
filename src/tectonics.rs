//! Tectonic plate simulation: grows plate regions over the mesh graph,
//! derives per-boundary stress from relative plate motion, and propagates
//! elevation from the boundaries into plate interiors.
//!
//! The stages run strictly in sequence, each consuming the previous stage's
//! full output. Plate generation and the per-tile velocity map are
//! order-independent; frontier spreading and the interior BFS are inherently
//! sequential and draw from explicit seeded streams so a planet seed always
//! reproduces the same boundaries.

use std::collections::VecDeque;

use glam::Vec3;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::TectonicsConfig;
use crate::math::lerp;
use crate::planet::{INVALID, Planet};
use crate::plate::{Plate, PlateKind};
use crate::tools::stream_seed;

/// Stage tags for deriving RNG streams from the planet seed. Per-plate
/// streams pack the plate id above the tag byte so no two stages ever share
/// a stream.
const PLATE_STREAM: u64 = 0x70;
const SPREAD_STREAM: u64 = 0x71;

/// Runs the full simulation, writing final elevations into
/// `planet.tile_elevations`.
pub fn simulate(planet: &mut Planet, config: &TectonicsConfig) {
    let tile_count = planet.tile_positions.len();

    let mut plates = generate_plates(config, tile_count, planet.seed);
    let mut tile_plates = vec![INVALID; tile_count];
    assign_plate_seeds(planet, &plates, &mut tile_plates);
    spread_plates(planet, &plates, &mut tile_plates);
    debug!("spread {} plates over {} tiles", plates.len(), tile_count);

    if config.designate_extremes {
        designate_extremes(config, &mut plates, &tile_plates);
    }

    let (pressures, shears) = compute_stresses(planet, &plates, &tile_plates);
    debug!(
        "peak boundary stress: pressure {:.2}, shear {:.2}",
        pressures.iter().fold(0.0f32, |a, p| a.max(p.abs())),
        shears.iter().fold(0.0f32, |a, s| a.max(*s)),
    );

    resolve_boundary_elevations(planet, config, &plates, &tile_plates, &pressures);
    propagate_interior_elevations(planet, config, &plates, &tile_plates);
}

/// Creates the plate set. Each plate derives its own RNG from the planet
/// seed and its id, so the stage is order-independent; the oceanic/
/// continental split follows the configured ratio deterministically by
/// index.
fn generate_plates(config: &TectonicsConfig, tile_count: usize, seed: u64) -> Vec<Plate> {
    (0..config.plate_count)
        .map(|id| {
            let mut rng =
                ChaCha8Rng::seed_from_u64(stream_seed(seed, (id as u64) << 8 | PLATE_STREAM));
            let kind = if (id as f32) / (config.plate_count as f32) < config.oceanic_plate_ratio {
                PlateKind::Oceanic
            } else {
                PlateKind::Continental
            };
            let (min_elevation, max_elevation) = match kind {
                PlateKind::Oceanic => (config.min_oceanic_elevation, config.max_oceanic_elevation),
                PlateKind::Continental => (
                    config.min_continental_elevation,
                    config.max_continental_elevation,
                ),
            };
            Plate {
                id,
                kind,
                desired_elevation: sample_range(&mut rng, min_elevation, max_elevation),
                rotation_axis: random_unit_vector(&mut rng),
                rotation_rate: sample_range(
                    &mut rng,
                    config.min_rotation_rate,
                    config.max_rotation_rate,
                ),
                seed_tile: rng.random_range(0..tile_count),
            }
        })
        .collect()
}

fn sample_range(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    if min == max {
        return min;
    }
    rng.random_range(min..max)
}

fn random_unit_vector(rng: &mut ChaCha8Rng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if let Some(unit) = candidate.try_normalize() {
            return unit;
        }
    }
}

/// Fixes each plate's seed tile assignment. Two plates may roll the same
/// seed tile; the later plate keeps the tile, both still spread from it.
fn assign_plate_seeds(planet: &mut Planet, plates: &[Plate], tile_plates: &mut [usize]) {
    for plate in plates {
        tile_plates[plate.seed_tile] = plate.id;
        planet.tile_elevations[plate.seed_tile] = plate.desired_elevation;
    }
}

/// Voronoi-like region growth: repeatedly pick a random active frontier
/// entry and let it claim one unassigned neighbor; entries with no free
/// neighbor left are swap-removed. Terminates when every tile has a plate.
///
/// The growth order determines the final boundary shapes, so the stage runs
/// single-threaded on one seeded stream.
fn spread_plates(planet: &mut Planet, plates: &[Plate], tile_plates: &mut [usize]) {
    let mut rng = ChaCha8Rng::seed_from_u64(stream_seed(planet.seed, SPREAD_STREAM));
    let mut frontier: Vec<(usize, usize)> = plates
        .iter()
        .map(|plate| (plate.seed_tile, plate.id))
        .collect();

    while !frontier.is_empty() {
        let index = rng.random_range(0..frontier.len());
        let (tile, plate_id) = frontier[index];

        let mut claimed = false;
        for neighbor in planet.tile_neighbor_indices(tile) {
            if tile_plates[neighbor] == INVALID {
                tile_plates[neighbor] = plate_id;
                planet.tile_elevations[neighbor] = plates[plate_id].desired_elevation;
                frontier.push((neighbor, plate_id));
                claimed = true;
                break;
            }
        }

        if !claimed {
            frontier.swap_remove(index);
        }
    }
}

/// Overrides the extreme plates of each kind so every planet gets a distinct
/// trench, abyssal plain, peak, and plains region regardless of how the
/// elevation sampling rolled. A kind with no plates is skipped.
fn designate_extremes(config: &TectonicsConfig, plates: &mut [Plate], tile_plates: &[usize]) {
    let mut sizes = vec![0usize; plates.len()];
    for &plate in tile_plates {
        sizes[plate] += 1;
    }

    let extreme = |kind: PlateKind, largest: bool, plates: &[Plate]| -> Option<usize> {
        let candidates = plates.iter().filter(|plate| plate.kind == kind);
        if largest {
            candidates.max_by_key(|plate| sizes[plate.id]).map(|p| p.id)
        } else {
            candidates.min_by_key(|plate| sizes[plate.id]).map(|p| p.id)
        }
    };

    if let Some(id) = extreme(PlateKind::Oceanic, false, plates) {
        plates[id].desired_elevation = config.trench_elevation;
    }
    if let Some(id) = extreme(PlateKind::Oceanic, true, plates) {
        plates[id].desired_elevation = config.min_oceanic_elevation;
    }
    if let Some(id) = extreme(PlateKind::Continental, false, plates) {
        plates[id].desired_elevation = config.max_continental_elevation;
    }
    if let Some(id) = extreme(PlateKind::Continental, true, plates) {
        plates[id].desired_elevation = config.plains_elevation;
    }
}

/// Computes per-spoke stress. Each tile's linear velocity comes from its
/// plate's angular rotation; for every undirected edge the relative
/// velocity is projected onto the boundary normal (signed pressure,
/// positive = convergence) and the corner-to-corner tangent (unsigned
/// shear), stored symmetrically on both spokes.
fn compute_stresses(
    planet: &Planet,
    plates: &[Plate],
    tile_plates: &[usize],
) -> (Vec<f32>, Vec<f32>) {
    let velocities: Vec<Vec3> = (0..planet.tile_positions.len())
        .into_par_iter()
        .map(|tile| {
            let plate = &plates[tile_plates[tile]];
            (plate.rotation_axis * plate.rotation_rate).cross(planet.tile_positions[tile])
        })
        .collect();

    let spoke_count = planet.spokes.len();
    let mut pressures = vec![0.0; spoke_count];
    let mut shears = vec![0.0; spoke_count];

    for spoke in 0..spoke_count {
        let opposite = planet.spoke_opposites[spoke];
        if spoke > opposite {
            continue;
        }

        let tile_a = planet.spokes[spoke];
        let tile_b = planet.spokes[opposite];

        let normal = (planet.tile_positions[tile_b] - planet.tile_positions[tile_a])
            .normalize_or_zero();
        let (corner_1, corner_2) = planet.spoke_corners(spoke);
        let tangent = (planet.corner_positions[corner_2] - planet.corner_positions[corner_1])
            .normalize_or_zero();

        let relative_velocity = velocities[tile_b] - velocities[tile_a];
        let pressure = -relative_velocity.dot(normal);
        let shear = relative_velocity.dot(tangent).abs();

        pressures[spoke] = pressure;
        pressures[opposite] = pressure;
        shears[spoke] = shear;
        shears[opposite] = shear;
    }

    (pressures, shears)
}

/// Resolves an elevation for every inter-plate boundary edge from its
/// pressure and blends it into both sides' running estimates.
///
/// A tile touching several boundaries is halved toward each boundary
/// elevation in ascending spoke order; the accumulation is deliberately
/// order-sensitive but the order is fixed, so results are reproducible.
fn resolve_boundary_elevations(
    planet: &mut Planet,
    config: &TectonicsConfig,
    plates: &[Plate],
    tile_plates: &[usize],
    pressures: &[f32],
) {
    let mut new_elevations: Vec<f32> = tile_plates
        .iter()
        .map(|&plate| plates[plate].desired_elevation)
        .collect();

    for spoke in 0..planet.spokes.len() {
        let opposite = planet.spoke_opposites[spoke];
        if spoke > opposite {
            continue;
        }

        let tile_a = planet.spokes[spoke];
        let tile_b = planet.spokes[opposite];
        let plate_a = &plates[tile_plates[tile_a]];
        let plate_b = &plates[tile_plates[tile_b]];
        if plate_a.id == plate_b.id {
            continue;
        }

        let pressure = pressures[spoke];
        let desired_a = plate_a.desired_elevation;
        let desired_b = plate_b.desired_elevation;
        let average = (desired_a + desired_b) / 2.0;
        let highest = desired_a.max(desired_b);

        let boundary_elevation = if pressure.abs() < config.low_stress_threshold {
            average
        } else if pressure > config.high_stress_threshold {
            if plate_a.kind == plate_b.kind {
                highest + config.uplift_amount
            } else {
                // Convergence with differing kinds: the continental side
                // rides up over the subducting oceanic side.
                let continental = if plate_a.kind == PlateKind::Continental {
                    desired_a
                } else {
                    desired_b
                };
                continental + config.uplift_amount
            }
        } else if pressure < -config.high_stress_threshold {
            highest * config.divergent_factor
        } else {
            let t = (pressure.abs() - config.low_stress_threshold)
                / (config.high_stress_threshold - config.low_stress_threshold);
            lerp(average, highest, t)
        };

        new_elevations[tile_a] = (new_elevations[tile_a] + boundary_elevation) * 0.5;
        new_elevations[tile_b] = (new_elevations[tile_b] + boundary_elevation) * 0.5;
    }

    planet.tile_elevations.copy_from_slice(&new_elevations);
}

/// How a tile's plate relates to the nearest differing-kind neighbor:
/// `Some(Oceanic)` means the tile's oceanic plate is sinking under a
/// continental neighbor, `Some(Continental)` means it is overriding an
/// oceanic one, `None` means no differing-kind boundary is adjacent.
fn subduction_kind(
    planet: &Planet,
    tile: usize,
    plates: &[Plate],
    tile_plates: &[usize],
) -> Option<PlateKind> {
    let kind = plates[tile_plates[tile]].kind;
    for neighbor in planet.tile_neighbor_indices(tile) {
        let neighbor_kind = plates[tile_plates[neighbor]].kind;
        if neighbor_kind != kind {
            return Some(kind);
        }
    }
    None
}

fn is_boundary_tile(planet: &Planet, tile: usize, tile_plates: &[usize]) -> bool {
    planet
        .tile_neighbor_indices(tile)
        .into_iter()
        .any(|neighbor| tile_plates[neighbor] != tile_plates[tile])
}

/// Multi-source BFS from all boundary tiles at once, then a per-tile blend
/// between the propagated boundary elevation and the plate's desired
/// elevation, shaped by the subduction-aware falloff curves.
fn propagate_interior_elevations(
    planet: &mut Planet,
    config: &TectonicsConfig,
    plates: &[Plate],
    tile_plates: &[usize],
) {
    let tile_count = planet.tile_positions.len();
    let mut steps = vec![usize::MAX; tile_count];
    let mut boundary_source = vec![INVALID; tile_count];
    let mut queue = VecDeque::new();

    for tile in 0..tile_count {
        if is_boundary_tile(planet, tile, tile_plates) {
            steps[tile] = 0;
            boundary_source[tile] = tile;
            queue.push_back(tile);
        }
    }

    while let Some(tile) = queue.pop_front() {
        let next_steps = steps[tile] + 1;
        for neighbor in planet.tile_neighbor_indices(tile) {
            if next_steps < steps[neighbor] {
                steps[neighbor] = next_steps;
                boundary_source[neighbor] = boundary_source[tile];
                queue.push_back(neighbor);
            }
        }
    }

    let mut plate_max_distance = vec![0usize; plates.len()];
    let mut propagated_elevations = vec![0.0; tile_count];
    for tile in 0..tile_count {
        propagated_elevations[tile] = if boundary_source[tile] != INVALID {
            planet.tile_elevations[boundary_source[tile]]
        } else {
            planet.tile_elevations[tile]
        };

        let plate = tile_plates[tile];
        if steps[tile] != usize::MAX && steps[tile] > plate_max_distance[plate] {
            plate_max_distance[plate] = steps[tile];
        }
    }

    for tile in 0..tile_count {
        let plate = &plates[tile_plates[tile]];
        let max_distance = plate_max_distance[plate.id].max(1);
        // Unreached tiles (a plate with no boundary at all) saturate to the
        // plate interior.
        let t = if steps[tile] == usize::MAX {
            1.0
        } else {
            (steps[tile] as f32 / max_distance as f32).clamp(0.0, 1.0)
        };

        let curve = match subduction_kind(planet, tile, plates, tile_plates) {
            Some(PlateKind::Oceanic) => &config.oceanic_subduction_curve,
            Some(PlateKind::Continental) => &config.continental_subduction_curve,
            None => &config.plain_curve,
        };
        let factor = curve.evaluate(t);

        planet.tile_elevations[tile] =
            lerp(propagated_elevations[tile], plate.desired_elevation, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TectonicsConfig;
    use crate::icosahedron::seed_planet;
    use crate::subdivision::subdivide;

    fn level_two_planet(seed: u64) -> Planet {
        subdivide(&subdivide(&seed_planet(seed)))
    }

    #[test]
    fn plate_kinds_follow_the_configured_ratio() {
        let config = TectonicsConfig {
            plate_count: 10,
            oceanic_plate_ratio: 0.7,
            ..Default::default()
        };
        let plates = generate_plates(&config, 162, 1);
        let oceanic = plates
            .iter()
            .filter(|plate| plate.kind == PlateKind::Oceanic)
            .count();
        assert_eq!(oceanic, 7);
        for plate in &plates {
            assert!((plate.rotation_axis.length() - 1.0).abs() < 1e-5);
            assert!(plate.seed_tile < 162);
            let (min, max) = match plate.kind {
                PlateKind::Oceanic => {
                    (config.min_oceanic_elevation, config.max_oceanic_elevation)
                }
                PlateKind::Continental => (
                    config.min_continental_elevation,
                    config.max_continental_elevation,
                ),
            };
            assert!((min..=max).contains(&plate.desired_elevation));
        }
    }

    #[test]
    fn spreading_assigns_every_tile() {
        let mut planet = level_two_planet(3);
        let config = TectonicsConfig {
            plate_count: 5,
            ..Default::default()
        };
        let plates = generate_plates(&config, planet.tile_positions.len(), planet.seed);
        let mut tile_plates = vec![INVALID; planet.tile_positions.len()];
        assign_plate_seeds(&mut planet, &plates, &mut tile_plates);
        spread_plates(&mut planet, &plates, &mut tile_plates);

        assert!(tile_plates.iter().all(|&plate| plate != INVALID));
        // Regions are connected to their seeds, so at least the seed tiles
        // carry their own plates (unless stolen by a duplicate roll).
        let claimed: std::collections::HashSet<_> = tile_plates.iter().copied().collect();
        assert!(!claimed.is_empty());
    }

    #[test]
    fn single_plate_planet_is_uniform_at_desired_elevation() {
        let mut planet = level_two_planet(11);
        let config = TectonicsConfig {
            plate_count: 1,
            designate_extremes: false,
            ..Default::default()
        };
        simulate(&mut planet, &config);

        let expected = planet.tile_elevations[0];
        let plates = generate_plates(&config, planet.tile_positions.len(), planet.seed);
        assert_eq!(expected, plates[0].desired_elevation);
        for &elevation in &planet.tile_elevations {
            assert_eq!(elevation, expected);
        }
    }

    #[test]
    fn elevations_stay_within_plate_and_uplift_bounds() {
        let mut planet = level_two_planet(21);
        let config = TectonicsConfig::default();
        simulate(&mut planet, &config);

        let lowest = config.trench_elevation.min(config.min_oceanic_elevation);
        let highest = config.max_continental_elevation + config.uplift_amount;
        for (tile, &elevation) in planet.tile_elevations.iter().enumerate() {
            assert!(
                (lowest..=highest).contains(&elevation),
                "tile {tile} at {elevation}"
            );
        }
    }

    #[test]
    fn same_seed_reproduces_identical_elevations() {
        let config = TectonicsConfig::default();

        let mut first = level_two_planet(77);
        simulate(&mut first, &config);
        let mut second = level_two_planet(77);
        simulate(&mut second, &config);

        assert_eq!(first.tile_elevations, second.tile_elevations);
    }

    #[test]
    fn stress_is_symmetric_across_opposites() {
        let mut planet = level_two_planet(5);
        let config = TectonicsConfig::default();
        let plates = generate_plates(&config, planet.tile_positions.len(), planet.seed);
        let mut tile_plates = vec![INVALID; planet.tile_positions.len()];
        assign_plate_seeds(&mut planet, &plates, &mut tile_plates);
        spread_plates(&mut planet, &plates, &mut tile_plates);

        let (pressures, shears) = compute_stresses(&planet, &plates, &tile_plates);
        for spoke in 0..planet.spokes.len() {
            let opposite = planet.spoke_opposites[spoke];
            assert_eq!(pressures[spoke], pressures[opposite]);
            assert_eq!(shears[spoke], shears[opposite]);
            assert!(shears[spoke] >= 0.0);
        }
    }
}
