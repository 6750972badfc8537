//! Base temperature and iterative heat advection.

use rayon::prelude::*;

use crate::config::ClimateConfig;
use crate::math::lerp;
use crate::planet::Planet;

/// Elevation difference at which heat exchange between neighbors shuts off
/// entirely; mountain ranges act as thermal walls.
const ELEVATION_BARRIER: f32 = 3.0;
/// Ocean tiles mix heat a little faster than land.
const OCEAN_MIXING_BOOST: f32 = 1.2;

/// Computes every tile's pre-advection temperature: a latitude blend from
/// the equatorial to the polar reference, adjusted by elevation with a lapse
/// rate that differs underwater.
pub fn base_temperatures(planet: &Planet, config: &ClimateConfig) -> Vec<f32> {
    planet
        .tile_positions
        .par_iter()
        .zip(planet.tile_elevations.par_iter())
        .map(|(&position, &elevation)| {
            let latitude = position.normalize().y.abs().sin();
            let base = lerp(
                config.equatorial_temperature,
                config.polar_temperature,
                latitude,
            );
            let lapse_rate = if elevation < 0.0 {
                config.underwater_lapse_rate
            } else {
                config.land_lapse_rate
            };
            base + elevation * lapse_rate
        })
        .collect()
}

/// Runs `steps` heat-advection iterations over `planet.tile_temperatures`.
///
/// Every step maps the previous temperature buffer to a fresh one: tiles
/// are independent within a step, and the buffer swap is the barrier that
/// keeps steps strictly sequential with respect to each other.
pub fn advect(planet: &mut Planet, config: &ClimateConfig, base_temperatures: &[f32], steps: usize) {
    for _ in 0..steps {
        let snapshot: &Planet = planet;
        let next: Vec<f32> = (0..snapshot.tile_positions.len())
            .into_par_iter()
            .map(|tile| advect_tile(snapshot, config, base_temperatures, tile))
            .collect();
        planet.tile_temperatures = next;
    }
}

/// One tile's step: a weighted average with its neighbors (downwind
/// neighbors and ocean neighbors weigh more, big elevation jumps weigh
/// less), pulled toward the base temperature by the forcing factor, then
/// damped toward the previous temperature by the advection factor.
fn advect_tile(
    planet: &Planet,
    config: &ClimateConfig,
    base_temperatures: &[f32],
    tile: usize,
) -> f32 {
    let current = planet.tile_temperatures[tile];
    let mut weighted_sum = current;
    let mut total_weight = 1.0;

    for neighbor in planet.tile_neighbor_indices(tile) {
        let direction = (planet.tile_positions[neighbor] - planet.tile_positions[tile])
            .normalize_or_zero();
        let wind_alignment = (direction.dot(planet.tile_winds[tile]) + 1.0) * 0.5;

        let elevation_difference =
            (planet.tile_elevations[tile] - planet.tile_elevations[neighbor]).abs();
        let elevation_factor = 1.0 - (elevation_difference / ELEVATION_BARRIER).clamp(0.0, 1.0);

        let ocean_factor = if planet.tile_elevations[neighbor] < 0.0 {
            OCEAN_MIXING_BOOST
        } else {
            1.0
        };

        let weight = wind_alignment * elevation_factor * ocean_factor;
        weighted_sum += planet.tile_temperatures[neighbor] * weight;
        total_weight += weight;
    }

    let advected = weighted_sum / total_weight;
    let forced = lerp(advected, base_temperatures[tile], config.forcing_factor);
    lerp(current, forced, config.advection_factor)
}
