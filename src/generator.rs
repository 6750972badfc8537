//! The generation pipeline: configuration in, finalized planet out.

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::climate;
use crate::config::PlanetConfig;
use crate::error::PlanetError;
use crate::icosahedron;
use crate::planet::Planet;
use crate::relaxation;
use crate::subdivision;
use crate::tectonics;
use crate::tools::stream_seed;

const RELAX_STREAM: u64 = 0x51;

/// Generates a complete planet: seeds the icosahedron, subdivides to the
/// configured size, relaxes the grid, then runs the tectonic and climate
/// simulations. Runs synchronously to completion; on error the caller is
/// expected to retry with adjusted parameters rather than resume.
pub fn generate(config: &PlanetConfig, seed: u64) -> Result<Planet, PlanetError> {
    config.validate()?;

    let mut planet = build_mesh(config, seed)?;
    info!(
        "mesh ready: size {} with {} tiles, radius {:.1}",
        planet.size,
        planet.tile_positions.len(),
        planet.radius
    );

    tectonics::simulate(&mut planet, &config.tectonics);
    climate::simulate(&mut planet, &config.climate);

    check_finite(&planet)?;
    info!("planet {seed} generated");
    Ok(planet)
}

/// Builds the finalized mesh (topology plus positions) without running the
/// simulations. The topology is validated after seeding, after every
/// subdivision level, and after relaxation; a failure here means a
/// construction bug, never a usable partial mesh.
pub fn build_mesh(config: &PlanetConfig, seed: u64) -> Result<Planet, PlanetError> {
    let mut planet = icosahedron::seed_planet(seed);
    planet.validate()?;

    for level in 0..config.size {
        planet = subdivision::subdivide(&planet);
        planet.validate()?;
        debug!(
            "subdivided to level {}: {} tiles",
            level + 1,
            planet.tile_positions.len()
        );
    }

    let mut rng = ChaCha8Rng::seed_from_u64(stream_seed(seed, RELAX_STREAM));
    relaxation::relax(&mut planet, &config.mesh, &mut rng);
    planet.validate()?;

    Ok(planet)
}

fn check_finite(planet: &Planet) -> Result<(), PlanetError> {
    for (tile, &elevation) in planet.tile_elevations.iter().enumerate() {
        if !elevation.is_finite() {
            return Err(PlanetError::DegenerateResult(format!(
                "elevation of tile {tile} is {elevation}"
            )));
        }
    }
    for (tile, &temperature) in planet.tile_temperatures.iter().enumerate() {
        if !temperature.is_finite() {
            return Err(PlanetError::DegenerateResult(format!(
                "temperature of tile {tile} is {temperature}"
            )));
        }
    }
    for (tile, wind) in planet.tile_winds.iter().enumerate() {
        if !wind.is_finite() {
            return Err(PlanetError::DegenerateResult(format!(
                "wind of tile {tile} is {wind}"
            )));
        }
    }
    Ok(())
}
