//! Climate simulation: a cyclone-driven prevailing-wind field, a latitude/
//! elevation base temperature, and iterative heat advection across the mesh
//! adjacency graph.

pub mod temperature;
pub mod wind;

pub use wind::CyclonePoint;

use log::debug;

use crate::config::ClimateConfig;
use crate::planet::Planet;

/// Runs the full simulation: winds persist into `planet.tile_winds`, final
/// temperatures into `planet.tile_temperatures`.
///
/// The advection step count scales with the planet circumference, so heat
/// has time to travel around the sphere regardless of size.
pub fn simulate(planet: &mut Planet, config: &ClimateConfig) {
    let cyclones = wind::create_cyclone_points(config, planet.radius, planet.seed);
    planet.tile_winds = wind::prevailing_winds(planet, &cyclones);

    let base_temperatures = temperature::base_temperatures(planet, config);
    planet.tile_temperatures = base_temperatures.clone();

    let steps = (std::f32::consts::TAU * planet.radius).round() as usize;
    debug!(
        "advecting heat over {} tiles for {} steps",
        planet.tile_positions.len(),
        steps
    );
    temperature::advect(planet, config, &base_temperatures, steps);
}
