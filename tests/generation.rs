//! End-to-end generation scenarios exercised through the public API.

use tellus::config::{PlanetConfig, TectonicsConfig};
use tellus::generator::{build_mesh, generate};
use tellus::planet::{corner_count, spoke_count, tile_count};

/// A small, fast configuration used by the end-to-end cases.
fn small_config() -> PlanetConfig {
    PlanetConfig {
        size: 2,
        ..Default::default()
    }
}

#[test]
fn size_zero_reproduces_the_canonical_icosahedron() {
    let mut config = small_config();
    config.size = 0;
    config.mesh.relaxation_iterations = 0;

    let planet = build_mesh(&config, 12345).unwrap();

    assert_eq!(planet.tile_positions.len(), 12);
    assert_eq!(planet.corner_positions.len(), 20);
    assert_eq!(planet.spokes.len(), 60);
    assert_eq!(tile_count(0), 12);
    assert_eq!(corner_count(0), 20);
    assert_eq!(spoke_count(0), 60);

    for tile in 0..12 {
        assert_eq!(
            planet.tile_neighbor_indices(tile).len(),
            5,
            "tile {tile} lost the icosahedron adjacency"
        );
    }
}

#[test]
fn one_plate_covers_the_planet_uniformly() {
    let mut config = small_config();
    config.tectonics = TectonicsConfig {
        plate_count: 1,
        designate_extremes: false,
        ..Default::default()
    };

    let planet = generate(&config, 777).unwrap();

    let first = planet.tile_elevations[0];
    assert!(
        planet
            .tile_elevations
            .iter()
            .all(|&elevation| elevation == first),
        "single-plate planet has elevation relief"
    );
}

#[test]
fn generation_produces_a_closed_finite_planet() {
    let config = small_config();
    let planet = generate(&config, 2024).unwrap();

    planet.validate().unwrap();
    assert_eq!(planet.tile_positions.len(), tile_count(config.size));

    for tile in 0..planet.tile_positions.len() {
        assert!(planet.tile_elevations[tile].is_finite());
        assert!(planet.tile_temperatures[tile].is_finite());
        assert!(planet.tile_winds[tile].is_finite());
        // Temperatures stay in a physically plausible band around the
        // configured references.
        assert!((-80.0..=80.0).contains(&planet.tile_temperatures[tile]));
    }
}

#[test]
fn fixed_seed_regenerates_the_same_planet() {
    let config = small_config();
    let first = generate(&config, 99).unwrap();
    let second = generate(&config, 99).unwrap();

    assert_eq!(first.spokes, second.spokes);
    assert_eq!(first.tile_positions, second.tile_positions);
    assert_eq!(first.tile_elevations, second.tile_elevations);
    assert_eq!(first.tile_temperatures, second.tile_temperatures);
    assert_eq!(first.tile_winds, second.tile_winds);
}

#[test]
fn different_seeds_diverge() {
    let config = small_config();
    let first = generate(&config, 1).unwrap();
    let second = generate(&config, 2).unwrap();

    assert_ne!(
        first.tile_elevations, second.tile_elevations,
        "two seeds produced identical elevations"
    );
}

#[test]
fn invalid_configuration_is_rejected_before_any_work() {
    let mut config = small_config();
    config.tectonics.plate_count = 0;
    let error = generate(&config, 5).unwrap_err();
    assert!(matches!(error, tellus::PlanetError::InvalidConfig(_)));
}
