//! The canonical icosahedron the planet mesh grows from.

use std::collections::HashMap;

use glam::Vec3;

use crate::planet::Planet;

/// The 12 icosahedron vertices built from the golden ratio, not yet
/// normalized.
pub fn vertices() -> [Vec3; 12] {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ]
}

/// The 20 triangular faces as vertex-index triples, wound consistently so
/// that shared edges always appear in opposite directions.
pub const FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Builds the level-0 planet: 12 tiles, 20 corners, 60 spokes, every
/// opposite linked in one registration pass.
pub fn seed_planet(seed: u64) -> Planet {
    let mut planet = Planet::new(seed, 0);
    for vertex in vertices() {
        planet.add_tile_center(vertex.normalize() * planet.radius);
    }

    let mut edge_lookup = HashMap::new();
    for [a, b, c] in FACES {
        planet.add_tile_corner(a, b, c, &mut edge_lookup);
    }

    planet
}
