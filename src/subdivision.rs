//! 4× mesh refinement: every face splits into four, every tile survives.

use std::collections::HashMap;

use crate::planet::Planet;

/// Builds the next subdivision level from `planet`.
///
/// All existing tiles are retained (rescaled to the new level's radius), one
/// midpoint tile is created per undirected edge, and each parent face is
/// replaced by three corner sub-triangles plus the central one. The
/// opposite-edge map is scoped to this pass; linkage never carries over from
/// the parent mesh.
pub fn subdivide(planet: &Planet) -> Planet {
    let mut child = Planet::new(planet.seed, planet.size + 1);
    let scale = child.radius / planet.radius;
    for &position in &planet.tile_positions {
        child.add_tile_center(position * scale);
    }

    let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
    let mut edge_lookup = HashMap::new();

    for corner in 0..planet.corner_positions.len() {
        let [a, b, c] = planet.corner_tile_indices(corner);

        let ab = midpoint_tile(&mut child, &mut midpoints, a, b);
        let bc = midpoint_tile(&mut child, &mut midpoints, b, c);
        let ca = midpoint_tile(&mut child, &mut midpoints, c, a);

        child.add_tile_corner(a, ab, ca, &mut edge_lookup);
        child.add_tile_corner(b, bc, ab, &mut edge_lookup);
        child.add_tile_corner(c, ca, bc, &mut edge_lookup);
        child.add_tile_corner(ab, bc, ca, &mut edge_lookup);
    }

    child
}

/// Returns the midpoint tile for the edge `(a, b)`, creating it on first
/// sight. The key is ordered so both faces sharing the edge get the same
/// midpoint; the position is projected back onto the sphere.
fn midpoint_tile(
    child: &mut Planet,
    midpoints: &mut HashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
) -> usize {
    let key = (a.min(b), a.max(b));
    if let Some(&tile) = midpoints.get(&key) {
        return tile;
    }

    let midpoint = (child.tile_positions[a] + child.tile_positions[b]) / 2.0;
    let tile = child.add_tile_center(midpoint.normalize() * child.radius);
    midpoints.insert(key, tile);
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icosahedron::seed_planet;
    use crate::planet::{corner_count, tile_count};
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn refinement_hits_exact_counts(#[case] levels: u32) {
        let mut planet = seed_planet(7);
        for _ in 0..levels {
            planet = subdivide(&planet);
        }
        assert_eq!(planet.size, levels);
        assert_eq!(planet.tile_positions.len(), tile_count(levels));
        assert_eq!(planet.corner_positions.len(), corner_count(levels));
        planet.validate().unwrap();
    }

    #[test]
    fn parent_tiles_survive_with_directions_intact() {
        let parent = seed_planet(7);
        let child = subdivide(&parent);
        for (tile, &position) in parent.tile_positions.iter().enumerate() {
            let parent_direction = position.normalize();
            let child_direction = child.tile_positions[tile].normalize();
            assert!(parent_direction.distance(child_direction) < 1e-5, "tile {tile} moved");
        }
    }

    #[test]
    fn all_tiles_projected_onto_new_radius() {
        let child = subdivide(&seed_planet(7));
        for (tile, position) in child.tile_positions.iter().enumerate() {
            assert!(
                (position.length() - child.radius).abs() < 1e-3,
                "tile {tile} off sphere"
            );
        }
    }

    #[test]
    fn original_vertices_keep_degree_five() {
        let child = subdivide(&subdivide(&seed_planet(7)));
        for tile in 0..12 {
            assert_eq!(child.tile_neighbor_indices(tile).len(), 5);
        }
        // Midpoint tiles are ordinary hexagonal sites.
        assert_eq!(child.tile_neighbor_indices(12).len(), 6);
    }
}
