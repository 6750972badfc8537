//! De-biases the regular subdivision grid: random edge flips under degree
//! and shape constraints, alternated with centroid vertex relaxation.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::MeshConfig;
use crate::math;
use crate::planet::{INVALID, Planet};

/// Runs the configured number of flip/relax rounds. In total
/// `spoke_count · irregularity` flips are attempted, spread evenly over the
/// rounds; each round ends with one vertex-relaxation sweep.
pub fn relax(planet: &mut Planet, config: &MeshConfig, rng: &mut ChaCha8Rng) {
    let edge_flip_count = (planet.spokes.len() as f32 * config.irregularity) as u32;
    for _ in 0..config.relaxation_iterations {
        for _ in 0..edge_flip_count / config.relaxation_iterations {
            flip_random_spoke(planet, config, rng);
        }
        relax_vertices(planet, config.relaxation_strength);
    }
}

/// Picks a uniformly random spoke and flips its edge if eligible.
fn flip_random_spoke(planet: &mut Planet, config: &MeshConfig, rng: &mut ChaCha8Rng) {
    let spoke = rng.random_range(0..planet.spokes.len());
    if can_flip(planet, config, spoke) {
        flip(planet, spoke);
    }
}

/// Checks whether flipping the edge at `spoke` keeps the mesh well formed.
///
/// With A, B the tiles on the shared edge and C, D the tiles opposite it in
/// the two adjoining triangles, the flip replaces edge AB with edge CD. It
/// is rejected when A or B would drop below the minimum degree, C or D would
/// exceed the maximum, the candidate edge is too much longer than the
/// original, or either triangle has an obtuse angle at its vertex opposite
/// the shared edge.
fn can_flip(planet: &Planet, config: &MeshConfig, spoke: usize) -> bool {
    let opposite = planet.spoke_opposites[spoke];
    if opposite == INVALID {
        return false;
    }

    let tile_a = planet.spokes[spoke];
    let tile_b = planet.spokes[opposite];
    let tile_c = planet.spokes[Planet::previous_spoke(spoke)];
    let tile_d = planet.spokes[Planet::previous_spoke(opposite)];

    if planet.tile_spoke_indices(tile_a).len() <= config.min_neighbor_count
        || planet.tile_spoke_indices(tile_b).len() <= config.min_neighbor_count
    {
        return false;
    }
    if planet.tile_spoke_indices(tile_c).len() >= config.max_neighbor_count
        || planet.tile_spoke_indices(tile_d).len() >= config.max_neighbor_count
    {
        return false;
    }

    let original_length = planet.tile_positions[tile_a].distance(planet.tile_positions[tile_b]);
    let flipped_length = planet.tile_positions[tile_c].distance(planet.tile_positions[tile_d]);
    let length_difference_ratio =
        (flipped_length - original_length) / ((original_length + flipped_length) / 2.0);
    if length_difference_ratio > config.max_edge_length_difference_ratio {
        return false;
    }

    !has_obtuse_angle(planet, spoke)
}

/// For both triangles sharing the edge, checks the angle at the vertex
/// opposite the shared edge.
fn has_obtuse_angle(planet: &Planet, spoke: usize) -> bool {
    let opposite = planet.spoke_opposites[spoke];
    angle_opposite_shared_edge(planet, spoke) > std::f32::consts::FRAC_PI_2
        || angle_opposite_shared_edge(planet, opposite) > std::f32::consts::FRAC_PI_2
}

fn angle_opposite_shared_edge(planet: &Planet, spoke: usize) -> f32 {
    let a = planet.tile_positions[planet.spokes[spoke]];
    let b = planet.tile_positions[planet.spokes[Planet::next_spoke(spoke)]];
    let apex = planet.tile_positions[planet.spokes[Planet::previous_spoke(spoke)]];
    math::angle_at(apex, a, b)
}

/// Rewires the two triangles sharing the edge at `spoke` so the shared edge
/// runs C–D instead of A–B: six spoke origins, four opposite links, two tile
/// anchors, and the two affected corner centroids.
fn flip(planet: &mut Planet, spoke: usize) {
    // Pre-flip layout. Triangle 1 is (ab, bc, ca), triangle 2 is
    // (ba, ad, db); cb/ac/da/bd are the outer opposites.
    let ab = spoke;
    let bc = Planet::next_spoke(ab);
    let cb = planet.spoke_opposites[bc];
    let ca = Planet::previous_spoke(ab);
    let ac = planet.spoke_opposites[ca];

    let ba = planet.spoke_opposites[ab];
    let ad = Planet::next_spoke(ba);
    let da = planet.spoke_opposites[ad];
    let db = Planet::previous_spoke(ba);
    let bd = planet.spoke_opposites[db];

    let tile_a = planet.spokes[ab];
    let tile_b = planet.spokes[bc];
    let tile_c = planet.spokes[ca];
    let tile_d = planet.spokes[da];

    let corner_1 = Planet::spoke_corner(ab);
    let corner_2 = Planet::spoke_corner(ba);

    // Triangle 1 becomes (d, c, a); triangle 2 becomes (c, d, b).
    planet.spokes[ab] = tile_d;
    planet.spokes[bc] = tile_c;
    planet.spokes[ca] = tile_a;

    planet.spokes[ba] = tile_c;
    planet.spokes[ad] = tile_d;
    planet.spokes[db] = tile_b;

    planet.corner_positions[corner_1] = (planet.tile_positions[tile_a]
        + planet.tile_positions[tile_c]
        + planet.tile_positions[tile_d])
        / 3.0;
    planet.corner_positions[corner_2] = (planet.tile_positions[tile_b]
        + planet.tile_positions[tile_c]
        + planet.tile_positions[tile_d])
        / 3.0;

    // A and B may have anchored on a spoke that now originates elsewhere.
    planet.tile_spokes[tile_a] = ca;
    planet.tile_spokes[tile_b] = db;
    planet.tile_spokes[tile_c] = bc;
    planet.tile_spokes[tile_d] = ad;

    planet.spoke_opposites[ca] = da;
    planet.spoke_opposites[da] = ca;

    planet.spoke_opposites[ad] = bd;
    planet.spoke_opposites[bd] = ad;

    planet.spoke_opposites[db] = cb;
    planet.spoke_opposites[cb] = db;

    planet.spoke_opposites[bc] = ac;
    planet.spoke_opposites[ac] = bc;
}

/// One vertex-relaxation sweep: every tile moves toward the centroid of its
/// topological neighbors (reprojected onto the sphere), blended by
/// `strength`; corners are then re-centered on their updated tiles with the
/// same blend.
///
/// All new tile positions are computed from a snapshot before any is
/// applied, so the sweep has no read-after-write order dependence.
fn relax_vertices(planet: &mut Planet, strength: f32) {
    let new_positions: Vec<Vec3> = (0..planet.tile_positions.len())
        .map(|tile| {
            let neighbors = planet.tile_neighbor_indices(tile);
            let mut centroid = Vec3::ZERO;
            for &neighbor in &neighbors {
                centroid += planet.tile_positions[neighbor];
            }
            centroid /= neighbors.len() as f32;
            centroid.normalize() * planet.radius
        })
        .collect();

    for (tile, new_position) in new_positions.into_iter().enumerate() {
        planet.tile_positions[tile] = planet.tile_positions[tile].lerp(new_position, strength);
    }

    for corner in 0..planet.corner_positions.len() {
        let [a, b, c] = planet.corner_tile_indices(corner);
        let centroid = (planet.tile_positions[a]
            + planet.tile_positions[b]
            + planet.tile_positions[c])
            / 3.0;
        planet.corner_positions[corner] = planet.corner_positions[corner].lerp(centroid, strength);
    }
}
