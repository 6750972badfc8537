//! Flat-array half-edge mesh for a subdivided icosphere.
//!
//! Topology lives in three index arrays instead of a pointer graph: the mesh
//! is rebuilt wholesale at every subdivision level, and both sequential and
//! parallel passes index into the same buffers without per-node allocation.
//!
//! A *spoke* is a directed edge. Triangle `c` owns spokes `3c..3c+3`;
//! `spokes[s]` is the tile the spoke originates from, and the spoke runs to
//! the origin of the next spoke in the triangle. A *corner* is a triangular
//! face, stored as its centroid. A *tile* is a seed point on the sphere and
//! the unit of elevation, temperature, and plate assignment.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::PlanetError;

/// Sentinel for an unset index slot.
pub const INVALID: usize = usize::MAX;

/// Number of tiles at subdivision level `size`.
pub fn tile_count(size: u32) -> usize {
    let frequency = 1usize << size;
    10 * frequency * frequency + 2
}

/// Number of corners (triangular faces) at subdivision level `size`.
pub fn corner_count(size: u32) -> usize {
    let frequency = 1usize << size;
    20 * frequency * frequency
}

/// Number of spokes at subdivision level `size`; three per corner.
pub fn spoke_count(size: u32) -> usize {
    3 * corner_count(size)
}

/// Sphere radius for subdivision level `size`, chosen so tile density stays
/// roughly constant across sizes: `sqrt(tile_count / 4 · π)`.
pub fn radius(size: u32) -> f32 {
    (tile_count(size) as f32 / 4.0 * std::f32::consts::PI).sqrt()
}

/// Named planet sizes exposed to callers; the discriminant is the
/// subdivision level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetSize {
    Miniscule = 1,
    Tiny = 2,
    Small = 3,
    Medium = 4,
    Large = 5,
    Huge = 6,
    Gargantuan = 7,
    Colossal = 8,
}

impl PlanetSize {
    pub fn level(self) -> u32 {
        self as u32
    }
}

/// A planet mesh plus its per-tile simulation buffers.
///
/// All fields are flat arrays keyed by tile, corner, or spoke index; no
/// handles into internal structures are exposed beyond these indices.
#[derive(Debug, Clone)]
pub struct Planet {
    /// Seed the planet was generated from.
    pub seed: u64,
    /// Subdivision level. Tile/corner/spoke counts and the radius are fixed
    /// functions of it.
    pub size: u32,
    /// Sphere radius all tile positions lie on.
    pub radius: f32,
    /// Origin tile of each spoke.
    pub spokes: Vec<usize>,
    /// Opposite spoke of each spoke; [`INVALID`] until linked.
    pub spoke_opposites: Vec<usize>,
    /// One outgoing spoke per tile.
    pub tile_spokes: Vec<usize>,
    /// Tile seed-point positions.
    pub tile_positions: Vec<Vec3>,
    /// Corner positions (face centroids).
    pub corner_positions: Vec<Vec3>,
    /// Signed elevation per tile; sea level is 0.
    pub tile_elevations: Vec<f32>,
    /// Temperature per tile, °C-like.
    pub tile_temperatures: Vec<f32>,
    /// Prevailing wind vector per tile, tangent to the sphere.
    pub tile_winds: Vec<Vec3>,
}

impl Planet {
    /// Creates an empty mesh for the given subdivision level. Tiles and
    /// corners are appended afterwards; the scalar buffers are zeroed at
    /// their final sizes up front.
    pub fn new(seed: u64, size: u32) -> Self {
        let tiles = tile_count(size);
        let corners = corner_count(size);
        let spokes = spoke_count(size);
        Self {
            seed,
            size,
            radius: radius(size),
            spokes: Vec::with_capacity(spokes),
            spoke_opposites: Vec::with_capacity(spokes),
            tile_spokes: Vec::with_capacity(tiles),
            tile_positions: Vec::with_capacity(tiles),
            corner_positions: Vec::with_capacity(corners),
            tile_elevations: vec![0.0; tiles],
            tile_temperatures: vec![0.0; tiles],
            tile_winds: vec![Vec3::ZERO; tiles],
        }
    }

    /// Next spoke within the owning triangle.
    pub fn next_spoke(spoke: usize) -> usize {
        if spoke % 3 == 2 { spoke - 2 } else { spoke + 1 }
    }

    /// Previous spoke within the owning triangle.
    pub fn previous_spoke(spoke: usize) -> usize {
        if spoke % 3 == 0 { spoke + 2 } else { spoke - 1 }
    }

    /// Corner (triangle) owning the spoke.
    pub fn spoke_corner(spoke: usize) -> usize {
        spoke / 3
    }

    /// The three spokes owned by a corner.
    pub fn corner_spoke_indices(corner: usize) -> [usize; 3] {
        [3 * corner, 3 * corner + 1, 3 * corner + 2]
    }

    /// Occupies the next free tile slot and returns its index. The tile's
    /// anchor spoke stays unset until a face registers it.
    pub fn add_tile_center(&mut self, position: Vec3) -> usize {
        self.tile_positions.push(position);
        self.tile_spokes.push(INVALID);
        self.tile_positions.len() - 1
    }

    /// Registers the triangular face `(tile_a, tile_b, tile_c)` as three
    /// consecutive spokes and returns the new corner index.
    ///
    /// For each directed edge the reverse key `(to, from)` is looked up in
    /// `edge_lookup`: a hit links both spokes as mutual opposites, a miss
    /// registers `(from, to)` for the face that will arrive from the other
    /// side. This lookup-and-link is the sole mechanism establishing
    /// opposite connectivity, so every face of a pass must be registered
    /// against the same map.
    pub fn add_tile_corner(
        &mut self,
        tile_a: usize,
        tile_b: usize,
        tile_c: usize,
        edge_lookup: &mut HashMap<(usize, usize), usize>,
    ) -> usize {
        let corner = self.corner_positions.len();
        let base = corner * 3;

        self.spokes.extend([tile_a, tile_b, tile_c]);
        self.spoke_opposites.extend([INVALID; 3]);

        let centroid = (self.tile_positions[tile_a]
            + self.tile_positions[tile_b]
            + self.tile_positions[tile_c])
            / 3.0;
        self.corner_positions.push(centroid);

        if self.tile_spokes[tile_a] == INVALID {
            self.tile_spokes[tile_a] = base;
        }
        if self.tile_spokes[tile_b] == INVALID {
            self.tile_spokes[tile_b] = base + 1;
        }
        if self.tile_spokes[tile_c] == INVALID {
            self.tile_spokes[tile_c] = base + 2;
        }

        self.link_opposite(base, tile_a, tile_b, edge_lookup);
        self.link_opposite(base + 1, tile_b, tile_c, edge_lookup);
        self.link_opposite(base + 2, tile_c, tile_a, edge_lookup);

        corner
    }

    fn link_opposite(
        &mut self,
        spoke: usize,
        from: usize,
        to: usize,
        edge_lookup: &mut HashMap<(usize, usize), usize>,
    ) {
        if let Some(&opposite) = edge_lookup.get(&(to, from)) {
            self.spoke_opposites[opposite] = spoke;
            self.spoke_opposites[spoke] = opposite;
        }
        edge_lookup.insert((from, to), spoke);
    }

    /// Walks the spoke fan around `tile`: from the anchor spoke, repeatedly
    /// take `opposite` then `next` until back at the start.
    ///
    /// Panics if the fan cannot close. On a validated mesh that is
    /// unreachable; hitting it means the mesh was corrupted after
    /// validation, and truncating the fan silently would corrupt every
    /// consumer downstream.
    pub fn tile_spoke_indices(&self, tile: usize) -> Vec<usize> {
        match self.try_tile_spoke_indices(tile) {
            Ok(fan) => fan,
            Err(error) => panic!("{error}"),
        }
    }

    fn try_tile_spoke_indices(&self, tile: usize) -> Result<Vec<usize>, PlanetError> {
        let start = self.tile_spokes[tile];
        if start == INVALID {
            return Err(PlanetError::BrokenTopology(format!(
                "tile {tile} has no anchor spoke"
            )));
        }
        let mut fan = Vec::new();
        let mut current = start;
        loop {
            fan.push(current);
            if fan.len() > self.spokes.len() {
                return Err(PlanetError::BrokenTopology(format!(
                    "fan around tile {tile} does not close"
                )));
            }
            let opposite = self.spoke_opposites[current];
            if opposite == INVALID {
                return Err(PlanetError::BrokenTopology(format!(
                    "spoke {current} has no opposite; fan around tile {tile} cannot close"
                )));
            }
            current = Self::next_spoke(opposite);
            if current == start {
                return Ok(fan);
            }
        }
    }

    /// Tiles adjacent to `tile`, in fan order.
    pub fn tile_neighbor_indices(&self, tile: usize) -> Vec<usize> {
        self.tile_spoke_indices(tile)
            .into_iter()
            .map(|spoke| self.spokes[Self::next_spoke(spoke)])
            .collect()
    }

    /// Corners touching `tile`, in fan order.
    pub fn tile_corner_indices(&self, tile: usize) -> Vec<usize> {
        self.tile_spoke_indices(tile)
            .into_iter()
            .map(Self::spoke_corner)
            .collect()
    }

    /// The three tiles forming a corner.
    pub fn corner_tile_indices(&self, corner: usize) -> [usize; 3] {
        [
            self.spokes[3 * corner],
            self.spokes[3 * corner + 1],
            self.spokes[3 * corner + 2],
        ]
    }

    /// The three corners sharing an edge with `corner`.
    pub fn corner_neighbor_indices(&self, corner: usize) -> [usize; 3] {
        Self::corner_spoke_indices(corner).map(|spoke| {
            let opposite = self.spoke_opposites[spoke];
            assert!(
                opposite != INVALID,
                "spoke {spoke} of corner {corner} has no opposite"
            );
            Self::spoke_corner(opposite)
        })
    }

    /// The two corners on either side of a spoke's undirected edge.
    pub fn spoke_corners(&self, spoke: usize) -> (usize, usize) {
        let opposite = self.spoke_opposites[spoke];
        assert!(opposite != INVALID, "spoke {spoke} has no opposite");
        (Self::spoke_corner(spoke), Self::spoke_corner(opposite))
    }

    /// The origin and destination tiles of a spoke.
    pub fn spoke_tiles(&self, spoke: usize) -> (usize, usize) {
        (self.spokes[spoke], self.spokes[Self::next_spoke(spoke)])
    }

    /// Checks the structural invariants of a fully constructed mesh: buffer
    /// sizes match the subdivision level, every opposite link is set and
    /// symmetric, and every tile's fan closes over spokes that originate at
    /// the tile.
    pub fn validate(&self) -> Result<(), PlanetError> {
        let tiles = tile_count(self.size);
        let corners = corner_count(self.size);
        if self.tile_positions.len() != tiles
            || self.corner_positions.len() != corners
            || self.spokes.len() != 3 * corners
            || self.spoke_opposites.len() != 3 * corners
            || self.tile_spokes.len() != tiles
        {
            return Err(PlanetError::BrokenTopology(format!(
                "buffer sizes do not match subdivision level {}: {} tiles, {} corners, {} spokes",
                self.size,
                self.tile_positions.len(),
                self.corner_positions.len(),
                self.spokes.len(),
            )));
        }

        for (spoke, &opposite) in self.spoke_opposites.iter().enumerate() {
            if opposite == INVALID {
                return Err(PlanetError::BrokenTopology(format!(
                    "spoke {spoke} has no opposite"
                )));
            }
            if opposite >= self.spoke_opposites.len() {
                return Err(PlanetError::BrokenTopology(format!(
                    "spoke {spoke} links to nonexistent spoke {opposite}"
                )));
            }
            if self.spoke_opposites[opposite] != spoke {
                return Err(PlanetError::BrokenTopology(format!(
                    "opposite links of spokes {spoke} and {opposite} are not symmetric"
                )));
            }
        }

        for tile in 0..self.tile_positions.len() {
            let fan = self.try_tile_spoke_indices(tile)?;
            for &spoke in &fan {
                if self.spokes[spoke] != tile {
                    return Err(PlanetError::BrokenTopology(format!(
                        "fan around tile {tile} contains spoke {spoke} originating at tile {}",
                        self.spokes[spoke]
                    )));
                }
            }
        }

        Ok(())
    }
}
