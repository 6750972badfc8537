use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlateKind {
    Oceanic,
    Continental,
}

/// A rigid tectonic region: every tile of the plate shares one angular
/// rotation and one target elevation. Immutable after generation except for
/// the desired-elevation overrides of the extremes-designation step.
#[derive(Debug, Clone)]
pub struct Plate {
    pub id: usize,
    pub kind: PlateKind,
    /// Elevation the plate interior settles toward, away from boundaries.
    pub desired_elevation: f32,
    /// Unit axis the plate rotates about.
    pub rotation_axis: Vec3,
    /// Signed angular velocity around the axis.
    pub rotation_rate: f32,
    /// Tile the plate grows from during frontier spreading.
    pub seed_tile: usize,
}
