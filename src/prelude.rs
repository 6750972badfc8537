pub use crate::config::{ClimateConfig, MeshConfig, PlanetConfig, TectonicsConfig};
pub use crate::curve::Curve;
pub use crate::error::PlanetError;
pub use crate::generator::{build_mesh, generate};
pub use crate::planet::{INVALID, Planet, PlanetSize};
pub use crate::plate::{Plate, PlateKind};
