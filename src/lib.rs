pub mod climate;
pub mod config;
pub mod curve;
pub mod error;
pub mod generator;
pub mod icosahedron;
pub mod math;
pub mod planet;
pub mod plate;
pub mod prelude;
pub mod relaxation;
pub mod subdivision;
pub mod tectonics;
pub mod tools;

pub use config::PlanetConfig;
pub use error::PlanetError;
pub use generator::generate;
pub use planet::Planet;
