//! Generation parameters for every pipeline stage.
//!
//! The whole tree is serde-backed so a `tellus.toml` can override any knob;
//! defaults are complete, so callers can also start from
//! [`PlanetConfig::default`] and tweak fields directly.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::error::PlanetError;
use crate::planet::PlanetSize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetConfig {
    /// Subdivision level, 0–8. Level 0 is the raw icosahedron.
    pub size: u32,
    pub mesh: MeshConfig,
    pub tectonics: TectonicsConfig,
    pub climate: ClimateConfig,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            size: PlanetSize::Medium.level(),
            mesh: MeshConfig::default(),
            tectonics: TectonicsConfig::default(),
            climate: ClimateConfig::default(),
        }
    }
}

/// Relaxation parameters for de-biasing the regular subdivision grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Fraction of all spokes attempted as random edge flips, spread over
    /// the relaxation iterations.
    pub irregularity: f32,
    /// A tile on the flipped edge must keep at least this many neighbors.
    pub min_neighbor_count: usize,
    /// A tile gaining a neighbor must stay at or below this many.
    pub max_neighbor_count: usize,
    /// Reject a flip when the candidate edge is longer than the original by
    /// more than this ratio of their average length.
    pub max_edge_length_difference_ratio: f32,
    /// Alternating flip/relax rounds.
    pub relaxation_iterations: u32,
    /// Blend factor toward the neighbor centroid per relaxation sweep;
    /// 1 replaces positions outright.
    pub relaxation_strength: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            irregularity: 0.05,
            min_neighbor_count: 5,
            max_neighbor_count: 8,
            max_edge_length_difference_ratio: 0.2,
            relaxation_iterations: 10,
            relaxation_strength: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TectonicsConfig {
    pub plate_count: usize,
    /// Fraction of plates that are oceanic; the rest are continental.
    pub oceanic_plate_ratio: f32,
    pub min_oceanic_elevation: f32,
    pub max_oceanic_elevation: f32,
    pub min_continental_elevation: f32,
    pub max_continental_elevation: f32,
    pub min_rotation_rate: f32,
    pub max_rotation_rate: f32,
    /// Override the extreme plates (smallest/largest of each kind) with
    /// fixed trench/abyss/peak/plains elevations so every planet gets
    /// visually distinct relief regardless of sampling luck.
    pub designate_extremes: bool,
    pub trench_elevation: f32,
    pub plains_elevation: f32,
    /// Below this pressure magnitude a boundary is considered calm.
    pub low_stress_threshold: f32,
    /// Above this pressure magnitude a boundary is a direct collision or a
    /// full rift.
    pub high_stress_threshold: f32,
    /// Extra elevation applied at convergent collisions.
    pub uplift_amount: f32,
    /// Scale applied to divergent boundaries.
    pub divergent_factor: f32,
    pub plain_curve: Curve,
    pub oceanic_subduction_curve: Curve,
    pub continental_subduction_curve: Curve,
}

impl Default for TectonicsConfig {
    fn default() -> Self {
        Self {
            plate_count: 12,
            oceanic_plate_ratio: 0.7,
            min_oceanic_elevation: -4.0,
            max_oceanic_elevation: -1.0,
            min_continental_elevation: 1.0,
            max_continental_elevation: 4.0,
            min_rotation_rate: -1.0,
            max_rotation_rate: 1.0,
            designate_extremes: true,
            trench_elevation: -10.0,
            plains_elevation: 1.0,
            low_stress_threshold: 1.0,
            high_stress_threshold: 3.0,
            uplift_amount: 3.0,
            divergent_factor: 1.0,
            plain_curve: Curve::linear(),
            oceanic_subduction_curve: Curve::oceanic_subduction(),
            continental_subduction_curve: Curve::continental_subduction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    pub cyclone_count: usize,
    pub min_wind_speed: f32,
    pub max_wind_speed: f32,
    pub equatorial_temperature: f32,
    pub polar_temperature: f32,
    /// Temperature change per elevation unit below sea level.
    pub underwater_lapse_rate: f32,
    /// Temperature change per elevation unit above sea level.
    pub land_lapse_rate: f32,
    /// How far each step moves toward the advected temperature; 0 freezes
    /// the field.
    pub advection_factor: f32,
    /// How strongly each step is pulled back toward the base temperature.
    pub forcing_factor: f32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            cyclone_count: 10,
            min_wind_speed: 20.0,
            max_wind_speed: 50.0,
            equatorial_temperature: 40.0,
            polar_temperature: -20.0,
            underwater_lapse_rate: -1.5,
            land_lapse_rate: -3.0,
            advection_factor: 0.2,
            forcing_factor: 0.05,
        }
    }
}

impl PlanetConfig {
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PlanetConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rejects configurations that cannot produce a planet. Runs before any
    /// mesh work so failures are cheap and unambiguous.
    pub fn validate(&self) -> Result<(), PlanetError> {
        let invalid = |message: String| Err(PlanetError::InvalidConfig(message));

        if self.size > 8 {
            return invalid(format!("size {} exceeds the supported maximum of 8", self.size));
        }
        if self.mesh.min_neighbor_count >= self.mesh.max_neighbor_count {
            return invalid(format!(
                "neighbor degree bounds cannot be satisfied: min {} >= max {}",
                self.mesh.min_neighbor_count, self.mesh.max_neighbor_count
            ));
        }
        if !(0.0..=1.0).contains(&self.mesh.irregularity) {
            return invalid(format!("irregularity {} outside [0, 1]", self.mesh.irregularity));
        }
        if !(0.0..=1.0).contains(&self.mesh.relaxation_strength) {
            return invalid(format!(
                "relaxation strength {} outside [0, 1]",
                self.mesh.relaxation_strength
            ));
        }
        if self.mesh.max_edge_length_difference_ratio < 0.0 {
            return invalid(format!(
                "edge length difference ratio {} is negative",
                self.mesh.max_edge_length_difference_ratio
            ));
        }

        if self.tectonics.plate_count == 0 {
            return invalid("plate count must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.tectonics.oceanic_plate_ratio) {
            return invalid(format!(
                "oceanic plate ratio {} outside [0, 1]",
                self.tectonics.oceanic_plate_ratio
            ));
        }
        if self.tectonics.min_oceanic_elevation > self.tectonics.max_oceanic_elevation {
            return invalid("oceanic elevation range is inverted".into());
        }
        if self.tectonics.min_continental_elevation > self.tectonics.max_continental_elevation {
            return invalid("continental elevation range is inverted".into());
        }
        if self.tectonics.min_rotation_rate > self.tectonics.max_rotation_rate {
            return invalid("rotation rate range is inverted".into());
        }
        if self.tectonics.low_stress_threshold >= self.tectonics.high_stress_threshold {
            return invalid(format!(
                "stress thresholds cannot be satisfied: low {} >= high {}",
                self.tectonics.low_stress_threshold, self.tectonics.high_stress_threshold
            ));
        }

        if self.climate.cyclone_count == 0 {
            return invalid("cyclone count must be at least 1".into());
        }
        if self.climate.min_wind_speed > self.climate.max_wind_speed {
            return invalid("wind speed range is inverted".into());
        }
        if !(0.0..=1.0).contains(&self.climate.advection_factor) {
            return invalid(format!(
                "advection factor {} outside [0, 1]",
                self.climate.advection_factor
            ));
        }
        if !(0.0..=1.0).contains(&self.climate.forcing_factor) {
            return invalid(format!(
                "forcing factor {} outside [0, 1]",
                self.climate.forcing_factor
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PlanetConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_unsatisfiable_degree_bounds() {
        let mut config = PlanetConfig::default();
        config.mesh.min_neighbor_count = 8;
        config.mesh.max_neighbor_count = 8;
        assert!(matches!(
            config.validate(),
            Err(PlanetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_plate_and_cyclone_counts() {
        let mut config = PlanetConfig::default();
        config.tectonics.plate_count = 0;
        assert!(config.validate().is_err());

        let mut config = PlanetConfig::default();
        config.climate.cyclone_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_planet() {
        let config = PlanetConfig {
            size: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip_preserves_settings() {
        let mut config = PlanetConfig::default();
        config.size = 3;
        config.tectonics.plate_count = 24;
        config.climate.cyclone_count = 7;

        let text = toml::to_string_pretty(&config).unwrap();
        let restored: PlanetConfig = toml::from_str(&text).unwrap();
        assert_eq!(restored.size, 3);
        assert_eq!(restored.tectonics.plate_count, 24);
        assert_eq!(restored.climate.cyclone_count, 7);
        restored.validate().unwrap();
    }
}
