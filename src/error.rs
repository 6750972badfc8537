use thiserror::Error;

/// Terminal failures surfaced by planet generation.
///
/// Generation is never retried or resumed; on any of these the caller is
/// expected to re-run `generate` wholesale with adjusted parameters.
#[derive(Debug, Error)]
pub enum PlanetError {
    /// The configuration cannot produce a planet. Rejected before any work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The half-edge mesh failed validation after a construction stage.
    /// Signals a seeding/subdivision/flip bug, not a recoverable state.
    #[error("broken mesh topology: {0}")]
    BrokenTopology(String),

    /// A simulation wrote a non-finite value into one of the planet buffers.
    #[error("degenerate simulation result: {0}")]
    DegenerateResult(String),
}
