/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors reported synchronously at the point of evaluation.
///
/// Pure computation has no transient failures, so nothing here is ever
/// retried; a bad frequency point fails its whole sweep rather than
/// being substituted with a default value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A geometric parameter is non-positive, a flared segment has a
    /// mouth smaller than its throat, or adjacent segments do not share
    /// their junction area.
    #[error("invalid geometry: {parameter} = {value}")]
    InvalidGeometry {
        parameter: &'static str,
        value: f64,
    },

    /// A transfer-matrix entry or impedance evaluated to a non-finite
    /// value, or the mechanical impedance collapsed to exactly zero.
    #[error("numerical instability in {context} at {frequency} Hz")]
    NumericalInstability {
        context: &'static str,
        frequency: f64,
    },

    /// A requested profile/topology combination is not implemented.
    #[error("unsupported configuration: {reason}")]
    UnsupportedConfiguration { reason: String },
}

impl SimError {
    pub(crate) fn geometry(parameter: &'static str, value: f64) -> Self {
        Self::InvalidGeometry { parameter, value }
    }

    pub(crate) fn unstable(context: &'static str, frequency: f64) -> Self {
        Self::NumericalInstability { context, frequency }
    }
}
