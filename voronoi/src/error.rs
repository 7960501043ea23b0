use thiserror::Error;

/// Invalid site input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    #[error("Site coordinate lengths differ: {xs} x-coordinates, {ys} y-coordinates")]
    LengthMismatch { xs: usize, ys: usize },
}

/// Errors returned while building or restoring a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("Invalid sites: {0}")]
    InvalidSites(#[from] SiteError),

    #[error("Diagram build was cancelled")]
    Cancelled,

    #[error("Region {site} does not start with the (-1, -1) sentinel")]
    MissingSentinel { site: usize },
}
