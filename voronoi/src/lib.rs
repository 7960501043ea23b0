//! Raster Voronoi diagrams.
//!
//! Assigns every cell of a `width × height` pixel grid to its nearest site
//! (Euclidean distance, lowest index wins ties) and groups the cells by site.
//! Also provides Lloyd relaxation, initial site placement and YAML/JSON
//! persistence of seeds and diagrams.
//!
//! # Quick Start
//!
//! ```rust
//! use voronoi::{compute_diagram, Cell};
//!
//! fn main() -> Result<(), voronoi::DiagramError> {
//!     let diagram = compute_diagram(4, 1, &[0, 3], &[0, 0])?;
//!
//!     // Every region starts with the (-1, -1) sentinel.
//!     assert_eq!(diagram.region(0).unwrap()[0], Cell::SENTINEL);
//!     assert_eq!(diagram.cells(0).unwrap(), &[Cell::new(0, 0), Cell::new(1, 0)]);
//!     assert_eq!(diagram.cells(1).unwrap(), &[Cell::new(2, 0), Cell::new(3, 0)]);
//!     Ok(())
//! }
//! ```

pub mod diagram;
mod error;
pub mod grid;
pub mod lloyd;
pub mod seed;
pub mod seed_file;
pub mod site;

// ============================================================================
// Diagram
// ============================================================================

pub use diagram::{
    compute_diagram, Aggregation, CancelToken, Diagram, DiagramBuilder, DiagramConfig, Schedule,
};
pub use error::{DiagramError, SiteError};
pub use grid::{Cell, GridSize};
pub use site::{Site, Sites};

// ============================================================================
// Relaxation and seeds
// ============================================================================

pub use lloyd::{relax, LloydOptions, Relaxation};
pub use seed::{grid_sites, quadtree_sites, random_sites};
pub use seed_file::{DiagramFile, SeedFile};
