//! Lloyd relaxation: repeatedly move every site to the centroid of its region.
//!
//! Converges towards a centroidal Voronoi diagram, which gives evenly sized
//! cells for mosaic-style rendering.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diagram::{Diagram, DiagramBuilder};
use crate::error::DiagramError;
use crate::grid::GridSize;
use crate::site::{Site, Sites};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LloydOptions {
    /// Maximum number of centroid moves.
    pub iterations: usize,
    /// Stop once no site moves farther than this in one iteration.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            convergence_threshold: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Relaxation {
    pub sites: Sites,
    /// Diagram of `sites`.
    pub diagram: Diagram,
    /// Centroid moves actually performed.
    pub iterations: usize,
    pub converged: bool,
}

/// Relaxes `sites` on a grid of `size`.
///
/// Each iteration moves every site that owns at least one cell to the centroid
/// of its cells, rounded half to even. Sites that own nothing stay where they
/// are. The returned diagram always belongs to the returned sites.
pub fn relax(
    size: GridSize,
    mut sites: Sites,
    options: &LloydOptions,
    builder: &DiagramBuilder,
) -> Result<Relaxation, DiagramError> {
    let mut diagram = builder.build(size, &sites)?;
    let mut performed = 0;
    let mut converged = false;

    while performed < options.iterations {
        let shift = move_to_centroids(&mut sites, &diagram);
        performed += 1;
        debug!(iteration = performed, max_shift = shift, "lloyd iteration");

        if shift == 0.0 {
            converged = true;
            break;
        }
        diagram = builder.build(size, &sites)?;
        if shift <= options.convergence_threshold {
            converged = true;
            break;
        }
    }

    info!(
        sites = sites.len(),
        iterations = performed,
        converged,
        "lloyd relaxation finished"
    );

    Ok(Relaxation {
        sites,
        diagram,
        iterations: performed,
        converged,
    })
}

/// Moves every site to its rounded region centroid. Returns the largest move.
fn move_to_centroids(sites: &mut Sites, diagram: &Diagram) -> f64 {
    let mut max_shift = 0.0f64;
    for index in 0..sites.len() {
        let (Some(site), Some((cx, cy))) = (sites.get(index), diagram.centroid(index)) else {
            continue;
        };
        let moved = Site::new(cx.round_ties_even() as i32, cy.round_ties_even() as i32);
        let shift = f64::from(moved.x - site.x).hypot(f64::from(moved.y - site.y));
        max_shift = max_shift.max(shift);
        sites.set(index, moved);
    }
    max_shift
}
