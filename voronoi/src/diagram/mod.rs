//! Raster Voronoi diagram construction.
//!
//! Every grid cell is assigned to the site nearest to it under Euclidean
//! distance. Ties go to the lowest site index. The scan is brute force over all
//! sites per cell; the only engineering is in how rows are fanned out over
//! rayon and how per-site results are aggregated afterwards.

mod scan;


use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::{debug, warn};

use crate::error::DiagramError;
use crate::grid::{Cell, GridSize};
use crate::site::{check_lengths, Sites};

// ============================================================================
// Configuration
// ============================================================================

/// Where the cell scan runs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Schedule {
    /// Single pass on the calling thread.
    Sequential,
    /// Row chunks on the rayon pool.
    #[default]
    Parallel,
}

/// How parallel workers publish the cells they assign.
///
/// Ignored by [`Schedule::Sequential`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Aggregation {
    /// Each row chunk fills private per-site buffers, merged in row order after
    /// the scan. Lock free, and produces the same cell order as a sequential scan.
    #[default]
    LocalMerge,
    /// One mutex per site. Cell order within a region is nondeterministic.
    PerSiteLock,
    /// One mutex around every region. Cell order within a region is nondeterministic.
    GlobalLock,
}

/// Options for [`DiagramBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub schedule: Schedule,
    pub aggregation: Aggregation,
}

impl DiagramConfig {
    pub fn sequential() -> Self {
        Self {
            schedule: Schedule::Sequential,
            ..Self::default()
        }
    }

    pub fn parallel(aggregation: Aggregation) -> Self {
        Self {
            schedule: Schedule::Parallel,
            aggregation,
        }
    }
}

/// Cooperative cancellation flag, checked before every row.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Result
// ============================================================================

/// Cells grouped by owning site.
///
/// Region `i` belongs to site `i`. Every region starts with [`Cell::SENTINEL`],
/// which is a marker and not a grid cell; the assigned cells follow it in
/// discovery order. A site that owns no cell still has its sentinel-only region.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Diagram {
    regions: Vec<Vec<Cell>>,
}

impl Diagram {
    /// One sentinel-only region per site.
    pub(crate) fn seeded(site_count: usize) -> Self {
        Self {
            regions: vec![vec![Cell::SENTINEL]; site_count],
        }
    }

    pub fn site_count(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Full region of `site`, sentinel included.
    pub fn region(&self, site: usize) -> Option<&[Cell]> {
        self.regions.get(site).map(Vec::as_slice)
    }

    /// Cells assigned to `site`, sentinel excluded.
    pub fn cells(&self, site: usize) -> Option<&[Cell]> {
        self.region(site).map(|region| &region[1..])
    }

    /// `(site, cells)` pairs in site order, sentinel excluded.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &[Cell])> + '_ {
        self.regions
            .iter()
            .enumerate()
            .map(|(site, region)| (site, &region[1..]))
    }

    /// Total number of assigned cells over all regions.
    pub fn assigned_cell_count(&self) -> usize {
        self.regions.iter().map(|region| region.len() - 1).sum()
    }

    /// Mean position of the cells assigned to `site`, `None` if it owns none.
    pub fn centroid(&self, site: usize) -> Option<(f64, f64)> {
        let cells = self.cells(site)?;
        if cells.is_empty() {
            return None;
        }
        let (sum_x, sum_y) = cells.iter().fold((0i64, 0i64), |(sx, sy), cell| {
            (sx + i64::from(cell.x), sy + i64::from(cell.y))
        });
        let count = cells.len() as f64;
        Some((sum_x as f64 / count, sum_y as f64 / count))
    }

    /// Row-major owner index per pixel of `size`. Pixels not covered by any
    /// region (or covered by a region that falls outside `size`) are `None`.
    pub fn owner_raster(&self, size: GridSize) -> Vec<Option<usize>> {
        let mut owners = vec![None; size.cell_count()];
        for (site, cells) in self.iter() {
            for &cell in cells {
                if let Some(index) = size.index_of(cell) {
                    owners[index] = Some(site);
                }
            }
        }
        owners
    }

    /// Associative form: site index to `(x, y)` pairs, sentinel included.
    pub fn to_map(&self) -> BTreeMap<usize, Vec<(i32, i32)>> {
        self.regions
            .iter()
            .enumerate()
            .map(|(site, region)| (site, region.iter().copied().map(Into::into).collect()))
            .collect()
    }

    pub fn into_regions(self) -> Vec<Vec<Cell>> {
        self.regions
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Diagram {
    type Error = DiagramError;

    fn try_from(regions: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        if let Some(site) = regions
            .iter()
            .position(|region| region.first() != Some(&Cell::SENTINEL))
        {
            return Err(DiagramError::MissingSentinel { site });
        }
        Ok(Self { regions })
    }
}

impl From<Diagram> for Vec<Vec<Cell>> {
    fn from(diagram: Diagram) -> Self {
        diagram.regions
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds raster Voronoi diagrams. Holds no state between builds.
#[derive(Clone, Debug, Default)]
pub struct DiagramBuilder {
    config: DiagramConfig,
    cancel: Option<CancelToken>,
}

impl DiagramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DiagramConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Builds stop with [`DiagramError::Cancelled`] once `token` is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn build(&self, size: GridSize, sites: &Sites) -> Result<Diagram, DiagramError> {
        self.scan(size, sites.xs(), sites.ys())
    }

    /// Builds from two parallel coordinate slices. Mismatched lengths are
    /// rejected before any work starts.
    pub fn build_from_coords(
        &self,
        width: i32,
        height: i32,
        xs: &[i32],
        ys: &[i32],
    ) -> Result<Diagram, DiagramError> {
        check_lengths(xs, ys)?;
        self.scan(GridSize::new(width, height), xs, ys)
    }

    fn scan(&self, size: GridSize, xs: &[i32], ys: &[i32]) -> Result<Diagram, DiagramError> {
        if xs.is_empty() {
            return Ok(Diagram::default());
        }

        // Seeding is finished before any worker starts.
        let mut diagram = Diagram::seeded(xs.len());
        if size.is_empty() {
            return Ok(diagram);
        }

        debug!(
            width = size.width,
            height = size.height,
            sites = xs.len(),
            schedule = %self.config.schedule,
            aggregation = %self.config.aggregation,
            "building diagram"
        );
        let start = Instant::now();

        let input = scan::ScanInput {
            size,
            xs,
            ys,
            cancel: self.cancel.as_ref(),
        };
        let result = match self.config.schedule {
            Schedule::Sequential => scan::sequential(&input, &mut diagram.regions),
            Schedule::Parallel => match self.config.aggregation {
                Aggregation::LocalMerge => scan::local_merge(&input, &mut diagram.regions),
                Aggregation::PerSiteLock => scan::per_site_lock(&input, &mut diagram.regions),
                Aggregation::GlobalLock => scan::global_lock(&input, &mut diagram.regions),
            },
        };

        if let Err(err) = result {
            warn!("diagram build stopped: {err}");
            return Err(err);
        }

        debug!(elapsed = ?start.elapsed(), "diagram built");
        Ok(diagram)
    }
}

/// Builds a diagram with the default parallel configuration.
///
/// `xs` and `ys` are the site coordinates; they must have equal length.
pub fn compute_diagram(
    width: i32,
    height: i32,
    xs: &[i32],
    ys: &[i32],
) -> Result<Diagram, DiagramError> {
    DiagramBuilder::new().build_from_coords(width, height, xs, ys)
}
