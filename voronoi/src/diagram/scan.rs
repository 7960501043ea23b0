use std::ops::Range;

use common::parallel::try_par_map_row_chunks;
use parking_lot::Mutex;

use super::CancelToken;
use crate::error::DiagramError;
use crate::grid::{Cell, GridSize};
use crate::site::squared_distance;

/// Read-only inputs shared by every worker of one build.
pub(super) struct ScanInput<'a> {
    pub size: GridSize,
    pub xs: &'a [i32],
    pub ys: &'a [i32],
    pub cancel: Option<&'a CancelToken>,
}

impl ScanInput<'_> {
    fn check_cancelled(&self) -> Result<(), DiagramError> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(DiagramError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Calls `assign(site, cell)` for every cell of `rows`, row-major.
    fn scan_rows<F>(&self, rows: Range<usize>, mut assign: F) -> Result<(), DiagramError>
    where
        F: FnMut(usize, Cell),
    {
        for y in rows {
            self.check_cancelled()?;
            for cell in self.size.row(y as i32) {
                if let Some(site) = nearest_site(self.xs, self.ys, cell) {
                    assign(site, cell);
                }
            }
        }
        Ok(())
    }
}

/// Index of the site nearest to `cell`, `None` when there are no sites.
///
/// Sites are visited in index order and only a strictly smaller distance
/// replaces the current best, so the lowest index wins ties.
#[inline]
pub(super) fn nearest_site(xs: &[i32], ys: &[i32], cell: Cell) -> Option<usize> {
    let mut best: Option<(usize, u128)> = None;
    for (site, (&x, &y)) in xs.iter().zip(ys).enumerate() {
        let dist = squared_distance(x, y, cell);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((site, dist)),
        }
    }
    best.map(|(site, _)| site)
}

pub(super) fn sequential(
    input: &ScanInput<'_>,
    regions: &mut [Vec<Cell>],
) -> Result<(), DiagramError> {
    input.scan_rows(0..input.size.row_count(), |site, cell| {
        regions[site].push(cell)
    })
}

/// Private per-site buffers per row chunk, appended in row order once every
/// chunk is done.
pub(super) fn local_merge(
    input: &ScanInput<'_>,
    regions: &mut [Vec<Cell>],
) -> Result<(), DiagramError> {
    let site_count = regions.len();
    let partials = try_par_map_row_chunks(input.size.row_count(), |rows| {
        let mut partial: Vec<Vec<Cell>> = vec![Vec::new(); site_count];
        input.scan_rows(rows, |site, cell| partial[site].push(cell))?;
        Ok::<_, DiagramError>(partial)
    })?;

    for partial in partials {
        for (region, cells) in regions.iter_mut().zip(partial) {
            region.extend(cells);
        }
    }
    Ok(())
}

pub(super) fn per_site_lock(
    input: &ScanInput<'_>,
    regions: &mut [Vec<Cell>],
) -> Result<(), DiagramError> {
    let locked: Vec<Mutex<Vec<Cell>>> = regions
        .iter_mut()
        .map(|region| Mutex::new(std::mem::take(region)))
        .collect();

    let result = try_par_map_row_chunks(input.size.row_count(), |rows| {
        input.scan_rows(rows, |site, cell| locked[site].lock().push(cell))
    });

    for (region, lock) in regions.iter_mut().zip(locked) {
        *region = lock.into_inner();
    }
    result.map(|_| ())
}

pub(super) fn global_lock(
    input: &ScanInput<'_>,
    regions: &mut [Vec<Cell>],
) -> Result<(), DiagramError> {
    let shared = Mutex::new(regions);
    try_par_map_row_chunks(input.size.row_count(), |rows| {
        input.scan_rows(rows, |site, cell| shared.lock()[site].push(cell))
    })?;
    Ok(())
}
