//! Initial site placement.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::GridSize;
use crate::site::{Site, Sites};

/// `count` sites drawn uniformly from the cells of `size`, reproducible per `seed`.
///
/// Returns no sites for an empty grid.
pub fn random_sites(size: GridSize, count: usize, seed: u64) -> Sites {
    if size.is_empty() {
        return Sites::default();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.random_range(0..size.width);
            let y = rng.random_range(0..size.height);
            Site::new(x, y)
        })
        .collect()
}

/// One site at the centre of every `step × step` block, row-major.
///
/// Blocks on the right and bottom edges are clipped to the grid and their
/// sites sit at the centre of the clipped block.
///
/// # Panics
///
/// Panics if `step` is not positive.
pub fn grid_sites(size: GridSize, step: i32) -> Sites {
    assert!(step > 0, "step must be > 0, got {}", step);

    let columns = size.column_count() as i32;
    let rows = size.row_count() as i32;
    let mut sites = Sites::default();
    for top in (0..rows).step_by(step as usize) {
        let block_height = step.min(rows - top);
        for left in (0..columns).step_by(step as usize) {
            let block_width = step.min(columns - left);
            sites.push(Site::new(left + block_width / 2, top + block_height / 2));
        }
    }
    sites
}

/// Axis-aligned block of cells visited by [`quadtree_sites`].
#[derive(Clone, Copy, Debug)]
struct Block {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Block {
    fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Four quadrants of `ceil(w/2) × ceil(h/2)`, empty ones dropped.
    fn split(&self) -> impl Iterator<Item = Block> {
        let left = (self.width + 1) / 2;
        let top = (self.height + 1) / 2;
        let Block { x, y, width, height } = *self;
        [
            Block::new(x, y, left, top),
            Block::new(x + left, y, width - left, top),
            Block::new(x, y + top, left, height - top),
            Block::new(x + left, y + top, width - left, height - top),
        ]
        .into_iter()
        .filter(|block| block.area() > 0)
    }

    fn pixels<'a>(
        &self,
        grid_width: usize,
        pixels: &'a [[u8; 3]],
    ) -> impl Iterator<Item = [u8; 3]> + 'a {
        let (x, y) = (self.x as usize, self.y as usize);
        let (width, height) = (self.width as usize, self.height as usize);
        (y..y + height).flat_map(move |row| {
            let start = row * grid_width + x;
            pixels[start..start + width].iter().copied()
        })
    }

    /// Largest squared colour distance of a pixel from the block mean, with
    /// channels scaled to `[0, 1]`.
    fn colour_error(&self, grid_width: usize, pixels: &[[u8; 3]]) -> f64 {
        let mut sum = [0.0f64; 3];
        for pixel in self.pixels(grid_width, pixels) {
            for (total, &channel) in sum.iter_mut().zip(&pixel) {
                *total += f64::from(channel);
            }
        }
        let area = self.area() as f64;
        let mean = sum.map(|total| total / area);

        self.pixels(grid_width, pixels)
            .map(|pixel| {
                pixel
                    .iter()
                    .zip(&mean)
                    .map(|(&channel, &centre)| ((f64::from(channel) - centre) / 255.0).powi(2))
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }
}

/// Sites adapted to the colour detail of a raster.
///
/// `pixels` holds one RGB triple per cell of `size`, row-major. Starting from
/// the whole grid, blocks are split breadth-first into four quadrants of
/// `ceil(w/2) × ceil(h/2)` cells. A block stops splitting once its area is
/// below `min_area` or no pixel deviates from the block's mean colour by more
/// than `error_rate` (squared, channels scaled to `[0, 1]`). Every such leaf
/// contributes one site at its centre, in the order the leaves are reached.
///
/// # Panics
///
/// Panics if `pixels` does not hold exactly one entry per cell.
pub fn quadtree_sites(
    size: GridSize,
    pixels: &[[u8; 3]],
    min_area: usize,
    error_rate: f64,
) -> Sites {
    assert_eq!(
        pixels.len(),
        size.cell_count(),
        "raster must hold one pixel per cell of a {}x{} grid",
        size.width,
        size.height
    );

    let mut sites = Sites::default();
    if size.is_empty() {
        return sites;
    }

    let grid_width = size.column_count();
    let mut queue = VecDeque::from([Block::new(0, 0, size.width, size.height)]);
    while let Some(block) = queue.pop_front() {
        let is_leaf = block.area() <= 1
            || block.area() < min_area
            || block.colour_error(grid_width, pixels) <= error_rate;
        if is_leaf {
            sites.push(Site::new(
                block.x + block.width / 2,
                block.y + block.height / 2,
            ));
        } else {
            queue.extend(block.split());
        }
    }
    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn random_sites_are_inside_grid() {
        let size = GridSize::new(17, 5);
        let sites = random_sites(size, 200, 3);
        assert_eq!(sites.len(), 200);
        assert!(sites.iter().all(|s| size.contains(Cell::new(s.x, s.y))));
    }

    #[test]
    fn random_sites_are_reproducible() {
        let size = GridSize::new(64, 64);
        assert_eq!(random_sites(size, 32, 11), random_sites(size, 32, 11));
        assert_ne!(random_sites(size, 32, 11), random_sites(size, 32, 12));
    }

    #[test]
    fn random_sites_on_empty_grid() {
        assert!(random_sites(GridSize::new(0, 10), 5, 1).is_empty());
        assert!(random_sites(GridSize::new(10, 10), 0, 1).is_empty());
    }

    #[test]
    fn grid_sites_exact_blocks() {
        let sites = grid_sites(GridSize::new(8, 4), 4);
        assert_eq!(sites.xs(), &[2, 6]);
        assert_eq!(sites.ys(), &[2, 2]);
    }

    #[test]
    fn grid_sites_clipped_blocks() {
        let sites = grid_sites(GridSize::new(5, 3), 2);
        // Columns 0-1, 2-3, 4; rows 0-1, 2.
        assert_eq!(sites.xs(), &[1, 3, 4, 1, 3, 4]);
        assert_eq!(sites.ys(), &[1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn grid_sites_empty_grid() {
        assert!(grid_sites(GridSize::new(-1, 3), 2).is_empty());
    }

    #[test]
    #[should_panic(expected = "step must be > 0")]
    fn grid_sites_zero_step_panics() {
        grid_sites(GridSize::new(4, 4), 0);
    }

    const BLACK: [u8; 3] = [0, 0, 0];
    const WHITE: [u8; 3] = [255, 255, 255];

    /// `size` raster that is black left of column `edge` and white from it on.
    fn split_raster(size: GridSize, edge: i32) -> Vec<[u8; 3]> {
        size.cells()
            .map(|cell| if cell.x < edge { BLACK } else { WHITE })
            .collect()
    }

    fn site_pairs(sites: &Sites) -> Vec<(i32, i32)> {
        let mut pairs: Vec<_> = sites.iter().map(|s| (s.x, s.y)).collect();
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn quadtree_uniform_raster_is_one_site() {
        let size = GridSize::new(8, 6);
        let pixels = vec![[40, 90, 200]; size.cell_count()];
        let sites = quadtree_sites(size, &pixels, 1, 0.01);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites.get(0), Some(Site::new(4, 3)));
    }

    #[test]
    fn quadtree_splits_along_colour_edge() {
        let size = GridSize::new(8, 8);
        let pixels = split_raster(size, 3);
        let sites = quadtree_sites(size, &pixels, 1, 0.5);

        // The right quadrants are white and stay whole. Each left quadrant
        // keeps its black 2x2 halves and splits the 2x2 blocks straddling
        // column 3 down to single cells.
        assert_eq!(sites.len(), 2 + 2 * (2 + 2 * 4));
        let pairs = site_pairs(&sites);
        let right: Vec<_> = pairs.iter().filter(|&&(x, _)| x >= 4).collect();
        assert_eq!(right, [&(6, 2), &(6, 6)]);
        let single_cells = pairs.iter().filter(|&&(x, _)| x == 2 || x == 3).count();
        assert_eq!(single_cells, 16);
    }

    #[test]
    fn quadtree_breadth_first_order() {
        let size = GridSize::new(4, 4);
        let pixels = split_raster(size, 2);
        let sites = quadtree_sites(size, &pixels, 1, 0.0);
        assert_eq!(sites.xs(), &[1, 3, 1, 3]);
        assert_eq!(sites.ys(), &[1, 1, 3, 3]);
    }

    #[test]
    fn quadtree_min_area_stops_splitting() {
        let size = GridSize::new(8, 8);
        let pixels = split_raster(size, 3);
        let sites = quadtree_sites(size, &pixels, 5, 0.5);
        // 2x2 blocks are below the minimum area and become leaves.
        assert_eq!(sites.len(), 2 + 2 * 4);
    }

    #[test]
    fn quadtree_odd_extents_cover_the_grid() {
        let size = GridSize::new(5, 1);
        let pixels: Vec<[u8; 3]> = (0..5).map(|i| [i * 50, 0, 0]).collect();
        let sites = quadtree_sites(size, &pixels, 1, 0.0);
        // Every cell differs from its neighbours, so each ends up alone.
        assert_eq!(site_pairs(&sites), [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn quadtree_empty_grid() {
        assert!(quadtree_sites(GridSize::new(0, 4), &[], 1, 0.1).is_empty());
    }

    #[test]
    #[should_panic(expected = "raster must hold one pixel per cell")]
    fn quadtree_rejects_short_raster() {
        quadtree_sites(GridSize::new(2, 2), &[BLACK; 3], 1, 0.1);
    }
}
