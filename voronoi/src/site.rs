use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::grid::Cell;

/// A Voronoi site: the attractor that grid cells are assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Site {
    pub x: i32,
    pub y: i32,
}

impl Site {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `cell`, exact over the whole `i32` range.
    #[inline]
    pub fn distance_squared(&self, cell: Cell) -> u128 {
        squared_distance(self.x, self.y, cell)
    }

    pub fn distance(&self, cell: Cell) -> f64 {
        (self.distance_squared(cell) as f64).sqrt()
    }
}

#[inline]
pub(crate) fn squared_distance(x: i32, y: i32, cell: Cell) -> u128 {
    // Each delta is below 2^32, so each square fits in u64 but their sum may not.
    let dx = (i64::from(x) - i64::from(cell.x)).unsigned_abs();
    let dy = (i64::from(y) - i64::from(cell.y)).unsigned_abs();
    u128::from(dx * dx) + u128::from(dy * dy)
}

/// Site coordinates stored as two parallel sequences.
///
/// Index `i` into both sequences identifies site `i`. The sequences always
/// have the same length. Duplicate positions are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sites {
    xs: Vec<i32>,
    ys: Vec<i32>,
}

impl Sites {
    pub fn new(xs: Vec<i32>, ys: Vec<i32>) -> Result<Self, SiteError> {
        check_lengths(&xs, &ys)?;
        Ok(Self { xs, ys })
    }

    pub fn from_slices(xs: &[i32], ys: &[i32]) -> Result<Self, SiteError> {
        check_lengths(xs, ys)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Site> {
        Some(Site::new(*self.xs.get(index)?, *self.ys.get(index)?))
    }

    /// Moves site `index`. Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, site: Site) {
        self.xs[index] = site.x;
        self.ys[index] = site.y;
    }

    pub fn push(&mut self, site: Site) {
        self.xs.push(site.x);
        self.ys.push(site.y);
    }

    pub fn xs(&self) -> &[i32] {
        &self.xs
    }

    pub fn ys(&self) -> &[i32] {
        &self.ys
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Site> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Site::new(x, y))
    }

    pub fn into_parts(self) -> (Vec<i32>, Vec<i32>) {
        (self.xs, self.ys)
    }
}

impl FromIterator<Site> for Sites {
    fn from_iter<I: IntoIterator<Item = Site>>(iter: I) -> Self {
        let mut sites = Sites::default();
        for site in iter {
            sites.push(site);
        }
        sites
    }
}

pub(crate) fn check_lengths(xs: &[i32], ys: &[i32]) -> Result<(), SiteError> {
    if xs.len() != ys.len() {
        return Err(SiteError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    Ok(())
}
