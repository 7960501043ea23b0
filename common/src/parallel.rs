//! Row-chunked parallel iteration for raster scans.
//!
//! Rows of a grid are grouped into contiguous ranges and handed to rayon's
//! work-stealing pool. The iterators are indexed, so collected results come
//! back in row order regardless of which worker finished first.

use std::ops::Range;

use rayon::prelude::*;

/// Multiplier for number of chunks relative to CPU threads.
/// Using 3x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Number of rows per chunk that splits `height` into roughly
/// `threads * CHUNKS_PER_THREAD` chunks. Minimum of 1 row per chunk.
#[inline]
pub fn rows_per_chunk(height: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// Parallel iterator over contiguous row ranges covering `0..height`.
pub fn par_row_chunks(height: usize) -> impl IndexedParallelIterator<Item = Range<usize>> {
    let chunk_rows = rows_per_chunk(height);
    let chunk_count = height.div_ceil(chunk_rows);
    (0..chunk_count).into_par_iter().map(move |chunk| {
        let start = chunk * chunk_rows;
        start..(start + chunk_rows).min(height)
    })
}

/// Maps `f` over the row chunks of `0..height` in parallel, returning results in row order.
pub fn par_map_row_chunks<R, F>(height: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(Range<usize>) -> R + Sync + Send,
{
    par_row_chunks(height).map(f).collect()
}

/// Like [`par_map_row_chunks`], but the closure returns `Result<R, E>`.
///
/// Returns one of the errors if any chunk fails. Chunks already running
/// elsewhere are not interrupted; rayon stops handing out new ones.
pub fn try_par_map_row_chunks<R, E, F>(height: usize, f: F) -> Result<Vec<R>, E>
where
    R: Send,
    E: Send,
    F: Fn(Range<usize>) -> Result<R, E> + Sync + Send,
{
    par_row_chunks(height).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn rows_per_chunk_is_at_least_one() {
        assert_eq!(rows_per_chunk(0), 1);
        assert_eq!(rows_per_chunk(1), 1);
        assert!(rows_per_chunk(10_000) >= 1);
    }

    #[test]
    fn row_chunks_cover_every_row_once() {
        for height in [0usize, 1, 2, 7, 13, 100, 1031] {
            let chunks: Vec<Range<usize>> = par_row_chunks(height).collect();
            let mut next = 0;
            for chunk in &chunks {
                assert_eq!(chunk.start, next, "gap or overlap at height {height}");
                assert!(chunk.end > chunk.start, "empty chunk at height {height}");
                next = chunk.end;
            }
            assert_eq!(next, height);
        }
    }

    #[test]
    fn par_map_row_chunks_preserves_row_order() {
        let height = 257;
        let rows: Vec<usize> = par_map_row_chunks(height, |rows| rows.collect::<Vec<_>>())
            .into_iter()
            .flatten()
            .collect();
        let expected: Vec<usize> = (0..height).collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn par_map_row_chunks_visits_each_row_once() {
        let visits = AtomicUsize::new(0);
        par_map_row_chunks(500, |rows| {
            visits.fetch_add(rows.len(), Ordering::Relaxed);
        });
        assert_eq!(visits.load(Ordering::Relaxed), 500);
    }

    #[test]
    fn try_par_map_row_chunks_ok() {
        let result: Result<Vec<usize>, String> = try_par_map_row_chunks(40, |rows| Ok(rows.len()));
        assert_eq!(result.unwrap().iter().sum::<usize>(), 40);
    }

    #[test]
    fn try_par_map_row_chunks_err() {
        let result: Result<Vec<usize>, String> = try_par_map_row_chunks(40, |rows| {
            if rows.contains(&17) {
                Err("row 17".to_string())
            } else {
                Ok(rows.len())
            }
        });
        assert_eq!(result.unwrap_err(), "row 17");
    }

    #[test]
    fn empty_height_yields_no_chunks() {
        assert_eq!(par_row_chunks(0).count(), 0);
        let result: Result<Vec<()>, ()> = try_par_map_row_chunks(0, |_| Err(()));
        assert!(result.unwrap().is_empty());
    }
}
