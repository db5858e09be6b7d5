//! Clustering: partition foreground pixels into spatially coherent groups.
//!
//! Two foreground pixels are neighbors when their Chebyshev distance is at
//! most `max_distance`. Clusters are grown by a breadth-first flood fill
//! seeded in row-major scan order.
//!
//! # Ring scan
//!
//! Neighbors of a pixel are found ring by ring: for each `d` in
//! `1..=max_distance` the perimeter of the square `[x-d, x+d] x [y-d, y+d]`
//! is visited. The union of those perimeters is the filled square minus
//! its center, but the visiting order (and therefore the order points are
//! queued) is ring-major, which is observable in each cluster's point
//! order.
//!
//! # Cost
//!
//! Every foreground pixel is dequeued once and scanned once, and a scan
//! touches `(2 * max_distance + 1)^2 - 1` cells, so clustering runs in
//! `O(F * max_distance^2)` for `F` foreground pixels. `max_distance` is a
//! quality/performance trade-off: larger values bridge wider gaps.

use std::collections::VecDeque;

use crate::grid::BooleanMask;
use crate::types::{Cluster, Dimensions, PipelineError, Point};

/// Partition every `true` cell of `mask` into clusters.
///
/// Clusters appear in the row-major order of their seed pixel. Within a
/// cluster, points appear in breadth-first dequeue order. The input mask
/// is never modified.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `max_distance` is zero.
pub fn clusterize(mask: &BooleanMask, max_distance: u32) -> Result<Vec<Cluster>, PipelineError> {
    if max_distance == 0 {
        return Err(PipelineError::InvalidConfig(
            "max_distance must be at least 1".to_string(),
        ));
    }
    let dimensions = mask.dimensions();
    let max_distance = effective_distance(max_distance, dimensions);

    let mut unvisited = mask.as_raw().to_vec();
    let mut clusters = Vec::new();
    let width = dimensions.width as usize;

    for y in 0..dimensions.height {
        for x in 0..dimensions.width {
            if unvisited[y as usize * width + x as usize] {
                let cluster = flood_fill(&mut unvisited, dimensions, Point::new(x, y), max_distance);
                clusters.push(cluster);
            }
        }
    }

    log::debug!(
        "clustered {} foreground pixels into {} clusters (max_distance={max_distance})",
        mask.count_foreground(),
        clusters.len(),
    );
    Ok(clusters)
}

/// Clamp `max_distance` to the largest ring that can still hit a cell.
///
/// Two cells are never more than `max_side - 1` apart, so every ring
/// beyond that lies wholly outside the grid and clamping leaves the
/// clusters unchanged.
fn effective_distance(max_distance: u32, dimensions: Dimensions) -> u32 {
    let limit = dimensions.max_side().saturating_sub(1).max(1);
    if max_distance > limit {
        log::warn!(
            "max_distance {max_distance} spans the whole {}x{} mask; \
             scanning with {limit} instead",
            dimensions.width,
            dimensions.height,
        );
        limit
    } else {
        max_distance
    }
}

/// Grow one cluster from `seed`, consuming its cells from `unvisited`.
///
/// Before each dequeue every point currently queued is marked visited, so
/// a point queued this round cannot be queued again by a sibling's scan.
/// Marking is idempotent, so only the entries appended since the previous
/// pass need touching.
fn flood_fill(
    unvisited: &mut [bool],
    dimensions: Dimensions,
    seed: Point,
    max_distance: u32,
) -> Cluster {
    let width = dimensions.width as usize;
    let mut points = Vec::new();
    let mut queue = VecDeque::from([seed]);
    let mut unmarked = queue.len();

    while !queue.is_empty() {
        for p in queue.iter().skip(queue.len() - unmarked) {
            unvisited[p.y as usize * width + p.x as usize] = false;
        }

        let Some(current) = queue.pop_front() else {
            break;
        };
        points.push(current);

        let before = queue.len();
        ring_scan(unvisited, dimensions, current, max_distance, |p| {
            queue.push_back(p);
        });
        unmarked = queue.len() - before;
    }

    Cluster::new(points)
}

/// Visit every still-unvisited cell on the square rings of half-width
/// `1..=max_distance` around `center`, calling `found` for each.
///
/// Each ring is walked as two columns (left then right, bottom to top)
/// interleaved with the two rows (bottom then top, right to left) that
/// fill in between the column ends. Out-of-bounds cells are skipped.
fn ring_scan(
    unvisited: &[bool],
    dimensions: Dimensions,
    center: Point,
    max_distance: u32,
    mut found: impl FnMut(Point),
) {
    let width = dimensions.width as usize;
    let cx = i64::from(center.x);
    let cy = i64::from(center.y);

    let mut probe = |x: i64, y: i64| {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < dimensions.width
            && y < dimensions.height
            && unvisited[y as usize * width + x as usize]
        {
            found(Point::new(x, y));
        }
    };

    for d in 1..=i64::from(max_distance) {
        let (left, right) = (cx - d, cx + d);
        let (top, bottom) = (cy - d, cy + d);
        for i in 0..=2 * d {
            probe(left, bottom - i);
            probe(right, bottom - i);
            if i != 0 && i != 2 * d {
                probe(right - i, bottom);
                probe(right - i, top);
            }
        }
    }
}
