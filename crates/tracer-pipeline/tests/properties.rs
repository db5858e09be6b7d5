//! Property checks for binarization and clustering on generated inputs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeSet, HashSet};

use imageproc::region_labelling::{Connectivity, connected_components};
use tracer_pipeline::{
    BooleanMask, Cluster, IntensityGrid, Point, ThresholdKind, binarize, clusterize,
};

/// Small deterministic xorshift generator so the tests need no extra crates.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }
}

fn random_mask(seed: u64, width: u32, height: u32, density: u64) -> BooleanMask {
    let mut rng = XorShift(seed);
    let cells = (0..width * height).map(|_| rng.chance(density)).collect();
    BooleanMask::new(width, height, cells).unwrap()
}

fn foreground(mask: &BooleanMask) -> BTreeSet<Point> {
    let mut set = BTreeSet::new();
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(x, y) {
                set.insert(Point::new(x, y));
            }
        }
    }
    set
}

/// Reference partition: connected components of the graph joining every
/// pair of foreground pixels within Chebyshev distance `d`.
fn brute_force_components(mask: &BooleanMask, d: u32) -> BTreeSet<BTreeSet<Point>> {
    let points: Vec<Point> = foreground(mask).into_iter().collect();
    let mut parent: Vec<usize> = (0..points.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if points[i].chebyshev_distance(points[j]) <= d {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                parent[a] = b;
            }
        }
    }

    let mut groups: std::collections::HashMap<usize, BTreeSet<Point>> =
        std::collections::HashMap::new();
    for (i, p) in points.iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().insert(*p);
    }
    groups.into_values().collect()
}

fn as_sets(clusters: &[Cluster]) -> BTreeSet<BTreeSet<Point>> {
    clusters
        .iter()
        .map(|c| c.points().iter().copied().collect())
        .collect()
}

#[test]
fn clusters_partition_the_foreground() {
    for (seed, density) in [(1, 10), (2, 30), (3, 55), (4, 80)] {
        let mask = random_mask(seed, 23, 17, density);
        for d in 1..=3 {
            let clusters = clusterize(&mask, d).unwrap();

            let mut seen = HashSet::new();
            for c in &clusters {
                assert!(!c.is_empty());
                for p in c.points() {
                    assert!(seen.insert(*p), "{p:?} appears twice (seed {seed}, d {d})");
                }
            }
            let expected = foreground(&mask);
            assert_eq!(seen.len(), expected.len());
            assert!(seen.iter().all(|p| expected.contains(p)));
        }
    }
}

#[test]
fn clusters_are_chebyshev_components() {
    for seed in 10..16 {
        let mask = random_mask(seed, 19, 14, 12);
        for d in 1..=4 {
            let clusters = clusterize(&mask, d).unwrap();
            assert_eq!(
                as_sets(&clusters),
                brute_force_components(&mask, d),
                "seed {seed}, max_distance {d}"
            );
        }
    }
}

#[test]
fn distance_one_matches_eight_connected_labelling() {
    for seed in 20..26 {
        let mask = random_mask(seed, 31, 29, 45);
        let image = image::GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
            image::Luma([if mask.get(x, y) { 255 } else { 0 }])
        });
        let labels = connected_components(&image, Connectivity::Eight, image::Luma([0u8]));
        let label_count = labels
            .pixels()
            .map(|p| p.0[0])
            .filter(|&l| l != 0)
            .collect::<HashSet<_>>()
            .len();

        let clusters = clusterize(&mask, 1).unwrap();
        assert_eq!(clusters.len(), label_count, "seed {seed}");

        // Every cluster maps to exactly one label.
        for c in &clusters {
            let ids: HashSet<u32> = c
                .points()
                .iter()
                .map(|p| labels.get_pixel(p.x, p.y).0[0])
                .collect();
            assert_eq!(ids.len(), 1);
        }
    }
}

#[test]
fn clustering_is_deterministic() {
    let mask = random_mask(99, 40, 30, 35);
    let first = clusterize(&mask, 2).unwrap();
    for _ in 0..3 {
        assert_eq!(clusterize(&mask, 2).unwrap(), first);
    }
}

#[test]
fn seeds_follow_row_major_order() {
    let mask = random_mask(7, 25, 25, 8);
    let clusters = clusterize(&mask, 1).unwrap();
    let seeds: Vec<(u32, u32)> = clusters
        .iter()
        .map(|c| {
            let s = c.seed().unwrap();
            (s.y, s.x)
        })
        .collect();
    let mut sorted = seeds.clone();
    sorted.sort_unstable();
    assert_eq!(seeds, sorted);

    // Each seed is the row-major first point of its cluster.
    for c in &clusters {
        let min = c.points().iter().map(|p| (p.y, p.x)).min().unwrap();
        let s = c.seed().unwrap();
        assert_eq!(min, (s.y, s.x));
    }
}

#[test]
fn two_pixels_merge_exactly_at_max_distance() {
    for d in 1..=6_u32 {
        for (dx, dy) in [(d, 0), (0, d), (d, d), (d, d / 2)] {
            let width = 2 * d + 3;
            let mut cells = vec![false; (width * width) as usize];
            let a = (1, 1);
            let b = (1 + dx, 1 + dy);
            cells[(a.1 * width + a.0) as usize] = true;
            cells[(b.1 * width + b.0) as usize] = true;
            let mask = BooleanMask::new(width, width, cells).unwrap();

            assert_eq!(clusterize(&mask, d).unwrap().len(), 1, "d={d} offset=({dx},{dy})");
            if d > 1 {
                assert_eq!(
                    clusterize(&mask, d - 1).unwrap().len(),
                    2,
                    "d-1={} offset=({dx},{dy})",
                    d - 1
                );
            }
        }
    }
}

#[test]
fn absolute_threshold_is_inclusive_for_every_bound() {
    let grid = IntensityGrid::new(256, 1, (0..=255).collect()).unwrap();
    for t in [0_u8, 1, 77, 128, 254] {
        let mask = binarize(&grid, &ThresholdKind::Absolute { less_or_equal: t }).unwrap();
        assert!(mask.get(u32::from(t), 0));
        assert!(!mask.get(u32::from(t) + 1, 0));
        assert_eq!(mask.count_foreground(), u64::from(t) + 1);
    }
}

#[test]
fn relative_area_on_uniform_grid_is_empty() {
    let mut rng = XorShift(5);
    for _ in 0..8 {
        let value = u8::try_from(rng.next() % 256).unwrap();
        let grid = IntensityGrid::new(11, 7, vec![value; 77]).unwrap();
        for radius in [0, 1, 3, 20] {
            let t = ThresholdKind::RelativeArea {
                less_or_equal: 255,
                greater_diff: 1,
                radius,
            };
            assert_eq!(binarize(&grid, &t).unwrap().count_foreground(), 0);
        }
    }
}
