use crate::color_index::{ColorIndex, MAX_BUCKET};
use crate::error::CutError;
use crate::histogram::Histogram;
use crate::queue::{BoxOrder, PriorityQueue};
use crate::vbox::{Axis, VBox};

/// Hard cap on pop/split cycles per phase.
pub const MAX_ITERATIONS: usize = 1000;

/// Share of the requested colors produced by the population-ordered phase,
/// in quarters.
pub const QUARTERS_BY_POPULATION: usize = 3;

/// Cumulative population along one axis, indexed by bucket coordinate.
pub type PartialSums = [u32; MAX_BUCKET as usize + 1];

/// Result of applying median cut to a box.
#[derive(Debug)]
pub enum Split<'h> {
    /// The box cannot be divided further; an unchanged copy.
    Single(VBox<'h>),
    /// The two halves on either side of the cut plane.
    Pair(VBox<'h>, VBox<'h>),
}

/// Split a box near its population median along its longest axis.
///
/// Returns `Ok(None)` for an empty box and a single copy for a box holding
/// one pixel or one grid cell.
pub fn median_cut_apply<'h>(
    histogram: &Histogram,
    vbox: &VBox<'h>,
) -> Result<Option<Split<'h>>, CutError> {
    let count = vbox.count();
    if count == 0 {
        return Ok(None);
    }
    if count == 1 || vbox.volume() == 1 {
        return Ok(Some(Split::Single(vbox.copy())));
    }

    let axis = vbox.longest_axis();
    let (total, partial_sum) = sum_colors(axis, histogram, vbox);
    let (first, second) = do_cut(axis, vbox, &partial_sum, total)?;
    Ok(Some(Split::Pair(first, second)))
}

/// Running population totals along `axis`.
///
/// For each coordinate of the axis, the population of the slab at that
/// coordinate (spanning the full range of the other two axes) is added to
/// the running total. Coordinates outside the box stay zero.
pub fn sum_colors(axis: Axis, histogram: &Histogram, vbox: &VBox<'_>) -> (u32, PartialSums) {
    let (lo, hi) = vbox.bounds(axis);
    let [second, third] = axis.others();
    let (lo2, hi2) = vbox.bounds(second);
    let (lo3, hi3) = vbox.bounds(third);

    let mut total = 0u32;
    let mut partial_sum = [0u32; MAX_BUCKET as usize + 1];
    for i in lo..=hi {
        let mut slab = 0u32;
        for j in lo2..=hi2 {
            for k in lo3..=hi3 {
                let mut coords = [0u8; 3];
                coords[axis.index()] = i;
                coords[second.index()] = j;
                coords[third.index()] = k;
                slab += histogram.get(ColorIndex::from_bucket(coords[0], coords[1], coords[2]));
            }
        }
        total += slab;
        partial_sum[i as usize] = total;
    }
    (total, partial_sum)
}

/// Cut `vbox` along `axis` at a plane chosen from the partial sums.
///
/// The first coordinate whose running total passes half the population is
/// the median; the plane is then moved into the larger side of the box, and
/// nudged so that neither half is empty while the population allows it.
pub fn do_cut<'h>(
    axis: Axis,
    vbox: &VBox<'h>,
    partial_sum: &PartialSums,
    total: u32,
) -> Result<(VBox<'h>, VBox<'h>), CutError> {
    let (lo, hi) = vbox.bounds(axis);
    if lo == hi {
        return Err(CutError::SingleSlice(axis));
    }
    let (lo, hi) = (lo as i32, hi as i32);
    let at = |d: i32| partial_sum[d as usize];

    let Some(i) = (lo..=hi).find(|&i| at(i) as u64 * 2 > total as u64) else {
        return Err(CutError::NoMedian { axis, total });
    };

    let left = i - lo;
    let right = hi - i;
    let mut d2 = if left <= right {
        (hi - 1).min(i + right / 2)
    } else {
        // i32 division truncates toward zero, like the whole-expression
        // truncation of `i - 1 - left / 2` in floating point.
        lo.max((2 * (i - 1) - left) / 2)
    };

    // Skip empty slabs so the first half is populated; stop one short of
    // `hi` so the second half is never inverted.
    while d2 < hi - 1 && at(d2) == 0 {
        d2 += 1;
    }
    // Back off when the first half already holds everything.
    while at(d2) >= total && d2 > lo && at(d2 - 1) != 0 {
        d2 -= 1;
    }

    let first = vbox.with_bounds(axis, lo as u8, d2 as u8);
    let second = vbox.with_bounds(axis, (d2 + 1) as u8, hi as u8);
    Ok((first, second))
}

/// Counters from one refinement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterateStats {
    pub colors: usize,
    pub iterations: usize,
    pub aborted: bool,
}

/// Repeatedly split the highest-priority box until `target` colors exist
/// or [`MAX_ITERATIONS`] cycles have run.
///
/// Empty boxes are put back untouched. A cut failure ends the phase early
/// with the popped box restored, so the palette may come out short.
pub fn iterate<'h>(
    queue: &mut PriorityQueue<VBox<'h>>,
    histogram: &'h Histogram,
    target: usize,
) -> IterateStats {
    let mut stats = IterateStats {
        colors: 1,
        iterations: 0,
        aborted: false,
    };

    while stats.iterations < MAX_ITERATIONS {
        let Some(vbox) = queue.pop() else {
            break;
        };
        stats.iterations += 1;

        if vbox.count() == 0 {
            queue.push(vbox);
            continue;
        }

        match median_cut_apply(histogram, &vbox) {
            Ok(Some(Split::Pair(first, second))) => {
                log::trace!("split {vbox:?} into {first:?} and {second:?}");
                queue.push(first);
                queue.push(second);
                stats.colors += 1;
            }
            Ok(Some(Split::Single(only))) => queue.push(only),
            Ok(None) => {
                log::warn!("median cut produced nothing for {vbox:?}, ending phase");
                queue.push(vbox);
                stats.aborted = true;
                break;
            }
            Err(err) => {
                log::warn!("median cut failed on {vbox:?}: {err}, ending phase");
                queue.push(vbox);
                stats.aborted = true;
                break;
            }
        }

        if stats.colors >= target {
            break;
        }
    }

    if stats.iterations >= MAX_ITERATIONS {
        log::warn!(
            "median cut stopped after {MAX_ITERATIONS} iterations at {} colors",
            stats.colors
        );
    }
    stats
}

/// Run both refinement phases starting from the box around `pixels`.
///
/// The returned queue holds the final boxes; their number approximates
/// `max_colors` and may be off by a couple in either direction.
pub fn quantize<'h>(
    histogram: &'h Histogram,
    pixels: &[ColorIndex],
    max_colors: usize,
) -> PriorityQueue<VBox<'h>> {
    let mut queue = PriorityQueue::new(BoxOrder::Population.comparator());
    let Some(seed) = VBox::from_pixels(pixels, histogram) else {
        return queue;
    };
    queue.push(seed);

    let target = (QUARTERS_BY_POPULATION * max_colors).div_ceil(4);
    let first = iterate(&mut queue, histogram, target);
    log::debug!(
        "population phase: target {target}, {} colors in {} iterations",
        first.colors,
        first.iterations
    );

    queue.set_comparator(BoxOrder::PopulationVolume.comparator());
    let target = max_colors.saturating_sub(queue.len());
    let second = iterate(&mut queue, histogram, target);
    log::debug!(
        "population x volume phase: target {target}, {} colors in {} iterations, {} boxes",
        second.colors,
        second.iterations,
        queue.len()
    );

    queue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::build_histogram;
    use alloc::vec::Vec;

    fn spread_pixels(n: u32) -> Vec<rgb::RGB<u8>> {
        (0..n)
            .map(|i| rgb::RGB {
                r: (i * 37 % 256) as u8,
                g: (i * 91 % 256) as u8,
                b: (i * 53 % 256) as u8,
            })
            .collect()
    }

    #[test]
    fn empty_box_is_not_split() {
        let hist = Histogram::new();
        let vbox = VBox::new([0, 0, 0], [31, 31, 31], &hist);
        assert!(median_cut_apply(&hist, &vbox).unwrap().is_none());
    }

    #[test]
    fn single_cell_returns_copy() {
        let (hist, pixels) = build_histogram([rgb::RGB { r: 50, g: 50, b: 50 }; 20]);
        let vbox = VBox::from_pixels(&pixels, &hist).unwrap();
        match median_cut_apply(&hist, &vbox).unwrap() {
            Some(Split::Single(copy)) => assert_eq!(copy.count(), 20),
            other => panic!("expected a single copy, got {other:?}"),
        }
    }

    #[test]
    fn sum_colors_total_matches_count() {
        let (hist, pixels) = build_histogram(spread_pixels(300));
        let vbox = VBox::from_pixels(&pixels, &hist).unwrap();
        for axis in Axis::ALL {
            let (total, partial) = sum_colors(axis, &hist, &vbox);
            assert_eq!(total, vbox.count());
            let (_, hi) = vbox.bounds(axis);
            assert_eq!(partial[hi as usize], total);
            assert!(partial.windows(2).take(hi as usize).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn cut_partitions_population() {
        let (hist, pixels) = build_histogram(spread_pixels(300));
        let vbox = VBox::from_pixels(&pixels, &hist).unwrap();
        let Some(Split::Pair(a, b)) = median_cut_apply(&hist, &vbox).unwrap() else {
            panic!("expected two halves");
        };
        let axis = vbox.longest_axis();
        assert_eq!(a.bounds(axis).1 + 1, b.bounds(axis).0);
        assert_eq!(a.count() + b.count(), vbox.count());
        assert!(a.count() > 0 && b.count() > 0);
    }

    #[test]
    fn cut_lands_in_larger_side() {
        // all red population at 0 and 31, heavier at 0
        let mut px = Vec::new();
        px.extend([rgb::RGB { r: 0, g: 0, b: 0 }; 5]);
        px.extend([rgb::RGB { r: 255, g: 0, b: 0 }; 3]);
        let (hist, pixels) = build_histogram(px);
        let vbox = VBox::from_pixels(&pixels, &hist).unwrap();
        let (total, partial) = sum_colors(Axis::Red, &hist, &vbox);
        let (a, b) = do_cut(Axis::Red, &vbox, &partial, total).unwrap();
        // median at 0, right side larger: d2 = min(30, 0 + 31 / 2) = 15
        assert_eq!(a.bounds(Axis::Red), (0, 15));
        assert_eq!(b.bounds(Axis::Red), (16, 31));
        assert_eq!((a.count(), b.count()), (5, 3));
    }

    #[test]
    fn cut_from_left_side_truncates() {
        // median at 20 with left = 20 > right = 11
        let mut px = Vec::new();
        px.extend([rgb::RGB { r: 0, g: 0, b: 0 }; 2]);
        px.extend([rgb::RGB { r: 160, g: 0, b: 0 }; 4]);
        px.push(rgb::RGB { r: 255, g: 0, b: 0 });
        let (hist, pixels) = build_histogram(px);
        let vbox = VBox::from_pixels(&pixels, &hist).unwrap();
        let (total, partial) = sum_colors(Axis::Red, &hist, &vbox);
        let (a, b) = do_cut(Axis::Red, &vbox, &partial, total).unwrap();
        // d2 = max(0, 20 - 1 - 10) = 9
        assert_eq!(a.bounds(Axis::Red), (0, 9));
        assert_eq!(b.bounds(Axis::Red), (10, 31));
        assert_eq!((a.count(), b.count()), (2, 5));
    }

    #[test]
    fn single_populated_plane_at_top_stays_valid() {
        // every pixel on r = 31 of a box spanning r = 0..=31
        let (hist, _) = build_histogram([
            rgb::RGB { r: 255, g: 0, b: 0 },
            rgb::RGB { r: 255, g: 8, b: 0 },
        ]);
        let vbox = VBox::new([0, 0, 0], [31, 1, 0], &hist);
        let (total, partial) = sum_colors(Axis::Red, &hist, &vbox);
        let (a, b) = do_cut(Axis::Red, &vbox, &partial, total).unwrap();
        assert_eq!(a.bounds(Axis::Red), (0, 30));
        assert_eq!(b.bounds(Axis::Red), (31, 31));
        assert_eq!((a.count(), b.count()), (0, 2));
    }

    #[test]
    fn inconsistent_sums_are_reported() {
        let hist = Histogram::new();
        let vbox = VBox::new([0, 0, 0], [3, 0, 0], &hist);
        let partial = [0u32; MAX_BUCKET as usize + 1];
        assert_eq!(
            do_cut(Axis::Red, &vbox, &partial, 10).unwrap_err(),
            CutError::NoMedian {
                axis: Axis::Red,
                total: 10
            }
        );
        let flat = VBox::new([0, 0, 0], [0, 3, 0], &hist);
        assert_eq!(
            do_cut(Axis::Red, &flat, &partial, 10).unwrap_err(),
            CutError::SingleSlice(Axis::Red)
        );
    }

    #[test]
    fn oversized_partial_sums_do_not_underflow() {
        let hist = Histogram::new();
        let vbox = VBox::new([0, 0, 0], [3, 0, 0], &hist);
        let mut partial = [0u32; MAX_BUCKET as usize + 1];
        partial[1..=3].fill(5);
        let (a, b) = do_cut(Axis::Red, &vbox, &partial, 4).unwrap();
        assert_eq!(a.bounds(Axis::Red), (0, 1));
        assert_eq!(b.bounds(Axis::Red), (2, 3));
    }

    #[test]
    fn quantize_preserves_population() {
        let (hist, pixels) = build_histogram(spread_pixels(2000));
        let mut queue = quantize(&hist, &pixels, 16);
        let counts = queue.map(|v| v.count() as u64);
        assert_eq!(counts.iter().sum::<u64>(), 2000);
        let non_empty = counts.iter().filter(|&&c| c > 0).count();
        assert!((14..=18).contains(&non_empty), "got {non_empty} boxes");
    }

    #[test]
    fn quantize_single_color_is_one_box() {
        let (hist, pixels) = build_histogram([rgb::RGB { r: 50, g: 50, b: 50 }; 64]);
        let mut queue = quantize(&hist, &pixels, 8);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().unwrap().count(), 64);
    }

    #[test]
    fn quantize_without_pixels_is_empty() {
        let hist = Histogram::new();
        assert!(quantize(&hist, &[], 8).is_empty());
    }

    #[test]
    fn iterate_respects_target() {
        let (hist, pixels) = build_histogram(spread_pixels(1000));
        let mut queue = PriorityQueue::new(BoxOrder::Population.comparator());
        queue.push(VBox::from_pixels(&pixels, &hist).unwrap());
        let stats = iterate(&mut queue, &hist, 6);
        assert_eq!(stats.colors, 6);
        assert_eq!(queue.len(), 6);
        assert!(!stats.aborted);
    }
}
