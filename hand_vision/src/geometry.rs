//! Contour geometry: convex hull, convexity defects, enclosed area.
//!
//! The hull is an index-returning Andrew monotone chain rather than
//! `imageproc::geometry::convex_hull` because the defect walk needs hull
//! vertices *as indices into the contour* — the stretch of boundary between
//! two adjacent hull vertices is what holds the defect.

use imageproc::point::Point;

// ════════════════════════════════════════════════════════════════════════════
// Convex hull (indices)
// ════════════════════════════════════════════════════════════════════════════

/// Indices of the contour points forming the convex hull, in hull order.
///
/// Fewer than three input points are returned as-is; collinear points on
/// the hull boundary are dropped.
pub fn convex_hull_indices(contour: &[Point<i32>]) -> Vec<usize> {
    if contour.len() < 3 {
        return (0..contour.len()).collect();
    }

    let mut idx: Vec<usize> = (0..contour.len()).collect();
    idx.sort_by_key(|&i| (contour[i].x, contour[i].y));
    idx.dedup_by(|a, b| contour[*a] == contour[*b]);

    let cross = |o: usize, a: usize, b: usize| -> i64 {
        let (o, a, b) = (contour[o], contour[a], contour[b]);
        (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
    };

    let mut hull: Vec<usize> = Vec::with_capacity(idx.len() * 2);

    // Lower chain
    for &i in &idx {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0 {
            hull.pop();
        }
        hull.push(i);
    }

    // Upper chain
    let lower_len = hull.len() + 1;
    for &i in idx.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0 {
            hull.pop();
        }
        hull.push(i);
    }

    hull.pop(); // last point equals the first
    hull
}

// ════════════════════════════════════════════════════════════════════════════
// Convexity defects
// ════════════════════════════════════════════════════════════════════════════

/// One inward deviation of the contour from its hull: the chord runs from
/// `start` to `end` (hull vertices), `far` is the deepest interior contour
/// point, `depth` its perpendicular distance to the chord.  All three are
/// indices into the contour.
#[derive(Clone, Copy, Debug)]
pub struct ConvexityDefect {
    pub start: usize,
    pub end:   usize,
    pub far:   usize,
    pub depth: f64,
}

/// Walk each stretch of contour between adjacent hull vertices and record
/// the deepest point.  Stretches with no interior points yield no defect.
pub fn convexity_defects(contour: &[Point<i32>], hull: &[usize]) -> Vec<ConvexityDefect> {
    let n = contour.len();
    if n == 0 || hull.len() < 2 {
        return Vec::new();
    }

    // Defects are walked in contour order, so order the hull the same way.
    let mut h: Vec<usize> = hull.to_vec();
    h.sort_unstable();
    h.dedup();

    let mut out = Vec::new();
    for w in 0..h.len() {
        let start = h[w];
        let end   = h[(w + 1) % h.len()];

        let mut best: Option<(usize, f64)> = None;
        let mut i = (start + 1) % n;
        while i != end {
            let d = chord_distance(contour[i], contour[start], contour[end]);
            if best.map_or(true, |(_, bd)| d > bd) {
                best = Some((i, d));
            }
            i = (i + 1) % n;
        }

        if let Some((far, depth)) = best {
            out.push(ConvexityDefect { start, end, far, depth });
        }
    }
    out
}

/// Perpendicular distance from `p` to the chord through `a` and `b`.
/// Degenerates to plain point distance when the chord has zero length.
fn chord_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let abx = (b.x - a.x) as f64;
    let aby = (b.y - a.y) as f64;
    let len = (abx * abx + aby * aby).sqrt();
    if len == 0.0 {
        return distance(p, a);
    }
    let cross = abx * (p.y - a.y) as f64 - aby * (p.x - a.x) as f64;
    cross.abs() / len
}

/// Euclidean distance between two contour points.
pub fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

// ════════════════════════════════════════════════════════════════════════════
// Enclosed area
// ════════════════════════════════════════════════════════════════════════════

/// Area enclosed by a closed polygon, by the shoelace formula.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        acc += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (acc.abs() as f64) / 2.0
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    #[test]
    fn hull_of_square_with_interior_point() {
        let pts = vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10), p(5, 5)];
        let hull = convex_hull_indices(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&4), "interior point must not be on the hull");
    }

    #[test]
    fn hull_drops_collinear_edge_points() {
        let pts = vec![p(0, 0), p(5, 0), p(10, 0), p(10, 10), p(0, 10)];
        let hull = convex_hull_indices(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&1));
    }

    #[test]
    fn hull_of_two_points_is_identity() {
        let pts = vec![p(0, 0), p(3, 4)];
        assert_eq!(convex_hull_indices(&pts).len(), 2);
    }

    #[test]
    fn notch_produces_one_deep_defect() {
        // Square boundary with a notch dipping 50 px into the top edge.
        let pts = vec![
            p(0, 0), p(40, 0), p(50, 50), p(60, 0), p(100, 0),
            p(100, 100), p(0, 100),
        ];
        let hull = convex_hull_indices(&pts);
        let defects = convexity_defects(&pts, &hull);

        let deepest = defects
            .iter()
            .max_by(|a, b| a.depth.partial_cmp(&b.depth).unwrap())
            .unwrap();
        assert_eq!(deepest.far, 2);
        assert!((deepest.depth - 50.0).abs() < 1.0, "depth was {}", deepest.depth);
    }

    #[test]
    fn convex_polygon_has_no_deep_defects() {
        let pts = vec![p(0, 0), p(100, 0), p(100, 100), p(0, 100)];
        let hull = convex_hull_indices(&pts);
        let defects = convexity_defects(&pts, &hull);
        assert!(defects.iter().all(|d| d.depth == 0.0), "{:?}", defects);
    }

    #[test]
    fn shoelace_area_of_square() {
        let pts = vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10)];
        assert_eq!(polygon_area(&pts), 100.0);
    }

    #[test]
    fn shoelace_area_orientation_independent() {
        let cw  = vec![p(0, 0), p(0, 10), p(10, 10), p(10, 0)];
        let ccw = vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10)];
        assert_eq!(polygon_area(&cw), polygon_area(&ccw));
    }

    #[test]
    fn degenerate_inputs_yield_zero_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[p(1, 1), p(2, 2)]), 0.0);
    }
}
