//! Planar geometry in pixel space.

use crate::core::geo::Point;
use crate::rendering::surface::FillRule;

/// Distance from `p` to the segment `a`-`b`, with the projection clamped to the segment
pub fn point_to_segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Ray-casting parity test; the ring is implicitly closed
pub fn point_in_ring(p: &Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&ring[i], &ring[j]);
        if (pi.y > p.y) != (pj.y > p.y)
            && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Horizontal spans inside a set of edges along the scanline at `y`.
///
/// Edges are half-open in y so shared vertices are counted once. Spans are
/// returned left to right as `(start_x, end_x)`.
pub fn scanline_spans(edges: &[(Point, Point)], y: f64, rule: FillRule) -> Vec<(f64, f64)> {
    let mut crossings: Vec<(f64, i32)> = edges
        .iter()
        .filter(|(a, b)| (a.y > y) != (b.y > y))
        .map(|(a, b)| {
            let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
            let winding = if b.y > a.y { 1 } else { -1 };
            (x, winding)
        })
        .collect();
    crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

    let mut spans = Vec::new();
    let mut winding = 0;
    let mut start = None;
    for (x, dir) in crossings {
        let was_inside = is_inside(winding, rule);
        winding += dir;
        let now_inside = is_inside(winding, rule);
        match (was_inside, now_inside) {
            (false, true) => start = Some(x),
            (true, false) => {
                if let Some(s) = start.take() {
                    if x > s {
                        spans.push((s, x));
                    }
                }
            }
            _ => {}
        }
    }
    spans
}

fn is_inside(winding: i32, rule: FillRule) -> bool {
    match rule {
        FillRule::EvenOdd => winding % 2 != 0,
        FillRule::NonZero => winding != 0,
    }
}
