use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

/// Coordinate grid all plan geometry lives on, in meters. Every rect that
/// enters a plan is snapped to this grid, which lets most comparisons be
/// exact and keeps output byte-stable across runs.
pub const GRID: f64 = 0.05;

/// Comparison tolerance for coordinates. Snapped values differ by either
/// zero or at least one grid step, so anything below GRID works here.
pub const EPSILON: f64 = 1e-3;

/// Snaps a coordinate to the nearest grid line.
pub fn snap(v: f64) -> f64 {
    (v / GRID).round() * GRID
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn snapped(self) -> Self {
        Point::new(snap(self.x), snap(self.y))
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal edges of a footprint or room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    North,
    South,
    East,
    West,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::North, Edge::South, Edge::East, Edge::West];

    pub fn opposite(self) -> Edge {
        match self {
            Edge::North => Edge::South,
            Edge::South => Edge::North,
            Edge::East => Edge::West,
            Edge::West => Edge::East,
        }
    }

    /// Whether this edge runs horizontally (constant y).
    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::North | Edge::South)
    }
}

impl TryFrom<&str> for Edge {
    type Error = String;
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        match input.to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Edge::North),
            "south" | "s" => Ok(Edge::South),
            "east" | "e" => Ok(Edge::East),
            "west" | "w" => Ok(Edge::West),
            other => Err(format!("unrecognized edge '{other}'")),
        }
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::North => "north",
            Edge::South => "south",
            Edge::East => "east",
            Edge::West => "west",
        };
        write!(f, "{name}")
    }
}

/// Axis-aligned rectangle with normalized corner order. Constructors snap
/// all coordinates, so two rects describing the same region compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Rect {
            x1: snap(x1),
            y1: snap(y1),
            x2: snap(x2),
            y2: snap(y2),
        }
    }

    pub fn from_corner_size(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect::new(x, y, x + w, y + h)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Width-to-height ratio. Callers guard against zero-height rects.
    pub fn aspect(&self) -> f64 {
        self.width() / self.height()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Rect::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x1 - EPSILON && p.x <= self.x2 + EPSILON && p.y >= self.y1 - EPSILON && p.y <= self.y2 + EPSILON
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x1 >= self.x1 - EPSILON
            && other.x2 <= self.x2 + EPSILON
            && other.y1 >= self.y1 - EPSILON
            && other.y2 <= self.y2 + EPSILON
    }

    /// Length of the overlap of the two rects' x-ranges, clamped to zero.
    pub fn x_overlap(&self, other: &Rect) -> f64 {
        (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0)
    }

    pub fn y_overlap(&self, other: &Rect) -> f64 {
        (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0)
    }

    /// True when the rects' interiors overlap. Rects that merely share an
    /// edge do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x_overlap(other) > EPSILON && self.y_overlap(other) > EPSILON
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let x = self.x_overlap(other);
        let y = self.y_overlap(other);
        if x > EPSILON && y > EPSILON {
            x * y
        } else {
            0.0
        }
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if self.overlaps(other) {
            Some(Rect::new(
                self.x1.max(other.x1),
                self.y1.max(other.y1),
                self.x2.min(other.x2),
                self.y2.min(other.y2),
            ))
        } else {
            None
        }
    }

    /// Length of the edge the two rects share, or zero if they don't abut.
    /// Two rects abut when they touch along a full edge segment without
    /// their interiors overlapping.
    pub fn shared_edge_len(&self, other: &Rect) -> f64 {
        let touches_x = (self.x2 - other.x1).abs() <= EPSILON || (other.x2 - self.x1).abs() <= EPSILON;
        if touches_x {
            let len = self.y_overlap(other);
            if len >= EPSILON {
                return len;
            }
        }
        let touches_y = (self.y2 - other.y1).abs() <= EPSILON || (other.y2 - self.y1).abs() <= EPSILON;
        if touches_y {
            let len = self.x_overlap(other);
            if len >= EPSILON {
                return len;
            }
        }
        0.0
    }

    pub fn adjacent(&self, other: &Rect) -> bool {
        self.shared_edge_len(other) >= EPSILON
    }

    /// Whether this rect touches the given edge of the enclosing rect.
    pub fn touches_edge(&self, edge: Edge, outer: &Rect) -> bool {
        match edge {
            Edge::North => (self.y2 - outer.y2).abs() <= EPSILON,
            Edge::South => (self.y1 - outer.y1).abs() <= EPSILON,
            Edge::East => (self.x2 - outer.x2).abs() <= EPSILON,
            Edge::West => (self.x1 - outer.x1).abs() <= EPSILON,
        }
    }

    pub fn touches_any_edge(&self, outer: &Rect) -> bool {
        Edge::ALL.iter().any(|edge| self.touches_edge(*edge, outer))
    }

    /// The rect's own edge as a (start, end, cross-axis position) segment.
    /// Horizontal edges run along x, vertical ones along y.
    pub fn edge_segment(&self, edge: Edge) -> (f64, f64, f64) {
        match edge {
            Edge::North => (self.x1, self.x2, self.y2),
            Edge::South => (self.x1, self.x2, self.y1),
            Edge::East => (self.y1, self.y2, self.x2),
            Edge::West => (self.y1, self.y2, self.x1),
        }
    }

    /// Sample points used for polygon containment tests: the center plus
    /// eight points inset 10% from the corners and edge midpoints.
    pub fn sample_points(&self) -> [Point; 9] {
        let dx = self.width() * 0.1;
        let dy = self.height() * 0.1;
        let cx = (self.x1 + self.x2) / 2.0;
        let cy = (self.y1 + self.y2) / 2.0;
        [
            Point::new(cx, cy),
            Point::new(self.x1 + dx, self.y1 + dy),
            Point::new(self.x2 - dx, self.y1 + dy),
            Point::new(self.x1 + dx, self.y2 - dy),
            Point::new(self.x2 - dx, self.y2 - dy),
            Point::new(cx, self.y1 + dy),
            Point::new(cx, self.y2 - dy),
            Point::new(self.x1 + dx, cy),
            Point::new(self.x2 - dx, cy),
        ]
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {} .. {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A simple polygon given as a counter-clockwise or clockwise point loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Polygon {
            points: points.into_iter().map(Point::snapped).collect(),
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        let mut x1 = f64::MAX;
        let mut y1 = f64::MAX;
        let mut x2 = f64::MIN;
        let mut y2 = f64::MIN;
        for p in &self.points {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        Rect::new(x1, y1, x2, y2)
    }

    /// Even-odd ray cast. Points exactly on the boundary are not reliably
    /// classified, which is why all rect tests go through inset samples.
    pub fn contains_point(&self, p: Point) -> bool {
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// All nine inset samples inside: the rect is treated as contained.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        rect.sample_points().iter().all(|p| self.contains_point(*p))
    }

    /// At least one inset sample inside: the rect overlaps the interior.
    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        rect.sample_points().iter().any(|p| self.contains_point(*p))
    }

    /// A rect touches the polygon boundary iff one of its four edges lies
    /// collinearly on a polygon edge with positive overlap. Diagonal
    /// polygon edges can never satisfy this for an axis-aligned rect.
    pub fn rect_touches_boundary(&self, rect: &Rect) -> bool {
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            if (a.y - b.y).abs() <= EPSILON {
                // Horizontal polygon edge; compare against the rect's top and bottom.
                for y in [rect.y1, rect.y2] {
                    if (a.y - y).abs() <= EPSILON {
                        let lo = a.x.min(b.x).max(rect.x1);
                        let hi = a.x.max(b.x).min(rect.x2);
                        if hi - lo > EPSILON {
                            return true;
                        }
                    }
                }
            } else if (a.x - b.x).abs() <= EPSILON {
                for x in [rect.x1, rect.x2] {
                    if (a.x - x).abs() <= EPSILON {
                        let lo = a.y.min(b.y).max(rect.y1);
                        let hi = a.y.max(b.y).min(rect.y2);
                        if hi - lo > EPSILON {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}

/// Outer boundary of the plan. Rect footprints get exact containment
/// tests; polygon footprints fall back to inset-sample tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Footprint {
    Rect(Rect),
    Polygon(Polygon),
}

impl Footprint {
    pub fn bounding_rect(&self) -> Rect {
        match self {
            Footprint::Rect(r) => *r,
            Footprint::Polygon(p) => p.bounding_rect(),
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Footprint::Polygon(_))
    }

    pub fn contains_rect(&self, rect: &Rect) -> bool {
        match self {
            Footprint::Rect(r) => r.contains_rect(rect),
            Footprint::Polygon(p) => p.contains_rect(rect),
        }
    }

    /// Whether a rect overlaps the footprint interior at all. Used for
    /// marking frame cells, not for placement legality.
    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        match self {
            Footprint::Rect(r) => r.overlaps(rect),
            Footprint::Polygon(p) => p.overlaps_rect(rect),
        }
    }

    /// Whether a rect touches the outer boundary anywhere. For polygons
    /// this is collinear-edge contact with the polygon itself, not with
    /// the bounding box.
    pub fn touches_exterior(&self, rect: &Rect) -> bool {
        match self {
            Footprint::Rect(r) => rect.touches_any_edge(r),
            Footprint::Polygon(p) => p.rect_touches_boundary(rect),
        }
    }

    /// Edge tests always run against the bounding box, including for
    /// polygon footprints.
    pub fn touches_edge(&self, rect: &Rect, edge: Edge) -> bool {
        rect.touches_edge(edge, &self.bounding_rect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rect_normalizes_and_snaps() {
        let r = Rect::new(5.02, 3.0, 1.0, 0.0);
        assert_eq!(r, Rect::new(1.0, 0.0, 5.0, 3.0));
        assert!((r.area() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_excludes_shared_edges() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(4.0, 0.0, 8.0, 4.0);
        assert!(!a.overlaps(&b));
        assert!(a.adjacent(&b));
        assert!((a.shared_edge_len(&b) - 4.0).abs() < EPSILON);
    }

    #[test]
    fn shared_edge_requires_contact() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(4.5, 0.0, 8.0, 4.0);
        assert_eq!(a.shared_edge_len(&b), 0.0);
        // Corner contact only: no shared edge.
        let c = Rect::new(4.0, 4.0, 8.0, 8.0);
        assert_eq!(a.shared_edge_len(&c), 0.0);
    }

    #[test]
    fn edge_touch_against_outer() {
        let outer = Rect::new(0.0, 0.0, 12.0, 8.0);
        let r = Rect::new(0.0, 2.0, 4.0, 6.0);
        assert!(r.touches_edge(Edge::West, &outer));
        assert!(!r.touches_edge(Edge::East, &outer));
        assert!(r.touches_any_edge(&outer));
    }

    #[test]
    fn polygon_point_containment() {
        // L-shaped footprint.
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(5.0, 4.0),
            Point::new(5.0, 8.0),
            Point::new(0.0, 8.0),
        ]);
        assert!(poly.contains_point(Point::new(2.0, 6.0)));
        assert!(poly.contains_point(Point::new(8.0, 2.0)));
        assert!(!poly.contains_point(Point::new(8.0, 6.0)));
    }

    #[test]
    fn polygon_rect_containment_uses_samples() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(5.0, 4.0),
            Point::new(5.0, 8.0),
            Point::new(0.0, 8.0),
        ]);
        assert!(poly.contains_rect(&Rect::new(1.0, 1.0, 4.0, 7.0)));
        // Spans the notch: overlaps but is not contained.
        let spanning = Rect::new(3.0, 3.0, 9.0, 7.0);
        assert!(!poly.contains_rect(&spanning));
        assert!(poly.overlaps_rect(&spanning));
    }

    #[test]
    fn polygon_boundary_contact() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 8.0),
            Point::new(0.0, 8.0),
        ]);
        assert!(poly.rect_touches_boundary(&Rect::new(0.0, 1.0, 3.0, 4.0)));
        assert!(!poly.rect_touches_boundary(&Rect::new(1.0, 1.0, 3.0, 4.0)));
    }

    #[test]
    fn snap_is_idempotent() {
        for v in [0.0, 0.024, 0.025, 1.37, -2.51, 11.999] {
            let s = snap(v);
            assert_eq!(s, snap(s));
            let steps = s / GRID;
            assert!((steps - steps.round()).abs() < 1e-9);
        }
    }
}
