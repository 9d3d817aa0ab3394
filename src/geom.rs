use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::DVec2;

// ---------------------------------------------------------------------------
// MapPoint
// ---------------------------------------------------------------------------

/// A position in planar projected units.
///
/// Usable as a map key: equality, hashing and ordering all go through the
/// coordinate bit patterns (with `-0.0` folded into `0.0`), and ordering is
/// lexicographic on (x, y) via `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub const ORIGIN: MapPoint = MapPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    fn key_bits(self) -> (u64, u64) {
        (canonical(self.x).to_bits(), canonical(self.y).to_bits())
    }
}

/// Folds `-0.0` into `0.0` so both compare and hash equal.
fn canonical(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for MapPoint {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for MapPoint {}

impl Hash for MapPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl Ord for MapPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical(self.x)
            .total_cmp(&canonical(other.x))
            .then_with(|| canonical(self.y).total_cmp(&canonical(other.y)))
    }
}

impl PartialOrd for MapPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<DVec2> for MapPoint {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<MapPoint> for DVec2 {
    fn from(p: MapPoint) -> Self {
        p.to_dvec2()
    }
}

impl From<(f64, f64)> for MapPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// MapRect
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in planar units, stored as its two corners so the
/// far edge never has to be recomputed from `origin + width`. Corners are
/// saturated to the finite f64 range; `max` is never below `min` on an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRect {
    min: MapPoint,
    max: MapPoint,
}

impl MapRect {
    pub const ZERO: MapRect = MapRect {
        min: MapPoint::ORIGIN,
        max: MapPoint::ORIGIN,
    };

    /// Negative or NaN extents collapse to zero. Extents running past the
    /// largest finite coordinate stop there.
    pub fn new(origin: MapPoint, width: f64, height: f64) -> Self {
        let extent = |v: f64| if v > 0.0 { v } else { 0.0 };
        let far = |o: f64, len: f64| saturate(o + extent(len)).max(o);
        Self {
            min: origin,
            max: MapPoint::new(far(origin.x, width), far(origin.y, height)),
        }
    }

    /// Rectangle spanning two opposite corners, in any order.
    pub fn from_corners(a: MapPoint, b: MapPoint) -> Self {
        let (a, b) = (a.to_dvec2(), b.to_dvec2());
        Self {
            min: a.min(b).into(),
            max: a.max(b).into(),
        }
    }

    pub fn origin(&self) -> MapPoint {
        self.min
    }

    pub fn min(&self) -> MapPoint {
        self.min
    }

    pub fn max(&self) -> MapPoint {
        self.max
    }

    /// May be infinite when the rect spans more than f64 can represent.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> MapPoint {
        (self.min.to_dvec2() * 0.5 + self.max.to_dvec2() * 0.5).into()
    }

    pub fn is_empty(&self) -> bool {
        !(self.max.x > self.min.x && self.max.y > self.min.y)
    }

    /// Inclusive of all four edges.
    pub fn contains(&self, p: MapPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grow outward by `margin` on every side. An infinite margin covers the
    /// whole finite plane.
    pub fn expanded(&self, margin: f64) -> Self {
        if !(margin > 0.0) {
            return *self;
        }
        Self {
            min: MapPoint::new(saturate(self.min.x - margin), saturate(self.min.y - margin)),
            max: MapPoint::new(saturate(self.max.x + margin), saturate(self.max.y + margin)),
        }
    }

    /// Overlap test, inclusive of touching edges.
    pub fn intersects(&self, other: &MapRect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Smallest rectangle containing every point, or `None` for no points.
    pub fn bounding(points: impl IntoIterator<Item = MapPoint>) -> Option<Self> {
        let mut iter = points.into_iter().map(MapPoint::to_dvec2);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self {
            min: min.into(),
            max: max.into(),
        })
    }
}

/// Clamp into the finite range; NaN passes through.
fn saturate(v: f64) -> f64 {
    v.clamp(-f64::MAX, f64::MAX)
}

impl Default for MapRect {
    fn default() -> Self {
        MapRect::ZERO
    }
}

// ---------------------------------------------------------------------------
// WeightedPoint
// ---------------------------------------------------------------------------

/// A stored observation. `weight` is always positive and finite once it has
/// passed through a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    pub position: MapPoint,
    pub weight: f64,
}

/// One entry of a query result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatSample {
    pub position: MapPoint,
    pub intensity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn negative_zero_is_same_key() {
        let a = MapPoint::new(0.0, -0.0);
        let b = MapPoint::new(-0.0, 0.0);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn ordering_is_x_then_y() {
        let mut pts = vec![
            MapPoint::new(1.0, 0.0),
            MapPoint::new(0.0, 5.0),
            MapPoint::new(0.0, -1.0),
        ];
        pts.sort();
        assert_eq!(
            pts,
            vec![
                MapPoint::new(0.0, -1.0),
                MapPoint::new(0.0, 5.0),
                MapPoint::new(1.0, 0.0),
            ]
        );
    }

    #[test]
    fn contains_is_inclusive() {
        let r = MapRect::new(MapPoint::new(0.0, 0.0), 2.0, 2.0);
        assert!(r.contains(MapPoint::new(0.0, 0.0)));
        assert!(r.contains(MapPoint::new(2.0, 2.0)));
        assert!(r.contains(MapPoint::new(2.0, 0.0)));
        assert!(!r.contains(MapPoint::new(2.0001, 1.0)));
    }

    #[test]
    fn negative_extent_collapses() {
        let r = MapRect::new(MapPoint::new(3.0, 3.0), -1.0, f64::NAN);
        assert!(r.is_empty());
        assert_eq!(r.width(), 0.0);
        assert_eq!(r.height(), 0.0);
    }

    #[test]
    fn corners_in_any_order() {
        let r = MapRect::from_corners(MapPoint::new(4.0, -1.0), MapPoint::new(1.0, 3.0));
        assert_eq!(r.origin(), MapPoint::new(1.0, -1.0));
        assert_eq!(r.width(), 3.0);
        assert_eq!(r.height(), 4.0);
    }

    #[test]
    fn bounding_of_points() {
        assert!(MapRect::bounding(std::iter::empty()).is_none());

        let r = MapRect::bounding([
            MapPoint::new(1.0, 5.0),
            MapPoint::new(-2.0, 0.0),
            MapPoint::new(3.0, 2.0),
        ])
        .unwrap();
        assert_eq!(r.origin(), MapPoint::new(-2.0, 0.0));
        assert_eq!(r.max(), MapPoint::new(3.0, 5.0));
    }

    #[test]
    fn bounding_contains_its_points() {
        let pts = [MapPoint::new(0.1, 0.3), MapPoint::new(0.7, 1e-17)];
        let r = MapRect::bounding(pts).unwrap();
        assert!(pts.iter().all(|p| r.contains(*p)));
    }

    #[test]
    fn bounding_spans_the_full_f64_range() {
        let pts = [MapPoint::new(-1e308, 0.0), MapPoint::new(1e308, 1.0)];
        let r = MapRect::bounding(pts).unwrap();
        assert!(!r.is_empty());
        assert!(pts.iter().all(|p| r.contains(*p)));
        assert_eq!(r.center(), MapPoint::new(0.0, 0.5));
        assert!(r.intersects(&MapRect::new(MapPoint::new(9e307, 0.0), 1.0, 1.0)));
    }

    #[test]
    fn huge_extents_saturate_instead_of_collapsing() {
        let r = MapRect::new(MapPoint::new(1e308, 0.0), f64::MAX, f64::INFINITY);
        assert!(!r.is_empty());
        assert_eq!(r.max(), MapPoint::new(f64::MAX, f64::MAX));
        assert!(r.contains(MapPoint::new(f64::MAX, 5.0)));

        let wide = MapRect::new(MapPoint::new(-1.0, -1.0), 2.0, 2.0).expanded(f64::MAX);
        assert!(wide.contains(MapPoint::new(f64::MAX, -f64::MAX)));
        let all = MapRect::ZERO.expanded(f64::INFINITY);
        assert_eq!(all.min(), MapPoint::new(-f64::MAX, -f64::MAX));
        assert_eq!(all.max(), MapPoint::new(f64::MAX, f64::MAX));
    }

    #[test]
    fn expanded_and_intersects() {
        let a = MapRect::new(MapPoint::new(0.0, 0.0), 1.0, 1.0);
        let b = MapRect::new(MapPoint::new(2.0, 2.0), 1.0, 1.0);
        assert!(!a.intersects(&b));
        assert!(a.expanded(1.0).intersects(&b));
        assert_eq!(a.expanded(-5.0), a);
    }
}
