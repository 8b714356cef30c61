//! Exact pixel coverage of an oriented unit-width line
//!
//! A straight-line motion along angle `θ` smears a point over the band
//! `{p : |p·n| <= 0.5}` with `n = (-sin θ, cos θ)`. Restricted to a segment
//! of length `L` the band becomes the `L × 1` rectangle
//! `{p : |p·n| <= 0.5, |p·d| <= L/2}` with `d = (cos θ, sin θ)`.
//!
//! The weight of a pixel is the double integral of that region's indicator
//! over the pixel footprint, which is the area of a convex polygon. It is
//! computed by clipping the pixel square against the region's half-planes
//! (Sutherland-Hodgman) and applying the shoelace formula. No step divides
//! by a trigonometric factor, and axis-aligned motion uses closed-form
//! interval overlaps.

// ============================================================
// Constants
// ============================================================

/// Half-width of the motion band in pixels
pub const BAND_HALF_WIDTH: f64 = 0.5;

/// Angles (degrees) closer than this to an axis are treated as axis-aligned
pub const AXIS_ANGLE_TOLERANCE: f64 = 1e-9;

/// Period of the motion angle in degrees (a line has no direction)
const ANGLE_PERIOD: f64 = 180.0;

type Point = [f64; 2];

// ============================================================
// Types
// ============================================================

/// Axis-aligned pixel footprint `[x0, x1] × [y0, y1]`
///
/// Coordinates are in pixel units relative to the kernel centre, with `y`
/// pointing up (image rows grow downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCell {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl PixelCell {
    /// Create a cell from its bounds (bounds are reordered if needed)
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            x1: x0.max(x1),
            y0: y0.min(y1),
            y1: y0.max(y1),
        }
    }

    /// Unit cell centred on `(cx, cy)`
    pub fn unit(cx: f64, cy: f64) -> Self {
        Self::new(cx - 0.5, cx + 0.5, cy - 0.5, cy + 0.5)
    }

    /// Cell area
    pub fn area(&self) -> f64 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }

    /// Corners in counter-clockwise order
    fn corners(&self) -> [Point; 4] {
        [
            [self.x0, self.y0],
            [self.x1, self.y0],
            [self.x1, self.y1],
            [self.x0, self.y1],
        ]
    }
}

/// Orientation class of a normalized angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Motion along image rows (θ ≡ 0°)
    Horizontal,
    /// Motion along image columns (θ ≡ 90°)
    Vertical,
    /// Any other angle
    Oblique,
}

impl Orientation {
    /// Classify an angle in degrees
    pub fn classify(theta: f64) -> Self {
        let angle = normalize_angle(theta);
        if angle < AXIS_ANGLE_TOLERANCE || ANGLE_PERIOD - angle < AXIS_ANGLE_TOLERANCE {
            Orientation::Horizontal
        } else if (angle - 90.0).abs() < AXIS_ANGLE_TOLERANCE {
            Orientation::Vertical
        } else {
            Orientation::Oblique
        }
    }
}

// ============================================================
// Public API
// ============================================================

/// Reduce an angle in degrees to `[0, 180)`
pub fn normalize_angle(theta: f64) -> f64 {
    let angle = theta.rem_euclid(ANGLE_PERIOD);
    // rem_euclid rounds tiny negative inputs up to the period itself
    if angle >= ANGLE_PERIOD {
        0.0
    } else {
        angle
    }
}

/// Fraction of `cell` covered by the infinite unit-width band through the
/// origin at angle `theta` (degrees)
///
/// Returns a value in `[0, 1]`; degenerate (zero-area) cells return 0.
pub fn line_integral(theta: f64, cell: &PixelCell) -> f64 {
    coverage(theta, None, cell)
}

/// Fraction of `cell` covered by the unit-width segment of `length` pixels
/// centred on the origin at angle `theta` (degrees)
///
/// This is [`line_integral`] clipped to the segment end points at
/// `± length / 2` along the motion direction.
pub fn segment_integral(theta: f64, length: f64, cell: &PixelCell) -> f64 {
    coverage(theta, Some(length.max(0.0) / 2.0), cell)
}

// ============================================================
// Integration
// ============================================================

fn coverage(theta: f64, half_length: Option<f64>, cell: &PixelCell) -> f64 {
    let area = cell.area();
    if !area.is_finite() || area <= 0.0 || !theta.is_finite() {
        return 0.0;
    }

    let covered = match Orientation::classify(theta) {
        Orientation::Horizontal => {
            along_overlap(cell.x0, cell.x1, half_length)
                * interval_overlap(cell.y0, cell.y1, -BAND_HALF_WIDTH, BAND_HALF_WIDTH)
        }
        Orientation::Vertical => {
            interval_overlap(cell.x0, cell.x1, -BAND_HALF_WIDTH, BAND_HALF_WIDTH)
                * along_overlap(cell.y0, cell.y1, half_length)
        }
        Orientation::Oblique => clipped_area(normalize_angle(theta), half_length, cell),
    };

    (covered / area).clamp(0.0, 1.0)
}

/// Overlap of `[lo, hi]` with the segment extent, or its full length for
/// an unbounded line
fn along_overlap(lo: f64, hi: f64, half_length: Option<f64>) -> f64 {
    match half_length {
        Some(h) => interval_overlap(lo, hi, -h, h),
        None => hi - lo,
    }
}

fn interval_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

fn clipped_area(angle_deg: f64, half_length: Option<f64>, cell: &PixelCell) -> f64 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    // Half-planes `normal · p <= offset` bounding the band (and segment)
    let mut planes: Vec<(Point, f64)> = vec![
        ([-sin, cos], BAND_HALF_WIDTH),
        ([sin, -cos], BAND_HALF_WIDTH),
    ];
    if let Some(h) = half_length {
        planes.push(([cos, sin], h));
        planes.push(([-cos, -sin], h));
    }

    let mut polygon: Vec<Point> = cell.corners().to_vec();
    for (normal, offset) in planes {
        polygon = clip_half_plane(&polygon, normal, offset);
        if polygon.len() < 3 {
            return 0.0;
        }
    }

    polygon_area(&polygon)
}

/// Keep the part of a convex polygon where `normal · p <= offset`
fn clip_half_plane(polygon: &[Point], normal: Point, offset: f64) -> Vec<Point> {
    let n = polygon.len();
    let mut clipped = Vec::with_capacity(n + 1);

    for i in 0..n {
        let current = polygon[i];
        let previous = polygon[(i + n - 1) % n];
        let d_cur = offset - dot(normal, current);
        let d_prev = offset - dot(normal, previous);

        if d_cur >= 0.0 {
            if d_prev < 0.0 {
                clipped.push(intersect(previous, current, d_prev, d_cur));
            }
            clipped.push(current);
        } else if d_prev >= 0.0 {
            clipped.push(intersect(previous, current, d_prev, d_cur));
        }
    }

    clipped
}

/// Point on `a → b` where the signed distance crosses zero
///
/// `da` and `db` have opposite signs, so `da - db` is never zero.
fn intersect(a: Point, b: Point, da: f64, db: f64) -> Point {
    let t = da / (da - db);
    [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]
}

fn dot(a: Point, b: Point) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Shoelace area of a simple polygon
fn polygon_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let [x0, y0] = polygon[i];
            let [x1, y1] = polygon[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum();
    twice.abs() / 2.0
}

// ============================================================
// Tests
// ============================================================
