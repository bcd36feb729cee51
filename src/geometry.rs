/*!
Turns numeric functions and samples into drawing-surface geometry.

- [`build_curve`] samples `f: ℝ → ℝ≥0` on `N + 1` evenly spaced points and closes the path
  along the baseline so it can be filled.
- [`build_grid`] evaluates `g: ℝ² → ℝ` at the centres of a rectangular grid and
  peak-normalizes it into intensities in `[0, 1]`.
- [`map_points`] and [`polyline`] place sample scatter and chain trajectories on the surface.

Surface coordinates put the origin at the top-left corner, so larger densities have smaller
`y`. Every builder is a pure function of its arguments, and non-finite values are floored to
zero rather than passed on to the renderer.
*/

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Pixel extent of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
        }
    }
}

/// A closed interval of the data axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `v` as a fraction of the range; `0` for an empty range.
    pub fn fraction(&self, v: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            return 0.0;
        }
        (v - self.min) / span
    }

    /// The value at fraction `t` of the range.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * self.span()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered list of surface points, optionally closed for filling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    /// SVG path data: `M x y L x y … [Z]`.
    pub fn to_svg_path(&self) -> String {
        let mut d = String::with_capacity(self.points.len() * 16);
        for (i, p) in self.points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            d.push_str(&format!("{cmd}{:.2},{:.2}", p.x, p.y));
        }
        if self.closed && !self.points.is_empty() {
            d.push_str(" Z");
        }
        d
    }

    /// The sampled curve without the two baseline points appended by [`build_curve`].
    pub fn curve(&self) -> &[Point] {
        if self.closed && self.points.len() >= 2 {
            &self.points[..self.points.len() - 2]
        } else {
            &self.points
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// Samples `f` at `n + 1` evenly spaced points of `domain` and maps them onto `surface`.
///
/// Values are capped at `y_max` (which maps to the top edge). Two closing points at the right
/// and left ends of the baseline are appended so the path encloses the area under the curve.
pub fn build_curve(
    f: impl Fn(f64) -> f64,
    domain: AxisRange,
    n: usize,
    y_max: f64,
    surface: &Surface,
) -> Path {
    let n = n.max(1);
    let mut points = Vec::with_capacity(n + 3);
    for i in 0..=n {
        let t = i as f64 / n as f64;
        let x = domain.lerp(t);
        let height_fraction = if y_max > 0.0 {
            finite_or_zero(f(x)).min(y_max) / y_max
        } else {
            0.0
        };
        points.push(Point::new(
            t * surface.width,
            surface.height - height_fraction * surface.height,
        ));
    }
    points.push(Point::new(surface.width, surface.height));
    points.push(Point::new(0.0, surface.height));
    Path {
        points,
        closed: true,
    }
}

/// How grid evaluations are turned into intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridScale {
    /// Values are log-densities: intensity `exp(g − max g)`.
    Log,
    /// Values are densities: intensity `g / max g`.
    Linear,
}

/// Peak-normalized intensities over a rectangular region. Row `r` holds the cells whose
/// centre has `y = y_range.min + (r + ½)·dy`; column `c` likewise for `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntensityGrid {
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub cells: Array2<f64>,
}

/// One shaded rectangle ready for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub intensity: f64,
}

impl IntensityGrid {
    pub fn nrows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.cells.ncols()
    }

    /// Rectangles covering `surface`, with larger `y` values drawn nearer the top.
    pub fn to_cells(&self, surface: &Surface) -> Vec<Cell> {
        let (rows, cols) = self.cells.dim();
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        let width = surface.width / cols as f64;
        let height = surface.height / rows as f64;
        self.cells
            .indexed_iter()
            .map(|((r, c), &intensity)| Cell {
                x: c as f64 * width,
                y: (rows - 1 - r) as f64 * height,
                width,
                height,
                intensity,
            })
            .collect()
    }
}

/// Evaluates `g(x, y)` at the centre of each of `nx × ny` cells and normalizes by the largest
/// finite value. Non-finite evaluations become zero intensity; a grid without any positive
/// finite value (linear) or any finite value (log) is all zeros.
pub fn build_grid(
    g: impl Fn(f64, f64) -> f64,
    x_range: AxisRange,
    y_range: AxisRange,
    nx: usize,
    ny: usize,
    scale: GridScale,
) -> IntensityGrid {
    let raw = Array2::from_shape_fn((ny, nx), |(r, c)| {
        let x = x_range.lerp((c as f64 + 0.5) / nx as f64);
        let y = y_range.lerp((r as f64 + 0.5) / ny as f64);
        g(x, y)
    });
    let peak = raw
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    let cells = match scale {
        GridScale::Log if peak.is_finite() => raw.mapv(|v| finite_or_zero((v - peak).exp())),
        GridScale::Linear if peak > 0.0 => raw.mapv(|v| finite_or_zero(v / peak)),
        _ => Array2::zeros((ny, nx)),
    };
    IntensityGrid {
        x_range,
        y_range,
        cells,
    }
}

/// Places 2D data points on `surface`.
pub fn map_points<'a>(
    points: impl IntoIterator<Item = &'a [f64]>,
    x_range: AxisRange,
    y_range: AxisRange,
    surface: &Surface,
) -> Vec<Point> {
    points
        .into_iter()
        .map(|p| {
            Point::new(
                x_range.fraction(p[0]) * surface.width,
                surface.height - y_range.fraction(p[1]) * surface.height,
            )
        })
        .collect()
}

/// An open path through 2D data points, e.g. a chain trajectory.
pub fn polyline<'a>(
    points: impl IntoIterator<Item = &'a [f64]>,
    x_range: AxisRange,
    y_range: AxisRange,
    surface: &Surface,
) -> Path {
    Path {
        points: map_points(points, x_range, y_range, surface),
        closed: false,
    }
}
