use crate::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// `a·x² + b·x + c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola<T> {
    pub a: T,
    pub b: T,
    pub c: T,
}

/// Fit a parabola through three points with Newton's divided differences.
///
/// Returns `None` when the second divided difference is zero, i.e. the points
/// are collinear and there is no vertex.
pub fn newton_parabola<S: Sample>(p0: Point<S>, p1: Point<S>, p2: Point<S>) -> Option<Parabola<S>> {
    let c0 = p0.y;
    let c1 = (p1.y - c0) / (p1.x - p0.x);
    let c2 = ((p2.y - c0) / (p2.x - p0.x) - c1) / (p2.x - p1.x);
    if c2 == S::zero() {
        return None;
    }
    Some(Parabola {
        a: c2,
        b: c1 - c2 * (p0.x + p1.x),
        c: c0 - p0.x * (c1 - c2 * p1.x),
    })
}

impl<S: Sample> Parabola<S> {
    pub fn to_f64(self) -> Parabola<f64> {
        Parabola {
            a: self.a.to_f64(),
            b: self.b.to_f64(),
            c: self.c.to_f64(),
        }
    }

    /// The first numeric fault in the coefficients.
    pub fn fault(&self) -> Option<crate::sample::NumericFault> {
        self.a.fault().or(self.b.fault()).or(self.c.fault())
    }
}

impl Parabola<f64> {
    /// `(-b/2a, c - b²/4a)`
    pub fn vertex(&self) -> Point<f64> {
        Point {
            x: -self.b / (2.0 * self.a),
            y: self.c - self.b * self.b / (4.0 * self.a),
        }
    }
}
