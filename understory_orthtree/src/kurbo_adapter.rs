// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between Kurbo geometry and 2D tree types.

use kurbo::{Point, Rect, Vec2};

use crate::ray::Ray;
use crate::types::Area;

impl From<Rect> for Area<f64> {
    /// Converts a `Rect`, normalizing it so that `min <= max`.
    fn from(r: Rect) -> Self {
        Self::new([r.x0.min(r.x1), r.y0.min(r.y1)], [r.x0.max(r.x1), r.y0.max(r.y1)])
    }
}

impl From<Area<f64>> for Rect {
    fn from(a: Area<f64>) -> Self {
        Self::new(a.min[0], a.min[1], a.max[0], a.max[1])
    }
}

impl Ray<2> {
    /// Create a 2D ray from Kurbo types.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Ray::new`].
    pub fn from_kurbo(origin: Point, direction: Vec2) -> Self {
        Self::new([origin.x, origin.y], [direction.x, direction.y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_round_trip_normalizes() {
        let area: Area<f64> = Rect::new(10.0, 0.0, 0.0, 5.0).into();
        assert_eq!(area, Area::new([0.0, 0.0], [10.0, 5.0]));
        assert_eq!(Rect::from(area), Rect::new(0.0, 0.0, 10.0, 5.0));
    }

    #[test]
    fn ray_from_kurbo() {
        let ray = Ray::from_kurbo(Point::new(1.0, 2.0), Vec2::new(0.0, -1.0));
        assert_eq!(ray.origin(), &[1.0, 2.0]);
        assert!(ray.intersects(&Area::new([0.0, -10.0], [2.0, -5.0])));
    }
}
