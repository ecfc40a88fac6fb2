use quickcheck::Arbitrary;

use crate::{Point, Polygon};

/// An axis-aligned rectangle with a nonzero area.
#[derive(Clone, Debug)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn polygon(&self) -> Polygon {
        rect(self.x0, self.y0, self.x1, self.y1)
    }
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ])
    .unwrap()
}

impl Arbitrary for Rect {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let x0 = (i16::arbitrary(g) % 1000) as f64;
        let y0 = (i16::arbitrary(g) % 1000) as f64;
        // Keep the sides at least one unit long
        let w = (u16::arbitrary(g) % 500) as f64 + 1.0;
        let h = (u16::arbitrary(g) % 500) as f64 + 1.0;
        Rect {
            x0,
            y0,
            x1: x0 + w,
            y1: y0 + h,
        }
    }
}
