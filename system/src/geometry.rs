use crate::message::ShapeKind;
use euclid::default::{Point2D, Size2D};

pub type Point = Point2D<f64>;
pub type Size = Size2D<f64>;

/// What a surface has to stroke for a committed shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Rect { origin: Point, size: Size },
    Circle { center: Point, radius: f64 },
    /// Closed path through the points.
    Polygon(Vec<Point>),
}

impl Outline {
    /// Geometry for a drag from `start` to `end`. `None` for shapes nobody knows how to draw.
    pub fn from_drag(kind: &ShapeKind, start: Point, end: Point) -> Option<Self> {
        match kind {
            // Size may be negative when dragging up or left; canvas handles that.
            ShapeKind::Rectangle => Some(Self::Rect {
                origin: start,
                size: Size::new(end.x - start.x, end.y - start.y),
            }),
            ShapeKind::Circle => Some(Self::Circle {
                center: start,
                radius: start.distance_to(end),
            }),
            ShapeKind::Triangle => {
                let half_base = end.x - start.x;
                Some(Self::Polygon(vec![
                    start,
                    Point::new(start.x - half_base, end.y),
                    Point::new(start.x + half_base, end.y),
                ]))
            }
            ShapeKind::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_uses_corner_and_extent_for_rectangle() {
        let outline = Outline::from_drag(
            &ShapeKind::Rectangle,
            Point::new(10.0, 20.0),
            Point::new(4.0, 50.0),
        );
        assert_eq!(
            outline,
            Some(Outline::Rect {
                origin: Point::new(10.0, 20.0),
                size: Size::new(-6.0, 30.0),
            })
        );
    }

    #[test]
    fn it_uses_distance_as_circle_radius() {
        let outline =
            Outline::from_drag(&ShapeKind::Circle, Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(
            outline,
            Some(Outline::Circle {
                center: Point::new(0.0, 0.0),
                radius: 5.0,
            })
        );
    }

    #[test]
    fn it_mirrors_triangle_base_around_apex() {
        let outline = Outline::from_drag(
            &ShapeKind::Triangle,
            Point::new(100.0, 10.0),
            Point::new(130.0, 60.0),
        );
        assert_eq!(
            outline,
            Some(Outline::Polygon(vec![
                Point::new(100.0, 10.0),
                Point::new(70.0, 60.0),
                Point::new(130.0, 60.0),
            ]))
        );
    }

    #[test]
    fn it_skips_unknown_shapes() {
        let kind = ShapeKind::Other("star".into());
        assert_eq!(
            Outline::from_drag(&kind, Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            None
        );
    }
}
