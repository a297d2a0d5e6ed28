// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounds for meshes and mesh sets
//!
//! Bounds are summarized as min/max corners with derived center and size.
//! They are recomputed on demand during a detection pass; only the
//! model-level bounds are held for the lifetime of a loaded model.

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Create a new bounding box from corner points
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a center point and full size
    pub fn from_center_size(center: Point3<f32>, size: Vector3<f32>) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, or `None` for an empty set
    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Aabb::new(first, first);
        for p in iter {
            aabb.expand(p);
        }
        Some(aabb)
    }

    /// Grow the box to contain `point`
    pub fn expand(&mut self, point: Point3<f32>) {
        self.min = Point3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Point3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    /// Union of two boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.expand(other.min);
        out.expand(other.max);
        out
    }

    /// Union over a set of boxes, or `None` for an empty set
    pub fn union_all(boxes: impl IntoIterator<Item = Aabb>) -> Option<Aabb> {
        let mut iter = boxes.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(&b)))
    }

    /// Center point
    pub fn center(&self) -> Point3<f32> {
        self.min + (self.max - self.min) * 0.5
    }

    /// Full extent along each axis
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest extent across the three axes
    pub fn largest_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn center_and_size() {
        let aabb = Aabb::new(Point3::new(-1.0, 0.0, 2.0), Point3::new(3.0, 4.0, 2.0));
        assert_relative_eq!(aabb.center(), Point3::new(1.0, 2.0, 2.0));
        assert_relative_eq!(aabb.size(), Vector3::new(4.0, 4.0, 0.0));
        assert_relative_eq!(aabb.largest_dimension(), 4.0);
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(-2.0, 0.5, 0.0), Point3::new(0.5, 3.0, 0.5));
        let u = a.union(&b);
        assert_relative_eq!(u.min, Point3::new(-2.0, 0.0, 0.0));
        assert_relative_eq!(u.max, Point3::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn union_all_single() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(Aabb::union_all([a]), Some(a));
        assert_eq!(Aabb::union_all([]), None);
    }
}
