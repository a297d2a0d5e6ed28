// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera fly-to path computation
//!
//! A fly-to is a finite sequence of camera poses from the current view to a
//! vantage point framing a bounding volume. The caller advances the path one
//! step per rendered frame; starting a new path simply replaces the old one,
//! so a superseded animation can never write another pose.

use crate::bounds::Aabb;
use nalgebra::Point3;

/// Interpolation advance per tick
pub const FLY_STEP: f32 = 0.02;

/// Number of ticks a path takes to reach its end pose
pub const FLY_TICKS: u32 = 50;

/// Distance factor relative to the largest bounds dimension
const DISTANCE_FACTOR: f32 = 1.5;

/// Per-axis share of the vantage distance (three-quarter view)
const AXIS_FACTOR: f32 = 0.7;

/// Camera pose: eye position and orbit target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

/// Compute the vantage pose framing `bounds`.
///
/// The eye sits at a distance proportional to the largest dimension, offset
/// equally along all three axes from the center; the target is the center.
pub fn vantage(bounds: &Aabb) -> Pose {
    let center = bounds.center();
    let distance = bounds.largest_dimension() * DISTANCE_FACTOR;
    let offset = distance * AXIS_FACTOR;
    Pose {
        position: Point3::new(center.x + offset, center.y + offset, center.z + offset),
        target: center,
    }
}

/// Finite interpolation path from a starting pose to a vantage pose.
///
/// Yields one pose per tick; the final pose is exactly the end pose, with no
/// residual floating error. Not restartable once begun.
#[derive(Clone, Debug)]
pub struct FlyToPath {
    start: Pose,
    end: Pose,
    tick: u32,
}

impl FlyToPath {
    /// Path from `from` to the vantage framing `bounds`
    pub fn new(bounds: &Aabb, from: Pose) -> Self {
        Self::toward(from, vantage(bounds))
    }

    /// Path between two explicit poses
    pub fn toward(from: Pose, end: Pose) -> Self {
        Self {
            start: from,
            end,
            tick: 0,
        }
    }

    /// End pose the path converges to
    pub fn end_pose(&self) -> Pose {
        self.end
    }

    /// Whether the path has produced its final pose
    pub fn is_finished(&self) -> bool {
        self.tick >= FLY_TICKS
    }
}

impl Iterator for FlyToPath {
    type Item = Pose;

    fn next(&mut self) -> Option<Pose> {
        if self.tick >= FLY_TICKS {
            return None;
        }
        self.tick += 1;
        if self.tick == FLY_TICKS {
            // Snap to the exact end values on the last step
            return Some(self.end);
        }
        let t = self.tick as f32 * FLY_STEP;
        Some(Pose {
            position: self.start.position + (self.end.position - self.start.position) * t,
            target: self.start.target + (self.end.target - self.start.target) * t,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn unit_bounds() -> Aabb {
        Aabb::from_center_size(Point3::new(10.0, 5.0, -2.0), Vector3::new(4.0, 2.0, 1.0))
    }

    fn start_pose() -> Pose {
        Pose {
            position: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(1.0, 0.0, 0.0),
        }
    }

    #[test]
    fn vantage_frames_largest_dimension() {
        let pose = vantage(&unit_bounds());
        // distance = 4.0 * 1.5 = 6.0, offset = 6.0 * 0.7 = 4.2 on each axis
        assert_relative_eq!(pose.position, Point3::new(14.2, 9.2, 2.2));
        assert_relative_eq!(pose.target, Point3::new(10.0, 5.0, -2.0));
    }

    #[test]
    fn path_terminates_in_exactly_fifty_ticks() {
        let path = FlyToPath::new(&unit_bounds(), start_pose());
        let poses: Vec<Pose> = path.collect();
        assert_eq!(poses.len(), FLY_TICKS as usize);
    }

    #[test]
    fn final_pose_snaps_exactly() {
        let mut path = FlyToPath::new(&unit_bounds(), start_pose());
        let end = path.end_pose();
        let last = path.by_ref().last().unwrap();
        // Bitwise equality, not approximate: the last step snaps
        assert_eq!(last.position, end.position);
        assert_eq!(last.target, end.target);
        assert!(path.is_finished());
        assert_eq!(path.next(), None);
    }

    #[test]
    fn path_interpolates_linearly() {
        let end = Pose {
            position: Point3::new(100.0, 0.0, 0.0),
            target: Point3::new(100.0, 0.0, -10.0),
        };
        let mut path = FlyToPath::toward(start_pose(), end);
        let first = path.next().unwrap();
        assert_relative_eq!(first.position.x, 2.0, epsilon = 1e-4);
        let second = path.next().unwrap();
        assert_relative_eq!(second.position.x, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn exhausted_path_stops_advancing() {
        let mut path = FlyToPath::new(&unit_bounds(), start_pose());
        for _ in 0..FLY_TICKS {
            assert!(path.next().is_some());
        }
        assert_eq!(path.next(), None);
        assert_eq!(path.next(), None);
    }
}
