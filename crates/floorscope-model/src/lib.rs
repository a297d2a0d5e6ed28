// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorscope Model - floor and component detection for building scenes
//!
//! Maps an unstructured mesh scene graph onto a semantic partition: floor
//! index to set of meshes, and component type (windows, doors, ...) to set
//! of meshes. The crate is renderer-independent; a viewer feeds it a
//! [`SceneSnapshot`] captured from whatever scene graph it renders and gets
//! back plain descriptors.
//!
//! # Pipeline
//!
//! 1. Capture a [`SceneSnapshot`] of the loaded model.
//! 2. [`group_floors`] partitions all meshes into [`FloorDescriptor`]s,
//!    falling back from name matching to Y-proximity to uniform slicing.
//! 3. [`classify_components`] buckets meshes into configured
//!    [`ComponentTypeDescriptor`]s via ancestor-chain pattern matching.
//! 4. [`FlyToPath`] produces the camera poses for framing a selection.
//!
//! Detection is synchronous and one-shot: the caller re-runs it in full on
//! every model reload.

pub mod bounds;
pub mod components;
pub mod config;
pub mod error;
pub mod floors;
pub mod flyto;
pub mod patterns;
pub mod scene;

// Re-export all public types
pub use bounds::*;
pub use components::*;
pub use config::*;
pub use error::*;
pub use floors::*;
pub use flyto::*;
pub use patterns::{floor_number, matches_any};
pub use scene::*;
