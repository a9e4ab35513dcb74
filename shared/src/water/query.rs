//! Submersion classification for paths and volumes, and buoyancy scaling.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

use super::body::WaterBody;
use crate::constants::{
    BUOYANCY_DEPTH_SCALE, LARGE_BODY_BUOYANCY_DIVISOR, SMALL_BODY_BUOYANCY_DIVISOR,
};

/// How a segment or sphere relates to the water surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Intersection {
    Overwater = 0,
    ExitsWater = 1,
    EntersWater = 2,
    Underwater = 3,
}

impl Intersection {
    /// Classifies from the submersion of the first and second sample point.
    #[inline]
    pub fn from_submersion(first: bool, second: bool) -> Self {
        match (first, second) {
            (false, false) => Intersection::Overwater,
            (true, false) => Intersection::ExitsWater,
            (false, true) => Intersection::EntersWater,
            (true, true) => Intersection::Underwater,
        }
    }

    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: DVec3,
    pub to: DVec3,
}

impl Line {
    pub fn new(from: DVec3, to: DVec3) -> Self {
        Self { from, to }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Grid size class of a floating object, used for buoyancy scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodySizeClass {
    Large,
    Small,
}

impl BodySizeClass {
    fn buoyancy_divisor(self) -> f32 {
        match self {
            BodySizeClass::Large => LARGE_BODY_BUOYANCY_DIVISOR,
            BodySizeClass::Small => SMALL_BODY_BUOYANCY_DIVISOR,
        }
    }
}

impl WaterBody {
    pub fn intersects_line(&self, line: &Line) -> Intersection {
        Intersection::from_submersion(self.is_underwater(line.from), self.is_underwater(line.to))
    }

    /// Samples the two extremal points of the sphere along the local up axis.
    ///
    /// A sphere can dip below the surface off-axis while both samples stay dry;
    /// callers depend on this two-point behavior.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> Intersection {
        let up = self.up_direction(sphere.center) * sphere.radius;
        Intersection::from_submersion(
            self.is_underwater(sphere.center + up),
            self.is_underwater(sphere.center - up),
        )
    }

    pub fn buoyancy_multiplier(&self, position: DVec3, size: BodySizeClass) -> f32 {
        let depth = self.depth(position);
        (1.0 + (-depth / BUOYANCY_DEPTH_SCALE)) / size.buoyancy_divisor() * self.buoyancy
    }

    /// True once `position` is deeper than the body's crush depth.
    pub fn is_crushed(&self, position: DVec3) -> bool {
        -self.depth(position) > self.crush_depth as f32
    }
}
