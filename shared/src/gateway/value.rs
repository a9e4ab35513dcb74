//! Tagged values passed through the capability table.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::water::{BodyId, BodySizeClass, Line, Sphere, WaterBody};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalData {
    pub center: DVec3,
    pub radius: f64,
    pub min_radius: f64,
    pub max_radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveData {
    pub height: f32,
    pub speed: f32,
    pub scale: f32,
    pub seed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    pub fog_color: DVec3,
    pub transparent: bool,
    pub lit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsData {
    pub viscosity: f32,
    pub buoyancy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TideData {
    pub height: f32,
    pub speed: f32,
}

impl From<&WaterBody> for PhysicalData {
    fn from(body: &WaterBody) -> Self {
        let (min_radius, max_radius) = body.radius_bounds();
        Self {
            center: body.center,
            radius: body.base_radius,
            min_radius,
            max_radius,
        }
    }
}

impl From<&WaterBody> for WaveData {
    fn from(body: &WaterBody) -> Self {
        Self {
            height: body.wave_height,
            speed: body.wave_speed,
            scale: body.wave_scale,
            seed: body.seed(),
        }
    }
}

impl From<&WaterBody> for RenderData {
    fn from(body: &WaterBody) -> Self {
        Self {
            fog_color: body.fog_color,
            transparent: body.transparent,
            lit: body.lit,
        }
    }
}

impl From<&WaterBody> for PhysicsData {
    fn from(body: &WaterBody) -> Self {
        Self {
            viscosity: body.viscosity,
            buoyancy: body.buoyancy,
        }
    }
}

impl From<&WaterBody> for TideData {
    fn from(body: &WaterBody) -> Self {
        Self {
            height: body.tide_height,
            speed: body.tide_speed,
        }
    }
}

/// An argument or result of a capability call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i32),
    Ints(Vec<i32>),
    Float(f32),
    OptFloat(Option<f32>),
    Text(String),
    BodyId(BodyId),
    /// `None` asks for the closest body; `Some(BodyId(0))` is a real id
    OptBodyId(Option<BodyId>),
    SizeClass(BodySizeClass),
    Vector(DVec3),
    Vectors(Vec<DVec3>),
    Line(Line),
    Lines(Vec<Line>),
    Sphere(Sphere),
    Spheres(Vec<Sphere>),
    Physical(PhysicalData),
    Wave(WaveData),
    Render(RenderData),
    Physics(PhysicsData),
    Tide(TideData),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Unit,
    Bool,
    Int,
    Ints,
    Float,
    OptFloat,
    Text,
    BodyId,
    OptBodyId,
    SizeClass,
    Vector,
    Vectors,
    Line,
    Lines,
    Sphere,
    Spheres,
    Physical,
    Wave,
    Render,
    Physics,
    Tide,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Ints(_) => ValueKind::Ints,
            Value::Float(_) => ValueKind::Float,
            Value::OptFloat(_) => ValueKind::OptFloat,
            Value::Text(_) => ValueKind::Text,
            Value::BodyId(_) => ValueKind::BodyId,
            Value::OptBodyId(_) => ValueKind::OptBodyId,
            Value::SizeClass(_) => ValueKind::SizeClass,
            Value::Vector(_) => ValueKind::Vector,
            Value::Vectors(_) => ValueKind::Vectors,
            Value::Line(_) => ValueKind::Line,
            Value::Lines(_) => ValueKind::Lines,
            Value::Sphere(_) => ValueKind::Sphere,
            Value::Spheres(_) => ValueKind::Spheres,
            Value::Physical(_) => ValueKind::Physical,
            Value::Wave(_) => ValueKind::Wave,
            Value::Render(_) => ValueKind::Render,
            Value::Physics(_) => ValueKind::Physics,
            Value::Tide(_) => ValueKind::Tide,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Typed access to the arguments of one call.
pub struct Args<'a> {
    operation: &'static str,
    values: &'a [Value],
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self, index: usize) -> crate::WaterResult<&'a $ty> {
            match self.values.get(index) {
                Some(Value::$variant(value)) => Ok(value),
                _ => Err(self.mismatch(index, ValueKind::$variant)),
            }
        }
    };
}

impl<'a> Args<'a> {
    pub fn new(operation: &'static str, values: &'a [Value]) -> Self {
        Self { operation, values }
    }

    fn mismatch(&self, index: usize, expected: ValueKind) -> crate::WaterError {
        crate::WaterError::BadArguments {
            operation: self.operation,
            expected: format!("{expected} at position {index}"),
        }
    }

    accessor!(boolean, Bool, bool);
    accessor!(int, Int, i32);
    accessor!(float, Float, f32);
    accessor!(text, Text, String);
    accessor!(body_id, BodyId, BodyId);
    accessor!(opt_body_id, OptBodyId, Option<BodyId>);
    accessor!(size_class, SizeClass, BodySizeClass);
    accessor!(vector, Vector, DVec3);
    accessor!(vectors, Vectors, Vec<DVec3>);
    accessor!(line, Line, Line);
    accessor!(lines, Lines, Vec<Line>);
    accessor!(sphere, Sphere, Sphere);
    accessor!(spheres, Spheres, Vec<Sphere>);
}
