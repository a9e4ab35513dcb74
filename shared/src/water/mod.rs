//! Spherical water surfaces attached to planets.
//!
//! ```text
//! ┌───────────────┐    seed     ┌──────────────┐
//! │  NoiseField   │◄────────────│  WaterBody   │  per planet, keyed by BodyId
//! └───────────────┘             │ - waves      │
//!                               │ - tides      │
//!                               │ - physics    │
//!                               └──────┬───────┘
//!                                      │ owned by
//!                               ┌──────▼───────┐
//!                               │WaterRegistry │  closest-by-center lookup
//!                               └──────────────┘
//! ```
//!
//! Every query is a read-only function of a body's current state. Only the
//! timers and the current radius change per tick.

pub mod body;
pub mod noise;
pub mod planet;
pub mod query;
pub mod registry;
pub mod surface;

pub use body::{tide_direction_for, BodyId, WaterBody, WaterSettings};
pub use noise::NoiseField;
pub use planet::{PlanetInfo, PlanetLookup};
pub use query::{BodySizeClass, Intersection, Line, Sphere};
pub use registry::WaterRegistry;
