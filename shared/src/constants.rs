use bevy::math::DVec3;

pub const PROTOCOL_ID: u64 = 0;
pub const TICKS_PER_SECOND: u64 = 20;

/// Rate at which wave and tide speeds are expressed (units per 1/60 s).
pub const TIMER_UNITS_PER_SECOND: f64 = 60.0;
/// Tide timer advance per unit of tide speed, per timer unit.
pub const TIDE_TIMER_RATE: f64 = 0.001;

/// Oldest capability API version still accepted from external callers.
pub const MIN_API_VERSION: i32 = 14;
/// Identifier the capability table is published under.
pub const CAPABILITY_HANDLER_ID: u16 = 50271;

/// Radius of a configured water body relative to its planet's minimum radius.
pub const DEFAULT_RADIUS_MULTIPLIER: f64 = 1.032;
pub const DEFAULT_SEED: u32 = 42069;
pub const DEFAULT_TEXTURE: &str = "JWater";
pub const DEFAULT_FOG_COLOR: DVec3 = DVec3::new(0.1, 0.125, 0.196);

/// Depth over which the buoyancy multiplier grows by one full unit.
pub const BUOYANCY_DEPTH_SCALE: f32 = 5000.0;
pub const LARGE_BODY_BUOYANCY_DIVISOR: f32 = 50.0;
pub const SMALL_BODY_BUOYANCY_DIVISOR: f32 = 20.0;

/// Direction returned by up-direction queries when no water body is known.
pub const GLOBAL_UP: DVec3 = DVec3::Y;

/// Upper bound for a decompressed snapshot or message payload.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const UNIX_EPOCH_TIME_ERROR: &str = "System time is before UNIX_EPOCH";
pub const SOCKET_LOCAL_ADDR_ERROR: &str = "Failed to retrieve local address for UDP socket";
pub const SOCKET_BIND_ERROR: &str = "Failed to bind UDP socket";
pub const NETCODE_SERVER_TRANSPORT_ERROR: &str = "Failed to create Netcode server transport";
