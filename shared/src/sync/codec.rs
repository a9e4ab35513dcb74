//! Tagged field records for water bodies.
//!
//! Each attribute is stored under a stable numeric tag with its own bincode
//! payload. Readers skip tags they do not know and fall back to defaults for
//! tags that are absent, so replicas on different versions can still talk.

use bevy::math::DVec3;
use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{WaterError, WaterResult};
use crate::water::{BodyId, PlanetInfo, WaterBody, WaterSettings};

/// Stable field numbers. Never reuse a retired number.
pub mod tags {
    pub const BODY_ID: u16 = 5;
    pub const BASE_RADIUS: u16 = 10;
    pub const CURRENT_RADIUS: u16 = 11;
    pub const WAVE_HEIGHT: u16 = 15;
    pub const WAVE_SPEED: u16 = 16;
    pub const WAVE_TIMER: u16 = 17;
    pub const WAVE_SCALE: u16 = 18;
    pub const CENTER: u16 = 20;
    pub const VISCOSITY: u16 = 25;
    pub const BUOYANCY: u16 = 26;
    pub const ENABLE_FISH: u16 = 30;
    pub const ENABLE_SEAGULLS: u16 = 31;
    pub const TEXTURE: u16 = 32;
    pub const CRUSH_DEPTH: u16 = 35;
    pub const PLAYER_DRAG: u16 = 40;
    pub const TRANSPARENT: u16 = 45;
    pub const LIT: u16 = 50;
    pub const COLLECTION_RATE: u16 = 55;
    pub const FOG_COLOR: u16 = 60;
    pub const TIDE_HEIGHT: u16 = 65;
    pub const TIDE_SPEED: u16 = 66;
    pub const TIDE_TIMER: u16 = 67;
    pub const SEED: u16 = 70;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaggedField {
    pub tag: u16,
    pub payload: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaggedRecord {
    pub fields: Vec<TaggedField>,
}

impl TaggedRecord {
    pub fn put<T: Serialize>(&mut self, tag: u16, value: &T) -> WaterResult<()> {
        let payload = bincode::options().serialize(value)?;
        self.fields.push(TaggedField { tag, payload });
        Ok(())
    }

    /// Decodes the first field with `tag`. A present but undecodable field is an error.
    pub fn get<T: DeserializeOwned>(&self, tag: u16) -> WaterResult<Option<T>> {
        match self.fields.iter().find(|f| f.tag == tag) {
            Some(field) => Ok(Some(bincode::options().deserialize(&field.payload)?)),
            None => Ok(None),
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, tag: u16, default: T) -> WaterResult<T> {
        Ok(self.get(tag)?.unwrap_or(default))
    }

    pub fn require<T: DeserializeOwned>(&self, tag: u16) -> WaterResult<T> {
        self.get(tag)?.ok_or(WaterError::MissingField { tag })
    }
}

pub fn encode_body(body: &WaterBody) -> WaterResult<TaggedRecord> {
    let mut record = TaggedRecord::default();
    record.put(tags::BODY_ID, &body.body_id)?;
    record.put(tags::BASE_RADIUS, &body.base_radius)?;
    record.put(tags::CURRENT_RADIUS, &body.current_radius)?;
    record.put(tags::WAVE_HEIGHT, &body.wave_height)?;
    record.put(tags::WAVE_SPEED, &body.wave_speed)?;
    record.put(tags::WAVE_TIMER, &body.wave_timer)?;
    record.put(tags::WAVE_SCALE, &body.wave_scale)?;
    record.put(tags::CENTER, &body.center)?;
    record.put(tags::VISCOSITY, &body.viscosity)?;
    record.put(tags::BUOYANCY, &body.buoyancy)?;
    record.put(tags::ENABLE_FISH, &body.enable_fish)?;
    record.put(tags::ENABLE_SEAGULLS, &body.enable_seagulls)?;
    record.put(tags::TEXTURE, &body.texture)?;
    record.put(tags::CRUSH_DEPTH, &body.crush_depth)?;
    record.put(tags::PLAYER_DRAG, &body.player_drag)?;
    record.put(tags::TRANSPARENT, &body.transparent)?;
    record.put(tags::LIT, &body.lit)?;
    record.put(tags::COLLECTION_RATE, &body.collection_rate)?;
    record.put(tags::FOG_COLOR, &body.fog_color)?;
    record.put(tags::TIDE_HEIGHT, &body.tide_height)?;
    record.put(tags::TIDE_SPEED, &body.tide_speed)?;
    record.put(tags::TIDE_TIMER, &body.tide_timer)?;
    record.put(tags::SEED, &body.seed())?;
    Ok(record)
}

/// Rebuilds a body from a record. The result is validated before it is returned.
pub fn decode_body(record: &TaggedRecord) -> WaterResult<WaterBody> {
    let body_id: BodyId = record.require(tags::BODY_ID)?;
    let base_radius: f64 = record.require(tags::BASE_RADIUS)?;
    let center: DVec3 = record.require(tags::CENTER)?;
    let defaults = WaterSettings::default();

    let settings = WaterSettings {
        radius: 1.0,
        wave_height: record.get_or(tags::WAVE_HEIGHT, defaults.wave_height)?,
        wave_speed: record.get_or(tags::WAVE_SPEED, defaults.wave_speed)?,
        wave_scale: record.get_or(tags::WAVE_SCALE, defaults.wave_scale)?,
        tide_height: record.get_or(tags::TIDE_HEIGHT, defaults.tide_height)?,
        tide_speed: record.get_or(tags::TIDE_SPEED, defaults.tide_speed)?,
        viscosity: record.get_or(tags::VISCOSITY, defaults.viscosity)?,
        buoyancy: record.get_or(tags::BUOYANCY, defaults.buoyancy)?,
        crush_depth: record.get_or(tags::CRUSH_DEPTH, defaults.crush_depth)?,
        collection_rate: record.get_or(tags::COLLECTION_RATE, defaults.collection_rate)?,
        enable_fish: record.get_or(tags::ENABLE_FISH, defaults.enable_fish)?,
        enable_seagulls: record.get_or(tags::ENABLE_SEAGULLS, defaults.enable_seagulls)?,
        player_drag: record.get_or(tags::PLAYER_DRAG, defaults.player_drag)?,
        transparent: record.get_or(tags::TRANSPARENT, defaults.transparent)?,
        lit: record.get_or(tags::LIT, defaults.lit)?,
        texture: record.get_or(tags::TEXTURE, defaults.texture.clone())?,
        fog_color: record.get_or(tags::FOG_COLOR, defaults.fog_color)?,
        seed: record.get_or(tags::SEED, defaults.seed)?,
    };

    let planet = PlanetInfo {
        id: body_id,
        center,
        minimum_radius: base_radius,
    };
    let mut body = WaterBody::from_planet(&planet, Some(&settings));
    body.base_radius = base_radius;
    body.current_radius = record.get_or(tags::CURRENT_RADIUS, base_radius)?;
    body.wave_timer = record.get_or(tags::WAVE_TIMER, 0.0)?;
    body.tide_timer = record.get_or(tags::TIDE_TIMER, 0.0)?;
    body.rebuild_derived();
    body.validate()?;
    Ok(body)
}
