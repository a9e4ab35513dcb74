//! Height field and depth queries of a single water body.
//!
//! The surface is a sphere of `current_radius` displaced along the radial
//! direction by noise waves and a tidal bulge. Waves are sampled at the
//! projected point on the sphere, not at the raw query position.

use bevy::math::DVec3;

use super::body::WaterBody;

impl WaterBody {
    /// Wave displacement at a world position.
    #[inline]
    pub fn wave_height_at(&self, position: DVec3) -> f64 {
        let scaled = (position + DVec3::ONE * self.wave_timer) * self.wave_scale as f64;
        self.noise().sample_at(scaled) as f64 * self.wave_height as f64
    }

    /// Tidal displacement for a unit direction from the body center.
    ///
    /// The `sqrt(x² + z²)` term fades the bulge out towards the poles.
    #[inline]
    pub fn tide_height_at(&self, direction: DVec3) -> f64 {
        let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
        self.tide_height as f64 * horizontal * direction.dot(self.tide_direction())
    }

    /// Unit vector pointing away from the body center.
    ///
    /// Zero at the center itself.
    #[inline]
    pub fn up_direction(&self, position: DVec3) -> DVec3 {
        (position - self.center).normalize_or_zero()
    }

    /// Surface point along the radial line through `position`.
    pub fn surface_point(&self, position: DVec3) -> DVec3 {
        self.surface_point_with_offset(position, 0.0)
    }

    pub fn surface_point_with_offset(&self, position: DVec3, altitude_offset: f64) -> DVec3 {
        let up = self.up_direction(position);
        let base = self.center + up * (self.current_radius + altitude_offset);
        self.displace(base, up)
    }

    #[inline]
    fn displace(&self, base: DVec3, up: DVec3) -> DVec3 {
        base + up * (self.wave_height_at(base) + self.tide_height_at(up))
    }

    /// Signed distance to the surface; negative is underwater.
    pub fn depth(&self, position: DVec3) -> f32 {
        let surface = self.surface_point(position);
        (position.distance(self.center) - surface.distance(self.center)) as f32
    }

    /// Squared-distance depth. Same sign as [`WaterBody::depth`], not the same magnitude.
    pub fn depth_squared(&self, position: DVec3) -> f32 {
        let surface = self.surface_point(position);
        (position.distance_squared(self.center) - surface.distance_squared(self.center)) as f32
    }

    /// Distance to the undisturbed sphere of `base_radius`.
    #[inline]
    pub fn depth_simple(&self, position: DVec3) -> f32 {
        (position.distance(self.center) - self.base_radius) as f32
    }

    #[inline]
    pub fn is_underwater(&self, position: DVec3) -> bool {
        self.is_underwater_with_offset(position, 0.0)
    }

    #[inline]
    pub fn is_underwater_with_offset(&self, position: DVec3, altitude_offset: f32) -> bool {
        self.depth(position) + altitude_offset < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::BodyId;

    fn calm() -> WaterBody {
        WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0)
    }

    fn wavy() -> WaterBody {
        let mut body = WaterBody::new(BodyId(2), DVec3::new(1000.0, -200.0, 40.0), 600.0);
        body.wave_height = 3.0;
        body.tide_height = 5.0;
        body.step(2.5);
        body
    }

    #[test]
    fn calm_body_depths() {
        let body = calm();
        assert!((body.depth(DVec3::new(0.0, 0.0, 700.0)) - 100.0).abs() < 1e-4);
        assert!(body.is_underwater(DVec3::new(0.0, 0.0, 500.0)));
        assert!(!body.is_underwater(DVec3::new(0.0, 650.0, 0.0)));
        assert!((body.depth_simple(DVec3::new(0.0, -550.0, 0.0)) + 50.0).abs() < 1e-4);
    }

    #[test]
    fn altitude_offset_shifts_submersion() {
        let body = calm();
        let p = DVec3::new(0.0, 0.0, 605.0);
        assert!(!body.is_underwater(p));
        assert!(body.is_underwater_with_offset(p, -10.0));

        let raised = body.surface_point_with_offset(p, 20.0);
        assert!((raised.length() - 620.0).abs() < 1e-6);
    }

    #[test]
    fn surface_point_has_zero_depth() {
        let body = wavy();
        for i in 0..40 {
            let a = i as f64 * 0.41;
            let p = body.center + DVec3::new(a.cos() * 900.0, (a * 0.7).sin() * 300.0, a.sin() * 700.0);
            let surface = body.surface_point(p);
            assert!(body.depth(surface).abs() < 1e-2, "depth at surface {}", body.depth(surface));
        }
    }

    #[test]
    fn underwater_matches_depth_sign() {
        let body = wavy();
        for i in 0..80 {
            let r = 590.0 + i as f64 * 0.25;
            let p = body.center + DVec3::new(0.3, 0.5, -0.8).normalize() * r;
            assert_eq!(body.is_underwater(p), body.depth(p) < 0.0);
        }
    }

    #[test]
    fn squared_depth_keeps_sign() {
        let body = wavy();
        for r in [500.0, 590.0, 615.0, 700.0] {
            let p = body.center + DVec3::new(1.0, 0.2, 0.1).normalize() * r;
            let exact = body.depth(p);
            let fast = body.depth_squared(p);
            assert_eq!(exact < 0.0, fast < 0.0);
        }
    }

    #[test]
    fn tide_is_zero_along_vertical_axis() {
        let body = wavy();
        assert_eq!(body.tide_height_at(DVec3::Y), 0.0);
        let along = body.tide_height_at(body.tide_direction());
        assert!((along - 5.0).abs() < 1e-9);
    }

    #[test]
    fn up_direction_points_outwards() {
        let body = calm();
        assert_eq!(body.up_direction(DVec3::new(0.0, 10.0, 0.0)), DVec3::Y);
        assert_eq!(body.up_direction(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn equal_seeds_equal_fields() {
        let a = wavy();
        let mut b = wavy();
        b.body_id = BodyId(99);
        let p = a.center + DVec3::new(600.0, 1.0, 2.0);
        assert_eq!(a.wave_height_at(p), b.wave_height_at(p));
        assert_eq!(a.surface_point(p), b.surface_point(p));
    }
}
