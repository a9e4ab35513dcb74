//! Handlers behind the capability table. Argument kinds are already checked.

use bevy::math::DVec3;

use super::value::{Args, PhysicalData, PhysicsData, RenderData, TideData, Value, WaveData};
use super::GatewayContext;
use crate::constants::GLOBAL_UP;
use crate::error::WaterResult;
use crate::sync;
use crate::water::{Intersection, WaterBody};

fn resolve<'a>(
    ctx: &GatewayContext<'a>,
    args: &Args<'_>,
    id_index: usize,
    position: DVec3,
) -> WaterResult<Option<&'a WaterBody>> {
    let id = *args.opt_body_id(id_index)?;
    ctx.registry.resolve(id, position)
}

/// Body named by an explicit id, checked once for a whole batch.
fn batch_body<'a>(
    ctx: &GatewayContext<'a>,
    args: &Args<'_>,
    id_index: usize,
) -> WaterResult<Option<&'a WaterBody>> {
    let id = *args.opt_body_id(id_index)?;
    id.map(|id| ctx.registry.get(id))
        .transpose()
}

fn keyed<'a>(ctx: &GatewayContext<'a>, args: &Args<'_>) -> WaterResult<&'a WaterBody> {
    ctx.registry.get(*args.body_id(0)?)
}

pub(super) fn verify_version(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let version = *args.int(0)?;
    let caller = args.text(1)?;
    Ok(Value::Bool(ctx.versions.verify(version, caller, ctx.host)))
}

pub(super) fn is_underwater(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let position = *args.vector(0)?;
    let underwater = resolve(ctx, args, 1, position)?
        .is_some_and(|body| body.is_underwater(position));
    Ok(Value::Bool(underwater))
}

pub(super) fn closest_water(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let position = *args.vector(0)?;
    Ok(Value::OptBodyId(
        ctx.registry.closest(position).map(|body| body.body_id),
    ))
}

pub(super) fn sphere_intersects(
    args: &Args<'_>,
    ctx: &mut GatewayContext<'_>,
) -> WaterResult<Value> {
    let sphere = args.sphere(0)?;
    let code = resolve(ctx, args, 1, sphere.center)?
        .map_or(Intersection::Overwater, |body| body.intersects_sphere(sphere));
    Ok(Value::Int(code.code()))
}

pub(super) fn sphere_intersects_list(
    args: &Args<'_>,
    ctx: &mut GatewayContext<'_>,
) -> WaterResult<Value> {
    let fixed = batch_body(ctx, args, 1)?;
    let mut codes = Vec::new();
    for sphere in args.spheres(0)? {
        let code = fixed
            .or_else(|| ctx.registry.closest(sphere.center))
            .map_or(Intersection::Overwater, |body| body.intersects_sphere(sphere));
        codes.push(code.code());
    }
    Ok(Value::Ints(codes))
}

pub(super) fn surface_point(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let position = *args.vector(0)?;
    let point = resolve(ctx, args, 1, position)?
        .map_or(position, |body| body.surface_point(position));
    Ok(Value::Vector(point))
}

pub(super) fn surface_point_list(
    args: &Args<'_>,
    ctx: &mut GatewayContext<'_>,
) -> WaterResult<Value> {
    let fixed = batch_body(ctx, args, 1)?;
    let mut points = Vec::new();
    for &position in args.vectors(0)? {
        let point = fixed
            .or_else(|| ctx.registry.closest(position))
            .map_or(position, |body| body.surface_point(position));
        points.push(point);
    }
    Ok(Value::Vectors(points))
}

pub(super) fn line_intersects(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let line = args.line(0)?;
    let code = resolve(ctx, args, 1, line.from)?
        .map_or(Intersection::Overwater, |body| body.intersects_line(line));
    Ok(Value::Int(code.code()))
}

pub(super) fn line_intersects_list(
    args: &Args<'_>,
    ctx: &mut GatewayContext<'_>,
) -> WaterResult<Value> {
    let fixed = batch_body(ctx, args, 1)?;
    let mut codes = Vec::new();
    for line in args.lines(0)? {
        let code = fixed
            .or_else(|| ctx.registry.closest(line.from))
            .map_or(Intersection::Overwater, |body| body.intersects_line(line));
        codes.push(code.code());
    }
    Ok(Value::Ints(codes))
}

pub(super) fn depth(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let position = *args.vector(0)?;
    let depth = resolve(ctx, args, 1, position)?.map(|body| body.depth(position));
    Ok(Value::OptFloat(depth))
}

pub(super) fn up_direction(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    let position = *args.vector(0)?;
    let up = resolve(ctx, args, 1, position)?
        .map_or(GLOBAL_UP, |body| body.up_direction(position));
    Ok(Value::Vector(up))
}

pub(super) fn has_water(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Bool(ctx.registry.contains(*args.body_id(0)?)))
}

pub(super) fn buoyancy_multiplier(
    args: &Args<'_>,
    ctx: &mut GatewayContext<'_>,
) -> WaterResult<Value> {
    let position = *args.vector(0)?;
    let size = *args.size_class(1)?;
    let multiplier = resolve(ctx, args, 2, position)?
        .map_or(0.0, |body| body.buoyancy_multiplier(position, size));
    Ok(Value::Float(multiplier))
}

pub(super) fn crush_depth(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Int(keyed(ctx, args)?.crush_depth))
}

pub(super) fn physical_data(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Physical(PhysicalData::from(keyed(ctx, args)?)))
}

pub(super) fn wave_data(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Wave(WaveData::from(keyed(ctx, args)?)))
}

pub(super) fn render_data(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Render(RenderData::from(keyed(ctx, args)?)))
}

pub(super) fn physics_data(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Physics(PhysicsData::from(keyed(ctx, args)?)))
}

pub(super) fn tide_data(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Tide(TideData::from(keyed(ctx, args)?)))
}

pub(super) fn tide_direction(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    Ok(Value::Vector(keyed(ctx, args)?.tide_direction()))
}

pub(super) fn force_sync(_args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    sync::force_sync(ctx.registry, ctx.role, ctx.host)?;
    Ok(Value::Unit)
}

pub(super) fn create_splash(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    ctx.host
        .create_splash(*args.vector(0)?, *args.float(1)?, *args.boolean(2)?);
    Ok(Value::Unit)
}

pub(super) fn create_bubble(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    ctx.host.create_bubble(*args.vector(0)?, *args.float(1)?);
    Ok(Value::Unit)
}

pub(super) fn run_command(args: &Args<'_>, ctx: &mut GatewayContext<'_>) -> WaterResult<Value> {
    ctx.host.run_command(args.text(0)?);
    Ok(Value::Unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{names, CapabilityTable, VersionGate};
    use crate::host::QueuedHost;
    use crate::sync::ReplicaRole;
    use crate::water::{BodyId, BodySizeClass, WaterRegistry};

    fn call(registry: &WaterRegistry, name: &str, args: Vec<Value>) -> Value {
        let mut host = QueuedHost::new();
        let mut versions = VersionGate::default();
        let mut ctx = GatewayContext {
            registry,
            host: &mut host,
            versions: &mut versions,
            role: ReplicaRole::Mirror,
        };
        CapabilityTable::new()
            .invoke(name, &args, &mut ctx)
            .expect("call succeeds")
    }

    #[test]
    fn keyed_data_reflects_body() {
        let mut body = WaterBody::new(BodyId(3), DVec3::new(0.0, 5.0, 0.0), 600.0);
        body.crush_depth = 750;
        body.step(2.0);
        let registry = WaterRegistry::from_bodies([body.clone()]);
        let id = Value::BodyId(BodyId(3));

        assert_eq!(call(&registry, names::GET_CRUSH_DEPTH, vec![id.clone()]), Value::Int(750));
        let (min_radius, max_radius) = body.radius_bounds();
        assert_eq!(
            call(&registry, names::GET_PHYSICAL_DATA, vec![id.clone()]),
            Value::Physical(PhysicalData {
                center: body.center,
                radius: 600.0,
                min_radius,
                max_radius,
            })
        );
        assert_eq!(
            call(&registry, names::GET_TIDE_DIRECTION, vec![id]),
            Value::Vector(body.tide_direction())
        );
    }

    #[test]
    fn depth_and_buoyancy_at_known_points() {
        let body = WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0);
        let registry = WaterRegistry::from_bodies([body]);
        let below = DVec3::new(0.0, 0.0, 100.0);

        assert_eq!(
            call(
                &registry,
                names::GET_DEPTH,
                vec![Value::Vector(below), Value::OptBodyId(None)]
            ),
            Value::OptFloat(Some(-500.0))
        );
        match call(
            &registry,
            names::GET_BUOYANCY_MULTIPLIER,
            vec![
                Value::Vector(below),
                Value::SizeClass(BodySizeClass::Small),
                Value::OptBodyId(None),
            ],
        ) {
            Value::Float(value) => assert!((value - 1.1 / 20.0).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn batches_check_explicit_id_even_when_empty() {
        let registry = WaterRegistry::from_bodies([WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0)]);
        let mut host = QueuedHost::new();
        let mut versions = VersionGate::default();
        let mut ctx = GatewayContext {
            registry: &registry,
            host: &mut host,
            versions: &mut versions,
            role: ReplicaRole::Mirror,
        };
        let table = CapabilityTable::new();
        let missing = Value::OptBodyId(Some(BodyId(2)));

        for (name, empty) in [
            (names::SPHERE_INTERSECTS_WATER_LIST, Value::Spheres(vec![])),
            (names::GET_CLOSEST_SURFACE_POINT_LIST, Value::Vectors(vec![])),
            (names::LINE_INTERSECTS_WATER_LIST, Value::Lines(vec![])),
        ] {
            assert!(
                matches!(
                    table.invoke(name, &[empty.clone(), missing.clone()], &mut ctx),
                    Err(crate::WaterError::NotFound(BodyId(2)))
                ),
                "{name} accepted a missing body"
            );
        }

        assert_eq!(
            table
                .invoke(
                    names::LINE_INTERSECTS_WATER_LIST,
                    &[Value::Lines(vec![]), Value::OptBodyId(Some(BodyId(1)))],
                    &mut ctx,
                )
                .unwrap(),
            Value::Ints(vec![])
        );
    }

    #[test]
    fn mirror_force_sync_targets_authority() {
        let registry = WaterRegistry::from_bodies([WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0)]);
        let mut host = QueuedHost::new();
        let mut versions = VersionGate::default();
        let mut ctx = GatewayContext {
            registry: &registry,
            host: &mut host,
            versions: &mut versions,
            role: ReplicaRole::Mirror,
        };
        force_sync(&Args::new(names::FORCE_SYNC, &[]), &mut ctx).unwrap();
        assert!(matches!(
            host.actions(),
            [crate::host::HostAction::Snapshot {
                target: crate::host::SyncTarget::Authority,
                ..
            }]
        ));
    }
}
