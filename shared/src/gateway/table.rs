use bevy_ecs::resource::Resource;
use bevy_log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ops;
use super::value::{Args, Value, ValueKind};
use super::GatewayContext;
use crate::constants::CAPABILITY_HANDLER_ID;
use crate::error::{WaterError, WaterResult};
use crate::host::HostBridge;

/// Stable operation names.
pub mod names {
    pub const VERIFY_VERSION: &str = "VerifyVersion";
    pub const IS_UNDERWATER: &str = "IsUnderwater";
    pub const GET_CLOSEST_WATER: &str = "GetClosestWater";
    pub const SPHERE_INTERSECTS_WATER: &str = "SphereIntersectsWater";
    pub const SPHERE_INTERSECTS_WATER_LIST: &str = "SphereIntersectsWaterList";
    pub const GET_CLOSEST_SURFACE_POINT: &str = "GetClosestSurfacePoint";
    pub const GET_CLOSEST_SURFACE_POINT_LIST: &str = "GetClosestSurfacePointList";
    pub const LINE_INTERSECTS_WATER: &str = "LineIntersectsWater";
    pub const LINE_INTERSECTS_WATER_LIST: &str = "LineIntersectsWaterList";
    pub const GET_DEPTH: &str = "GetDepth";
    pub const GET_UP_DIRECTION: &str = "GetUpDirection";
    pub const HAS_WATER: &str = "HasWater";
    pub const GET_BUOYANCY_MULTIPLIER: &str = "GetBuoyancyMultiplier";
    pub const GET_CRUSH_DEPTH: &str = "GetCrushDepth";
    pub const GET_PHYSICAL_DATA: &str = "GetPhysicalData";
    pub const GET_WAVE_DATA: &str = "GetWaveData";
    pub const GET_RENDER_DATA: &str = "GetRenderData";
    pub const GET_PHYSICS_DATA: &str = "GetPhysicsData";
    pub const GET_TIDE_DATA: &str = "GetTideData";
    pub const GET_TIDE_DIRECTION: &str = "GetTideDirection";
    pub const FORCE_SYNC: &str = "ForceSync";
    pub const CREATE_SPLASH: &str = "CreateSplash";
    pub const CREATE_BUBBLE: &str = "CreateBubble";
    pub const RUN_COMMAND: &str = "RunCommand";
}

pub type Handler = fn(&Args<'_>, &mut GatewayContext<'_>) -> WaterResult<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub inputs: &'static [ValueKind],
    pub output: ValueKind,
}

#[derive(Clone, Copy)]
pub struct Capability {
    pub name: &'static str,
    pub signature: Signature,
    pub handler: Handler,
}

/// Wire form of a [`Capability`], without the handler.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub inputs: Vec<ValueKind>,
    pub output: ValueKind,
}

#[derive(Resource)]
pub struct CapabilityTable {
    entries: BTreeMap<&'static str, Capability>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityTable {
    pub fn new() -> Self {
        use names::*;
        use ValueKind as K;

        let mut table = Self {
            entries: BTreeMap::new(),
        };

        table.add(VERIFY_VERSION, &[K::Int, K::Text], K::Bool, ops::verify_version);
        table.add(IS_UNDERWATER, &[K::Vector, K::OptBodyId], K::Bool, ops::is_underwater);
        table.add(GET_CLOSEST_WATER, &[K::Vector], K::OptBodyId, ops::closest_water);
        table.add(
            SPHERE_INTERSECTS_WATER,
            &[K::Sphere, K::OptBodyId],
            K::Int,
            ops::sphere_intersects,
        );
        table.add(
            SPHERE_INTERSECTS_WATER_LIST,
            &[K::Spheres, K::OptBodyId],
            K::Ints,
            ops::sphere_intersects_list,
        );
        table.add(
            GET_CLOSEST_SURFACE_POINT,
            &[K::Vector, K::OptBodyId],
            K::Vector,
            ops::surface_point,
        );
        table.add(
            GET_CLOSEST_SURFACE_POINT_LIST,
            &[K::Vectors, K::OptBodyId],
            K::Vectors,
            ops::surface_point_list,
        );
        table.add(
            LINE_INTERSECTS_WATER,
            &[K::Line, K::OptBodyId],
            K::Int,
            ops::line_intersects,
        );
        table.add(
            LINE_INTERSECTS_WATER_LIST,
            &[K::Lines, K::OptBodyId],
            K::Ints,
            ops::line_intersects_list,
        );
        table.add(GET_DEPTH, &[K::Vector, K::OptBodyId], K::OptFloat, ops::depth);
        table.add(GET_UP_DIRECTION, &[K::Vector, K::OptBodyId], K::Vector, ops::up_direction);
        table.add(HAS_WATER, &[K::BodyId], K::Bool, ops::has_water);
        table.add(
            GET_BUOYANCY_MULTIPLIER,
            &[K::Vector, K::SizeClass, K::OptBodyId],
            K::Float,
            ops::buoyancy_multiplier,
        );
        table.add(GET_CRUSH_DEPTH, &[K::BodyId], K::Int, ops::crush_depth);
        table.add(GET_PHYSICAL_DATA, &[K::BodyId], K::Physical, ops::physical_data);
        table.add(GET_WAVE_DATA, &[K::BodyId], K::Wave, ops::wave_data);
        table.add(GET_RENDER_DATA, &[K::BodyId], K::Render, ops::render_data);
        table.add(GET_PHYSICS_DATA, &[K::BodyId], K::Physics, ops::physics_data);
        table.add(GET_TIDE_DATA, &[K::BodyId], K::Tide, ops::tide_data);
        table.add(GET_TIDE_DIRECTION, &[K::BodyId], K::Vector, ops::tide_direction);
        table.add(FORCE_SYNC, &[], K::Unit, ops::force_sync);
        table.add(
            CREATE_SPLASH,
            &[K::Vector, K::Float, K::Bool],
            K::Unit,
            ops::create_splash,
        );
        table.add(CREATE_BUBBLE, &[K::Vector, K::Float], K::Unit, ops::create_bubble);
        table.add(RUN_COMMAND, &[K::Text], K::Unit, ops::run_command);

        table
    }

    fn add(
        &mut self,
        name: &'static str,
        inputs: &'static [ValueKind],
        output: ValueKind,
        handler: Handler,
    ) {
        self.entries.insert(
            name,
            Capability {
                name,
                signature: Signature { inputs, output },
                handler,
            },
        );
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    pub fn descriptors(&self) -> Vec<CapabilityDescriptor> {
        self.entries
            .values()
            .map(|capability| CapabilityDescriptor {
                name: capability.name.to_string(),
                inputs: capability.signature.inputs.to_vec(),
                output: capability.signature.output,
            })
            .collect()
    }

    /// Hands the descriptor list to the host. Called once at startup.
    pub fn publish(&self, host: &mut dyn HostBridge) {
        info!(
            "Publishing {} water capabilities under handler {}",
            self.entries.len(),
            CAPABILITY_HANDLER_ID
        );
        host.publish_capabilities(CAPABILITY_HANDLER_ID, self.descriptors());
    }

    pub fn invoke(
        &self,
        name: &str,
        args: &[Value],
        ctx: &mut GatewayContext<'_>,
    ) -> WaterResult<Value> {
        let capability = self
            .entries
            .get(name)
            .ok_or_else(|| WaterError::UnknownOperation(name.to_string()))?;

        let inputs = capability.signature.inputs;
        let matches = args.len() == inputs.len()
            && args.iter().zip(inputs).all(|(arg, kind)| arg.kind() == *kind);
        if !matches {
            return Err(WaterError::BadArguments {
                operation: capability.name,
                expected: format!("{inputs:?}"),
            });
        }

        debug!("Invoking water capability {}", capability.name);
        (capability.handler)(&Args::new(capability.name, args), ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::VersionGate;
    use crate::host::{HostAction, QueuedHost};
    use crate::sync::ReplicaRole;
    use crate::water::{BodyId, WaterBody, WaterRegistry};
    use bevy::math::DVec3;

    struct Fixture {
        registry: WaterRegistry,
        host: QueuedHost,
        versions: VersionGate,
        table: CapabilityTable,
    }

    impl Fixture {
        fn new(bodies: Vec<WaterBody>) -> Self {
            Self {
                registry: WaterRegistry::from_bodies(bodies),
                host: QueuedHost::new(),
                versions: VersionGate::default(),
                table: CapabilityTable::new(),
            }
        }

        fn call(&mut self, name: &str, args: Vec<Value>) -> WaterResult<Value> {
            let mut ctx = GatewayContext {
                registry: &self.registry,
                host: &mut self.host,
                versions: &mut self.versions,
                role: ReplicaRole::Authority,
            };
            self.table.invoke(name, &args, &mut ctx)
        }
    }

    #[test]
    fn every_operation_is_registered() {
        let table = CapabilityTable::new();
        assert_eq!(table.len(), 24);
        assert!(table.get(names::LINE_INTERSECTS_WATER_LIST).is_some());
    }

    #[test]
    fn publish_sends_descriptors_once() {
        let table = CapabilityTable::new();
        let mut host = QueuedHost::new();
        table.publish(&mut host);

        match host.actions() {
            [HostAction::PublishCapabilities {
                handler_id,
                capabilities,
            }] => {
                assert_eq!(*handler_id, CAPABILITY_HANDLER_ID);
                assert_eq!(capabilities.len(), 24);
                let depth = capabilities
                    .iter()
                    .find(|descriptor| descriptor.name == names::GET_DEPTH)
                    .expect("GetDepth published");
                assert_eq!(depth.inputs, vec![ValueKind::Vector, ValueKind::OptBodyId]);
                assert_eq!(depth.output, ValueKind::OptFloat);
            }
            other => panic!("unexpected host actions {other:?}"),
        }
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let mut fixture = Fixture::new(vec![]);
        assert!(matches!(
            fixture.call("GetWaterColor", vec![]),
            Err(WaterError::UnknownOperation(name)) if name == "GetWaterColor"
        ));
    }

    #[test]
    fn wrong_argument_kinds_are_rejected() {
        let mut fixture = Fixture::new(vec![]);
        assert!(matches!(
            fixture.call(names::HAS_WATER, vec![Value::Int(3)]),
            Err(WaterError::BadArguments { operation, .. }) if operation == names::HAS_WATER
        ));
        assert!(matches!(
            fixture.call(names::IS_UNDERWATER, vec![Value::Vector(DVec3::ZERO)]),
            Err(WaterError::BadArguments { .. })
        ));
    }

    #[test]
    fn outdated_version_warns_and_returns_false() {
        let mut fixture = Fixture::new(vec![]);
        let result = fixture.call(
            names::VERIFY_VERSION,
            vec![Value::Int(13), Value::Text("X".into())],
        );

        assert_eq!(result.unwrap(), Value::Bool(false));
        assert!(fixture.versions.is_rejected("X"));
        assert!(matches!(
            fixture.host.actions(),
            [HostAction::ShowMessage(text)] if text.contains("'X'")
        ));
    }

    #[test]
    fn empty_registry_gives_defaults() {
        let mut fixture = Fixture::new(vec![]);
        let position = DVec3::new(5.0, -3.0, 2.0);
        let none = Value::OptBodyId(None);

        assert_eq!(
            fixture
                .call(names::IS_UNDERWATER, vec![Value::Vector(position), none.clone()])
                .unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            fixture
                .call(names::GET_CLOSEST_SURFACE_POINT, vec![Value::Vector(position), none.clone()])
                .unwrap(),
            Value::Vector(position)
        );
        assert_eq!(
            fixture
                .call(names::GET_DEPTH, vec![Value::Vector(position), none.clone()])
                .unwrap(),
            Value::OptFloat(None)
        );
        assert_eq!(
            fixture
                .call(names::GET_UP_DIRECTION, vec![Value::Vector(position), none.clone()])
                .unwrap(),
            Value::Vector(DVec3::Y)
        );
        assert_eq!(
            fixture
                .call(
                    names::GET_BUOYANCY_MULTIPLIER,
                    vec![
                        Value::Vector(position),
                        Value::SizeClass(crate::water::BodySizeClass::Large),
                        none.clone()
                    ]
                )
                .unwrap(),
            Value::Float(0.0)
        );
        assert_eq!(
            fixture
                .call(
                    names::SPHERE_INTERSECTS_WATER,
                    vec![Value::Sphere(crate::water::Sphere::new(position, 1.0)), none]
                )
                .unwrap(),
            Value::Int(0)
        );
        assert_eq!(
            fixture
                .call(names::GET_CLOSEST_WATER, vec![Value::Vector(position)])
                .unwrap(),
            Value::OptBodyId(None)
        );
    }

    #[test]
    fn body_zero_is_a_real_id() {
        let mut fixture = Fixture::new(vec![
            WaterBody::calm(BodyId(0), DVec3::ZERO, 600.0),
            WaterBody::calm(BodyId(9), DVec3::new(10_000.0, 0.0, 0.0), 600.0),
        ]);
        let near_nine = DVec3::new(10_000.0, 0.0, 100.0);

        // The explicit id wins over proximity.
        assert_eq!(
            fixture
                .call(
                    names::IS_UNDERWATER,
                    vec![Value::Vector(near_nine), Value::OptBodyId(Some(BodyId(0)))]
                )
                .unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            fixture
                .call(
                    names::IS_UNDERWATER,
                    vec![Value::Vector(near_nine), Value::OptBodyId(None)]
                )
                .unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn explicit_missing_id_is_not_found() {
        let mut fixture = Fixture::new(vec![WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0)]);

        assert!(matches!(
            fixture.call(
                names::GET_DEPTH,
                vec![Value::Vector(DVec3::ZERO), Value::OptBodyId(Some(BodyId(4)))]
            ),
            Err(WaterError::NotFound(BodyId(4)))
        ));
        assert!(matches!(
            fixture.call(names::GET_CRUSH_DEPTH, vec![Value::BodyId(BodyId(4))]),
            Err(WaterError::NotFound(BodyId(4)))
        ));
        assert_eq!(
            fixture
                .call(names::HAS_WATER, vec![Value::BodyId(BodyId(4))])
                .unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn list_results_keep_input_order() {
        let mut fixture = Fixture::new(vec![WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0)]);
        let wet = DVec3::new(0.0, 100.0, 0.0);
        let dry = DVec3::new(0.0, 900.0, 0.0);
        let lines = vec![
            crate::water::Line::new(dry, dry),
            crate::water::Line::new(wet, dry),
            crate::water::Line::new(dry, wet),
            crate::water::Line::new(wet, wet),
        ];

        assert_eq!(
            fixture
                .call(
                    names::LINE_INTERSECTS_WATER_LIST,
                    vec![Value::Lines(lines), Value::OptBodyId(None)]
                )
                .unwrap(),
            Value::Ints(vec![0, 1, 2, 3])
        );

        let points = vec![DVec3::new(0.0, 0.0, 50.0), DVec3::new(700.0, 0.0, 0.0)];
        assert_eq!(
            fixture
                .call(
                    names::GET_CLOSEST_SURFACE_POINT_LIST,
                    vec![Value::Vectors(points), Value::OptBodyId(None)]
                )
                .unwrap(),
            Value::Vectors(vec![DVec3::new(0.0, 0.0, 600.0), DVec3::new(600.0, 0.0, 0.0)])
        );
    }

    #[test]
    fn effects_are_forwarded_to_host() {
        let mut fixture = Fixture::new(vec![]);
        let at = DVec3::new(1.0, 2.0, 3.0);
        fixture
            .call(
                names::CREATE_SPLASH,
                vec![Value::Vector(at), Value::Float(2.5), Value::Bool(true)],
            )
            .unwrap();
        fixture
            .call(names::RUN_COMMAND, vec![Value::Text("/water reload".into())])
            .unwrap();

        assert_eq!(
            fixture.host.actions(),
            &[
                HostAction::Splash {
                    position: at,
                    radius: 2.5,
                    audible: true
                },
                HostAction::RunCommand("/water reload".into()),
            ]
        );
    }

    #[test]
    fn force_sync_sends_to_peers_from_authority() {
        let mut fixture = Fixture::new(vec![WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0)]);
        assert_eq!(fixture.call(names::FORCE_SYNC, vec![]).unwrap(), Value::Unit);
        assert!(matches!(
            fixture.host.actions(),
            [HostAction::Snapshot { target: crate::host::SyncTarget::Peers, .. }]
        ));
    }
}
