use crate::{
    network::dispatcher::{self, setup_resources_and_events},
    world::{
        load_from_file::{build_registry, load_water_state, load_world_config},
        PlanetCatalog,
    },
};
use bevy::{
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    prelude::*,
};
use bevy_app::ScheduleRunnerPlugin;
use bevy_log::info;
use bevy_renet::{netcode::NetcodeServerTransport, RenetServerPlugin};
use bevy_renet::{
    netcode::{NetcodeServerPlugin, ServerAuthentication, ServerConfig},
    renet::RenetServer,
};
use shared::{
    constants::{NETCODE_SERVER_TRANSPORT_ERROR, SOCKET_LOCAL_ADDR_ERROR, UNIX_EPOCH_TIME_ERROR},
    get_shared_renet_config, GameFolderPaths, WaterServerConfig,
};
use std::error::Error;
use std::net::IpAddr;
use std::time::{Duration, SystemTime};

use std::net::{SocketAddr, UdpSocket};

pub fn acquire_socket_by_port(ip: IpAddr, port: u16) -> std::io::Result<UdpSocket> {
    let addr = SocketAddr::new(ip, port);
    UdpSocket::bind(addr)
}

fn context_error(context: &str, err: impl std::fmt::Display) -> Box<dyn Error> {
    format!("{context}: {err}").into()
}

pub fn add_netcode_network(app: &mut App, socket: UdpSocket) -> Result<(), Box<dyn Error>> {
    app.add_plugins(NetcodeServerPlugin);

    let server = RenetServer::new(get_shared_renet_config());

    let granted_addr = socket
        .local_addr()
        .map_err(|err| context_error(SOCKET_LOCAL_ADDR_ERROR, err))?;

    let current_time: Duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|err| context_error(UNIX_EPOCH_TIME_ERROR, err))?;
    let server_config = ServerConfig {
        current_time,
        max_clients: 64,
        protocol_id: shared::PROTOCOL_ID,
        public_addresses: vec![granted_addr],
        authentication: ServerAuthentication::Unsecure,
    };

    let transport = NetcodeServerTransport::new(server_config, socket)
        .map_err(|err| context_error(NETCODE_SERVER_TRANSPORT_ERROR, err))?;
    app.insert_resource(server);
    app.insert_resource(transport);
    Ok(())
}

pub fn init(
    socket: UdpSocket,
    config: WaterServerConfig,
    game_folder_paths: GameFolderPaths,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new();
    let tick_rate = config.tick_rate.max(1);
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / tick_rate as f64,
        ))),
    );
    app.insert_resource(Time::<Fixed>::from_hz(tick_rate as f64));

    app.add_plugins(RenetServerPlugin);
    app.add_plugins(FrameTimeDiagnosticsPlugin::default());
    app.add_plugins(LogDiagnosticsPlugin::default());
    app.add_plugins(bevy_log::LogPlugin::default());

    let world_name = config.world_name.clone();

    info!(
        "Starting water authority for world '{}' on {}",
        world_name,
        socket
            .local_addr()
            .map_err(|err| context_error(SOCKET_LOCAL_ADDR_ERROR, err))?
    );

    add_netcode_network(&mut app, socket)?;

    setup_resources_and_events(&mut app);

    let world_config = load_world_config(&world_name, &game_folder_paths)
        .map_err(|err| context_error(&format!("Failed to load water world {world_name}"), err))?;
    let state = load_water_state(&world_name, &game_folder_paths)
        .map_err(|err| context_error(&format!("Failed to load water state {world_name}"), err))?;
    let registry = build_registry(&world_config, state);
    info!("Loaded {} water bodies", registry.len());

    app.insert_resource(PlanetCatalog {
        planets: world_config.planet_infos(),
    });
    app.insert_resource(registry);
    app.insert_resource(game_folder_paths);
    app.insert_resource(config);

    dispatcher::register_systems(&mut app);

    app.run();
    Ok(())
}
