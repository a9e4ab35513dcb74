use std::net::Ipv4Addr;

use clap::Parser;
use server::init::{self, acquire_socket_by_port};
use shared::constants::SOCKET_BIND_ERROR;
use shared::{get_game_folder_paths, WaterServerConfig, TICKS_PER_SECOND};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    #[arg(short, long, default_value = "default")]
    world: String,

    #[arg(short, long)]
    game_folder_path: Option<String>,

    #[arg(short, long, default_value_t = TICKS_PER_SECOND)]
    tick_rate: u64,
}

fn main() {
    let args = Args::parse();

    if args.tick_rate < 1 || args.tick_rate > 240 {
        eprintln!("Error: tick_rate must be between 1 and 240 (inclusive).");
        eprintln!("Got: {}", args.tick_rate);
        std::process::exit(1);
    }

    let socket = match acquire_socket_by_port(std::net::IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), args.port) {
        Ok(socket) => socket,
        Err(err) => {
            eprintln!("{}: {err}", SOCKET_BIND_ERROR);
            std::process::exit(1);
        }
    };

    if let Err(err) = init::init(
        socket,
        WaterServerConfig {
            world_name: args.world,
            tick_rate: args.tick_rate,
        },
        get_game_folder_paths(args.game_folder_path),
    ) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
