mod cli_view;
mod console;
mod link;

use std::{
    io,
    net::{SocketAddr, UdpSocket},
    sync::mpsc::Receiver,
    thread,
    time::{Duration, Instant, SystemTime, SystemTimeError},
};

use cli_view::CliView;
use console::{Command, HELP};
use link::OutboundQueue;
use log::{error, info, warn};
use manor_core::{
    card::ClueCard,
    deck::DeckConfig,
    engine::{Engine, GuestEngine},
    packet::ToClient,
};
use renet::{
    transport::{ClientAuthentication, NetcodeClientTransport, NetcodeError, NetcodeTransportError},
    ConnectionConfig, DefaultChannel, RenetClient,
};
use thiserror::Error;

static USAGE: &str = "Usage: manor_ui_cli SERVER_ADDR NAME [PROTOCOL_ID]";

#[derive(Debug, Error)]
enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("clock error: {0}")]
    Clock(#[from] SystemTimeError),
    #[error("netcode error: {0}")]
    Netcode(#[from] NetcodeError),
    #[error("transport error: {0}")]
    Transport(#[from] NetcodeTransportError),
}

type CliEngine = GuestEngine<OutboundQueue, CliView>;

fn print_hand(engine: &CliEngine) {
    let Some(me) = engine.my_player() else {
        println!("You are not seated yet");
        return;
    };
    let names: Vec<String> = me.cards.iter().map(ClueCard::to_string).collect();
    println!("You are in the {}. Your cards: {}", me.current_room, names.join(", "));
}

fn handle_commands(engine: &mut CliEngine, commands: &Receiver<String>) {
    while let Ok(line) = commands.try_recv() {
        match line.parse::<Command>() {
            Ok(Command::Quit) => engine.shut_down(),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Cards) => print_hand(engine),
            Ok(command) => {
                if let Err(e) = command.apply(engine) {
                    println!("Cannot do that: {}", e);
                }
            }
            Err(e) => println!("{}", e),
        }
    }
}

fn run(server_addr: SocketAddr, name: &str, protocol_id: u64) -> Result<(), ClientError> {
    let mut client = RenetClient::new(ConnectionConfig::default());
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let authentication = ClientAuthentication::Unsecure {
        server_addr,
        client_id: current_time.as_millis() as u64,
        user_data: None,
        protocol_id,
    };
    let mut transport = NetcodeClientTransport::new(current_time, authentication, socket)?;

    let commands = console::spawn_reader();
    let mut engine = GuestEngine::new(OutboundQueue::default(), CliView::new(name), DeckConfig::standard());
    let mut has_requested_seat = false;
    let mut last_updated = Instant::now();
    println!("{}", HELP);

    loop {
        let now = Instant::now();
        let duration = now - last_updated;
        last_updated = now;

        client.update(duration);
        transport.update(duration, &mut client)?;

        if client.is_connected() {
            if !has_requested_seat {
                engine.request_connect(name);
                has_requested_seat = true;
            }
            while let Some(message) = client.receive_message(DefaultChannel::ReliableOrdered) {
                match ToClient::decode(&message) {
                    Ok(packet) => engine.dispatch(packet),
                    Err(e) => warn!(target: "network", "Dropped a packet from the host: {}", e),
                }
            }
            handle_commands(&mut engine, &commands);
        }

        for frame in engine.link_mut().drain() {
            client.send_message(DefaultChannel::ReliableOrdered, frame);
        }
        transport.send_packets(&mut client)?;

        if engine.link().is_closed() {
            transport.disconnect();
            break;
        }
        if client.is_disconnected() {
            info!(target: "network", "Lost the host: {:?}", client.disconnect_reason());
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("{}", USAGE);
        return;
    }
    let server_addr: SocketAddr = match args[1].parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("{:?} is not an address: {}", args[1], e);
            println!("{}", USAGE);
            return;
        }
    };
    let protocol_id = match args.get(3).map(|id| id.parse::<u64>()) {
        None => 0,
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            error!("{:?} is not a protocol id: {}", args[3], e);
            return;
        }
    };

    if let Err(e) = run(server_addr, &args[2], protocol_id) {
        error!(target: "network", "{}", e);
    }
}
