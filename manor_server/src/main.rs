mod config;
mod seats;
mod transport;

use crate::{
    config::{ServerConfig, USAGE},
    seats::SeatMap,
    transport::{ChannelTransport, Outgoing},
};
use log::{debug, error, info, warn};
use manor_core::{
    board::ClassicBoard,
    deck::DeckConfig,
    engine::{Engine, HostEngine},
    game_state::PlayerId,
    packet::{ToClient, ToServer},
};
use renet::{
    transport::{NetcodeServerTransport, NetcodeTransportError, ServerAuthentication},
    ClientId, ConnectionConfig, DefaultChannel, RenetServer, ServerEvent,
};
use std::{
    io,
    net::{SocketAddr, UdpSocket},
    time::{Duration, Instant, SystemTime, SystemTimeError},
};
use thiserror::Error;
use tokio::{
    signal,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    time,
};

#[derive(Debug, Error)]
enum ServerError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("clock error: {0}")]
    Clock(#[from] SystemTimeError),
    #[error("transport error: {0}")]
    Transport(#[from] NetcodeTransportError),
}

enum Inbound {
    Packet(PlayerId, ToServer),
    Left(PlayerId),
    ShutDown,
}

async fn run_engine(
    deck: DeckConfig,
    mut inbound: UnboundedReceiver<Inbound>,
    outgoing: UnboundedSender<Outgoing>,
) {
    let mut engine = HostEngine::new(ChannelTransport::new(outgoing), ClassicBoard, deck);
    while let Some(event) = inbound.recv().await {
        match event {
            Inbound::Packet(player_id, packet) => engine.dispatch((player_id, packet)),
            Inbound::Left(player_id) => {
                if let Err(e) = engine.remove_player(player_id) {
                    debug!(target: "engine", "Seat {} left: {}", player_id, e);
                }
            }
            Inbound::ShutDown => {
                engine.shut_down();
                break;
            }
        }
    }
}

fn deliver(
    server: &mut RenetServer,
    seats: &SeatMap<ClientId>,
    player_id: PlayerId,
    packet: &ToClient,
) {
    match seats.client(player_id) {
        Some(client_id) => {
            server.send_message(client_id, DefaultChannel::ReliableOrdered, packet.encode())
        }
        None => warn!(
            target: "network",
            "Seat {} is empty, dropped {}",
            player_id,
            packet.message_id()
        ),
    }
}

async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let public_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let mut server = RenetServer::new(ConnectionConfig::default());

    let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let server_config = renet::transport::ServerConfig {
        current_time,
        max_clients: config.max_clients,
        protocol_id: config.protocol_id,
        public_addresses: vec![public_addr],
        authentication: ServerAuthentication::Unsecure,
    };
    let socket = UdpSocket::bind(public_addr)?;
    let mut transport = NetcodeServerTransport::new(server_config, socket)?;
    info!(target: "network", "Hosting on {}", public_addr);

    let (inbound_tx, inbound_rx) = unbounded_channel();
    let (outgoing_tx, mut outgoing_rx) = unbounded_channel();
    let engine = tokio::spawn(run_engine(config.deck.clone(), inbound_rx, outgoing_tx));

    let mut seats = SeatMap::new(config.max_clients);
    let mut interval = time::interval(Duration::from_millis(50));
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut is_shutting_down = false;
    let mut last_updated = Instant::now();

    loop {
        let now = Instant::now();
        let duration = now - last_updated;
        last_updated = now;

        server.update(duration);
        transport.update(duration, &mut server)?;

        while let Some(event) = server.get_event() {
            match event {
                ServerEvent::ClientConnected { client_id } => match seats.assign(client_id) {
                    Some(seat) => {
                        info!(target: "network", "Client {} connected to seat {}", client_id, seat)
                    }
                    None if seats.is_sealed() => {
                        warn!(target: "network", "Game in progress, turned away client {}", client_id);
                        server.disconnect(client_id);
                    }
                    None => {
                        warn!(target: "network", "No free seat for client {}", client_id);
                        server.disconnect(client_id);
                    }
                },
                ServerEvent::ClientDisconnected { client_id, reason } => {
                    info!(target: "network", "Client {} disconnected: {}", client_id, reason);
                    if let Some(seat) = seats.release(client_id) {
                        let _ = inbound_tx.send(Inbound::Left(seat));
                    }
                }
            }
        }

        for client_id in server.clients_id() {
            let Some(seat) = seats.seat(client_id) else {
                continue;
            };
            while let Some(message) =
                server.receive_message(client_id, DefaultChannel::ReliableOrdered)
            {
                match ToServer::decode(&message) {
                    Ok(packet) => {
                        let _ = inbound_tx.send(Inbound::Packet(seat, packet));
                    }
                    Err(e) => warn!(target: "network", "Dropped a packet from seat {}: {}", seat, e),
                }
            }
        }

        let mut is_closed = false;
        let mut turned_away = vec![];
        while let Ok(outgoing) = outgoing_rx.try_recv() {
            match outgoing {
                Outgoing::To(player_id, packet) => {
                    deliver(&mut server, &seats, player_id, &packet);
                    turned_away.extend(seats.on_reply(player_id, &packet));
                }
                Outgoing::Broadcast(audience, packet) => {
                    for (player_id, client_id) in seats.iter() {
                        if audience.includes(player_id) {
                            server.send_message(
                                client_id,
                                DefaultChannel::ReliableOrdered,
                                packet.encode(),
                            );
                        }
                    }
                }
                Outgoing::ShutDown => is_closed = true,
            }
        }
        transport.send_packets(&mut server);
        for client_id in turned_away {
            info!(target: "network", "Dropping turned away client {}", client_id);
            server.disconnect(client_id);
        }

        if is_closed {
            transport.disconnect_all(&mut server);
            break;
        }

        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown, if !is_shutting_down => {
                info!(target: "network", "Shutting down");
                is_shutting_down = true;
                if inbound_tx.send(Inbound::ShutDown).is_err() {
                    break;
                }
            }
        }
    }

    if let Err(e) = engine.await {
        error!(target: "engine", "Engine task failed: {}", e);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let config = match ServerConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            println!("{}", USAGE);
            return;
        }
    };

    if let Err(e) = serve(config).await {
        error!(target: "network", "{}", e);
    }
}
