use std::io::{BufRead, BufReader, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{error, info, warn};

use restrict_core::{load_restrict_config_from_env, CommandReply, RestrictEngine};
use restrict_runtime::{parse_command_line, CommandPayload};

const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 41010);

/// One parsed line waiting for the engine loop, plus where to send the answer.
struct Request {
    payload: CommandPayload,
    reply: Sender<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let bind_addr = match std::env::var("WEAPON_RESTRICT_BIND") {
        Ok(value) => match value.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                error!(value = %value, error = %err, "invalid WEAPON_RESTRICT_BIND");
                std::process::exit(2);
            }
        },
        Err(_) => DEFAULT_BIND,
    };

    let (config, metadata) = load_restrict_config_from_env();
    let mut engine = RestrictEngine::with_metadata(config, metadata);

    let requests = match spawn_command_listener(bind_addr) {
        Ok(requests) => requests,
        Err(err) => {
            error!(bind = %bind_addr, error = %err, "command listener bind failed");
            std::process::exit(1);
        }
    };

    info!(
        target: "weapon_restrict::server",
        bind = %bind_addr,
        restricted = engine.restricted().len(),
        vip_flag = engine.vip_flag(),
        "weapon restrict server ready"
    );

    // Every client funnels into this loop, so the engine sees one event at a time.
    while let Ok(request) = requests.recv() {
        let line = match engine.apply_command(request.payload) {
            Ok(CommandReply::Text { message }) => message,
            Ok(reply @ CommandReply::Acquire(_)) => {
                serde_json::to_string(&reply).unwrap_or_else(|err| format!("error: {err}"))
            }
            Err(err) => {
                warn!(target: "weapon_restrict::server", error = %err, "command.failed");
                format!("error: {err}")
            }
        };
        let _ = request.reply.send(line);
    }
}

fn spawn_command_listener(bind_addr: SocketAddr) -> std::io::Result<Receiver<Request>> {
    let listener = TcpListener::bind(bind_addr)?;
    listener.set_nonblocking(true)?;

    let (sender, receiver) = unbounded::<Request>();
    thread::spawn(move || loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!(target: "weapon_restrict::server", %addr, "client connected");
                let sender = sender.clone();
                thread::spawn(move || handle_client(stream, sender));
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                warn!("Error accepting command client: {}", err);
                thread::sleep(Duration::from_millis(200));
            }
        }
    });

    Ok(receiver)
}

fn handle_client(stream: TcpStream, sender: Sender<Request>) {
    if let Err(err) = stream.set_nonblocking(false) {
        warn!("set_nonblocking(false) failed for command client: {}", err);
        return;
    }
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            warn!("Failed to clone command stream: {}", err);
            return;
        }
    };
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let response = match parse_command_line(trimmed) {
                    Ok(payload) => {
                        let (reply_tx, reply_rx) = bounded(1);
                        let request = Request {
                            payload,
                            reply: reply_tx,
                        };
                        if sender.send(request).is_err() {
                            break;
                        }
                        match reply_rx.recv() {
                            Ok(response) => response,
                            Err(_) => break,
                        }
                    }
                    Err(err) => {
                        warn!(target: "weapon_restrict::server", input = %trimmed, error = %err, "command.rejected");
                        format!("error: {err}")
                    }
                };
                if writeln!(writer, "{response}").is_err() {
                    break;
                }
            }
            Err(err) => {
                warn!("Command read error: {}", err);
                break;
            }
        }
    }
}
