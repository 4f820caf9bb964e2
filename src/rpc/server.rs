//! Line-delimited JSON over TCP.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::store::PositionStore;

use super::dispatch::Dispatcher;

/// TCP front end for a [`Dispatcher`].
///
/// Each connection gets its own thread; calls still run one at a time
/// through the dispatcher's lock.
pub struct Server<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<STEP, DIR, MS, DELAY, S>>,
    stop: Arc<AtomicBool>,
}

impl<STEP, DIR, MS, DELAY, S> Server<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin + Send + 'static,
    DIR: OutputPin + Send + 'static,
    MS: OutputPin + Send + 'static,
    DELAY: DelayNs + Send + 'static,
    S: PositionStore + Send + 'static,
{
    /// Bind the listener.
    pub fn bind<A: ToSocketAddrs>(addr: A, dispatcher: Arc<Dispatcher<STEP, DIR, MS, DELAY, S>>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            dispatcher,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until a client sends `terminate`.
    pub fn run(self) -> io::Result<()> {
        let wake = wake_addr(self.listener.local_addr()?);
        log::info!("listening on {}", self.listener.local_addr()?);

        for stream in self.listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("accept failed: {}", e);
                    continue;
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let stop = Arc::clone(&self.stop);
            thread::spawn(move || {
                let peer = stream
                    .peer_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                log::info!("client {} connected", peer);
                match serve_connection(stream, &dispatcher) {
                    Ok(true) => {
                        stop.store(true, Ordering::SeqCst);
                        // Unblock the accept loop so it sees the flag.
                        let _ = TcpStream::connect(wake);
                    }
                    Ok(false) => {}
                    Err(e) => log::warn!("client {}: {}", peer, e),
                }
                log::info!("client {} disconnected", peer);
            });
        }

        log::info!("server stopped");
        Ok(())
    }
}

/// Serve one client. Returns `true` if it asked to terminate.
fn serve_connection<STEP, DIR, MS, DELAY, S>(
    stream: TcpStream,
    dispatcher: &Dispatcher<STEP, DIR, MS, DELAY, S>,
) -> io::Result<bool>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (reply, terminate) = dispatcher.handle_line(&line);
        writer.write_all(reply.to_line().as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        if terminate {
            return Ok(true);
        }
    }
    Ok(false)
}

fn wake_addr(bound: SocketAddr) -> SocketAddr {
    match bound.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), bound.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), bound.port()),
        _ => bound,
    }
}
