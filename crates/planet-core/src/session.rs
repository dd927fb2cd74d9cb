//! Update session - drives the lamp through the download protocol.
//!
//! The exchange is strictly request/acknowledge: every frame waits for the
//! lamp's answer before the next one goes out, and the first unexpected
//! answer ends the session.

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::events::{ChannelObserver, TracingObserver, UpdateEvent, UpdateObserver, UpdatePhase};
use crate::payload::{PacketIterator, completion_packet, packet_count};
use crate::protocol::constants::{GREETING, MAX_SEQUENCE, REPLY_DOWNLOAD_MODE, REPLY_PACKET_OK};
use crate::protocol::{Frame, Reply};
use crate::transport::{LampTransport, TcpTransport};

/// Update session - flashes one firmware image onto one lamp.
pub struct UpdateSession<O: UpdateObserver> {
    config: UpdateConfig,
    observer: Arc<O>,
}

impl UpdateSession<TracingObserver> {
    /// Create a new session with default tracing observer.
    pub fn new(config: UpdateConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }
}

impl<O: UpdateObserver> UpdateSession<O> {
    /// Create a new session with a custom observer.
    pub fn with_observer(config: UpdateConfig, observer: Arc<O>) -> Self {
        Self { config, observer }
    }

    /// Resolve, connect and upload `firmware`.
    ///
    /// Returns the wall-clock time the whole update took.
    #[instrument(skip(self, firmware), fields(dest = %self.config.destination, port = self.config.port, size = firmware.len()))]
    pub fn run(&self, firmware: &[u8]) -> Result<Duration, UpdateError> {
        let started = Instant::now();
        check_size(firmware)?;

        self.emit(UpdateEvent::Resolving);
        let addr = self.resolve()?;

        self.emit(UpdateEvent::Connecting {
            address: addr.to_string(),
        });
        let transport = TcpTransport::connect(
            addr,
            self.config.connect_timeout(),
            self.config.read_timeout(),
        )
        .map_err(|source| UpdateError::Connection {
            address: addr.to_string(),
            source,
        })?;

        self.drive(transport, firmware, started)
    }

    /// Upload `firmware` over an already open transport, starting at the
    /// handshake.
    #[instrument(skip_all, fields(peer = %transport.peer(), size = firmware.len()))]
    pub fn run_on<T: LampTransport>(
        &self,
        transport: T,
        firmware: &[u8],
    ) -> Result<Duration, UpdateError> {
        let started = Instant::now();
        check_size(firmware)?;
        self.drive(transport, firmware, started)
    }

    fn emit(&self, event: UpdateEvent) {
        self.observer.on_event(&event);
    }

    fn resolve(&self) -> Result<SocketAddr, UpdateError> {
        let destination = self.config.destination.as_str();
        let resolution_error = |source| UpdateError::AddressResolution {
            destination: destination.to_string(),
            source,
        };

        let addr = (destination, self.config.port)
            .to_socket_addrs()
            .map_err(resolution_error)?
            .next()
            .ok_or_else(|| {
                resolution_error(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses found",
                ))
            })?;

        debug!(dest = %destination, resolved = %addr, "Destination resolved");
        Ok(addr)
    }

    /// Protocol state machine. The transport is owned here so the connection
    /// is released however the session ends.
    fn drive<T: LampTransport>(
        &self,
        mut transport: T,
        firmware: &[u8],
        started: Instant,
    ) -> Result<Duration, UpdateError> {
        self.emit(UpdateEvent::Handshaking);
        let greeting = transport
            .read_exact(GREETING.len())
            .map_err(|e| UpdateError::from_transport(UpdatePhase::Handshaking, e))?;
        expect(
            UpdatePhase::Handshaking,
            &Reply::from_bytes(&greeting),
            GREETING,
        )?;
        info!("Greeting received");

        self.emit(UpdateEvent::RequestingDownloadMode);
        exchange(
            &mut transport,
            UpdatePhase::RequestingDownloadMode,
            &Frame::Program,
            REPLY_DOWNLOAD_MODE,
        )?;
        info!("Lamp in download mode");

        self.emit(UpdateEvent::SendingHeader);
        exchange(
            &mut transport,
            UpdatePhase::SendingHeader,
            &Frame::SendHeader,
            REPLY_PACKET_OK,
        )?;

        let packets = PacketIterator::new(firmware);
        let total = packets.total();
        self.emit(UpdateEvent::UploadingPackets { total });
        info!(packets = total, "Uploading firmware");

        for (index, payload) in packets.enumerate() {
            let seq = index + 1;
            exchange(
                &mut transport,
                UpdatePhase::UploadingPackets,
                &Frame::Packet {
                    seq,
                    payload: &payload,
                },
                REPLY_PACKET_OK,
            )?;
            self.emit(UpdateEvent::PacketAcknowledged { seq, total });
        }

        self.emit(UpdateEvent::SendingCompletionSignature);
        let signature = completion_packet();
        send(
            &mut transport,
            UpdatePhase::SendingCompletionSignature,
            &Frame::Packet {
                seq: total + 1,
                payload: &signature,
            },
        )?;

        self.emit(UpdateEvent::AwaitingFeedback);
        let reply = read_line(&mut transport, UpdatePhase::AwaitingFeedback)?;
        expect(
            UpdatePhase::AwaitingFeedback,
            &reply,
            REPLY_PACKET_OK.as_bytes(),
        )?;

        transport
            .close()
            .map_err(|e| UpdateError::from_transport(UpdatePhase::Completed, e))?;
        drop(transport);

        let elapsed = started.elapsed();
        info!(time = ?elapsed, "Update completed");
        self.emit(UpdateEvent::Completed { elapsed });
        Ok(elapsed)
    }
}

/// Reject images whose packets (plus the terminator) overflow the
/// sequence field.
fn check_size(firmware: &[u8]) -> Result<(), UpdateError> {
    let packets = packet_count(firmware.len());
    if packets + 1 > MAX_SEQUENCE {
        return Err(UpdateError::FirmwareTooLarge { packets });
    }
    Ok(())
}

fn send<T: LampTransport>(
    transport: &mut T,
    phase: UpdatePhase,
    frame: &Frame<'_>,
) -> Result<(), UpdateError> {
    transport
        .write(&frame.to_bytes())
        .map_err(|e| UpdateError::from_transport(phase, e))?;
    debug!(frame = %frame, "Frame sent");
    Ok(())
}

fn read_line<T: LampTransport>(transport: &mut T, phase: UpdatePhase) -> Result<Reply, UpdateError> {
    let reply = transport
        .read_line()
        .map_err(|e| UpdateError::from_transport(phase, e))?;
    debug!(reply = %reply, "Reply received");
    Ok(reply)
}

/// Send one frame and require `expected` as the answer.
fn exchange<T: LampTransport>(
    transport: &mut T,
    phase: UpdatePhase,
    frame: &Frame<'_>,
    expected: &str,
) -> Result<(), UpdateError> {
    send(transport, phase, frame)?;
    let reply = read_line(transport, phase)?;
    expect(phase, &reply, expected.as_bytes())
}

fn expect(phase: UpdatePhase, reply: &Reply, expected: &[u8]) -> Result<(), UpdateError> {
    if reply.matches(expected) {
        return Ok(());
    }
    Err(UpdateError::InvalidResponse {
        phase,
        expected: String::from_utf8_lossy(expected).into_owned(),
        received: reply.as_ascii(),
    })
}

/// Handle to a session running on a background thread.
///
/// Events arrive in order on [`UpdateHandle::events`]; the stream ends when
/// the session finishes, whatever the outcome. [`UpdateHandle::wait`] tells
/// which outcome it was.
pub struct UpdateHandle {
    events: Receiver<UpdateEvent>,
    thread: JoinHandle<Result<Duration, UpdateError>>,
}

impl UpdateHandle {
    /// Blocking iterator over the session's events.
    pub fn events(&self) -> mpsc::Iter<'_, UpdateEvent> {
        self.events.iter()
    }

    /// Wait for the session to end and return its result.
    pub fn wait(self) -> Result<Duration, UpdateError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Run an update on a background thread, reporting progress over a channel.
pub fn spawn_update(config: UpdateConfig, firmware: Vec<u8>) -> UpdateHandle {
    let (sender, events) = mpsc::channel();
    let thread = thread::spawn(move || {
        let session = UpdateSession::with_observer(config, Arc::new(ChannelObserver::new(sender)));
        session.run(&firmware)
    });
    UpdateHandle { events, thread }
}
