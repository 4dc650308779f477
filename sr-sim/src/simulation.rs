//! Discrete-event driver for a sender/receiver pair
//!
//! Events are processed one at a time, in simulated-time order (ties broken
//! by scheduling order), each to completion before the next. The sender and
//! receiver only ever see their own [`Recorder`]; the driver turns recorded
//! actions into new events.

use crate::clock::{units, SimTime};
use crate::network::{Direction, DirectionStats, NetworkConfig, NetworkError};
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sr_protocol::{
    Action, ConfigError, Message, Packet, ProtocolConfig, Receiver, ReceiverStats, Recorder,
    Sender, SenderStats,
};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Simulation setup errors
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Protocol configuration error: {0}")]
    Protocol(#[from] ConfigError),

    #[error("Network configuration error: {0}")]
    Network(#[from] NetworkError),
}

/// The two protocol roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Side A, sends data and receives acks
    Sender,
    /// Side B, receives data and sends acks
    Receiver,
}

impl Role {
    #[inline]
    fn index(self) -> usize {
        match self {
            Role::Sender => 0,
            Role::Receiver => 1,
        }
    }

    #[inline]
    fn peer(self) -> Role {
        match self {
            Role::Sender => Role::Receiver,
            Role::Receiver => Role::Sender,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "A"),
            Role::Receiver => write!(f, "B"),
        }
    }
}

#[derive(Debug)]
enum EventKind {
    /// The application hands the sender a new message
    FromApplication,
    /// A frame reaches `to`
    Arrival { to: Role, frame: Bytes },
    /// The timer of `role` fires, if `generation` is still current
    Timeout { role: Role, generation: u64 },
}

#[derive(Debug)]
struct Event {
    at: SimTime,
    order: u64,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.order == other.order
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    // Reversed so that BinaryHeap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Link counters for both directions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub to_receiver: DirectionStats,
    pub to_sender: DirectionStats,
}

/// Outcome of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Messages produced by the application source
    pub generated: u64,
    /// Messages accepted by the sender, in order
    pub admitted: Vec<Message>,
    /// Messages rejected because the window was full
    pub rejected: u64,
    /// Payloads delivered to the receiving application, in order
    pub delivered: Vec<Message>,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub link: LinkStats,
    /// Simulated time of the last processed event
    pub finished_at: SimTime,
    /// Every generated message was either rejected or acknowledged
    pub completed: bool,
}

impl SimulationReport {
    /// Delivered payloads match admitted messages exactly, in order
    pub fn delivered_in_order(&self) -> bool {
        self.admitted == self.delivered
    }
}

/// A sender and receiver connected by an emulated link
pub struct Simulation {
    network: NetworkConfig,
    sender: Sender,
    receiver: Receiver,
    sender_ctx: Recorder,
    receiver_ctx: Recorder,
    rng: StdRng,
    queue: BinaryHeap<Event>,
    order: u64,
    now: SimTime,
    /// Generation of the outstanding timer per role
    timers: [Option<u64>; 2],
    timer_generation: u64,
    links: [Direction; 2],
    generated: u64,
    admitted: Vec<Message>,
    rejected: u64,
    delivered: Vec<Message>,
}

impl Simulation {
    /// Build a simulation from validated configurations
    pub fn new(protocol: &ProtocolConfig, network: NetworkConfig) -> Result<Self, SimError> {
        network.validate()?;
        let mut sender = Sender::new(protocol)?;
        let mut receiver = Receiver::new(protocol)?;
        sender.init();
        receiver.init();

        Ok(Simulation {
            rng: StdRng::seed_from_u64(network.seed),
            network,
            sender,
            receiver,
            sender_ctx: Recorder::new(),
            receiver_ctx: Recorder::new(),
            queue: BinaryHeap::new(),
            order: 0,
            now: SimTime::ZERO,
            timers: [None, None],
            timer_generation: 0,
            links: [Direction::default(), Direction::default()],
            generated: 0,
            admitted: Vec::new(),
            rejected: 0,
            delivered: Vec::new(),
        })
    }

    /// Payload of the `n`th generated message: one letter repeated
    pub fn message(n: u64) -> Message {
        Message::filled(b'a' + (n % 26) as u8)
    }

    fn schedule(&mut self, at: SimTime, kind: EventKind) {
        self.order += 1;
        self.queue.push(Event {
            at,
            order: self.order,
            kind,
        });
    }

    fn schedule_next_message(&mut self) {
        if self.generated < self.network.messages {
            let gap = units(2.0 * self.network.lambda * self.rng.gen::<f64>());
            self.schedule(self.now + gap, EventKind::FromApplication);
        }
    }

    fn is_done(&self) -> bool {
        self.generated >= self.network.messages && self.sender.in_flight() == 0
    }

    /// Run until every message has been generated and acknowledged, the
    /// event queue runs dry, or the time limit passes
    pub fn run(mut self) -> SimulationReport {
        let limit = SimTime::from_duration(units(self.network.max_time));
        tracing::info!(
            messages = self.network.messages,
            loss = self.network.loss,
            corrupt = self.network.corrupt,
            reorder = self.network.reorder,
            "simulation starting"
        );

        self.schedule_next_message();

        while !self.is_done() {
            let event = match self.queue.pop() {
                Some(event) => event,
                None => break,
            };
            if event.at > limit {
                tracing::warn!(limit = %limit, "simulation time limit reached");
                break;
            }
            self.now = event.at;
            self.handle(event.kind);
        }

        let completed = self.is_done();
        tracing::info!(
            at = %self.now,
            delivered = self.delivered.len(),
            completed,
            "simulation finished"
        );

        SimulationReport {
            generated: self.generated,
            admitted: self.admitted,
            rejected: self.rejected,
            delivered: self.delivered,
            sender: self.sender.stats().clone(),
            receiver: self.receiver.stats().clone(),
            link: LinkStats {
                to_receiver: self.links[Role::Receiver.index()].stats().clone(),
                to_sender: self.links[Role::Sender.index()].stats().clone(),
            },
            finished_at: self.now,
            completed,
        }
    }

    fn handle(&mut self, kind: EventKind) {
        match kind {
            EventKind::FromApplication => {
                let message = Simulation::message(self.generated);
                self.generated += 1;
                tracing::trace!(at = %self.now, n = self.generated, "message from application");
                match self.sender.admit(&mut self.sender_ctx, &message) {
                    Ok(_) => self.admitted.push(message),
                    Err(_) => self.rejected += 1,
                }
                self.apply(Role::Sender);
                self.schedule_next_message();
            }
            EventKind::Arrival { to, frame } => {
                let packet = match Packet::from_bytes(&frame) {
                    Ok(packet) => packet,
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping undecodable frame");
                        return;
                    }
                };
                match to {
                    Role::Sender => {
                        self.sender.on_ack(&mut self.sender_ctx, &packet);
                    }
                    Role::Receiver => {
                        self.receiver.on_packet(&mut self.receiver_ctx, &packet);
                    }
                }
                self.apply(to);
            }
            EventKind::Timeout { role, generation } => {
                if self.timers[role.index()] != Some(generation) {
                    return;
                }
                self.timers[role.index()] = None;
                tracing::trace!(at = %self.now, role = %role, "timer fired");
                if role == Role::Sender {
                    self.sender.on_timeout(&mut self.sender_ctx);
                }
                self.apply(role);
            }
        }
    }

    /// Turn the actions `role` recorded into link, timer and delivery effects
    fn apply(&mut self, role: Role) {
        let actions = match role {
            Role::Sender => self.sender_ctx.drain(),
            Role::Receiver => self.receiver_ctx.drain(),
        };

        for action in actions {
            match action {
                Action::Transmit(packet) => self.transmit(role, &packet),
                Action::StartTimer(duration) => self.start_timer(role, duration),
                Action::StopTimer => self.stop_timer(role),
                Action::Deliver(message) => self.delivered.push(message),
            }
        }
    }

    fn transmit(&mut self, from: Role, packet: &Packet) {
        let to = from.peer();
        let carried = self.links[to.index()].carry(
            &mut self.rng,
            &self.network,
            self.now,
            packet.to_bytes(),
        );
        if let Some((at, frame)) = carried {
            self.schedule(at, EventKind::Arrival { to, frame });
        }
    }

    fn start_timer(&mut self, role: Role, duration: Duration) {
        if self.timers[role.index()].is_some() {
            tracing::warn!(role = %role, "attempt to start a timer that is already started");
            return;
        }
        self.timer_generation += 1;
        let generation = self.timer_generation;
        self.timers[role.index()] = Some(generation);
        self.schedule(self.now + duration, EventKind::Timeout { role, generation });
    }

    fn stop_timer(&mut self, role: Role) {
        if self.timers[role.index()].take().is_none() {
            tracing::warn!(role = %role, "unable to cancel timer, it was not running");
        }
    }
}
