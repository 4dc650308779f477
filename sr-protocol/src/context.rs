//! Boundary between a protocol role and its environment
//!
//! The sender and receiver never perform I/O themselves. Every effect goes
//! through a [`Context`]: handing a packet to the link, arming or disarming
//! the role's single timer, and delivering a payload to the application.

use crate::packet::{Message, Packet};
use std::time::Duration;

/// Services the environment provides to one protocol role
pub trait Context {
    /// Hand a packet to the unreliable link (fire-and-forget)
    fn transmit(&mut self, packet: Packet);

    /// Arm the role's timer to fire once after `duration`
    fn start_timer(&mut self, duration: Duration);

    /// Disarm the role's timer
    fn stop_timer(&mut self);

    /// Deliver a payload to the application layer
    fn deliver(&mut self, message: Message);
}

/// An effect requested by a protocol role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Transmit(Packet),
    StartTimer(Duration),
    StopTimer,
    Deliver(Message),
}

/// Context that records every requested action in order
///
/// The emulator drains it after each event; tests inspect it directly.
#[derive(Debug, Default)]
pub struct Recorder {
    actions: Vec<Action>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions recorded so far
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Take all recorded actions, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    /// Packets transmitted, in order
    pub fn transmitted(&self) -> Vec<Packet> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Transmit(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Payloads delivered, in order
    pub fn delivered(&self) -> Vec<Message> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Deliver(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl Context for Recorder {
    fn transmit(&mut self, packet: Packet) {
        self.actions.push(Action::Transmit(packet));
    }

    fn start_timer(&mut self, duration: Duration) {
        self.actions.push(Action::StartTimer(duration));
    }

    fn stop_timer(&mut self) {
        self.actions.push(Action::StopTimer);
    }

    fn deliver(&mut self, message: Message) {
        self.actions.push(Action::Deliver(message));
    }
}
