//! Test harness for driving a sender/receiver pair by hand
//!
//! Unlike the emulator, nothing is delivered automatically: tests pick up
//! the packets each side transmitted and decide which copies reach the peer,
//! in what order, and when the sender's timer fires.

use sr_protocol::{
    AckOutcome, Action, Message, Packet, ProtocolConfig, ReceiveOutcome, Receiver, Recorder,
    SendError, SeqNumber, Sender, PAYLOAD_SIZE,
};

/// A sender and receiver with manually carried packets
pub struct Harness {
    pub sender: Sender,
    pub receiver: Receiver,
    sender_ctx: Recorder,
    receiver_ctx: Recorder,
    data_in_flight: Vec<Packet>,
    acks_in_flight: Vec<Packet>,
    delivered: Vec<Message>,
    timer_starts: usize,
    timer_stops: usize,
}

impl Harness {
    pub fn new(config: &ProtocolConfig) -> Self {
        Harness {
            sender: Sender::new(config).expect("valid protocol config"),
            receiver: Receiver::new(config).expect("valid protocol config"),
            sender_ctx: Recorder::new(),
            receiver_ctx: Recorder::new(),
            data_in_flight: Vec::new(),
            acks_in_flight: Vec::new(),
            delivered: Vec::new(),
            timer_starts: 0,
            timer_stops: 0,
        }
    }

    /// Harness with `WINDOWSIZE = 6`, `MAX_SEQ = 16`
    pub fn with_defaults() -> Self {
        Harness::new(&ProtocolConfig::default())
    }

    fn collect_sender(&mut self) {
        for action in self.sender_ctx.drain() {
            match action {
                Action::Transmit(packet) => self.data_in_flight.push(packet),
                Action::StartTimer(_) => self.timer_starts += 1,
                Action::StopTimer => self.timer_stops += 1,
                Action::Deliver(_) => panic!("sender delivered a payload"),
            }
        }
    }

    fn collect_receiver(&mut self) {
        for action in self.receiver_ctx.drain() {
            match action {
                Action::Transmit(packet) => self.acks_in_flight.push(packet),
                Action::Deliver(message) => self.delivered.push(message),
                Action::StartTimer(_) | Action::StopTimer => {
                    panic!("receiver touched a timer")
                }
            }
        }
    }

    /// Hand a message to the sender
    pub fn admit(&mut self, message: Message) -> Result<SeqNumber, SendError> {
        let result = self.sender.admit(&mut self.sender_ctx, &message);
        self.collect_sender();
        result
    }

    /// Take every data packet the sender has transmitted since the last call
    pub fn take_data(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.data_in_flight)
    }

    /// Take every ack the receiver has transmitted since the last call
    pub fn take_acks(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.acks_in_flight)
    }

    /// Deliver a data packet to the receiver
    pub fn to_receiver(&mut self, packet: &Packet) -> ReceiveOutcome {
        let outcome = self.receiver.on_packet(&mut self.receiver_ctx, packet);
        self.collect_receiver();
        outcome
    }

    /// Deliver an ack to the sender
    pub fn to_sender(&mut self, packet: &Packet) -> AckOutcome {
        let outcome = self.sender.on_ack(&mut self.sender_ctx, packet);
        self.collect_sender();
        outcome
    }

    /// Fire the sender's timer, returning the retransmitted packets
    pub fn fire_timer(&mut self) -> Vec<Packet> {
        let before = self.data_in_flight.len();
        self.sender.on_timeout(&mut self.sender_ctx);
        self.collect_sender();
        self.data_in_flight[before..].to_vec()
    }

    /// Payloads delivered to the receiving application so far
    pub fn delivered(&self) -> &[Message] {
        &self.delivered
    }

    /// Number of timer arms and disarms requested by the sender
    pub fn timer_calls(&self) -> (usize, usize) {
        (self.timer_starts, self.timer_stops)
    }
}

/// Distinct payload for message `i`
pub fn message(i: usize) -> Message {
    let mut data = [b'.'; PAYLOAD_SIZE];
    let label = format!("msg-{:06}", i);
    let len = label.len().min(PAYLOAD_SIZE);
    data[..len].copy_from_slice(&label.as_bytes()[..len]);
    Message::new(data)
}
