//! Property-based tests for the checksum and the sender/receiver pair
//!
//! Packets are shuffled, duplicated and dropped by a seeded RNG so that each
//! failing case shrinks to a reproducible seed.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sr_protocol::{Packet, ProtocolConfig, SendError, SeqNumber, PAYLOAD_SIZE};
use sr_tests::{message, Harness};
use std::collections::BTreeSet;

// Property test strategies

fn config_strategy() -> impl Strategy<Value = ProtocolConfig> {
    (1u32..=8, 0u32..=10).prop_map(|(window_size, extra)| ProtocolConfig {
        window_size,
        max_seq: 2 * window_size + extra,
        ..Default::default()
    })
}

fn payload_strategy() -> impl Strategy<Value = [u8; PAYLOAD_SIZE]> {
    prop::array::uniform20(any::<u8>())
}

/// Shuffle, duplicate and (optionally) drop a batch of packets
fn mangle(rng: &mut StdRng, packets: Vec<Packet>, lossy: bool) -> Vec<Packet> {
    let mut out = Vec::with_capacity(packets.len() * 2);
    for packet in packets {
        if lossy && rng.gen_bool(0.3) {
            continue;
        }
        out.push(packet);
        if rng.gen_bool(0.2) {
            out.push(packet);
        }
    }
    out.shuffle(rng);
    out
}

proptest! {
    #[test]
    fn test_checksum_accepts_fresh_packets(
        seqnum in any::<i32>(),
        acknum in any::<i32>(),
        payload in payload_strategy(),
    ) {
        let packet = Packet::new(seqnum, acknum, payload);
        prop_assert!(!packet.is_corrupted());

        let decoded = Packet::from_bytes(&packet.to_bytes()).unwrap();
        prop_assert_eq!(decoded, packet);
        prop_assert!(!decoded.is_corrupted());
    }

    #[test]
    fn test_checksum_detects_single_byte_change(
        payload in payload_strategy(),
        index in 0..PAYLOAD_SIZE,
        delta in 1u8..=255,
    ) {
        let mut packet = Packet::new(3, -1, payload);
        packet.payload[index] = packet.payload[index].wrapping_add(delta);
        prop_assert!(packet.is_corrupted());
    }

    #[test]
    fn test_checksum_detects_field_change(
        seqnum in 0i32..1000,
        acknum in -1i32..1000,
        replacement in any::<i32>(),
        field in 0usize..3,
    ) {
        let mut packet = Packet::new(seqnum, acknum, [b'q'; PAYLOAD_SIZE]);
        let target = match field {
            0 => &mut packet.seqnum,
            1 => &mut packet.acknum,
            _ => &mut packet.checksum,
        };
        prop_assume!(*target != replacement);
        *target = replacement;
        prop_assert!(packet.is_corrupted());
    }

    #[test]
    fn test_window_bound(
        config in config_strategy(),
        ops in prop::collection::vec(any::<bool>(), 1..200),
    ) {
        let mut h = Harness::new(&config);
        let mut sent = 0;

        // true admits a message, false acks the oldest outstanding packet
        for admit in ops {
            if admit {
                let before = h.sender.in_flight();
                let result = h.admit(message(sent));
                if before == config.window_size {
                    prop_assert_eq!(result, Err(SendError::WindowFull));
                    prop_assert_eq!(h.sender.in_flight(), before);
                } else {
                    prop_assert!(result.is_ok());
                    sent += 1;
                }
            } else if h.sender.in_flight() > 0 {
                let base = h.sender.base();
                h.to_sender(&Packet::ack(base));
            }
            prop_assert!(h.sender.in_flight() <= config.window_size);
            prop_assert_eq!(h.sender.timer_armed(), h.sender.in_flight() > 0);
        }
    }

    #[test]
    fn test_timeout_resends_exactly_unacked(
        config in config_strategy(),
        acked in prop::collection::vec(any::<bool>(), 8),
    ) {
        let mut h = Harness::new(&config);
        for i in 0..config.window_size as usize {
            h.admit(message(i)).unwrap();
        }
        let data = h.take_data();

        let mut expected = Vec::new();
        for (packet, &ack) in data.iter().zip(&acked) {
            if ack {
                let seq = h.sender.space().from_wire(packet.seqnum).unwrap();
                h.to_sender(&Packet::ack(seq));
            } else {
                expected.push(*packet);
            }
        }

        let resent = h.fire_timer();
        prop_assert_eq!(&resent, &expected);
        prop_assert!(h.sender.in_flight() as usize >= resent.len());
        prop_assert_eq!(h.sender.timer_armed(), !resent.is_empty());
    }

    #[test]
    fn test_receiver_delivers_once_in_order(
        config in config_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut h = Harness::new(&config);
        let count = config.window_size as usize;
        for i in 0..count {
            h.admit(message(i)).unwrap();
        }

        let mut data = h.take_data();
        let copies = data.clone();
        data.extend(copies);
        data.shuffle(&mut rng);

        for packet in &data {
            h.to_receiver(packet);
        }

        let expected: Vec<_> = (0..count).map(message).collect();
        prop_assert_eq!(h.delivered(), expected.as_slice());
        prop_assert_eq!(h.receiver.buffered(), 0);

        // Every copy is acked with its own sequence number
        let acks: BTreeSet<i32> = h.take_acks().iter().map(|p| p.acknum).collect();
        let seqs: BTreeSet<i32> = data.iter().map(|p| p.seqnum).collect();
        prop_assert_eq!(acks, seqs);
    }

    #[test]
    fn test_delivery_over_unreliable_link(
        config in config_strategy(),
        total in 1usize..60,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut h = Harness::new(&config);
        let lossy_rounds = 12;
        let max_rounds = lossy_rounds + total + 4;
        let mut admitted = 0;

        for round in 0..max_rounds {
            let lossy = round < lossy_rounds;
            while admitted < total && h.admit(message(admitted)).is_ok() {
                admitted += 1;
            }

            let data = h.take_data();
            for packet in mangle(&mut rng, data, lossy) {
                h.to_receiver(&packet);
                let prefix: Vec<_> = (0..h.delivered().len()).map(message).collect();
                prop_assert_eq!(h.delivered(), prefix.as_slice());
            }

            let acks = h.take_acks();
            for ack in mangle(&mut rng, acks, lossy) {
                h.to_sender(&ack);
            }

            prop_assert_eq!(h.sender.timer_armed(), h.sender.in_flight() > 0);
            if h.sender.in_flight() > 0 {
                h.fire_timer();
            } else if admitted == total {
                break;
            }
        }

        prop_assert_eq!(admitted, total);
        prop_assert_eq!(h.sender.in_flight(), 0);
        let expected: Vec<_> = (0..total).map(message).collect();
        prop_assert_eq!(h.delivered(), expected.as_slice());
        prop_assert_eq!(h.receiver.expected(), h.sender.base());
        prop_assert_eq!(h.sender.base(), h.sender.space().seq((total % config.max_seq as usize) as u32));
    }
}

#[test]
fn test_zero_sequence_is_first() {
    let mut h = Harness::with_defaults();
    assert_eq!(h.admit(message(0)).unwrap(), SeqNumber::ZERO);
}
