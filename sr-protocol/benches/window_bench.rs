use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sr_protocol::{Message, Packet, ProtocolConfig, Receiver, Recorder, Sender};

fn bench_checksum(c: &mut Criterion) {
    let packet = Packet::data(
        ProtocolConfig::default().seq_space().unwrap().seq(5),
        &Message::filled(b'k'),
    );

    c.bench_function("packet_is_corrupted", |b| {
        b.iter(|| black_box(&packet).is_corrupted());
    });
}

fn bench_packet_codec(c: &mut Criterion) {
    let packet = Packet::data(
        ProtocolConfig::default().seq_space().unwrap().seq(5),
        &Message::filled(b'k'),
    );
    let bytes = packet.to_bytes();

    let mut group = c.benchmark_group("packet_codec");
    group.throughput(Throughput::Elements(1));
    group.bench_function("serialize", |b| {
        b.iter(|| black_box(black_box(&packet).to_bytes()));
    });
    group.bench_function("deserialize", |b| {
        b.iter(|| black_box(Packet::from_bytes(black_box(&bytes)).unwrap()));
    });
    group.finish();
}

fn bench_window_cycle(c: &mut Criterion) {
    let config = ProtocolConfig::default();
    let message = Message::filled(b'x');

    let mut group = c.benchmark_group("window");
    group.throughput(Throughput::Elements(config.window_size as u64));

    group.bench_function("fill_and_ack", |b| {
        let mut sender = Sender::new(&config).unwrap();
        let mut ctx = Recorder::new();
        b.iter(|| {
            let mut seqs = Vec::with_capacity(config.window_size as usize);
            while let Ok(seq) = sender.admit(&mut ctx, &message) {
                seqs.push(seq);
            }
            for seq in seqs.into_iter().rev() {
                black_box(sender.on_ack(&mut ctx, &Packet::ack(seq)));
            }
            ctx.clear();
        });
    });

    group.bench_function("reverse_delivery", |b| {
        let mut receiver = Receiver::new(&config).unwrap();
        let mut ctx = Recorder::new();
        let space = config.seq_space().unwrap();
        let mut base = 0u32;
        b.iter(|| {
            for offset in (0..config.window_size).rev() {
                let packet = Packet::data(space.seq(base + offset), &message);
                black_box(receiver.on_packet(&mut ctx, &packet));
            }
            base = (base + config.window_size) % config.max_seq;
            ctx.clear();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_checksum, bench_packet_codec, bench_window_cycle);
criterion_main!(benches);
