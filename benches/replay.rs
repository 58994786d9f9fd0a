//! Benchmarks for order book replay performance.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lob_replay::{Category, OrderBook, OrderEvent, Price, Side};

/// Generate a plausible event stream: mostly NEWs around a mid price,
/// interleaved with cancels and trades against earlier orders.
fn create_test_events(count: usize) -> Vec<OrderEvent> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut events = Vec::with_capacity(count);
    let mut resting: Vec<(u64, Side, Price, u64)> = Vec::new();
    let base_ticks: i64 = 1_000_000; // 100.0000

    for i in 0..count {
        let timestamp = i as i64 + 1;
        let roll: u8 = rng.gen_range(0..10);

        if roll < 6 || resting.is_empty() {
            let order_id = i as u64 + 1;
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let offset = rng.gen_range(0..20) * 500; // 0.05 increments
            let ticks = match side {
                Side::Buy => base_ticks - offset,
                Side::Sell => base_ticks + 500 + offset,
            };
            let price = Price::from_ticks(ticks);
            let quantity = rng.gen_range(1..200);
            resting.push((order_id, side, price, quantity));
            events.push(OrderEvent::new(
                timestamp,
                order_id,
                "BENCH",
                side,
                Category::New,
                price,
                quantity,
            ));
        } else if roll < 8 {
            let idx = rng.gen_range(0..resting.len());
            let (order_id, side, price, _) = resting.swap_remove(idx);
            events.push(OrderEvent::new(
                timestamp,
                order_id,
                "BENCH",
                side,
                Category::Cancel,
                price,
                0,
            ));
        } else {
            let idx = rng.gen_range(0..resting.len());
            let (order_id, side, price, quantity) = resting[idx];
            let take = rng.gen_range(1..=quantity);
            if take == quantity {
                resting.swap_remove(idx);
            } else {
                resting[idx].3 -= take;
            }
            events.push(OrderEvent::new(
                timestamp,
                order_id,
                "BENCH",
                side,
                Category::Trade,
                price,
                take,
            ));
        }
    }

    events
}

fn bench_apply(c: &mut Criterion) {
    let events = create_test_events(10_000);

    let mut group = c.benchmark_group("replay");
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("apply_events", |b| {
        b.iter(|| {
            let mut book = OrderBook::new("BENCH");
            for event in &events {
                let _ = black_box(book.apply(event));
            }
        })
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    // Build a populated book first
    let events = create_test_events(5_000);
    let mut book = OrderBook::new("BENCH");
    for event in &events {
        let _ = book.apply(event);
    }

    let mut group = c.benchmark_group("snapshot");

    group.bench_function("top5_both_sides", |b| {
        b.iter(|| black_box(book.snapshot(5)))
    });

    group.bench_function("render_line", |b| {
        let snapshot = book.snapshot(5);
        b.iter(|| black_box(snapshot.render_line()))
    });

    group.finish();
}

criterion_group!(benches, bench_apply, bench_snapshot);
criterion_main!(benches);
