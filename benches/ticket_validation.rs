use criterion::{black_box, criterion_group, criterion_main, Criterion};

use theatre_booking::models::Hall;
use theatre_booking::services::availability::seats_left;
use theatre_booking::services::validation::validate_ticket;

fn bench_validate_ticket(c: &mut Criterion) {
    let hall = Hall { id: 1, name: "Main Hall".into(), rows: 30, seats_in_row: 40 };

    c.bench_function("validate_ticket/full_hall", |b| {
        b.iter(|| {
            for row in 1..=hall.rows {
                for seat in 1..=hall.seats_in_row {
                    let _ = black_box(validate_ticket(black_box(row), black_box(seat), &hall));
                }
            }
        })
    });

    c.bench_function("validate_ticket/out_of_range", |b| {
        b.iter(|| black_box(validate_ticket(black_box(31), black_box(41), &hall)))
    });

    c.bench_function("seats_left", |b| {
        b.iter(|| black_box(seats_left(1, black_box(hall.capacity()), black_box(198))))
    });
}

criterion_group!(benches, bench_validate_ticket);
criterion_main!(benches);
