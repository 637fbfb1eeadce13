//! Benchmarks for Kaelion circuit operations
//!
//! Run with: cargo bench -p kaelion-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kaelion_ir::{Circuit, QubitId};
use std::f64::consts::PI;

/// Benchmark circuit creation
fn bench_circuit_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_creation");

    for num_qubits in &[2u32, 4, 8, 16] {
        group.bench_with_input(
            BenchmarkId::new("with_size", num_qubits),
            num_qubits,
            |b, &n| {
                b.iter(|| Circuit::with_size(black_box("bench"), black_box(n), black_box(n)));
            },
        );
    }

    group.finish();
}

/// Benchmark adding gates to a circuit
fn bench_gate_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_addition");

    group.bench_function("h_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit.h(black_box(QubitId(0))).unwrap();
        });
    });

    group.bench_function("rx_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit
                .rx(black_box(PI / 4.0), black_box(QubitId(0)))
                .unwrap();
        });
    });

    group.bench_function("cx_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit
                .cx(black_box(QubitId(0)), black_box(QubitId(1)))
                .unwrap();
        });
    });

    group.bench_function("rzz_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit
                .rzz(black_box(1.8), black_box(QubitId(0)), black_box(QubitId(1)))
                .unwrap();
        });
    });

    group.finish();
}

/// Build a brickwork layer circuit of the given width and depth.
fn brickwork(n: u32, layers: usize) -> Circuit {
    let mut circuit = Circuit::with_size("brickwork", n, 0);
    for _ in 0..layers {
        for i in 0..n {
            circuit.u(0.7, 1.2, -0.3, QubitId(i)).unwrap();
        }
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
        }
    }
    circuit
}

/// Benchmark layered circuit construction
fn bench_layered_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_circuit");

    for depth in &[1usize, 4, 10, 14] {
        group.bench_with_input(BenchmarkId::new("build", depth), depth, |b, &d| {
            b.iter(|| black_box(brickwork(4, d)));
        });
    }

    group.finish();
}

/// Benchmark circuit inversion
fn bench_circuit_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_inverse");

    for depth in &[1usize, 4, 10, 14] {
        let circuit = brickwork(4, *depth);
        group.bench_with_input(BenchmarkId::new("inverse", depth), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit.inverse().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark circuit depth calculation
fn bench_circuit_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_depth");

    for num_qubits in &[4u32, 8, 16] {
        let circuit = brickwork(*num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("depth", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| black_box(circuit.depth()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_circuit_creation,
    bench_gate_addition,
    bench_layered_circuit,
    bench_circuit_inverse,
    bench_circuit_depth,
);

criterion_main!(benches);
