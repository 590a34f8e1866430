//! Search and controller benchmarks for nav_core.
//!
//! Run with: `cargo bench -p nav_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nav_core::prelude::*;

/// Square grid with a comb of walls that forces long detours.
fn comb_grid(size: u32) -> NavGrid {
    let mut grid = NavGrid::new(size, size, Fixed::ONE);
    for x in (2..size).step_by(4) {
        let gap = if (x / 4) % 2 == 0 { size - 1 } else { 0 };
        for y in 0..size {
            if y != gap {
                grid.set_cell(GridCell::new(x, y), CellType::Blocked);
            }
        }
    }
    grid
}

/// Benchmarks a corner-to-corner search on open and walled grids.
pub fn search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    for size in [32u32, 128] {
        let mut open = NavGrid::new(size, size, Fixed::ONE);
        let mut comb = comb_grid(size);
        let goal = GridCell::new(size - 1, size - 1);

        group.bench_with_input(BenchmarkId::new("open", size), &size, |b, _| {
            b.iter(|| {
                open.reset();
                black_box(find_path(&mut open, GridCell::new(0, 0), goal))
            });
        });
        group.bench_with_input(BenchmarkId::new("comb", size), &size, |b, _| {
            b.iter(|| {
                comb.reset();
                black_box(find_path(&mut comb, GridCell::new(0, 0), goal))
            });
        });
    }
    group.finish();
}

/// Benchmarks a controller walking across a walled grid.
pub fn controller_benchmark(c: &mut Criterion) {
    let grid = comb_grid(64);
    let config = NavConfig {
        move_interval: 1,
        ..NavConfig::default()
    };
    c.bench_function("controller_walk_64", |b| {
        b.iter(|| {
            let source = MemorySource::new().with_grid("bench", &grid);
            let mut controller = MovementController::new(config.clone(), source, EventLog::new());
            let mut world = WorldSnapshot::new("bench").with_agent(Vec2Fixed::ZERO);
            controller.go(GridCell::new(63, 63));
            while controller.nav_state() != NavState::Idle {
                controller.tick(&world);
                for entry in controller.listener_mut().drain() {
                    if let LoggedEvent::Move { intent, .. } = entry {
                        world.agent = Some(intent.target);
                    }
                }
            }
            black_box(controller.state_hash())
        });
    });
}

criterion_group!(benches, search_benchmark, controller_benchmark);
criterion_main!(benches);
