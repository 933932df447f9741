//! Criterion benchmarks for u-roster strategies.
//!
//! Uses a synthetic three-shift contact-centre roster to measure the
//! greedy heuristic and the constraint-model path end to end.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_roster::models::{DayType, Employee, RuleConfig, Shift};
use u_roster::scheduler::{AssignmentStrategy, GreedyScheduler, OptimizingScheduler, ScheduleRequest};

// ===========================================================================
// Synthetic rosters
// ===========================================================================

fn three_shift_request(leads: usize, associates: usize) -> ScheduleRequest {
    let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2"), Shift::new("S3")])
        .with_requirements(DayType::Weekday, &[("S1", 3), ("S2", 2), ("S3", 3)])
        .with_requirements(DayType::Saturday, &[("S1", 2), ("S2", 2), ("S3", 2)])
        .with_requirements(DayType::Sunday, &[("S2", 2), ("S3", 2)])
        .with_forbidden_succession("S3", "S1");
    let mut employees: Vec<Employee> = (1..=leads)
        .map(|i| Employee::shift_lead(format!("L{i}")))
        .collect();
    employees.extend((1..=associates).map(|i| Employee::associate(format!("A{i}"))));
    ScheduleRequest::new(employees, rules, 2025, 8)
}

fn four_person_request() -> ScheduleRequest {
    let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
        .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)]);
    let employees = vec![
        Employee::shift_lead("L1"),
        Employee::shift_lead("L2"),
        Employee::associate("A1"),
        Employee::associate("A2"),
    ];
    ScheduleRequest::new(employees, rules, 2025, 9)
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_month");
    for &(leads, associates) in &[(5, 7), (10, 20), (20, 60)] {
        let request = three_shift_request(leads, associates);
        group.bench_with_input(
            BenchmarkId::from_parameter(leads + associates),
            &request,
            |b, r| {
                let scheduler = GreedyScheduler::new();
                // Shortfalls are still a full run.
                b.iter(|| black_box(scheduler.assign(black_box(r)).is_ok()));
            },
        );
    }
    group.finish();
}

fn bench_optimizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimizing_month");
    group.sample_size(10);
    let request = four_person_request();
    group.bench_function("four_person", |b| {
        let scheduler = OptimizingScheduler::new();
        b.iter(|| black_box(scheduler.assign(black_box(&request)).is_ok()));
    });
    group.finish();
}

criterion_group!(benches, bench_greedy, bench_optimizing);
criterion_main!(benches);
