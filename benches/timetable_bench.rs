//! Criterion benchmarks for u-timetable.
//!
//! Uses synthetic department and lab instances to measure constraint
//! building and search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_timetable::cp::ConstraintBuilder;
use u_timetable::model::{CandidateRecord, Owner, Problem, ProblemInput, Resource, ScheduleRules};
use u_timetable::search::{SearchConfig, SearchRunner};

// ===========================================================================
// Department: full grid, one teacher per subject and section
// ===========================================================================

fn department(sections: usize) -> Problem {
    let mut candidates = Vec::new();
    for s in 0..sections {
        let owner = Owner::section("2nd Year", format!("S{s}"));
        for j in 0..5 {
            candidates.push(
                CandidateRecord::new(owner.clone(), format!("Subject{j}"), 5)
                    .with_teacher(format!("T{s}_{j}")),
            );
        }
        candidates.push(CandidateRecord::new(owner, "Free", 5));
    }
    Problem::new(ScheduleRules::department(), ProblemInput::new(candidates))
        .expect("valid department instance")
}

// ===========================================================================
// Labs: shared resources across years
// ===========================================================================

fn labs(years: usize) -> Problem {
    let candidates = (0..years)
        .flat_map(|y| {
            let owner = Owner::year(format!("Year{y}"));
            [
                CandidateRecord::new(owner.clone(), "C++", 4)
                    .with_teacher(format!("L{y}a"))
                    .with_group_size(30),
                CandidateRecord::new(owner, "Python", 4)
                    .with_teacher(format!("L{y}b"))
                    .with_group_size(30),
            ]
        })
        .collect();
    let input = ProblemInput::new(candidates)
        .with_resources(vec![Resource::new("Lab1", 30), Resource::new("Lab2", 40)]);
    Problem::new(ScheduleRules::lab(), input).expect("valid lab instance")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for sections in [1, 4, 8] {
        let problem = department(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &problem, |b, p| {
            b.iter(|| black_box(ConstraintBuilder::new(p).build()))
        });
    }

    group.finish();
}

fn bench_search_department(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_department");
    group.sample_size(10);

    for (sections, workers) in [(2, 1), (4, 1), (4, 4)] {
        let set = ConstraintBuilder::new(&department(sections)).build();
        let config = SearchConfig::default()
            .with_workers(workers)
            .with_time_limit_ms(10_000);
        group.bench_with_input(
            BenchmarkId::new(format!("s{sections}_w{workers}"), sections),
            &(set, config),
            |b, (s, c)| b.iter(|| black_box(SearchRunner::run(s, c))),
        );
    }

    group.finish();
}

fn bench_search_labs(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_labs");
    group.sample_size(10);

    for years in [2, 3] {
        let set = ConstraintBuilder::new(&labs(years)).build();
        let config = SearchConfig::default().with_time_limit_ms(10_000);
        group.bench_with_input(BenchmarkId::from_parameter(years), &(set, config), |b, (s, c)| {
            b.iter(|| black_box(SearchRunner::run(s, c)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_search_department, bench_search_labs);
criterion_main!(benches);
