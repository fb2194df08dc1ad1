use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use sdst_fjsp::instance::Instance;
use sdst_fjsp::solution::Solution;

fn make_instance(num_jobs: usize, tasks_per_job: usize, num_machines: usize) -> Instance {
    let jobs = vec![vec![0usize; tasks_per_job]; num_jobs];
    let num_ops = num_jobs * tasks_per_job;
    let usable = vec![vec![true; num_machines]; num_ops];
    let proc_time = vec![vec![3.0; num_machines]; num_ops];
    let setup = vec![vec![1i64; num_ops]; num_ops];
    Instance::new(jobs, num_machines, usable, proc_time, setup).unwrap()
}

fn evaluator_benchmark(c: &mut Criterion) {
    let instance = make_instance(20, 10, 5);
    let mut rng = SmallRng::seed_from_u64(0);
    let solution = Solution::random_feasible(&instance, &mut rng);

    c.bench_function("makespan_uncached_200ops", |b| {
        b.iter(|| solution.makespan_uncached(&instance))
    });
}

criterion_group!(benches, evaluator_benchmark);
criterion_main!(benches);
