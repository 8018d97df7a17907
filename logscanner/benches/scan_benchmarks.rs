use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logscanner::scan::{JobBuilder, PlainTextExtractor, ScanJob, ScanWorkerPool, TermMatcher};
use logscanner::{CancellationToken, ConsoleSink};
use std::{fs::File, io, io::Write, num::NonZeroUsize, sync::Arc};
use tempfile::tempdir;

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    lines_per_file: usize,
) -> io::Result<()> {
    for i in 0..file_count {
        let file_path = dir.path().join(format!("log_{}.txt", i));
        let mut file = File::create(file_path)?;
        for j in 0..lines_per_file {
            writeln!(
                file,
                "{:02}:{:02} Unit {} responded to call {} on Elm Road",
                j % 24,
                j % 60,
                i,
                j
            )?;
        }
        if i % 10 == 0 {
            writeln!(file, "Follow-up at 65 Main Street")?;
        }
    }
    Ok(())
}

fn build_jobs(dir: &tempfile::TempDir) -> Vec<ScanJob> {
    let matcher = Arc::new(TermMatcher::new("65 main street").unwrap());
    JobBuilder::new(matcher, vec!["txt".to_string()])
        .build(dir.path())
        .unwrap()
}

fn bench_file_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("File Scaling");
    for &count in &[10usize, 100, 500] {
        let dir = tempdir().unwrap();
        create_test_files(&dir, count, 200).unwrap();
        let jobs = build_jobs(&dir);
        let pool =
            ScanWorkerPool::new(Arc::new(PlainTextExtractor), NonZeroUsize::new(4).unwrap())
                .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &jobs, |b, jobs| {
            b.iter(|| {
                let sink = ConsoleSink::new(io::sink(), false);
                black_box(pool.run(jobs, &sink, &CancellationToken::new()))
            });
        });
    }
    group.finish();
}

fn bench_worker_count(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 200, 500).unwrap();
    let jobs = build_jobs(&dir);

    let mut group = c.benchmark_group("Worker Count");
    for &workers in &[1usize, 2, 4, 8] {
        let pool = ScanWorkerPool::new(
            Arc::new(PlainTextExtractor),
            NonZeroUsize::new(workers).unwrap(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(workers), &jobs, |b, jobs| {
            b.iter(|| {
                let sink = ConsoleSink::new(io::sink(), false);
                black_box(pool.run(jobs, &sink, &CancellationToken::new()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_file_scaling, bench_worker_count);
criterion_main!(benches);
