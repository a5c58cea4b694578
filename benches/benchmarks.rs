use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::PathBuf;

use engine_tera::{Engine, RenderEngine, RenderOptions};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn sample_options() -> RenderOptions {
    RenderOptions::new()
        .local("thing", vec![1, 2, 3])
        .local("title", "Benchmark")
        .local("links", vec!["home", "about", "blog"])
}

fn bench_configure(c: &mut Criterion) {
    let root = fixture_path("templates");

    c.bench_function("configure", |b| {
        b.iter(|| {
            let engine = Engine::with_options(black_box(root.as_path())).unwrap();
            black_box(engine)
        });
    });
}

fn bench_render_string(c: &mut Criterion) {
    let engine = Engine::with_options(fixture_path("templates")).unwrap();
    let options = sample_options();

    c.bench_function("render (string)", |b| {
        b.iter(|| {
            let out = engine
                .render(
                    black_box("{% for item in thing %}{{item}}{% endfor %}"),
                    Some(&options),
                )
                .unwrap();
            black_box(out)
        });
    });
}

fn bench_render_file(c: &mut Criterion) {
    let engine = Engine::with_options(fixture_path("templates")).unwrap();
    let options = sample_options();

    c.bench_function("render_file (include)", |b| {
        b.iter(|| {
            let out = engine
                .render_file(black_box("page.html"), Some(&options))
                .unwrap();
            black_box(out)
        });
    });
}

criterion_group!(
    benches,
    bench_configure,
    bench_render_string,
    bench_render_file
);
criterion_main!(benches);
