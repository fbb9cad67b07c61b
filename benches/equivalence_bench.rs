use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use redundantoverride::analysis::FullBodyEquivalence;
use redundantoverride::{Inspector, Project};

/// `pairs` base/derived classes; every derived method repeats its base body
fn hierarchy_source(pairs: u32, statements: u32) -> String {
    let mut body = String::new();
    for i in 0..statements {
        body.push_str(&format!("        int v{0} = x + {0};\n        if (v{0} > limit) {{ return v{0}; }}\n", i));
    }
    body.push_str("        return helper(x);\n");

    let mut out = String::from("package bench;\n\n");
    for p in 0..pairs {
        out.push_str(&format!(
            "class Base{0} {{\n    int limit;\n    int helper(int x) {{ return x; }}\n    int compute(int x) {{\n{1}    }}\n}}\n\n",
            p, body
        ));
        out.push_str(&format!(
            "class Derived{0} extends Base{0} {{\n    @Override\n    int compute(int x) {{\n{1}    }}\n    @Override\n    int helper(int x) {{ return super.helper(x); }}\n}}\n\n",
            p, body
        ));
    }
    out
}

fn bench_full_body_equivalence(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_body_equivalence");
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(20);

    for statements in [1u32, 20, 200] {
        let source = hierarchy_source(1, statements);
        let project = Project::from_sources(&[("Bench.java", source.as_str())]).expect("bench source parses");
        let method = project
            .project_methods()
            .find(|m| m.name == "compute" && project.type_decl(&m.owner).map(|t| t.name.as_str()) == Some("Derived0"))
            .expect("derived method");
        let super_method = project
            .project_methods()
            .find(|m| m.name == "compute" && project.type_decl(&m.owner).map(|t| t.name.as_str()) == Some("Base0"))
            .expect("base method");

        let equivalence = FullBodyEquivalence::new(&project);
        group.bench_with_input(BenchmarkId::from_parameter(statements), &statements, |b, _| {
            b.iter(|| black_box(equivalence.is_equivalent(black_box(method), black_box(super_method))))
        });
    }

    group.finish();
}

fn bench_inspector_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspector_run");
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(10);

    for pairs in [10u32, 100] {
        let source = hierarchy_source(pairs, 5);
        let project = Project::from_sources(&[("Bench.java", source.as_str())]).expect("bench source parses");

        for parallel in [false, true] {
            let id = format!("{}_{}", pairs, if parallel { "parallel" } else { "sequential" });
            let inspector = Inspector::default().with_parallel(parallel);
            group.bench_function(BenchmarkId::from_parameter(id), |b| {
                b.iter(|| black_box(inspector.run(black_box(&project)).findings.len()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_full_body_equivalence, bench_inspector_run);
criterion_main!(benches);
