use criterion::{Criterion, black_box, criterion_group, criterion_main};

use gauntlet_core::{Descriptor, ScalarKind, export, marshal};

fn level_order_raw(nodes: usize) -> String {
    let slots: Vec<String> = (0..nodes).map(|i| i.to_string()).collect();
    format!("[{}]", slots.join(","))
}

fn edge_list_raw(nodes: usize) -> String {
    let edges: Vec<String> = (0..nodes)
        .map(|i| format!("[{},{}]", i, (i + 1) % nodes))
        .collect();
    format!("[{}]", edges.join(","))
}

fn tree_round_trip(c: &mut Criterion) {
    let descriptor = Descriptor::binary_tree(Descriptor::Scalar(ScalarKind::Integer));
    let raw = level_order_raw(1024);
    c.bench_function("tree_marshal_export_1024", |b| {
        b.iter(|| {
            let value = marshal(black_box(&raw), &descriptor).expect("bench input marshals");
            export(&value, &descriptor).expect("bench value exports")
        });
    });
}

fn graph_round_trip(c: &mut Criterion) {
    let descriptor = Descriptor::graph(Descriptor::Scalar(ScalarKind::Integer), false);
    let raw = edge_list_raw(512);
    c.bench_function("graph_marshal_export_512", |b| {
        b.iter(|| {
            let value = marshal(black_box(&raw), &descriptor).expect("bench input marshals");
            export(&value, &descriptor).expect("bench value exports")
        });
    });
}

criterion_group!(benches, tree_round_trip, graph_round_trip);
criterion_main!(benches);
