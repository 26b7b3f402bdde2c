//! Filter throughput over a synthetic fault tree

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use faulttree_core::{FaultTree, RawNode, SearchIndex};

/// `width` systems, each with `width` components holding `width` faults
fn synthetic_tree(width: usize) -> FaultTree {
    let systems = (0..width)
        .map(|s| {
            let components = (0..width)
                .map(|c| {
                    let faults = (0..width)
                        .map(|f| RawNode::new(format!("Fault {s}.{c}.{f} seal wear")))
                        .collect();
                    RawNode::new(format!("Component {s}.{c}")).with_children(faults)
                })
                .collect();
            RawNode::new(format!("System {s}")).with_children(components)
        })
        .collect();
    FaultTree::build(systems)
}

fn bench_filter(c: &mut Criterion) {
    let tree = synthetic_tree(20);
    let index = SearchIndex::new(&tree);

    c.bench_function("build_index_8k", |b| b.iter(|| SearchIndex::new(black_box(&tree))));
    c.bench_function("filter_narrow", |b| b.iter(|| index.filter(black_box("fault 3.4.5"))));
    c.bench_function("filter_broad", |b| b.iter(|| index.filter(black_box("seal"))));
    c.bench_function("filter_reset", |b| b.iter(|| index.filter(black_box(""))));
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
