use criterion::{Criterion, criterion_group, criterion_main};
use newick_graph::graft::{GraftOptions, GraftRequest, graft};
use newick_graph::newick::parse_str;
use newick_graph::store::MemoryStore;
use std::hint::black_box;
use std::sync::Arc;

/// (name, number of leaves) of the generated benchmark trees
const TREE_SIZES: &[(&str, usize)] = &[("n50", 50), ("n500", 500), ("n5000", 5000)];

/// Balanced binary tree over `num_leaves` leaves with bootstrap labels and branch lengths.
fn balanced_newick(num_leaves: usize) -> String {
    fn subtree(first: usize, count: usize, out: &mut String) {
        if count == 1 {
            out.push_str(&format!("taxon_{first}:0.{first}"));
            return;
        }
        let left = count / 2;
        out.push('(');
        subtree(first, left, out);
        out.push(',');
        subtree(first + left, count - left, out);
        out.push_str(&format!("){}:1.5e-2", 50 + count % 50));
    }

    let mut out = String::new();
    subtree(0, num_leaves, &mut out);
    out.push(';');
    out
}

fn newick_parsing(c: &mut Criterion) {
    for (name, num_leaves) in TREE_SIZES {
        let newick = balanced_newick(*num_leaves);
        c.bench_function(&format!("parse_{name}"), |b| {
            b.iter(|| parse_str(black_box(&newick)).unwrap());
        });
    }
}

fn memory_grafting(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let options = GraftOptions::default();

    for (name, num_leaves) in TREE_SIZES {
        let newick = balanced_newick(*num_leaves);
        c.bench_function(&format!("graft_{name}"), |b| {
            b.iter(|| {
                let request = GraftRequest {
                    tree_id: (*name).to_string(),
                    source: newick.clone(),
                };
                runtime
                    .block_on(graft(Arc::new(MemoryStore::new()), request, &options))
                    .unwrap()
            });
        });
    }
}

criterion_group!(regression, newick_parsing);
criterion_group! {
    name = engine;
    config = Criterion::default().sample_size(10);
    targets = memory_grafting
}
criterion_main!(regression, engine);
