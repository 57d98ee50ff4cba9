//! Dijkstra benchmarks over random graphs of increasing density
//!
//! Compares the pairing heap with decrease-key on both node stores against
//! `std::collections::BinaryHeap` with lazy deletion. Graphs are generated with
//! a fixed seed, 4000 vertices and edge weights in `1..=100`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use arena_pairing_heap::{Config, Handle, Node, NodeStore, PairingHeap, StashPairingHeap};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VERTICES: usize = 4000;
const DENSITIES: &[f64] = &[0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0];

type Graph = Vec<Vec<(usize, u64)>>;

fn generate_graph(vertices: usize, density: f64) -> Graph {
	let mut rng = StdRng::seed_from_u64(42);
	let mut adj = vec![Vec::new(); vertices];
	let target = (vertices * (vertices - 1)) as f64 * density / 100.0;

	let mut added = 0;
	while (added as f64) < target {
		let from = rng.gen_range(0..vertices);
		let to = rng.gen_range(0..vertices);
		if from != to {
			adj[from].push((to, rng.gen_range(1..=100)));
			added += 1;
		}
	}
	adj
}

fn dijkstra_pairing<S>(adj: &Graph, mut heap: PairingHeap<(u64, usize), S>) -> Vec<u64>
	where S: NodeStore<Node<(u64, usize)>>
{
	let mut dist = vec![u64::MAX; adj.len()];
	let mut handles: Vec<Option<Handle>> = vec![None; adj.len()];

	dist[0] = 0;
	handles[0] = heap.insert((0, 0)).ok();

	while let Ok((d, u)) = heap.delete_min() {
		handles[u] = None;
		for &(v, weight) in &adj[u] {
			let candidate = d + weight;
			if candidate < dist[v] {
				dist[v] = candidate;
				match handles[v] {
					Some(handle) => { let _ = heap.decrease_key(handle, (candidate, v)); }
					None         => handles[v] = heap.insert((candidate, v)).ok()
				}
			}
		}
	}
	dist
}

fn dijkstra_binary(adj: &Graph) -> Vec<u64> {
	let mut heap = BinaryHeap::new();
	let mut dist = vec![u64::MAX; adj.len()];

	dist[0] = 0;
	heap.push(Reverse((0u64, 0usize)));

	while let Some(Reverse((d, u))) = heap.pop() {
		if d > dist[u] {
			continue
		}
		for &(v, weight) in &adj[u] {
			let candidate = d + weight;
			if candidate < dist[v] {
				dist[v] = candidate;
				heap.push(Reverse((candidate, v)));
			}
		}
	}
	dist
}

fn benchmark_density(c: &mut Criterion) {
	let mut group = c.benchmark_group("dijkstra_density");
	group.sample_size(10);

	for &density in DENSITIES {
		let adj = generate_graph(VERTICES, density);

		group.bench_with_input(BenchmarkId::new("binary_heap", density), &adj, |b, adj| {
			b.iter(|| black_box(dijkstra_binary(adj)))
		});
		group.bench_with_input(BenchmarkId::new("pairing_arena", density), &adj, |b, adj| {
			b.iter(|| {
				let config = Config::default().with_reserve(adj.len());
				let heap: PairingHeap<(u64, usize)> = PairingHeap::with_config(config).unwrap();
				black_box(dijkstra_pairing(adj, heap))
			})
		});
		group.bench_with_input(BenchmarkId::new("pairing_stash", density), &adj, |b, adj| {
			b.iter(|| black_box(dijkstra_pairing(adj, StashPairingHeap::default())))
		});
	}

	group.finish();
}

criterion_group!(benches, benchmark_density);
criterion_main!(benches);
