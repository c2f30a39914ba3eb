use canopy::{AvlTree, OrderedTree, RedBlackTree, SkipList};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::prelude::*;
use rbtree::RBTree;
use std::collections::BTreeSet;
use std::ops::Range;

const POPULATION: usize = 100000;

fn bench_baseline_multi_insertions(data: Vec<usize>) {
    let mut tree = BTreeSet::new();

    for i in data {
        tree.insert(i);
    }
}

fn bench_rbtree_multi_insertions(data: Vec<usize>) {
    let mut tree = RBTree::new();

    for i in data {
        tree.insert(i, ());
    }
}

fn bench_multi_insertions<T: OrderedTree<usize>>(mut tree: T, data: Vec<usize>) {
    for i in data {
        tree.insert(i);
    }
}

fn bench_skip_list_multi_insertions(data: Vec<usize>) {
    let mut list = SkipList::with_seed(0);

    for i in data {
        list.insert(i);
    }
}

fn init_large_btree() -> BTreeSet<usize> {
    random_insertion_order().into_iter().collect()
}

fn init_large_tree<T: OrderedTree<usize>>(mut tree: T) -> T {
    for i in random_insertion_order() {
        tree.insert(i);
    }

    tree
}

fn init_large_skip_list() -> SkipList<usize> {
    let mut list = SkipList::with_seed(0);

    for i in random_insertion_order() {
        list.insert(i);
    }

    list
}

fn random_insertion_order() -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let mut indices: Vec<usize> = (0..POPULATION).collect();

    indices.shuffle(&mut rng);

    indices
}

fn init_random_data(count: usize, range_opt: Option<Range<usize>>) -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let range = range_opt.unwrap_or(0..POPULATION);
    let range = rand::distributions::Uniform::new(range.start, range.end);

    let indices: Vec<usize> = (0..count).map(|_| rng.sample(&range)).collect();

    indices
}

fn bench_baseline_random_lookups(tree: BTreeSet<usize>, indices: Vec<usize>) {
    for idx in indices {
        assert!(tree.contains(&idx));
    }
}

fn bench_random_lookups<T: OrderedTree<usize>>(tree: T, indices: Vec<usize>) {
    for idx in indices {
        assert!(tree.search(&idx));
    }
}

fn bench_skip_list_random_lookups(list: SkipList<usize>, indices: Vec<usize>) {
    for idx in indices {
        assert!(list.contains(&idx));
    }
}

fn inorder_iteration_btree(tree: BTreeSet<usize>) {
    for (i, &elem) in tree.iter().enumerate() {
        assert_eq!(i, elem);
    }
}

fn inorder_iteration<T: OrderedTree<usize>>(tree: T) {
    for (i, &elem) in tree.iter().enumerate() {
        assert_eq!(i, elem);
    }
}

fn ordered_tree_benchmark(c: &mut Criterion) {
    c.bench_function("baseline btree 100K insertions", |b| {
        b.iter_batched(
            random_insertion_order,
            bench_baseline_multi_insertions,
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline rbtree 100K insertions", |b| {
        b.iter_batched(
            random_insertion_order,
            bench_rbtree_multi_insertions,
            BatchSize::LargeInput,
        )
    });

    c.bench_function("avl 100K insertions", |b| {
        b.iter_batched(
            random_insertion_order,
            |order| bench_multi_insertions(AvlTree::new(), order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("avl 100K insertions with size hint", |b| {
        b.iter_batched(
            random_insertion_order,
            |order| bench_multi_insertions(AvlTree::with_capacity(order.len()), order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("red-black 100K insertions", |b| {
        b.iter_batched(
            random_insertion_order,
            |order| bench_multi_insertions(RedBlackTree::new(), order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("red-black 100K insertions with size hint", |b| {
        b.iter_batched(
            random_insertion_order,
            |order| bench_multi_insertions(RedBlackTree::with_capacity(order.len()), order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("skip list 100K insertions", |b| {
        b.iter_batched(
            random_insertion_order,
            bench_skip_list_multi_insertions,
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline btree random lookups", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(5000, None)),
            |(tree, indices)| bench_baseline_random_lookups(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("avl random lookups", |b| {
        b.iter_batched(
            || (init_large_tree(AvlTree::new()), init_random_data(5000, None)),
            |(tree, indices)| bench_random_lookups(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("red-black random lookups", |b| {
        b.iter_batched(
            || (init_large_tree(RedBlackTree::new()), init_random_data(5000, None)),
            |(tree, indices)| bench_random_lookups(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("skip list random lookups", |b| {
        b.iter_batched(
            || (init_large_skip_list(), init_random_data(5000, None)),
            |(list, indices)| bench_skip_list_random_lookups(list, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline btree inorder iteration", |b| {
        b.iter_batched(init_large_btree, inorder_iteration_btree, BatchSize::LargeInput)
    });

    c.bench_function("avl inorder iteration", |b| {
        b.iter_batched(
            || init_large_tree(AvlTree::new()),
            inorder_iteration,
            BatchSize::LargeInput,
        )
    });

    c.bench_function("red-black inorder iteration", |b| {
        b.iter_batched(
            || init_large_tree(RedBlackTree::new()),
            inorder_iteration,
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, ordered_tree_benchmark);
criterion_main!(benches);
