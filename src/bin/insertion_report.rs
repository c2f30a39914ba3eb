//! Inserts a shuffled key population into each engine, then measures a
//! second batch of insertions and prints summary statistics.

use anyhow::{Context, Result, ensure};
use canopy::{AvlTree, InsertMetrics, OrderedTree, RedBlackTree, SkipList, Summary, TraversalOrder};
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    All,
    Avl,
    RedBlack,
    SkipList,
}

impl Engine {
    fn includes(self, other: Engine) -> bool {
        self == Engine::All || self == other
    }
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Keys 1..=POPULATION are shuffled and inserted before measuring.
    #[arg(long, default_value_t = 5000)]
    population: u32,

    /// Number of measured insertions, drawn uniformly from 1..=POPULATION.
    #[arg(long, default_value_t = 1000)]
    batch: usize,

    /// Seed for the shuffle, the batch and the skip list heights.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Engine::All)]
    engine: Engine,

    /// Print every tree's keys in this order after the run
    /// (pre_order, in_order or post_order).
    #[arg(long)]
    traverse: Option<TraversalOrder>,
}

struct Batch {
    steps: Vec<usize>,
    adjustments: Vec<usize>,
}

impl Batch {
    fn measure(keys: &[u32], mut insert: impl FnMut(u32) -> InsertMetrics) -> Self {
        let (steps, adjustments) = keys
            .iter()
            .map(|&key| {
                let metrics = insert(key);
                (metrics.steps, metrics.adjustments)
            })
            .unzip();

        Self { steps, adjustments }
    }

    fn report(&self, adjustment_label: &str) -> Result<()> {
        let steps = Summary::from_samples(&self.steps).context("measured batch is empty")?;
        let adjustments = Summary::from_samples(&self.adjustments).context("measured batch is empty")?;
        let total: usize = self.adjustments.iter().sum();

        println!("  steps        {steps}");
        println!("  {adjustment_label:<12} {adjustments}  total {total}");

        Ok(())
    }
}

fn run_tree<T: OrderedTree<u32>>(
    name: &str,
    mut tree: T,
    population: &[u32],
    batch: &[u32],
    traverse: Option<TraversalOrder>,
    is_valid: impl Fn(&T) -> bool,
) -> Result<()> {
    for &key in population {
        tree.insert(key);
    }
    debug!(engine = name, height = tree.height(), "population inserted");

    let measured = Batch::measure(batch, |key| tree.insert_with_metrics(key));

    println!("{name}");
    measured.report("rotations")?;
    println!("  height       {}", tree.height());
    println!("  leaves       {}", tree.leaf_count());

    ensure!(is_valid(&tree), "{name} invariants broken after {} insertions", tree.len());
    ensure!(tree.is_search_ordered(), "{name} lost its search ordering");

    if let Some(order) = traverse {
        let keys: Vec<String> = tree.traverse(order).iter().map(ToString::to_string).collect();
        println!("  {order}: {}", keys.join(" "));
    }

    Ok(())
}

fn run_skip_list(population: &[u32], batch: &[u32], seed: u64) -> Result<()> {
    let mut list = SkipList::with_seed(seed);
    for &value in population {
        list.insert(value);
    }
    debug!(engine = "skip list", max_height = list.max_height(), "population inserted");

    let measured = Batch::measure(batch, |value| list.insert_with_metrics(value));

    println!("skip list");
    measured.report("promotions")?;
    println!("  max height   {}", list.max_height());

    ensure!(list.is_well_formed(), "skip list invariants broken after {} insertions", list.len());

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    ensure!(args.population > 0, "population must hold at least one key");

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    info!(seed, population = args.population, batch = args.batch, "starting run");

    let mut population: Vec<u32> = (1..=args.population).collect();
    population.shuffle(&mut rng);
    let batch: Vec<u32> = (0..args.batch).map(|_| rng.gen_range(1..=args.population)).collect();

    if args.engine.includes(Engine::Avl) {
        run_tree(
            "avl",
            AvlTree::with_capacity(population.len() + batch.len()),
            &population,
            &batch,
            args.traverse,
            AvlTree::is_valid_avl,
        )?;
    }

    if args.engine.includes(Engine::RedBlack) {
        run_tree(
            "red-black",
            RedBlackTree::with_capacity(population.len() + batch.len()),
            &population,
            &batch,
            args.traverse,
            RedBlackTree::is_valid_red_black,
        )?;
    }

    if args.engine.includes(Engine::SkipList) {
        run_skip_list(&population, &batch, seed)?;
    }

    info!("run complete");

    Ok(())
}
