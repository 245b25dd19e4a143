//! Command-line driver (§6.1): `imh LISTDB_FILE QUERY_FILE OUTPUT_FILE`.
//!
//! Builds a [`HashIndex`] over `LISTDB_FILE`, searches it with every list in
//! `QUERY_FILE`, re-ranks each query's neighbors by Jaccard similarity
//! against the original lists, and writes the result to `OUTPUT_FILE`.

mod io;

use anyhow::{Context, Result};
use clap::Parser;
use imh_core::{jaccard, HashIndex, ListDb};
use log::info;

/// Intersection Min-Hashing: nearest-neighbor search over sparse list
/// databases.
#[derive(Parser, Debug)]
#[command(name = "imh", version, about)]
struct Cli {
    /// List database to index.
    listdb_file: String,
    /// Lists to query the index with.
    query_file: String,
    /// Where to write the re-ranked neighbor lists.
    output_file: String,

    /// MinHashes per tuple.
    #[arg(short = 'r', long, default_value_t = 3)]
    tuple_size: usize,

    /// Independent LSH tables.
    #[arg(short = 'l', long, default_value_t = 50)]
    number_of_tables: usize,

    /// table_size = 2^value.
    #[arg(short = 't', long, default_value_t = 20)]
    table_size: u32,

    /// Sublist partition size.
    #[arg(short = 's', long, default_value_t = 3)]
    sublist_size: usize,

    /// RNG seed.
    #[arg(short = 'e', long, default_value_t = 123_456)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let table_size = 1usize
        .checked_shl(cli.table_size)
        .context("table_size exponent is too large")?;

    info!("reading list database from {}", cli.listdb_file);
    let db = io::load_listdb(&cli.listdb_file)
        .with_context(|| format!("loading list database {}", cli.listdb_file))?;

    info!("reading queries from {}", cli.query_file);
    let queries = io::load_listdb(&cli.query_file)
        .with_context(|| format!("loading query database {}", cli.query_file))?;

    info!(
        "building index: tuple_size={} number_of_tables={} table_size={} sublist_size={} seed={}",
        cli.tuple_size, cli.number_of_tables, table_size, cli.sublist_size, cli.seed
    );
    let index = HashIndex::build(
        &db,
        cli.number_of_tables,
        cli.tuple_size,
        table_size,
        cli.sublist_size,
        cli.seed,
    )
    .context("building the hash index")?;

    info!("searching {} queries", queries.len());
    let mut results = index.query_multi(&queries);

    info!("sorting results by jaccard similarity");
    let mut sorted = ListDb::new(results.dim);
    for (query, mut neighbors) in queries.iter().zip(std::mem::take(&mut results.lists)) {
        index.sort_custom(query, &mut neighbors, &db, jaccard);
        sorted.push(neighbors);
    }

    info!("writing output to {}", cli.output_file);
    io::save_listdb(&cli.output_file, &sorted)
        .with_context(|| format!("writing output {}", cli.output_file))?;

    Ok(())
}
