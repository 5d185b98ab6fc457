use std::{ffi::OsString, fs::File, io::BufReader};

use clap::Parser;
use cutmap::MapperOptions;
use cutmap_network::aiger::import_binary_aiger;

#[derive(Debug, Parser)]
#[clap(about = "Maps a binary AIGER file into K-input LUTs")]
struct Options {
    /// Input file in binary AIGER format.
    input: OsString,

    /// Maximum number of cut leaves.
    #[clap(short = 'K', long, default_value_t = 6)]
    cut_size: usize,

    /// Maximum number of cuts stored per node.
    #[clap(short = 'C', long, default_value_t = 8)]
    cut_count: usize,

    /// Number of delay/area optimization rounds.
    #[clap(short = 'R', long, default_value_t = 2)]
    rounds: usize,

    /// Number of LUT inputs that may use the secondary delay.
    #[clap(short = 'E', long, default_value_t = 0)]
    fast_edges: usize,

    /// Delay of a regular LUT input, scaled by ten.
    #[clap(long, default_value_t = 10)]
    primary_delay: i32,

    /// Delay of a fast LUT input, scaled by ten.
    #[clap(long, default_value_t = 10)]
    secondary_delay: i32,

    /// Additional area charged per LUT.
    #[clap(short = 'A', long, default_value_t = 0)]
    area_tuner: u32,

    /// Required time of all outputs, scaled by ten.
    #[clap(short = 'D', long)]
    delay_target: Option<i32>,

    /// Compute and deduplicate cut functions.
    #[clap(short = 't', long)]
    truth: bool,

    /// Use multi-word truth tables for cut functions.
    #[clap(long, requires = "truth")]
    wide_truth: bool,

    /// Log per-round statistics.
    #[clap(short = 'v', long)]
    verbose: bool,

    /// Log the stored cuts of every node.
    #[clap(short = 'w', long)]
    very_verbose: bool,

    /// Print the statistics as a single JSON line.
    #[clap(long)]
    jsonl_output: bool,
}

fn main() -> color_eyre::Result<()> {
    let opts = Options::parse();

    color_eyre::install()?;
    cutmap_logger::setup();

    let network = import_binary_aiger(BufReader::new(File::open(&opts.input)?))?;
    network.log_stats();

    let options = MapperOptions {
        cut_size: opts.cut_size,
        cut_count: opts.cut_count,
        rounds: opts.rounds,
        fast_edge_count: opts.fast_edges,
        primary_delay_unit: opts.primary_delay,
        secondary_delay_unit: opts.secondary_delay,
        area_tuner: opts.area_tuner,
        enable_function_tracking: opts.truth,
        wide_truth_tables: opts.wide_truth,
        delay_target: opts.delay_target,
        verbose: opts.verbose,
        very_verbose: opts.very_verbose,
    };

    let mapping = cutmap::map(&network, options)?;
    let stats = &mapping.stats;

    if opts.jsonl_output {
        println!(
            "{}",
            serde_json::json!({
                "delay": stats.critical_delay,
                "delay_primary": stats.critical_delay_primary,
                "area": stats.area,
                "edges": stats.edges,
                "wires": mapping.wires.len(),
                "cuts": stats.cut_count,
                "functions": stats.function_count,
                "arena_bytes": stats.arena_bytes,
            })
        );
    } else {
        println!(
            "delay = {:.1}  area = {}  edges = {}  wires = {}",
            stats.critical_delay as f64 / 10.0,
            stats.area,
            stats.edges,
            mapping.wires.len(),
        );
    }

    Ok(())
}
