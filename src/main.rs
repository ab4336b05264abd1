use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::{Path, PathBuf};

use atfutil::atf::{Allocation, AtfFile};
use atfutil::atf_loader::{self, is_stdio};
use atfutil::forest::AllocationForest;
use atfutil::ip::{parse_network, IpNetPool, Ipv4Net};
use atfutil::render::{render_json, render_markdown, RenderFormat};

/// Smallest subnet handed out by default (a /28, the smallest practical cloud subnet)
const DEFAULT_MAX_PREFIX_LEN: u8 = 28;

/// atfutil can validate and render atf (allocation table format) yaml files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Input file, `-` for stdin
    #[arg(short, long, global = true, default_value = "-")]
    input_file: PathBuf,

    /// Output file, `-` for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an input file to be valid atf and have no network overlap
    Validate,

    /// Render an atf.yaml to a human readable format
    Render {
        /// Include free blocks when rendering
        #[arg(short, long)]
        all_blocks: bool,

        /// Render format
        #[arg(short = 'f', long, value_enum, default_value_t = RenderFormat::Markdown)]
        render_format: RenderFormat,
    },

    /// Allocate a new subnet
    #[command(
        long_about = "Allocate a new subnet. The smallest fitting free slice is automatically found and allocated to keep your IP space fragmentation low"
    )]
    Alloc {
        /// Prefix length of the network to allocate
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(..=32))]
        size: u8,

        /// Description for the newly allocated subnet
        #[arg(short, long, default_value = "")]
        description: String,

        /// Modify the input file in place
        #[arg(long)]
        in_place: bool,

        /// Allocate inside this top-level allocation instead of the superblock
        #[arg(long, value_parser = parse_network)]
        within: Option<Ipv4Net>,

        /// Longest prefix (smallest subnet) that may be requested
        #[arg(long, default_value_t = DEFAULT_MAX_PREFIX_LEN, value_parser = clap::value_parser!(u8).range(..=32))]
        max_prefix_len: u8,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Logs go to stderr so rendered output on stdout stays clean
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    run(args)
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Validate => validate(&args.input_file),
        Command::Render {
            all_blocks,
            render_format,
        } => render(&args.input_file, &args.output_file, all_blocks, render_format),
        Command::Alloc {
            size,
            description,
            in_place,
            within,
            max_prefix_len,
        } => {
            if in_place && !is_stdio(&args.output_file) {
                return Err(eyre!("cannot use --output-file and --in-place at the same time"));
            }
            if in_place && is_stdio(&args.input_file) {
                return Err(eyre!("cannot use --in-place when reading from stdin"));
            }

            let mut atf = atf_loader::load_atf(&args.input_file)?;
            let forest = AllocationForest::from_atf(&atf)?;
            let network = allocate(&mut atf, &forest, within, size, max_prefix_len, description)?;
            info!("Allocated {}", network);

            let output = if in_place { &args.input_file } else { &args.output_file };
            atf_loader::write_output(output, atf_loader::to_yaml(&atf)?.as_bytes())
        }
    }
}

fn validate(input: &Path) -> Result<()> {
    let atf = atf_loader::load_atf(input)?;
    let forest = AllocationForest::from_atf(&atf)?;

    let stats = forest.root().stats();
    info!(
        "{} is valid: {} allocations, {}/{} addresses free in {} blocks",
        atf.superblock,
        forest.root().allocations().len(),
        stats.free_addresses,
        stats.total_addresses,
        stats.free_blocks
    );
    Ok(())
}

fn render(input: &Path, output: &Path, all_blocks: bool, format: RenderFormat) -> Result<()> {
    let atf = atf_loader::load_atf(input)?;
    let forest = AllocationForest::from_atf(&atf)?;

    let mut buffer = Vec::new();
    match format {
        RenderFormat::Markdown => render_markdown(&mut buffer, &atf, &forest, all_blocks)
            .wrap_err("Failed to render markdown")?,
        RenderFormat::Json => {
            render_json(&mut buffer, &atf, &forest, all_blocks).wrap_err("Failed to render json")?
        }
    }

    atf_loader::write_output(output, &buffer)
}

/// Reject sizes the engine should never be asked for
fn check_request_size(parent_prefix: u8, size: u8, max_prefix_len: u8) -> Result<()> {
    if size > max_prefix_len || size <= parent_prefix {
        return Err(eyre!(
            "requested block size is out of range ({} < block <= {})",
            parent_prefix,
            max_prefix_len
        ));
    }
    Ok(())
}

/// Allocate a `/size` network and record it in the table, either at the top
/// level or as a suballocation of `within`.
fn allocate(
    atf: &mut AtfFile,
    forest: &AllocationForest,
    within: Option<Ipv4Net>,
    size: u8,
    max_prefix_len: u8,
    description: String,
) -> Result<Ipv4Net> {
    let Some(parent) = within else {
        let mut pool = forest.root().clone();
        check_request_size(pool.superblock().prefix_len(), size, max_prefix_len)?;
        let network = pool.alloc(size)?;
        atf.allocations.push(Allocation::new(network, description));
        return Ok(network);
    };

    let parent_alloc = atf
        .allocation_mut(&parent)
        .ok_or_else(|| eyre!("{} is not a top-level allocation", parent))?;
    check_request_size(parent.prefix_len(), size, max_prefix_len)?;

    let mut pool = match forest.pool_for(&parent.to_string()) {
        Some(pool) => pool.clone(),
        None => IpNetPool::new(&parent.to_string(), Vec::new())?,
    };
    let network = pool.alloc(size)?;
    parent_alloc.sub_allocations.push(Allocation::new(network, description));
    Ok(network)
}
