//! Inspect a Mudlet map file
//!
//! Run with: cargo run --bin mapsnap -- --map <file.dat> [--stats] [--validate]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mapsnap::codec::read_source;
use mapsnap::report::{export_json, fragment, stats, validate};
use mapsnap::{parse_with_timeout, Direction, Document, Error, ParseOptions};

#[derive(Parser)]
#[command(name = "mapsnap")]
#[command(about = "Decode, validate and export Mudlet map files")]
struct Args {
    /// Map file (plain or gzip-compressed)
    #[arg(long)]
    map: PathBuf,
    /// Print map statistics
    #[arg(long)]
    stats: bool,
    /// Check exits and area references
    #[arg(long)]
    validate: bool,
    /// Write the decoded map as JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,
    /// Room to describe the neighborhood of
    #[arg(long)]
    room: Option<i32>,
    /// Neighborhood radius in grid cells
    #[arg(long, default_value_t = 15)]
    radius: i32,
    /// Parse timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
    /// Skip map-level labels and jump to the rooms
    #[arg(long)]
    skip_labels: bool,
    /// Log section and record offsets
    #[arg(long)]
    verbose: bool,
    /// Disable resynchronization after misaligned sections
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut options = ParseOptions::from_env();
    if args.skip_labels {
        options = options.with_skip_labels(true);
    }
    if args.verbose {
        options = options.with_verbose(true);
    }
    if args.strict {
        options = options.strict();
    }

    let default_filter = if options.verbose { "mapsnap=debug" } else { "mapsnap=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let data = read_source(File::open(&args.map).map_err(|e| format!("{}: {e}", args.map.display()))?)?;
    eprintln!("Parsing {} ({} bytes, timeout {}s)", args.map.display(), data.len(), args.timeout);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(parse_with_timeout(data, options, Duration::from_secs(args.timeout)));
    // an abandoned parse may still be running; do not wait for it
    runtime.shutdown_background();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(Error::Timeout { seconds }) => {
            eprintln!("Error: parsing timed out after {seconds}s; the file may be too large or corrupted");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let doc = &outcome.document;
    match &outcome.error {
        None => println!(
            "Map parsed. Version {}, {} rooms, {} areas, {} labels.",
            doc.version,
            doc.rooms.len(),
            doc.areas.len(),
            doc.label_count()
        ),
        Some(err) => {
            eprintln!("Error: {err}");
            eprintln!(
                "Partial map: {} rooms, {} areas decoded before the failure.",
                doc.rooms.len(),
                doc.areas.len()
            );
        }
    }
    if let Some(pos) = outcome.resynced_at {
        eprintln!("Note: resynchronized on room records at offset {pos}; earlier sections may be incomplete.");
    }

    if args.validate {
        print_validation(doc);
    }
    if args.stats {
        print_stats(doc);
    }
    if let Some(path) = &args.dump_json {
        export_json(doc, BufWriter::new(File::create(path)?))?;
        println!("JSON written to {}", path.display());
    }
    if let Some(room_id) = args.room {
        print_fragment(doc, room_id, args.radius);
    }

    if outcome.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_validation(doc: &Document) {
    let issues = validate(doc);
    if issues.is_empty() {
        println!("Validation passed.");
        return;
    }
    println!("{} validation issues:", issues.len());
    for (i, issue) in issues.iter().enumerate() {
        println!("{:4}. {:?}: {}", i + 1, issue.kind, issue.message);
    }
}

fn print_stats(doc: &Document) {
    let s = stats(doc);
    println!("\nMap statistics:");
    println!("  Version:      {}", s.version);
    println!("  Rooms:        {}", s.rooms);
    println!("  Areas:        {}", s.areas);
    println!("  Environments: {}", s.environments);
    println!("  Labels:       {} in {} areas", s.labels, s.labelled_areas);
    println!("  Z levels:     {:?}", s.z_levels);
    if let Some(bb) = s.bounding_box {
        println!(
            "  Bounds:       X({},{}) Y({},{}) Z({},{})",
            bb.min_x, bb.max_x, bb.min_y, bb.max_y, bb.min_z, bb.max_z
        );
    }
    if !doc.areas.is_empty() {
        println!("\nAreas:");
        for area in doc.areas.values() {
            println!("  {:5}: {} ({} rooms)", area.id, area.name, area.rooms.len());
        }
    }
}

fn print_fragment(doc: &Document, room_id: i32, radius: i32) {
    let Some(frag) = fragment(doc, room_id, radius) else {
        eprintln!("Room {room_id} not found");
        return;
    };
    println!("\nRoom {} in {} (area {}), level {}:", frag.center, frag.area_name, frag.area_id, frag.z);
    if let Some(room) = doc.room(room_id) {
        let exits: Vec<&str> = room.active_exits().into_iter().map(Direction::name).collect();
        println!("  Name:  {}", room.name);
        println!("  Exits: {}", exits.join(", "));
        for (command, target) in &room.special_exits {
            println!("         {command} -> {target}");
        }
    }
    println!("  {} rooms and {} labels within radius {radius}", frag.rooms.len(), frag.labels.len());
}
