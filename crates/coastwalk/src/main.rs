//! `coastwalk` - CLI for the coastal walk tracker
//!
//! Every subcommand prints a short status report to stdout; warnings about
//! skipped inputs are logged to stderr.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use coastwalk::cli::{Cli, Command, ConfigCommand};
use coastwalk::map::{Measurement, WalkStatus};
use coastwalk::{
    init_logging, ingest, journal, map, pipeline, toc, Config, ManifestStore, ResolvedPaths,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let load = || load_project(&cli.root, cli.config.clone());

    match cli.command {
        Command::Run(run_cmd) => {
            let (config, paths) = load()?;
            handle_run(&paths, &config, run_cmd.json)
        }
        Command::Ingest(ingest_cmd) => {
            let (_, paths) = load()?;
            handle_ingest(&paths, ingest_cmd.dry_run)
        }
        Command::Journals => {
            let (_, paths) = load()?;
            handle_journals(&paths)
        }
        Command::Toc => {
            let (config, paths) = load()?;
            handle_toc(&paths, &config)
        }
        Command::Map => {
            let (config, paths) = load()?;
            handle_map(&paths, &config)
        }
        Command::Stats(stats_cmd) => {
            let (config, paths) = load()?;
            handle_stats(&paths, &config, stats_cmd.json)
        }
        Command::Config(config_cmd) => handle_config(&cli.root, cli.config.clone(), config_cmd),
    }
}

fn load_project(root: &Path, config_path: Option<PathBuf>) -> anyhow::Result<(Config, ResolvedPaths)> {
    let config = Config::load_from(root, config_path).context("loading configuration")?;
    let paths = config.resolve_paths(root);
    Ok((config, paths))
}

fn handle_run(paths: &ResolvedPaths, config: &Config, json: bool) -> anyhow::Result<()> {
    let report = pipeline::run(paths, config).context("running pipeline")?;

    if json {
        let summary = serde_json::json!({
            "new_walks": report.ingestion.new_walks,
            "new_journals": report.journals.created,
            "toc_added": report.toc.added,
            "map": paths.map_file,
            "stats": report.measurement,
            "fraction": report.measurement.fraction(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_ingestion(report.ingestion.new_walks.len());
    print_journals(&report.journals.created);
    println!(
        "TOC updated. {} new walk(s) added.",
        report.toc.added.len()
    );
    println!();
    print_totals(&report.measurement);
    println!();
    println!("Map saved to {}", paths.map_file.display());

    if !report.ingestion.new_walks.is_empty() {
        println!();
        println!("Newly added GPX walks this run:");
        for walk in &report.ingestion.new_walks {
            println!(" - {}", walk.gpx);
        }
    }
    Ok(())
}

fn handle_ingest(paths: &ResolvedPaths, dry_run: bool) -> anyhow::Result<()> {
    let store = ManifestStore::new(paths);
    let ingestion = ingest::ingest(paths, &store, dry_run).context("ingesting tracks")?;

    if dry_run {
        println!("{} new track file(s) found:", ingestion.new_walks.len());
        for walk in &ingestion.new_walks {
            println!(" - {} ({})", walk.gpx, walk.name);
        }
    } else {
        print_ingestion(ingestion.new_walks.len());
    }
    Ok(())
}

fn handle_journals(paths: &ResolvedPaths) -> anyhow::Result<()> {
    let manifest = ManifestStore::new(paths)
        .load()
        .context("loading manifest")?;
    let report = journal::generate(paths, &manifest).context("creating journals")?;
    let names = journal::write_index(paths).context("writing journal index")?;

    print_journals(&report.created);
    println!(
        "Journal index lists {} file(s): {}",
        names.len(),
        paths.journal_index.display()
    );
    Ok(())
}

fn handle_toc(paths: &ResolvedPaths, config: &Config) -> anyhow::Result<()> {
    let report =
        toc::rebuild(paths, &config.toc.default_region).context("rebuilding table of contents")?;
    println!(
        "{} updated. {} new walk(s) added.",
        paths.toc.display(),
        report.added.len()
    );
    println!(
        "{} region(s), {} walk(s), sorted alphabetically.",
        report.regions, report.walks
    );
    Ok(())
}

fn handle_map(paths: &ResolvedPaths, config: &Config) -> anyhow::Result<()> {
    let manifest = ManifestStore::new(paths)
        .load()
        .context("loading manifest")?;
    let measurement = map::render(paths, config, &manifest, &[]).context("rendering map")?;

    print_totals(&measurement);
    println!();
    println!("Map saved to {}", paths.map_file.display());
    Ok(())
}

fn handle_stats(paths: &ResolvedPaths, config: &Config, json: bool) -> anyhow::Result<()> {
    let manifest = ManifestStore::new(paths)
        .load()
        .context("loading manifest")?;
    let measurement = map::measure(paths, config, &manifest, &HashSet::new());

    if json {
        println!("{}", serde_json::to_string_pretty(&measurement)?);
        return Ok(());
    }

    for walk in &measurement.walks {
        match (&walk.status, walk.distance_km) {
            (WalkStatus::Rendered, Some(km)) => println!("{:>9.2} km  {}", km, walk.name),
            (WalkStatus::MissingTrack, _) => println!("  missing     {}", walk.name),
            (WalkStatus::NoCoordinates, _) => println!("  empty       {}", walk.name),
            _ => println!("  unreadable  {}", walk.name),
        }
    }
    println!();
    print_totals(&measurement);
    Ok(())
}

fn handle_config(root: &Path, config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(root, config_path).context("loading configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let paths = config.resolve_paths(root);
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Paths]");
                println!("  Tracks:         {}", paths.tracks_dir.display());
                println!("  Manifest:       {}", paths.manifest.display());
                println!("  Journals:       {}", paths.journals_dir.display());
                println!("  Journal index:  {}", paths.journal_index.display());
                println!("  TOC:            {}", paths.toc.display());
                println!("  Map:            {}", paths.map_file.display());
                println!();
                println!("[Map]");
                println!(
                    "  Centre:         {}, {}",
                    config.map.center_lat, config.map.center_lon
                );
                println!("  Zoom:           {}", config.map.zoom);
                println!(
                    "  Colours:        new={} known={}",
                    config.map.new_color, config.map.known_color
                );
                println!();
                println!("[Stats]");
                println!("  Coastline (km): {}", config.stats.coastline_km);
                println!();
                println!("[TOC]");
                println!("  Default region: {}", config.toc.default_region);
            }
        }
        ConfigCommand::Path => {
            if let Some(user) = Config::user_config_path() {
                println!("{}", user.display());
            }
            println!(
                "{}",
                config_path
                    .unwrap_or_else(|| Config::project_config_path(root))
                    .display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(|| Config::project_config_path(root));
            println!("Validating configuration: {}", path.display());
            match Config::load_from(root, Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_ingestion(added: usize) {
    if added == 0 {
        println!("No new coastal GPX files found.");
    } else {
        println!("Manifest updated with {added} new coastal GPX file(s).");
    }
}

fn print_journals(created: &[String]) {
    if created.is_empty() {
        println!("No new journal files created (all exist already).");
    } else {
        println!("Created {} new journal file(s):", created.len());
        for name in created {
            println!("   - {name}");
        }
    }
}

fn print_totals(measurement: &Measurement) {
    println!("Total distance walked: {:.2} km", measurement.total_km);
    println!(
        "Fraction of coastline walked: {:.2}%",
        measurement.fraction() * 100.0
    );
    if measurement.skipped() > 0 {
        println!("Skipped {} walk(s) without usable tracks.", measurement.skipped());
    }
}
