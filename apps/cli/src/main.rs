#![deny(warnings)]

//! Text front end for the farmland planner: interactive menus, or a single
//! calculation driven by flags.

use anyhow::{bail, Context, Result};
use farm_core::{Catalog, CropId, InputLimits, SoilId, REFERENCE_DATA_VERSION};
use std::io::{self, IsTerminal, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod menu;
mod render;

use render::Palette;

#[derive(Debug, Default, PartialEq)]
struct Args {
    catalog: Option<String>,
    crop: Option<String>,
    soil: Option<String>,
    population: Option<i64>,
    days: Option<i64>,
    json: bool,
    list: bool,
    no_color: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut it: I) -> Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--catalog" => args.catalog = it.next(),
            "--crop" => args.crop = it.next(),
            "--soil" => args.soil = it.next(),
            "--population" => args.population = parse_int(&arg, it.next())?,
            "--days" => args.days = parse_int(&arg, it.next())?,
            "--json" => args.json = true,
            "--list" => args.list = true,
            "--no-color" => args.no_color = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn parse_int(flag: &str, value: Option<String>) -> Result<Option<i64>> {
    let value = value.with_context(|| format!("{flag} needs a value"))?;
    let n = value
        .parse::<i64>()
        .with_context(|| format!("{flag} expects an integer, got {value:?}"))?;
    Ok(Some(n))
}

impl Args {
    fn wants_single_run(&self) -> bool {
        self.crop.is_some() || self.soil.is_some() || self.population.is_some() || self.days.is_some()
    }
}

fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    match path {
        Some(p) => farm_catalog::load_catalog_file(p)
            .with_context(|| format!("loading catalog {p}")),
        None => Ok(Catalog::reference()),
    }
}

fn single_run(args: &Args, catalog: &Catalog, palette: Palette) -> Result<()> {
    let limits = InputLimits::default();
    let (Some(crop), Some(soil), Some(population), Some(days)) =
        (&args.crop, &args.soil, args.population, args.days)
    else {
        bail!("--crop, --soil, --population and --days must be given together");
    };
    let population = limits.population(population)?;
    let days = limits.growing_days(days)?;
    let result = farm_calc::calculate_by_id(
        catalog,
        &CropId::new(crop.as_str()),
        &SoilId::new(soil.as_str()),
        population,
        days,
    )?;
    info!(tiles = result.tiles, layout = %result.layout, "calculation done");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &result)?;
        writeln!(out)?;
    } else {
        render::write_result(&mut out, &result, population, palette)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(?args, "starting CLI");

    let catalog = load_catalog(args.catalog.as_deref())?;
    let palette = Palette {
        color: !args.no_color
            && !args.json
            && std::env::var_os("NO_COLOR").is_none()
            && io::stdout().is_terminal(),
    };

    if args.list {
        render::write_catalog(&mut io::stdout().lock(), &catalog, palette)?;
        return Ok(());
    }
    if args.wants_single_run() {
        return single_run(&args, &catalog, palette);
    }

    println!("{}", palette.heading("=== Colony farm planner ==="));
    println!(
        "{}",
        palette.note(&format!(
            "data version {} | build {} ({})",
            REFERENCE_DATA_VERSION,
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        ))
    );
    let stdin = io::stdin();
    menu::Session::new(
        &catalog,
        InputLimits::default(),
        stdin.lock(),
        io::stdout().lock(),
        palette,
    )
    .run()
}
