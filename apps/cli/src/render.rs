//! Plain-text rendering of catalogs and farm results.

use crossterm::style::{style, Stylize};
use farm_calc::{Cell, FarmResult, Layout};
use farm_core::Catalog;
use std::io::{self, Write};

/// Grids wider or taller than this are summarized instead of drawn.
pub const MAX_GRID_SIDE: u64 = 40;
const BAR_WIDTH: usize = 20;

/// Terminal colors, or none when output is piped or `NO_COLOR` is set.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub color: bool,
}

impl Palette {
    pub fn heading(&self, s: &str) -> String {
        if self.color {
            style(s).cyan().bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn value(&self, s: &str) -> String {
        if self.color {
            style(s).white().bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn good(&self, s: &str) -> String {
        if self.color {
            style(s).green().bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn bad(&self, s: &str) -> String {
        if self.color {
            style(s).red().bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn note(&self, s: &str) -> String {
        if self.color {
            style(s).magenta().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Draw a layout as rows of `#` (planted) and `.` (buffer).
///
/// Returns `None` when there is nothing to draw or the grid is too large.
pub fn layout_grid(layout: &Layout) -> Option<String> {
    let (width, height) = layout.dimensions()?;
    if width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
        return None;
    }
    let mut out = String::new();
    for (i, cell) in layout.cells().enumerate() {
        out.push(match cell {
            Cell::Planted(_) => '#',
            Cell::Buffer => '.',
        });
        if (i as u64 + 1) % width == 0 {
            out.push('\n');
        }
    }
    Some(out)
}

/// A fixed-width bar for a percentage in `[0, 100]`.
pub fn coverage_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// List crops, soils and meals the way the menus number them.
pub fn write_catalog<W: Write>(out: &mut W, catalog: &Catalog, p: Palette) -> io::Result<()> {
    writeln!(out, "{}", p.heading("=== Crops ==="))?;
    for (i, c) in catalog.crops.iter().enumerate() {
        writeln!(
            out,
            "{}. {} ({}) sensitivity {} base yield {}",
            i + 1,
            c.name,
            c.id.0,
            c.fertility_sensitivity,
            c.base_yield
        )?;
    }
    writeln!(out, "{}", p.heading("=== Soils ==="))?;
    for (i, s) in catalog.soils.iter().enumerate() {
        writeln!(out, "{}. {} ({}) fertility {}", i + 1, s.name, s.id.0, s.fertility)?;
    }
    writeln!(out, "{}", p.heading("=== Meals ==="))?;
    for m in &catalog.meals {
        writeln!(out, "- {}: {} in, {} out", m.name, m.input, m.output)?;
    }
    Ok(())
}

/// Print a farm result for a colony of `population`.
pub fn write_result<W: Write>(
    out: &mut W,
    result: &FarmResult,
    population: u32,
    p: Palette,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", p.heading("=== Farm plan ==="))?;
    writeln!(out, "Crop: {}", p.value(&result.crop_name))?;
    writeln!(out, "Soil: {}", p.value(&result.soil_name))?;
    writeln!(out, "Harvests per season: {}", p.value(&result.harvests.to_string()))?;
    writeln!(
        out,
        "Tiles required: {} (includes 5% margin)",
        p.value(&result.tiles.to_string())
    )?;
    writeln!(out, "Recommended layout: {}", p.value(&result.layout.to_string()))?;
    writeln!(
        out,
        "Total yield: {} units",
        p.value(&format!("{:.0}", result.annual_yield))
    )?;

    match layout_grid(&result.layout) {
        Some(grid) => {
            writeln!(out)?;
            write!(out, "{grid}")?;
            if result.layout.unused_cells() > 0 {
                writeln!(
                    out,
                    "'.' marks {} buffer cells; only {} tiles need planting.",
                    result.layout.unused_cells(),
                    result.tiles
                )?;
            }
        }
        None if result.layout != Layout::NotNeeded => {
            writeln!(out, "(grid too large to draw)")?;
        }
        None => {}
    }

    writeln!(out)?;
    writeln!(out, "{}", p.heading("=== Meal production ==="))?;
    for (name, stats) in &result.meals {
        let status = if stats.is_sufficient(population) {
            p.good("sufficient")
        } else {
            p.bad("insufficient")
        };
        let percent = stats.coverage_percent(population);
        writeln!(out)?;
        writeln!(out, "{name} {status}")?;
        writeln!(
            out,
            "  {} {}/{} colonists ({:.1}%)",
            coverage_bar(percent),
            stats.supported_population,
            population,
            percent
        )?;
        writeln!(out, "  Total per year: {} meals", stats.total_meals)?;
        writeln!(out, "  Daily average: {} meals/day", stats.daily_meals)?;
        writeln!(out, "  Feeds: {} colonists", stats.supported_population)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", p.note("Notes"))?;
    writeln!(out, "{}", p.note("- Layouts favor near-square fields over minimal waste."))?;
    writeln!(out, "{}", p.note("- Tile counts include a 5% yield margin against losses."))?;
    writeln!(out, "{}", p.note("- Meal output assumes nothing is wasted in the kitchen."))?;
    Ok(())
}
