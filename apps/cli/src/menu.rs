//! Interactive text menus.
//!
//! Reads from any `BufRead` so sessions can be scripted in tests. End of
//! input at any prompt ends the session.

use anyhow::Result;
use farm_core::{Catalog, InputLimits, ValidationError};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::render::{write_result, Palette};

pub struct Session<'a, R, W> {
    catalog: &'a Catalog,
    limits: InputLimits,
    input: R,
    out: W,
    palette: Palette,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(catalog: &'a Catalog, limits: InputLimits, input: R, out: W, palette: Palette) -> Self {
        Self {
            catalog,
            limits,
            input,
            out,
            palette,
        }
    }

    /// Main menu loop: calculate or exit.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", self.palette.heading("=== Main menu ==="))?;
            writeln!(self.out, "1. Plan a farm")?;
            writeln!(self.out, "2. Exit")?;
            let Some(choice) = self.prompt_number("Choose an option: ", |v| {
                if v == 1 || v == 2 {
                    Ok(v as u32)
                } else {
                    Err(ValidationError::OutOfRange {
                        field: "option",
                        value: v,
                        min: 1,
                        max: 2,
                    })
                }
            })?
            else {
                return Ok(());
            };
            if choice == 2 {
                writeln!(self.out, "Goodbye!")?;
                return Ok(());
            }
            if !self.plan_once()? {
                return Ok(());
            }
            writeln!(self.out, "Press Enter to return to the main menu...")?;
            if self.read_line()?.is_none() {
                return Ok(());
            }
        }
    }

    /// One calculation. Returns `false` if input ran out.
    fn plan_once(&mut self) -> Result<bool> {
        let limits = self.limits.clone();
        let pop_prompt = format!(
            "Number of colonists ({}-{}): ",
            limits.population.start(),
            limits.population.end()
        );
        let Some(population) = self.prompt_number(&pop_prompt, |v| limits.population(v))? else {
            return Ok(false);
        };
        let days_prompt = format!(
            "Growing season in days ({}-{}): ",
            limits.growing_days.start(),
            limits.growing_days.end()
        );
        let Some(days) = self.prompt_number(&days_prompt, |v| limits.growing_days(v))? else {
            return Ok(false);
        };

        let catalog = self.catalog;
        let crop_names: Vec<&str> = catalog.crops.iter().map(|c| c.name.as_str()).collect();
        let Some(crop) = self.choose("Choose a crop", &crop_names)? else {
            return Ok(false);
        };
        let soil_names: Vec<&str> = catalog.soils.iter().map(|s| s.name.as_str()).collect();
        let Some(soil) = self.choose("Choose a soil", &soil_names)? else {
            return Ok(false);
        };

        let crop = &catalog.crops[crop];
        let soil = &catalog.soils[soil];
        debug!(crop = %crop.id.0, soil = %soil.id.0, population, days, "menu calculation");
        match farm_calc::calculate(catalog, crop, soil, population, days) {
            Ok(result) => write_result(&mut self.out, &result, population, self.palette)?,
            Err(e) => writeln!(self.out, "{}", self.palette.bad(&format!("Error: {e}")))?,
        }
        Ok(true)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt until `check` accepts a number.
    fn prompt_number<F>(&mut self, prompt: &str, check: F) -> Result<Option<u32>>
    where
        F: Fn(i64) -> Result<u32, ValidationError>,
    {
        loop {
            write!(self.out, "{prompt}")?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.parse::<i64>() {
                Ok(v) => match check(v) {
                    Ok(v) => return Ok(Some(v)),
                    Err(e) => writeln!(self.out, "{}", self.palette.bad(&format!("Error: {e}")))?,
                },
                Err(_) => writeln!(self.out, "{}", self.palette.bad("Error: please enter a number"))?,
            }
        }
    }

    /// Numbered menu; returns the zero-based index picked.
    fn choose(&mut self, title: &str, items: &[&str]) -> Result<Option<usize>> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.palette.heading(&format!("=== {title} ===")))?;
        for (i, name) in items.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, name)?;
        }
        let max = items.len() as i64;
        let picked = self.prompt_number("Enter a number: ", |v| {
            if (1..=max).contains(&v) {
                Ok(v as u32)
            } else {
                Err(ValidationError::OutOfRange {
                    field: "choice",
                    value: v,
                    min: 1,
                    max: max as u32,
                })
            }
        })?;
        Ok(picked.map(|v| v as usize - 1))
    }
}
