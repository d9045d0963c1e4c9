// quick/src/cli/installed.rs
use clap::Args;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use quick_common::error::Result;
use quick_common::model::version::installable;
use quick_core::{Ledger, ManifestStore};

use super::info::print_package;
use super::Context;

#[derive(Args, Debug)]
pub struct Installed;

impl Installed {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        let ledger = Ledger::load(&ctx.config.ledger_path, &ctx.config.install_dir)?;
        let records = ledger.all();
        if records.is_empty() {
            if !ctx.quiet {
                println!("{}", "No packages installed".yellow());
            }
            return Ok(());
        }
        let store = ManifestStore::new(&ctx.config);

        if ctx.verbose > 0 {
            for record in &records {
                match store.load_descriptor(&record.name) {
                    Ok(descriptor) => print_package(&record.name, &descriptor, Some(&record.version)),
                    Err(_) => {
                        println!("{} {}", "Package:".bold(), record.name.green());
                        println!("{} {}", "Version:".bold(), record.version);
                    }
                }
                println!(
                    "{} {}",
                    "Location:".bold(),
                    record.install_dir.display()
                );
                println!();
            }
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        for record in &records {
            let newer = store
                .load_descriptor(&record.name)
                .ok()
                .filter(|d| installable(record.version.as_str(), d.version.as_str()))
                .map(|d| format!("({} available)", d.version))
                .unwrap_or_default();
            table.add_row(Row::new(vec![
                Cell::new(&record.name).style_spec("Fb"),
                Cell::new(record.version.as_str()),
                Cell::new(&newer).style_spec("Fy"),
            ]));
        }
        table.printstd();
        Ok(())
    }
}
