// quick/src/cli/list.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::Result;
use quick_core::ManifestStore;
use terminal_size::{terminal_size, Width};
use tracing::warn;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::info::print_package;
use super::Context;

#[derive(Args, Debug)]
pub struct List;

impl List {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        let store = ManifestStore::new(&ctx.config);
        let names = store.package_names()?;
        if names.is_empty() {
            println!("{}", "The catalog is empty".yellow());
            return Ok(());
        }

        let term_cols = terminal_size()
            .map(|(Width(w), _)| w as usize)
            .unwrap_or(120);

        for name in names {
            let descriptor = match store.load_descriptor(&name) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    continue;
                }
            };
            if ctx.verbose > 0 {
                print_package(&name, &descriptor, None);
                println!();
            } else {
                let room = term_cols.saturating_sub(UnicodeWidthStr::width(name.as_str()) + 3);
                println!(
                    "{} - {}",
                    name.bold(),
                    truncate_vis(&descriptor.description, room)
                );
            }
        }
        Ok(())
    }
}

/// Shortens `s` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_vis(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    let mut w = 0;
    let mut out = String::new();
    let effective_max = if max > 0 { max } else { 1 };

    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw >= effective_max {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push('…');
    out
}
