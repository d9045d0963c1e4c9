// quick/src/cli/clean.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::Result;

use super::Context;

#[derive(Args, Debug)]
pub struct Clean;

impl Clean {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        ctx.manager()?.clean()?;
        if !ctx.quiet {
            println!("{}", "Removed cached package lists and archives.".green());
        }
        Ok(())
    }
}
