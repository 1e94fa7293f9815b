use anyhow::Result;
use clap::Parser;

mod args;
mod commands;
mod defs;
mod logger;
mod stores;

use args::{Cli, Commands};
use commands::{classes, compile, disassemble, fire};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match &cli.command {
        Commands::Compile {
            defs,
            explosions,
            aliases,
            tag,
        } => compile::compile_tags(defs, explosions, aliases.as_deref(), tag.as_deref()),
        Commands::Disassemble {
            defs,
            explosions,
            aliases,
            tag,
        } => disassemble::disassemble_tag(defs, explosions, aliases.as_deref(), tag),
        Commands::Classes { defs, aliases } => classes::dump_classes(defs, aliases.as_deref()),
        Commands::Fire {
            defs,
            explosions,
            aliases,
            tag,
            damage,
            radius,
            height,
            seed,
        } => fire::fire_tag(
            defs,
            explosions,
            aliases.as_deref(),
            tag,
            *damage,
            *radius,
            *height,
            *seed,
        ),
    }
}
