use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pyro")]
#[command(about = "Pyro effect-script CLI", long_about = None)]
pub struct Cli {
    /// Show info/debug log output
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile explosion tags and report their program sizes
    Compile {
        /// Class definition file (TOML)
        defs: String,
        /// Explosion table file (TOML)
        explosions: String,
        /// Alias table file (TOML)
        #[arg(long)]
        aliases: Option<String>,
        /// Compile only this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Disassemble the compiled programs of one tag
    Disassemble {
        /// Class definition file (TOML)
        defs: String,
        /// Explosion table file (TOML)
        explosions: String,
        /// Alias table file (TOML)
        #[arg(long)]
        aliases: Option<String>,
        /// Tag to disassemble
        tag: String,
    },
    /// Dump spawnable classes and their configurable fields as JSON
    Classes {
        /// Class definition file (TOML)
        defs: String,
        /// Alias table file (TOML)
        #[arg(long)]
        aliases: Option<String>,
    },
    /// Compile a tag and fire it once, printing every spawned instance
    Fire {
        /// Class definition file (TOML)
        defs: String,
        /// Explosion table file (TOML)
        explosions: String,
        /// Alias table file (TOML)
        #[arg(long)]
        aliases: Option<String>,
        /// Tag to fire
        tag: String,
        /// Damage input
        #[arg(long, default_value_t = 100.0)]
        damage: f32,
        /// Explosion radius
        #[arg(long, default_value_t = 20.0)]
        radius: f32,
        /// Explosion height over the (flat, zero-level) ground
        #[arg(long, default_value_t = 1.0)]
        height: f32,
        /// RNG seed, for reproducible runs
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}
