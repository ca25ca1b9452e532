use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog slot of the local object catalog
    #[arg(long, global = true, default_value = "ATID")]
    pub slot: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List database drivers usable on this host
    Drivers,

    /// Resolve an object by name
    Name {
        /// Object name or alias
        name: String,

        /// Only ask the local catalog
        #[arg(long, conflicts_with = "remote")]
        local: bool,

        /// Only ask the remote service
        #[arg(long)]
        remote: bool,
    },

    /// Objects within a radius of a position
    Cone {
        /// Right ascension (degrees, or `HH MM SS.sss`)
        ra: String,

        /// Declination (degrees, or `±DD MM SS.ss`)
        #[arg(allow_hyphen_values = true)]
        dec: String,

        /// Radius in degrees
        radius: f64,
    },

    /// Objects inside the box spanned by two opposite corners
    Box {
        /// First corner right ascension
        ra1: String,

        /// First corner declination
        #[arg(allow_hyphen_values = true)]
        dec1: String,

        /// Second corner right ascension
        ra2: String,

        /// Second corner declination
        #[arg(allow_hyphen_values = true)]
        dec2: String,
    },
}
