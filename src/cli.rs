// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag can also come from a BEAGLE_* environment variable; a flag on
// the command line wins over the environment.
//
// Example:
//   beagle --user bob --csv sites.csv --concurrency 8
// =============================================================================

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:67.0) Gecko/20100101 Firefox/67.0";

#[derive(Parser, Debug)]
#[command(
    name = "beagle",
    version,
    about = "Check which sites have a profile page for a username",
    long_about = "beagle reads a list of sites from a CSV file, puts the username into each \
                  site's URL template (the `$` placeholder) and prints one line per site: \
                  OK if the URL answered 200, NO otherwise."
)]
pub struct Cli {
    /// Username to search for; replaces `$` in every URL template
    #[arg(short, long, env = "BEAGLE_USER", default_value = "me")]
    pub user: String,

    /// User-Agent header sent with every request
    #[arg(short, long, env = "BEAGLE_AGENT", default_value = DEFAULT_AGENT)]
    pub agent: String,

    /// CSV file with one `name,url` pair per line
    #[arg(long = "csv", env = "BEAGLE_CSV", default_value = "./urls.csv")]
    pub csv: PathBuf,

    /// Maximum number of checks in flight at once (at least 1)
    // `-g`/`--goroutines` are kept so old invocations still work
    #[arg(
        short,
        long,
        alias = "goroutines",
        short_alias = 'g',
        env = "BEAGLE_CONCURRENCY",
        default_value_t = NonZeroUsize::MIN
    )]
    pub concurrency: NonZeroUsize,

    /// Per-request timeout in seconds (at least 1)
    #[arg(
        short,
        long,
        env = "BEAGLE_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Log each check to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
