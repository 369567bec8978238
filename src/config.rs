// src/config.rs
// =============================================================================
// The settings one run needs, in typed form.
//
// The CLI layer produces a `RunConfig`; nothing past this point looks at
// raw flags or environment variables.
// =============================================================================

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Substituted into each URL's placeholder
    pub identity: String,
    /// Sent as the User-Agent on every request
    pub user_agent: String,
    pub concurrency: NonZeroUsize,
    pub site_list: PathBuf,
    pub request_timeout: Duration,
    pub verbose: bool,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        Self {
            identity: cli.user,
            user_agent: cli.agent,
            concurrency: cli.concurrency,
            site_list: cli.csv,
            request_timeout: Duration::from_secs(cli.timeout),
            verbose: cli.verbose,
        }
    }
}
