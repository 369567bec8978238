// src/dispatch/pool.rs
// =============================================================================
// The dispatcher: fans the site list out to one task per site and waits for
// every task to finish.
//
// How it works:
// 1. For each site, take a permit from the limiter (this is where
//    submission stalls once N checks are in flight)
// 2. Resolve the URL and spawn a task that owns the site and the permit,
//    then move on to the next site straight away
// 3. Each task checks its URL, gives the permit back, and sends its line
//    to the result sink
// 4. After the last spawn, wait on the JoinSet until every task is done
//
// Per-site lifecycle (traced):
//   Pending -> Resolved -> Dispatched -> Checking -> Completed
//
// A failing site never affects the others. Its line just reads "NO".
//
// Rust concepts:
// - Arc<dyn Checker>: one checker shared by every task, chosen at runtime
// - JoinSet: a group of spawned tasks we can wait on one by one
// - catch_unwind: turns a panic inside a future into an ordinary value
// =============================================================================

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, error, trace};

use super::{Limiter, Permit};
use crate::checker::{CheckError, CheckOutcome, Checker};
use crate::output::{format_line, LineEmitter};
use crate::sites::Site;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiteState {
    Pending,
    Resolved,
    Dispatched,
    Checking,
    Completed,
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SiteState::Pending => "pending",
            SiteState::Resolved => "resolved",
            SiteState::Dispatched => "dispatched",
            SiteState::Checking => "checking",
            SiteState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Counts for the end-of-run log line. Never printed to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub ok: usize,
    pub no: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} site(s) checked: {} OK, {} NO",
            self.total, self.ok, self.no
        )
    }
}

pub struct Dispatcher {
    checker: Arc<dyn Checker>,
    limiter: Limiter,
    identity: Arc<str>,
}

impl Dispatcher {
    pub fn new(
        checker: Arc<dyn Checker>,
        limiter: Limiter,
        identity: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            checker,
            limiter,
            identity: identity.into(),
        }
    }

    // Checks every site and sends one line per site to `emitter`.
    //
    // Returns only after every spawned task has finished, so every line has
    // been handed to the sink by then.
    pub async fn run(&self, sites: Vec<Site>, emitter: &LineEmitter) -> RunSummary {
        let mut tasks = JoinSet::new();
        let mut summary = RunSummary::default();

        debug!(
            sites = sites.len(),
            concurrency = self.limiter.capacity(),
            "dispatching checks"
        );

        for site in sites {
            trace!(site = site.name(), state = %SiteState::Pending, "site state");
            // Blocks here while `capacity` checks are already running
            let permit = self.limiter.acquire().await;
            trace!(available = self.limiter.available(), "permit acquired");

            let site = site.resolve(&self.identity);
            trace!(
                site = site.name(),
                template = site.url_template(),
                url = site.resolved_url(),
                state = %SiteState::Resolved,
                "site state"
            );

            // Each task gets its own handles; the clones only bump counters
            let checker = Arc::clone(&self.checker);
            let emitter = emitter.clone();
            tasks.spawn(check_site(checker, site, permit, emitter));
            summary.total += 1;
        }

        // Wait on task completion, not on permits: a task returns its permit
        // before it has handed its line to the sink
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => summary.ok += 1,
                Ok(false) => summary.no += 1,
                // Only reachable if the task was cancelled or panicked
                // outside the check itself
                Err(e) => {
                    error!(error = %e, "check task did not complete");
                    summary.no += 1;
                }
            }
        }

        summary
    }
}

// One site, start to finish. Returns whether the site came back OK.
async fn check_site(
    checker: Arc<dyn Checker>,
    site: Site,
    permit: Permit,
    emitter: LineEmitter,
) -> bool {
    trace!(site = site.name(), state = %SiteState::Dispatched, "site state");

    let url = site.resolved_url().to_string();
    trace!(site = site.name(), state = %SiteState::Checking, "site state");
    // A panicking checker still produces a NO line for its site
    let result = match AssertUnwindSafe(checker.check(&url)).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(CheckError::Panicked { url: url.clone() }),
    };
    // Free the slot before waiting on the sink
    drop(permit);

    let outcome = CheckOutcome::new(site, result);
    match outcome.error() {
        // The cause never reaches the result line, only the log
        Some(e) => debug!(site = outcome.site.name(), error = %e, "check failed"),
        None => debug!(
            site = outcome.site.name(),
            url = %url,
            status = outcome.status_code(),
            "checked"
        ),
    }

    emitter.emit(format_line(&outcome)).await;

    trace!(site = outcome.site.name(), state = %SiteState::Completed, "site state");
    outcome.is_ok()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why take the permit before spawning?
//    - The loop waits in `acquire()` whenever every slot is busy
//    - So there are never more than `capacity` tasks doing network work
//    - Spawning first and acquiring inside the task would also cap the
//      checks, but would create one idle task per site up front
//
// 2. What is a JoinSet?
//    - A collection of tasks spawned on the tokio runtime
//    - join_next() returns the next task to finish, in completion order
//    - It returns None once the set is empty, which ends the while loop
//
// 3. What does AssertUnwindSafe do?
//    - catch_unwind only accepts values the compiler trusts after a panic
//    - The checker future does not prove that, so we wrap it and promise
//      we will not look at any half-updated state afterwards
//
// 4. Why is the permit passed into the task?
//    - The task owns it, so it is released when the task drops it
//    - drop(permit) happens on every path, including after a panic
//
// 5. What is `impl Into<Arc<str>>`?
//    - Lets callers pass a &str or a String
//    - Arc<str> is a shared, read-only string: cloning it is cheap
// -----------------------------------------------------------------------------
