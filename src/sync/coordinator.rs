//! Sync coordinator
//!
//! Chains the pipeline for one run:
//! 1. Acquire a session (or reuse the one supplied)
//! 2. Fetch and parse the Redconar provider listing
//! 3. Read the local provider table
//! 4. Reconcile by CUIT
//! 5. Link the matches in one batch
//!
//! Every network call is attempted once. The single exception: a reused
//! session that turns out to be expired is replaced by a fresh login and the
//! listing is fetched one more time.

use crate::config::{Config, Credentials};
use crate::output::SyncReport;
use crate::portal::{build_http_client, ProviderFetcher, SessionAcquirer, SessionToken};
use crate::reconcile::{reconcile, ReconciliationResult};
use crate::storage::{ProviderStore, RunCounts, RunStatus};
use crate::sync::linker::{apply_links, LinkError};
use crate::{FetchError, SyncError};

/// Options for a single sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Previously acquired session to reuse instead of logging in
    pub session: Option<SessionToken>,

    /// Reconcile and report without writing links
    pub dry_run: bool,

    /// Hash of the configuration, recorded with the run
    pub config_hash: String,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct SyncOutcome {
    pub run_id: i64,
    pub result: ReconciliationResult,
    pub linked: usize,
    /// Set when the batch link failed; `linked` is then 0
    pub link_error: Option<LinkError>,
    /// Session used for the listing, returned so callers can reuse it
    pub session: SessionToken,
}

impl SyncOutcome {
    /// Number of providers that failed to link
    pub fn link_errors(&self) -> usize {
        self.link_error.as_ref().map(LinkError::attempted).unwrap_or(0)
    }

    pub fn counts(&self) -> RunCounts {
        RunCounts {
            linked: self.linked as u64,
            link_errors: self.link_errors() as u64,
            new_in_remote: self.result.new_in_remote.len() as u64,
            missing_in_remote: self.result.missing_in_remote.len() as u64,
            total_local: self.result.stats.local_total as u64,
            total_remote: self.result.stats.remote_total as u64,
        }
    }

    /// The one-line machine-readable summary
    pub fn report(&self) -> SyncReport {
        SyncReport {
            linked: self.linked,
            link_errors: self.link_errors(),
            new_in_remote: self.result.new_in_remote.len(),
            missing_in_remote: self.result.missing_in_remote.len(),
            total_local: self.result.stats.local_total,
            total_remote: self.result.stats.remote_total,
            session_id: self.session.to_string(),
        }
    }
}

/// Logs into the portal once and returns the session
pub async fn acquire_session(
    config: &Config,
    credentials: &Credentials,
) -> Result<SessionToken, SyncError> {
    let client = build_http_client(&config.http)?;
    let acquirer = SessionAcquirer::new(client, &config.portal, credentials.clone());
    Ok(acquirer.acquire().await?)
}

/// Runs one full reconciliation against `store`
///
/// The run is recorded in the store's run history, as failed when any step
/// returns an error. A failed batch link does not fail the run; it is
/// reported through [`SyncOutcome::link_error`].
///
/// # Returns
///
/// * `Ok(SyncOutcome)` - The run completed (links may still have failed)
/// * `Err(SyncError)` - Login, listing or store access failed
pub async fn run_sync<S: ProviderStore + ?Sized>(
    config: &Config,
    credentials: &Credentials,
    store: &mut S,
    options: SyncOptions,
) -> Result<SyncOutcome, SyncError> {
    let run_id = store.start_run(&options.config_hash)?;
    tracing::info!("Sync run {} started", run_id);

    match sync_once(config, credentials, &mut *store, options, run_id).await {
        Ok(outcome) => {
            let link_error = outcome.link_error.as_ref().map(|e| e.to_string());
            store.finish_run(
                run_id,
                RunStatus::Completed,
                Some(outcome.counts()),
                link_error.as_deref(),
            )?;
            tracing::info!(
                "Sync run {} completed: {} linked, {} new in Redconar, {} missing in Redconar",
                run_id,
                outcome.linked,
                outcome.result.new_in_remote.len(),
                outcome.result.missing_in_remote.len()
            );
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Sync run {} failed: {}", run_id, e);
            if let Err(record_err) =
                store.finish_run(run_id, RunStatus::Failed, None, Some(&e.to_string()))
            {
                tracing::warn!("Could not record failure of run {}: {}", run_id, record_err);
            }
            Err(e)
        }
    }
}

async fn sync_once<S: ProviderStore + ?Sized>(
    config: &Config,
    credentials: &Credentials,
    store: &mut S,
    options: SyncOptions,
    run_id: i64,
) -> Result<SyncOutcome, SyncError> {
    let client = build_http_client(&config.http)?;
    let acquirer = SessionAcquirer::new(client.clone(), &config.portal, credentials.clone());
    let fetcher = ProviderFetcher::new(client, &config.portal, credentials.username.clone());
    let anchor_id = config.portal.anchor_id.as_str();

    let (mut session, reused) = match options.session {
        Some(token) => {
            tracing::info!("Reusing supplied portal session");
            (token, true)
        }
        None => (acquirer.acquire().await?, false),
    };

    let first_attempt = fetcher.fetch(&session, anchor_id).await;
    let remote = match first_attempt {
        Err(FetchError::SessionExpired) if reused => {
            tracing::warn!("Supplied session expired; logging in again");
            session = acquirer.acquire().await?;
            fetcher.fetch(&session, anchor_id).await?
        }
        other => other?,
    };

    let local = store.list_providers()?;
    tracing::info!("{} providers in the local table", local.len());

    let result = reconcile(&local, &remote);

    let (linked, link_error) = if options.dry_run {
        tracing::info!(
            "Dry run: {} providers would be linked",
            result.to_link.len()
        );
        (0, None)
    } else {
        match apply_links(&mut *store, &result.to_link) {
            Ok(outcome) => (outcome.linked, None),
            Err(e) => (0, Some(e)),
        }
    };

    if !result.to_update.is_empty() {
        tracing::warn!(
            "{} linked providers have a different Redconar id upstream",
            result.to_update.len()
        );
    }

    Ok(SyncOutcome {
        run_id,
        result,
        linked,
        link_error,
        session,
    })
}
