// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! In-process job queue driving the transaction pipeline.
//!
//! Two job kinds flow through one unbounded channel: **submit** (sign and
//! broadcast a created transaction) and **check-confirmation** (poll a
//! broadcast transaction until the chain settles it). The worker consumes
//! jobs strictly in arrival order; delayed delivery is a spawned sleep in
//! front of the send, so a retry never blocks the worker.
//!
//! A separate sweep loop re-checks every `PENDING_CONFIRMATION` record on a
//! fixed interval, catching transactions whose retry chain was lost (process
//! restart, dropped job). Both loops shut down through a
//! `CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::SubmitRequest;
use crate::orchestrator::Orchestrator;

/// Delay between confirmation polls for one transaction.
pub const CONFIRMATION_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Interval between sweeps over all pending-confirmation records.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A unit of asynchronous transaction work.
#[derive(Debug)]
pub enum Job {
    /// Sign and broadcast the transaction created under `id`.
    Submit { id: String, request: SubmitRequest },
    /// Poll the chain for the settled outcome of a broadcast transaction.
    CheckConfirmation { id: String, attempt: u32 },
}

/// Create a connected queue handle/receiver pair.
pub fn channel() -> (QueueHandle, mpsc::UnboundedReceiver<Job>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueHandle { tx }, rx)
}

/// Cheap cloneable producer side of the job queue.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl QueueHandle {
    /// Enqueue a job for immediate processing.
    pub fn enqueue(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("Job queue is closed, dropping job");
        }
    }

    /// Enqueue a job after a delay without blocking the caller.
    pub fn enqueue_after(&self, job: Job, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(job).is_err() {
                debug!("Job queue closed before delayed job fired");
            }
        });
    }
}

/// Worker loop consuming the job queue.
pub struct QueueProcessor {
    orchestrator: Arc<Orchestrator>,
    rx: mpsc::UnboundedReceiver<Job>,
}

impl QueueProcessor {
    pub fn new(orchestrator: Arc<Orchestrator>, rx: mpsc::UnboundedReceiver<Job>) -> Self {
        Self { orchestrator, rx }
    }

    /// Run the worker until the queue closes or shutdown is requested.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(processor.run(shutdown.clone()));
    /// ```
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Transaction queue worker starting");
        loop {
            tokio::select! {
                job = self.rx.recv() => {
                    match job {
                        Some(job) => self.handle(job).await,
                        None => {
                            info!("Job queue closed, worker stopping");
                            return;
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Transaction queue worker shutting down");
                    return;
                }
            }
        }
    }

    async fn handle(&self, job: Job) {
        match job {
            Job::Submit { id, request } => {
                if let Err(e) = self.orchestrator.process_submit(&id, &request).await {
                    warn!(id = %id, error = %e, "Submit job failed");
                }
            }
            Job::CheckConfirmation { id, attempt } => {
                if let Err(e) = self.orchestrator.check_confirmation(&id, attempt).await {
                    warn!(id = %id, attempt, error = %e, "Confirmation check failed");
                }
            }
        }
    }
}

/// Periodic sweep over all pending-confirmation records.
pub struct Sweeper {
    orchestrator: Arc<Orchestrator>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            interval: SWEEP_INTERVAL,
        }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Confirmation sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.cancelled() => {
                    info!("Confirmation sweeper shutting down");
                    return;
                }
            }

            match self.orchestrator.sweep().await {
                Ok(settled) if settled > 0 => {
                    info!(settled, "Sweep settled pending transactions");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Sweep pass failed"),
            }
        }
    }
}
