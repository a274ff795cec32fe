// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Transaction lifecycle orchestrator.
//!
//! Owns the state machine `PENDING_QUEUE -> PENDING_CONFIRMATION ->
//! CONFIRMED | FAILED` (the terminal states are also reachable directly from
//! `PENDING_QUEUE` for chains whose send waits for inclusion). The HTTP
//! layer calls `create`/`get_info`/`list`/`delete`; the queue worker calls
//! `process_submit`/`check_confirmation`; the sweeper calls `sweep`. All
//! record mutation goes through the store's merge path, so late or duplicate
//! writers cannot move a transaction backwards.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chains::{AdapterRegistry, ChainError, TxOutcome};
use crate::codes::ResultCode;
use crate::models::{
    CreateTransactionRequest, SubmitRequest, TransactionPatch, TransactionRecord,
    TransactionStatus,
};
use crate::queue::{Job, QueueHandle, CONFIRMATION_RETRY_DELAY};
use crate::store::{StoreError, TransactionStore};

/// Orchestrator failure surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("transaction not found")]
    NotFound,

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrchestratorError {
    /// The taxonomy code this failure surfaces as.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::NotFound => ResultCode::InvalidRequest,
            Self::Chain(e) => e.code(),
            Self::Store(_) => ResultCode::DatabaseError,
        }
    }
}

/// Coordinates the store, the chain adapters and the job queue.
pub struct Orchestrator {
    store: Arc<TransactionStore>,
    adapters: AdapterRegistry,
    queue: QueueHandle,
}

impl Orchestrator {
    pub fn new(store: Arc<TransactionStore>, adapters: AdapterRegistry, queue: QueueHandle) -> Self {
        Self {
            store,
            adapters,
            queue,
        }
    }

    /// Validate a request, persist the initial record and enqueue the submit
    /// job. Returns the `PENDING_QUEUE` record; the actual send happens on
    /// the worker.
    pub fn create(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<TransactionRecord, OrchestratorError> {
        let request = SubmitRequest::from(req);
        self.adapters.for_network(request.network).validate(&request)?;

        let id = uuid::Uuid::new_v4().to_string();
        let record = TransactionRecord::new_pending(id.clone(), &request);
        self.store.put(record.clone())?;
        self.queue.enqueue(Job::Submit { id: id.clone(), request });

        info!(id = %id, network = %record.network, "Transaction created and queued");
        Ok(record)
    }

    /// Execute a submit job: sign, broadcast and record the outcome.
    ///
    /// The job may be delivered more than once; anything not still in
    /// `PENDING_QUEUE` is skipped, so a duplicate delivery never double-sends.
    pub async fn process_submit(
        &self,
        id: &str,
        request: &SubmitRequest,
    ) -> Result<(), OrchestratorError> {
        let Some(record) = self.store.get(id)? else {
            warn!(id = %id, "Submit job for unknown transaction, skipping");
            return Ok(());
        };
        if record.status != TransactionStatus::PendingQueue {
            debug!(id = %id, status = ?record.status, "Duplicate submit delivery, skipping");
            return Ok(());
        }

        let adapter = self.adapters.for_network(request.network);
        let result = if request.token.is_some() {
            adapter.send_token(request).await
        } else {
            adapter.send_native(request).await
        };

        match result {
            Ok(outcome) => {
                let broadcast_only = outcome.status == TransactionStatus::PendingConfirmation;
                self.apply_outcome(id, outcome)?;
                if broadcast_only {
                    self.queue.enqueue_after(
                        Job::CheckConfirmation {
                            id: id.to_string(),
                            attempt: 1,
                        },
                        CONFIRMATION_RETRY_DELAY,
                    );
                }
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Send failed");
                self.store.update(
                    id,
                    TransactionPatch::status(TransactionStatus::Failed).with_code(e.code()),
                    true,
                )?;
            }
        }
        Ok(())
    }

    /// Execute a check-confirmation job. While the chain has no settled
    /// answer the job re-enqueues itself with the fixed retry delay; lookup
    /// errors count as "not yet confirmed".
    pub async fn check_confirmation(
        &self,
        id: &str,
        attempt: u32,
    ) -> Result<(), OrchestratorError> {
        let Some(record) = self.store.get(id)? else {
            return Ok(());
        };
        if record.status.is_terminal() {
            return Ok(());
        }

        if self.settle_from_chain(&record).await? {
            info!(id = %id, attempt, "Transaction settled");
            return Ok(());
        }

        debug!(id = %id, attempt, "Not yet confirmed, scheduling retry");
        self.queue.enqueue_after(
            Job::CheckConfirmation {
                id: id.to_string(),
                attempt: attempt + 1,
            },
            CONFIRMATION_RETRY_DELAY,
        );
        Ok(())
    }

    /// One sweep pass over every pending-confirmation record. Failures are
    /// isolated per record. Returns how many records the pass settled.
    pub async fn sweep(&self) -> Result<usize, OrchestratorError> {
        let pending = self
            .store
            .scan_by_status(TransactionStatus::PendingConfirmation)?;
        let mut settled = 0;
        for record in pending {
            match self.settle_from_chain(&record).await {
                Ok(true) => settled += 1,
                Ok(false) => {}
                Err(e) => warn!(id = %record.id, error = %e, "Sweep check failed"),
            }
        }
        Ok(settled)
    }

    /// Fetch a transaction, refreshing it from the chain first when it is
    /// still pending and already has a hash. A terminal record is deleted
    /// after the read; its outcome has been delivered.
    pub async fn get_info(&self, id: &str) -> Result<TransactionRecord, OrchestratorError> {
        let Some(mut record) = self.store.get(id)? else {
            return Err(OrchestratorError::NotFound);
        };

        if !record.status.is_terminal() && record.hash.is_some() {
            match self.settle_from_chain(&record).await {
                Ok(true) => {
                    if let Some(updated) = self.store.get(id)? {
                        record = updated;
                    }
                }
                Ok(false) => {}
                Err(e) => debug!(id = %id, error = %e, "On-read chain refresh failed"),
            }
        }

        if record.status.is_terminal() {
            self.store.delete(id)?;
        }
        Ok(record)
    }

    pub fn list_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<TransactionRecord>, OrchestratorError> {
        Ok(self.store.scan_by_status(status)?)
    }

    pub fn delete_by_id(&self, id: &str) -> Result<(), OrchestratorError> {
        if self.store.delete(id)? {
            Ok(())
        } else {
            Err(OrchestratorError::NotFound)
        }
    }

    pub fn delete_by_status(&self, status: TransactionStatus) -> Result<usize, OrchestratorError> {
        Ok(self.store.delete_by_status(status)?)
    }

    /// Ask the chain for the settled outcome of a record's hash and apply it.
    /// Returns whether the record reached a terminal state. A lookup error or
    /// a still-pending answer both read as "not settled".
    async fn settle_from_chain(
        &self,
        record: &TransactionRecord,
    ) -> Result<bool, OrchestratorError> {
        let Some(hash) = record.hash.as_deref() else {
            return Ok(false);
        };
        let adapter = self.adapters.for_network(record.network);
        match adapter.get_transaction(hash, record.network).await {
            Ok(Some(outcome)) if outcome.status.is_terminal() => {
                self.apply_outcome(&record.id, outcome)?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) => {
                debug!(id = %record.id, error = %e, "Chain lookup failed, treating as pending");
                Ok(false)
            }
        }
    }

    /// Merge a chain outcome into the stored record, with the matching
    /// taxonomy code. Failed outcomes take the short-TTL path so they
    /// self-expire.
    fn apply_outcome(&self, id: &str, outcome: TxOutcome) -> Result<(), OrchestratorError> {
        let code = match outcome.status {
            TransactionStatus::Confirmed => ResultCode::TransactionConfirmed,
            TransactionStatus::Failed => ResultCode::TransactionFailed,
            _ => ResultCode::Success,
        };
        let patch = TransactionPatch {
            status: Some(outcome.status),
            hash: Some(outcome.hash),
            code: Some(code),
            gas_used: outcome.gas_used,
            gas_price: outcome.gas_price,
            chain_id: outcome.chain_id,
            data: outcome.data,
        };
        self.store
            .update(id, patch, outcome.status == TransactionStatus::Failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainAdapter;
    use crate::models::{ChainFamily, Credential, NetworkId};
    use crate::queue;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    type SendFn = Box<dyn Fn(&SubmitRequest) -> Result<TxOutcome, ChainError> + Send + Sync>;
    type LookupFn = Box<dyn Fn(&str, usize) -> Result<Option<TxOutcome>, ChainError> + Send + Sync>;

    struct MockAdapter {
        send_calls: AtomicUsize,
        lookup_calls: AtomicUsize,
        send_fn: SendFn,
        lookup_fn: LookupFn,
    }

    impl MockAdapter {
        fn new(send_fn: SendFn, lookup_fn: LookupFn) -> Self {
            Self {
                send_calls: AtomicUsize::new(0),
                lookup_calls: AtomicUsize::new(0),
                send_fn,
                lookup_fn,
            }
        }

        fn confirming() -> Self {
            Self::new(
                Box::new(|_| {
                    Ok(TxOutcome::new("0xhash", TransactionStatus::Confirmed))
                }),
                Box::new(|hash, _| {
                    Ok(Some(TxOutcome::new(hash, TransactionStatus::Confirmed)))
                }),
            )
        }
    }

    #[async_trait]
    impl ChainAdapter for MockAdapter {
        fn family(&self) -> ChainFamily {
            ChainFamily::Evm
        }

        fn validate(&self, req: &SubmitRequest) -> Result<(), ChainError> {
            if req.to == "bogus" {
                return Err(ChainError::InvalidAddress(req.to.clone()));
            }
            Ok(())
        }

        async fn send_native(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            (self.send_fn)(req)
        }

        async fn send_token(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            (self.send_fn)(req)
        }

        async fn get_transaction(
            &self,
            hash: &str,
            _network: NetworkId,
        ) -> Result<Option<TxOutcome>, ChainError> {
            let call = self.lookup_calls.fetch_add(1, Ordering::SeqCst) + 1;
            (self.lookup_fn)(hash, call)
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        adapter: Arc<MockAdapter>,
        store: Arc<TransactionStore>,
        rx: mpsc::UnboundedReceiver<Job>,
    }

    fn harness(adapter: MockAdapter) -> Harness {
        let adapter = Arc::new(adapter);
        let registry = AdapterRegistry::new(adapter.clone(), adapter.clone(), adapter.clone());
        let store = Arc::new(TransactionStore::new());
        let (handle, rx) = queue::channel();
        Harness {
            orchestrator: Orchestrator::new(store.clone(), registry, handle),
            adapter,
            store,
            rx,
        }
    }

    fn create_request(to: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            from: "0x1111111111111111111111111111111111111111".into(),
            to: to.into(),
            amount: "1.5".into(),
            network: NetworkId::Polygon,
            token: None,
            gas: None,
            private_key: Credential::new("k"),
        }
    }

    fn submit_request(to: &str) -> SubmitRequest {
        SubmitRequest::from(create_request(to))
    }

    /// Put a record into `PENDING_CONFIRMATION` with a hash, the state a
    /// broadcast-only send leaves behind.
    fn seed_pending_confirmation(store: &TransactionStore, id: &str, hash: &str) {
        store
            .put(TransactionRecord::new_pending(
                id.to_string(),
                &submit_request("0x2222222222222222222222222222222222222222"),
            ))
            .unwrap();
        store
            .update(
                id,
                TransactionPatch::status(TransactionStatus::PendingConfirmation).with_hash(hash),
                false,
            )
            .unwrap();
    }

    #[tokio::test]
    async fn create_persists_and_enqueues() {
        let mut h = harness(MockAdapter::confirming());
        let record = h
            .orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();

        assert_eq!(record.status, TransactionStatus::PendingQueue);
        assert_eq!(record.code, ResultCode::Success.code());
        assert!(h.store.get(&record.id).unwrap().is_some());
        assert!(matches!(h.rx.recv().await, Some(Job::Submit { id, .. }) if id == record.id));
    }

    #[tokio::test]
    async fn create_rejects_invalid_requests() {
        let h = harness(MockAdapter::confirming());
        let err = h.orchestrator.create(create_request("bogus")).unwrap_err();
        assert_eq!(err.code(), ResultCode::InvalidAddress);
    }

    #[tokio::test]
    async fn submit_settles_the_record() {
        let h = harness(MockAdapter::confirming());
        let record = h
            .orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();

        h.orchestrator
            .process_submit(&record.id, &submit_request(&record.to))
            .await
            .unwrap();

        let stored = h.store.get(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Confirmed);
        assert_eq!(stored.code, ResultCode::TransactionConfirmed.code());
        assert_eq!(stored.hash.as_deref(), Some("0xhash"));
    }

    #[tokio::test]
    async fn duplicate_submit_delivery_is_a_noop() {
        let h = harness(MockAdapter::confirming());
        let record = h
            .orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();
        let request = submit_request(&record.to);

        h.orchestrator
            .process_submit(&record.id, &request)
            .await
            .unwrap();
        h.orchestrator
            .process_submit(&record.id, &request)
            .await
            .unwrap();

        assert_eq!(h.adapter.send_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_send_marks_failed_with_chain_code() {
        let h = harness(MockAdapter::new(
            Box::new(|_| Err(ChainError::Broadcast("nonce too low".into()))),
            Box::new(|_, _| Ok(None)),
        ));
        let record = h
            .orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();

        h.orchestrator
            .process_submit(&record.id, &submit_request(&record.to))
            .await
            .unwrap();

        let stored = h.store.get(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Failed);
        assert_eq!(stored.code, ResultCode::TransactionBroadcastError.code());
    }

    #[tokio::test]
    async fn unknown_token_send_marks_failed() {
        // Token membership is only resolved when the worker sends, so the
        // create succeeds and the record must end up failed with the
        // unsupported-currency code.
        let h = harness(MockAdapter::new(
            Box::new(|req| {
                Err(ChainError::UnsupportedToken {
                    network: req.network,
                    symbol: req.token.clone().unwrap_or_default(),
                })
            }),
            Box::new(|_, _| Ok(None)),
        ));
        let mut create = create_request("0x2222222222222222222222222222222222222222");
        create.token = Some("DOGE".into());
        let record = h.orchestrator.create(create.clone()).unwrap();
        assert_eq!(record.status, TransactionStatus::PendingQueue);

        h.orchestrator
            .process_submit(&record.id, &SubmitRequest::from(create))
            .await
            .unwrap();

        let stored = h.store.get(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Failed);
        assert_eq!(stored.code, ResultCode::UnsupportedCurrency.code());
    }

    #[tokio::test(start_paused = true)]
    async fn broadcast_only_send_schedules_polling() {
        let h = harness(MockAdapter::new(
            Box::new(|_| {
                Ok(TxOutcome::new(
                    "txid",
                    TransactionStatus::PendingConfirmation,
                ))
            }),
            Box::new(|_, _| Ok(None)),
        ));
        let mut rx = h.rx;
        let record = h
            .orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();
        rx.recv().await; // drain the submit job

        h.orchestrator
            .process_submit(&record.id, &submit_request(&record.to))
            .await
            .unwrap();

        let stored = h.store.get(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::PendingConfirmation);
        assert_eq!(stored.hash.as_deref(), Some("txid"));

        // Let the spawned retry sender register its sleep before moving the clock.
        tokio::task::yield_now().await;
        tokio::time::advance(CONFIRMATION_RETRY_DELAY).await;
        tokio::task::yield_now().await;
        assert!(
            matches!(rx.try_recv(), Ok(Job::CheckConfirmation { id, attempt: 1 }) if id == record.id)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn poll_confirms_on_the_fourth_attempt() {
        // Absent three times, settled on the fourth lookup.
        let h = harness(MockAdapter::new(
            Box::new(|_| Err(ChainError::Broadcast("unused".into()))),
            Box::new(|hash, call| {
                if call <= 3 {
                    Ok(None)
                } else {
                    Ok(Some(TxOutcome::new(hash, TransactionStatus::Confirmed)))
                }
            }),
        ));
        let mut rx = h.rx;
        seed_pending_confirmation(&h.store, "tx-1", "txid");

        let mut attempt = 1;
        loop {
            h.orchestrator
                .check_confirmation("tx-1", attempt)
                .await
                .unwrap();
            let stored = h.store.get("tx-1").unwrap().unwrap();
            if stored.status.is_terminal() {
                break;
            }
            // Let the spawned retry sender register its sleep before moving the clock.
            tokio::task::yield_now().await;
            tokio::time::advance(CONFIRMATION_RETRY_DELAY).await;
            tokio::task::yield_now().await;
            match rx.try_recv() {
                Ok(Job::CheckConfirmation { attempt: next, .. }) => attempt = next,
                other => panic!("expected a retry job, got {other:?}"),
            }
        }

        assert_eq!(attempt, 4);
        assert_eq!(h.adapter.lookup_calls.load(Ordering::SeqCst), 4);
        let stored = h.store.get("tx-1").unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Confirmed);
        assert_eq!(stored.code, ResultCode::TransactionConfirmed.code());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_errors_count_as_unconfirmed() {
        let h = harness(MockAdapter::new(
            Box::new(|_| Err(ChainError::Broadcast("unused".into()))),
            Box::new(|_, _| Err(ChainError::Rpc("node down".into()))),
        ));
        let mut rx = h.rx;
        seed_pending_confirmation(&h.store, "tx-1", "txid");

        h.orchestrator.check_confirmation("tx-1", 1).await.unwrap();

        let stored = h.store.get("tx-1").unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::PendingConfirmation);
        // Let the spawned retry sender register its sleep before moving the clock.
        tokio::task::yield_now().await;
        tokio::time::advance(CONFIRMATION_RETRY_DELAY).await;
        tokio::task::yield_now().await;
        assert!(matches!(
            rx.try_recv(),
            Ok(Job::CheckConfirmation { attempt: 2, .. })
        ));
    }

    #[tokio::test]
    async fn sweep_survives_a_failing_lookup() {
        let h = harness(MockAdapter::new(
            Box::new(|_| Err(ChainError::Broadcast("unused".into()))),
            Box::new(|hash, _| {
                if hash == "bad" {
                    Err(ChainError::Rpc("boom".into()))
                } else {
                    Ok(Some(TxOutcome::new(hash, TransactionStatus::Confirmed)))
                }
            }),
        ));
        seed_pending_confirmation(&h.store, "tx-1", "h1");
        seed_pending_confirmation(&h.store, "tx-2", "bad");
        seed_pending_confirmation(&h.store, "tx-3", "h3");

        let settled = h.orchestrator.sweep().await.unwrap();
        assert_eq!(settled, 2);

        assert_eq!(
            h.store.get("tx-1").unwrap().unwrap().status,
            TransactionStatus::Confirmed
        );
        assert_eq!(
            h.store.get("tx-2").unwrap().unwrap().status,
            TransactionStatus::PendingConfirmation
        );
        assert_eq!(
            h.store.get("tx-3").unwrap().unwrap().status,
            TransactionStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn get_info_refreshes_and_deletes_terminal_records() {
        let h = harness(MockAdapter::confirming());
        seed_pending_confirmation(&h.store, "tx-1", "txid");

        let record = h.orchestrator.get_info("tx-1").await.unwrap();
        assert_eq!(record.status, TransactionStatus::Confirmed);

        // The terminal outcome was delivered; the record is gone.
        assert!(matches!(
            h.orchestrator.get_info("tx-1").await,
            Err(OrchestratorError::NotFound)
        ));
    }

    #[tokio::test]
    async fn get_info_keeps_pending_records() {
        let h = harness(MockAdapter::new(
            Box::new(|_| Err(ChainError::Broadcast("unused".into()))),
            Box::new(|_, _| Ok(None)),
        ));
        seed_pending_confirmation(&h.store, "tx-1", "txid");

        let record = h.orchestrator.get_info("tx-1").await.unwrap();
        assert_eq!(record.status, TransactionStatus::PendingConfirmation);
        assert!(h.orchestrator.get_info("tx-1").await.is_ok());
    }

    #[tokio::test]
    async fn delete_round_trip() {
        let h = harness(MockAdapter::confirming());
        let record = h
            .orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();

        h.orchestrator.delete_by_id(&record.id).unwrap();
        assert!(matches!(
            h.orchestrator.delete_by_id(&record.id),
            Err(OrchestratorError::NotFound)
        ));
        assert!(matches!(
            h.orchestrator.get_info(&record.id).await,
            Err(OrchestratorError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_by_status_counts() {
        let h = harness(MockAdapter::confirming());
        seed_pending_confirmation(&h.store, "tx-1", "h1");
        seed_pending_confirmation(&h.store, "tx-2", "h2");

        let removed = h
            .orchestrator
            .delete_by_status(TransactionStatus::PendingConfirmation)
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            h.orchestrator
                .list_by_status(TransactionStatus::PendingConfirmation)
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn worker_drives_a_transaction_end_to_end() {
        let h = harness(MockAdapter::confirming());
        let orchestrator = Arc::new(h.orchestrator);
        let store = h.store;

        let record = orchestrator
            .create(create_request("0x2222222222222222222222222222222222222222"))
            .unwrap();

        let shutdown = tokio_util::sync::CancellationToken::new();
        let worker = queue::QueueProcessor::new(orchestrator.clone(), h.rx);
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        // Give the worker a chance to pick up and run the submit job.
        tokio::time::advance(Duration::from_millis(10)).await;
        tokio::task::yield_now().await;

        let stored = store.get(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Confirmed);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
