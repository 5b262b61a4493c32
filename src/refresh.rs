//! The single-flight refresh coordinator.
//!
//! At most one refresh exchange exists per process at any instant. The first
//! caller to discover an expired access credential claims the exchange;
//! every other caller that fails for the same reason while it is outstanding
//! is queued and receives the exchange's outcome. Claiming is one locked
//! section ("check flag, mark flag, append to queue"), so the decision stays
//! correct under preemptive threading, not just on a cooperative event loop.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::session::SessionGuard;
use crate::signals::CredentialSink;
use crate::store::{CredentialSlot, CredentialStore};
use crate::transport::{ApiRequest, Transport};

/// Wire shape of a successful refresh exchange.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialPair {
    access_token: String,
    refresh_token: String,
}

/// The process-wide refresh state: the in-flight flag plus the ordered
/// waiter queue. Invariant: the queue is non-empty only while the flag is
/// set, and the flag drops only after every waiter has been settled exactly
/// once.
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Result<String, ApiError>>>,
}

/// What a caller became when it hit the expired-credential path.
enum Claim {
    /// This caller performs the exchange.
    Refresher,
    /// Another exchange is outstanding; this caller shares its outcome.
    Waiter(oneshot::Receiver<Result<String, ApiError>>),
}

pub struct RefreshCoordinator {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    sink: Arc<dyn CredentialSink>,
    session: Arc<SessionGuard>,
    refresh_path: String,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        sink: Arc<dyn CredentialSink>,
        session: Arc<SessionGuard>,
        refresh_path: impl Into<String>,
    ) -> Self {
        RefreshCoordinator {
            transport,
            store,
            sink,
            session,
            refresh_path: refresh_path.into(),
            state: Mutex::new(RefreshState {
                refreshing: false,
                waiters: Vec::new(),
            }),
        }
    }

    /// Entry point for a request that failed with an expired access
    /// credential. Resolves to the fresh access credential once a refresh
    /// exchange (this caller's or an already outstanding one) concludes.
    pub async fn refreshed_access_token(&self) -> Result<String, ApiError> {
        match self.claim().await {
            Claim::Waiter(rx) => {
                debug!("refresh already in flight, queueing behind it");
                match rx.await {
                    Ok(outcome) => outcome,
                    // The refresher can only drop the sender by panicking;
                    // treat it like a dead session.
                    Err(_) => Err(ApiError::SessionExpired),
                }
            }
            Claim::Refresher => {
                let outcome = self.perform_exchange().await;
                if outcome.is_err() {
                    self.session.terminate().await;
                }
                self.settle(&outcome).await;
                outcome
            }
        }
    }

    /// The indivisible Idle -> Refreshing transition. Exactly one caller
    /// observes `refreshing == false` and becomes the refresher; everyone
    /// else is appended to the queue inside the same critical section.
    async fn claim(&self) -> Claim {
        let mut state = self.state.lock().await;
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Claim::Waiter(rx)
        } else {
            state.refreshing = true;
            Claim::Refresher
        }
    }

    /// One refresh exchange, authorized with the refresh credential as an
    /// explicit header (the outbound attachment step is bypassed). On
    /// success both credentials are stored and the new access credential is
    /// broadcast before anyone gets to see it.
    async fn perform_exchange(&self) -> Result<String, ApiError> {
        let Some(refresh_token) = self.store.get(CredentialSlot::Refresh).await else {
            warn!("access credential expired but no refresh credential stored, forcing re-authentication");
            return Err(ApiError::SessionExpired);
        };

        info!("access credential expired, starting refresh exchange");
        let request = ApiRequest::post(&self.refresh_path).with_bearer(&refresh_token);

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("refresh exchange never reached the server: {}", e);
                return Err(ApiError::RefreshFailed(Box::new(ApiError::Network(e))));
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "refresh exchange rejected by the server");
            return Err(ApiError::RefreshFailed(Box::new(ApiError::from_response(
                &response,
            ))));
        }

        let pair: CredentialPair = response.json().map_err(|e| {
            error!("refresh exchange returned an unreadable body: {}", e);
            ApiError::RefreshFailed(Box::new(ApiError::InvalidBody(e.to_string())))
        })?;

        self.store
            .set(CredentialSlot::Access, &pair.access_token)
            .await;
        self.store
            .set(CredentialSlot::Refresh, &pair.refresh_token)
            .await;
        self.sink.publish(&pair.access_token).await;
        info!("refresh exchange succeeded, credentials rotated");

        Ok(pair.access_token)
    }

    /// Completes every queued waiter (in enqueue order) with the exchange
    /// outcome, then returns to Idle. Each waiter is completed exactly once;
    /// one whose caller lost interest has dropped its receiver and is
    /// skipped by the failed send.
    async fn settle(&self, outcome: &Result<String, ApiError>) {
        let mut state = self.state.lock().await;
        for waiter in state.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
        state.refreshing = false;
    }
}
