//! The access layer entry point: outbound credential attachment, failure
//! routing, and replay after a transparent refresh.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::classify::{classify, FailureKind};
use crate::config::{ApiConfig, ConfigV1, RouteConfig};
use crate::error::ApiError;
use crate::refresh::RefreshCoordinator;
use crate::session::SessionGuard;
use crate::signals::{CredentialSink, Navigator};
use crate::store::{create_store, CredentialSlot, CredentialStore};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// The client every outgoing application request goes through.
///
/// A successful transparent refresh is invisible to the caller: the request
/// resolves with its replayed response. Every failure the layer cannot
/// resolve is propagated unchanged after its side effects (verification
/// redirect, session termination, logging) have run.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    session: Arc<SessionGuard>,
    coordinator: Arc<RefreshCoordinator>,
    routes: RouteConfig,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        sink: Arc<dyn CredentialSink>,
        navigator: Arc<dyn Navigator>,
        api: &ApiConfig,
        routes: RouteConfig,
    ) -> Self {
        let session = Arc::new(SessionGuard::new(
            store.clone(),
            navigator.clone(),
            routes.clone(),
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(
            transport.clone(),
            store.clone(),
            sink,
            session.clone(),
            api.refresh_path.clone(),
        ));

        ApiClient {
            transport,
            store,
            navigator,
            session,
            coordinator,
            routes,
        }
    }

    /// Wires the reqwest transport and the configured store backend. The
    /// navigation capability and the credential sink come from the host
    /// application (keep a handle on the sink to subscribe to rotations).
    pub fn from_config(
        config: &ConfigV1,
        navigator: Arc<dyn Navigator>,
        sink: Arc<dyn CredentialSink>,
    ) -> Self {
        let transport = Arc::new(HttpTransport::new(&config.api));
        let store = create_store(&config.store);
        Self::new(
            transport,
            store,
            sink,
            navigator,
            &config.api,
            config.routes.clone(),
        )
    }

    /// Sends a request through the access layer.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        loop {
            self.attach_credential(&mut request).await;

            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(e) => {
                    error!(path = request.path(), "network failure: {}", e);
                    return Err(e.into());
                }
            };

            if response.status().is_success() {
                return Ok(response);
            }

            match classify(&response) {
                FailureKind::UnverifiedAccount { verify_token } => {
                    if let Some(token) = verify_token {
                        self.store.set(CredentialSlot::VerifyAccount, &token).await;
                    }
                    warn!(
                        path = request.path(),
                        "account not verified, redirecting to verification"
                    );
                    self.navigator.go(&self.routes.verify_account);
                    return Err(ApiError::from_response(&response));
                }
                FailureKind::ExpiredAccess if !request.retried() => {
                    // Spend the retry budget before anything else, so this
                    // request can never be queued a second time.
                    request.mark_retried();
                    let token = self.coordinator.refreshed_access_token().await?;
                    request.set_bearer(&token);
                    debug!(path = request.path(), "replaying request after refresh");
                }
                FailureKind::ExpiredAccess | FailureKind::OtherUnauthorized => {
                    // A second expiry after a successful refresh lands here
                    // too: the retry budget is spent and the session is over.
                    warn!(
                        status = %response.status(),
                        path = request.path(),
                        "unauthorized, terminating session"
                    );
                    self.session.terminate().await;
                    return Err(ApiError::from_response(&response));
                }
                FailureKind::Forbidden | FailureKind::ServerError | FailureKind::Other => {
                    warn!(
                        status = %response.status(),
                        path = request.path(),
                        "request failed"
                    );
                    return Err(ApiError::from_response(&response));
                }
            }
        }
    }

    /// Outbound attachment: set the bearer header from the stored access
    /// credential unless the caller brought its own Authorization header.
    /// With nothing stored the request goes out unmodified and the server
    /// drives the failure path. Never blocks, never fails.
    async fn attach_credential(&self, request: &mut ApiRequest) {
        if request.has_explicit_authorization() {
            return;
        }
        if let Some(token) = self.store.get(CredentialSlot::Access).await {
            request.set_bearer(&token);
        }
    }
}
