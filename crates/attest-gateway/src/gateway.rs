use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use attest_ledger::{AuditReport, FileCommitLog, LedgerEvent, LedgerStore, SystemClock};
use attest_types::{Fingerprint, OwnerId};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::request::{
    DocumentEntry, ListResponse, RegisterRequest, RegisterResponse, RevokeRequest,
    RevokeResponse, VerifyResponse,
};

/// Relays caller requests to a [`LedgerStore`].
///
/// Raw wallet addresses and fingerprints are normalised here, before the
/// store sees them. Commits that time out are retried per
/// [`GatewayConfig::retry`]; every other failure is returned as is.
pub struct Gateway {
    store: Arc<LedgerStore>,
    config: GatewayConfig,
}

impl Gateway {
    /// Open the file-backed ledger named by `config`.
    pub fn open(config: GatewayConfig) -> GatewayResult<Self> {
        let log = FileCommitLog::open(&config.log_path, config.wal_config())?;
        let store = LedgerStore::open(
            Arc::new(log),
            Arc::new(SystemClock),
            config.ledger_config(),
        )?;
        info!(path = %config.log_path.display(), records = store.len(), "gateway ready");
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn new(store: Arc<LedgerStore>, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn register(&self, request: &RegisterRequest) -> GatewayResult<RegisterResponse> {
        let caller = self.owner(&request.caller)?;
        let fingerprint = self.fingerprint(&request.fingerprint)?;
        let name = request.name.as_str();
        let pointer = request.external_pointer.as_deref();
        let (fp, caller) = (&fingerprint, &caller);

        debug!(fingerprint = %fp, caller = %caller, "relaying register");
        let receipt = self
            .config
            .retry
            .run("register", move || self.store.register(fp, name, pointer, caller))
            .await?;

        Ok(receipt.into())
    }

    /// Fingerprint `bytes` here and register the result. Upload path: the
    /// bytes themselves are not kept.
    pub async fn register_bytes(
        &self,
        bytes: &[u8],
        name: &str,
        external_pointer: Option<&str>,
        wallet: &str,
    ) -> GatewayResult<RegisterResponse> {
        let fingerprint = attest_crypto::fingerprint(bytes);
        debug!(fingerprint = %fingerprint, size = bytes.len(), "fingerprinted upload");
        self.register(&RegisterRequest {
            caller: wallet.to_string(),
            fingerprint: fingerprint.to_string(),
            name: name.to_string(),
            external_pointer: external_pointer.map(str::to_string),
        })
        .await
    }

    pub async fn revoke(&self, request: &RevokeRequest) -> GatewayResult<RevokeResponse> {
        let caller = self.owner(&request.caller)?;
        let fingerprint = self.fingerprint(&request.fingerprint)?;
        let (fp, caller) = (&fingerprint, &caller);

        debug!(fingerprint = %fp, caller = %caller, "relaying revoke");
        let receipt = self
            .config
            .retry
            .run("revoke", move || self.store.revoke(fp, caller))
            .await?;

        Ok(receipt.into())
    }

    pub fn verify(&self, fingerprint: &str) -> GatewayResult<VerifyResponse> {
        let fingerprint = self.fingerprint(fingerprint)?;
        Ok(self.store.verify(&fingerprint)?.into())
    }

    pub fn list(&self, wallet: &str) -> GatewayResult<ListResponse> {
        let owner = self.owner(wallet)?;
        let documents = self
            .store
            .list_by_owner(&owner)?
            .into_iter()
            .map(DocumentEntry::from)
            .collect();
        Ok(ListResponse {
            owner: owner.to_canonical(),
            documents,
        })
    }

    pub fn history(&self, fingerprint: &str) -> GatewayResult<Vec<LedgerEvent>> {
        let fingerprint = self.fingerprint(fingerprint)?;
        Ok(self.store.history(&fingerprint)?)
    }

    pub fn audit(&self) -> GatewayResult<AuditReport> {
        Ok(self.store.audit()?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.store.subscribe()
    }

    fn owner(&self, raw: &str) -> GatewayResult<OwnerId> {
        Ok(OwnerId::parse(raw)?)
    }

    fn fingerprint(&self, raw: &str) -> GatewayResult<Fingerprint> {
        let fingerprint = Fingerprint::parse(raw)?;
        if self.config.require_sha256 && !fingerprint.is_sha256_hex() {
            return Err(GatewayError::InvalidInput(format!(
                "fingerprint must be 64 hex characters, got {:?}",
                raw.trim()
            )));
        }
        Ok(fingerprint)
    }
}
