use tracing::{info, instrument};
use transit_config::{HarnessConfig, PROVIDER_ASSET_FILE, PROVIDER_CONTAINER_NAME};
use transit_credential::{CredentialResolver, StaticResolver};
use transit_error::{Result, TransitError};
use transit_store::BlobStoreClient;
use uuid::Uuid;

use crate::cleanup::CleanupScope;
use crate::management::ManagementClient;
use crate::poll::poll_until;
use crate::runner::{ScenarioRunner, TransferScenario};

/// Drives one end-to-end transfer scenario to a verifiable terminal state.
///
/// Exactly one verification per call to [`verify_transfer`](Self::verify_transfer);
/// no state is shared between runs. Cleanup of resources the run created
/// executes unconditionally, even when an earlier stage failed.
pub struct TransferVerifier {
    config: HarnessConfig,
    management: ManagementClient,
    runner: Box<dyn ScenarioRunner>,
}

impl TransferVerifier {
    pub fn new(config: HarnessConfig, runner: Box<dyn ScenarioRunner>) -> Result<Self> {
        let management = ManagementClient::new(
            config.management_url.clone(),
            config.api_key.clone(),
            config.client_timeout,
        )?;
        Ok(Self {
            config,
            management,
            runner,
        })
    }

    /// Run the full flow: resolve → seed → trigger → discover → verify,
    /// with cleanup on every exit path.
    #[instrument(skip(self), fields(mode = ?self.config.mode))]
    pub async fn verify_transfer(&self) -> Result<()> {
        let mut cleanup = CleanupScope::new();
        let outcome = self.run_flow(&mut cleanup).await;
        cleanup.run().await;
        outcome
    }

    async fn run_flow(&self, cleanup: &mut CleanupScope) -> Result<()> {
        let resolver = transit_credential::resolver_for(&self.config)?;
        let destination = resolver.resolve().await?;
        let destination_store = BlobStoreClient::new(&destination, self.config.client_timeout)?;

        if self.config.mode.is_local() {
            self.seed_source(cleanup).await?;
        }

        let scenario = TransferScenario::blob_transfer(destination_store.account_name());
        self.runner.run(&scenario).await?;

        let container = self.discover_destination_container().await?;

        let exists = destination_store
            .blob_exists(&container, PROVIDER_ASSET_FILE)
            .await?;
        if !exists {
            return Err(TransitError::assertion(
                "destination blob not created",
                destination_store.blob_url(&container, PROVIDER_ASSET_FILE),
            ));
        }

        info!(
            container,
            blob = PROVIDER_ASSET_FILE,
            "transfer verified: destination blob exists"
        );
        Ok(())
    }

    /// Seed the provider side: a fresh source container (failing when it
    /// already exists) holding one artifact with randomized content, so each
    /// run transfers a distinct payload.
    async fn seed_source(&self, cleanup: &mut CleanupScope) -> Result<()> {
        let source = StaticResolver::source(&self.config.local).resolve().await?;
        let source_store = BlobStoreClient::new(&source, self.config.client_timeout)?;

        source_store.create_container(PROVIDER_CONTAINER_NAME).await?;
        // Deferred at the point of creation: the run owns this container.
        let store = source_store.clone();
        cleanup.defer(
            source_store.container_url(PROVIDER_CONTAINER_NAME),
            async move { store.delete_container(PROVIDER_CONTAINER_NAME).await },
        );

        source_store
            .upload_blob(
                PROVIDER_CONTAINER_NAME,
                PROVIDER_ASSET_FILE,
                Uuid::new_v4().to_string().into_bytes(),
            )
            .await?;
        Ok(())
    }

    /// Poll the transfer-process listing until the first entry reports a
    /// destination container. A non-200 listing is terminal immediately;
    /// budget exhaustion is an assertion failure naming the endpoint.
    async fn discover_destination_container(&self) -> Result<String> {
        let management = &self.management;
        let found = poll_until(&self.config.poll, || async move {
            let processes = management.list_transfer_processes().await?;
            Ok(processes
                .iter()
                .find_map(|p| p.destination_container().map(str::to_owned)))
        })
        .await?;

        found.ok_or_else(|| {
            TransitError::assertion(
                format!(
                    "no transfer process reported a destination container within {} attempts",
                    self.config.poll.max_attempts
                ),
                self.management.listing_url(),
            )
        })
    }
}
