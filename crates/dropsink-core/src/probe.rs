//! Capability probe: dry-run the pipeline to answer "can this be handled".

use crate::classify::Saver;
use crate::persist::SaveOutcome;
use crate::request::ShareRequest;

impl Saver {
    /// Runs the classification pipeline with every persistence step
    /// short-circuited. Reaches the same branch decisions as a real run but
    /// never mutates the filesystem, deletes, or touches the network.
    pub async fn probe_support(&self, request: &ShareRequest) -> bool {
        let result = self.handle(request, true).await;
        tracing::info!("supported: {}", result.outcome == SaveOutcome::Succeeded);
        result.outcome == SaveOutcome::Succeeded
    }
}
