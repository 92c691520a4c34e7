pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::conversation::store::ConversationStore;
use crate::llm::chat::ChatModelClient;
use crate::pipeline::RetrievalPipeline;

/// Shared application state handed to every axum handler.
///
/// `pipeline` is `None` when the store was unreachable at startup; handlers
/// report a dedicated "pipeline not initialized" error instead of the
/// process exiting (see the Exit policy in the design docs).
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Option<Arc<RetrievalPipeline>>,
    pub conversations: Arc<ConversationStore>,
    pub chat: Arc<dyn ChatModelClient>,
    pub config: Config,
}
