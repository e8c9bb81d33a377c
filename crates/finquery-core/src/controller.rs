//! Query controller: the single entry point tying the pipeline together
//!
//! query → entity extraction + intent classification → rule routing →
//! concurrent tool dispatch → response composition → memory update.
//! Memory is only mutated after a fully composed answer, so a cancelled or
//! failed request never leaves a user turn without its assistant turn.

use crate::compose::ResponseComposer;
use crate::config::ControllerConfig;
use crate::dispatch::ToolDispatcher;
use crate::entity::EntityExtractor;
use crate::intent::IntentClassifier;
use crate::memory::ConversationMemory;
use crate::prompts::APOLOGY_ANSWER;
use crate::query::Query;
use crate::router::RuleRouter;
use crate::tools::MarketDataService;
use finquery_llm::LlmProvider;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Answer plus routing metadata for one handled query
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Final natural-language answer
    pub answer: String,
    /// Wire names of the tools that were dispatched, deduplicated
    pub used_tools: Vec<String>,
    /// Tickers the query was resolved against
    pub symbols: Vec<String>,
}

/// The query routing and tool-dispatch controller
pub struct QueryController {
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    router: RuleRouter,
    dispatcher: ToolDispatcher,
    composer: ResponseComposer,
    memory: ConversationMemory,
}

impl QueryController {
    /// Wire a controller to its collaborators
    pub fn new(
        service: Arc<dyn MarketDataService>,
        provider: Arc<dyn LlmProvider>,
        config: ControllerConfig,
    ) -> Self {
        let config = Arc::new(config);

        Self {
            extractor: EntityExtractor::new(&config.routing),
            classifier: IntentClassifier::new(&config.routing),
            router: RuleRouter::new(&config),
            dispatcher: ToolDispatcher::new(service, Arc::clone(&config)),
            composer: ResponseComposer::new(provider, Arc::clone(&config)),
            memory: ConversationMemory::new(config.memory_window),
        }
    }

    /// Access the session store (idle eviction is driven externally)
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Handle one user message for a session
    ///
    /// Suspends until the answer is composed. Infallible from the caller's
    /// perspective: if the completion service is down, the response carries
    /// a fixed apology and memory is left untouched.
    #[instrument(skip(self, text), fields(session = session_id))]
    pub async fn handle_query(&self, session_id: &str, text: &str) -> QueryResponse {
        let context = self.memory.context(session_id);

        let entities = self.extractor.extract(text);
        let intent = self.classifier.classify(text, &entities);
        let query = Query {
            text: text.to_string(),
            entities,
            intent,
        };

        info!(
            ?intent,
            entities = ?query.entities,
            "query analyzed"
        );

        let calls = self.router.route(&query);
        let results = self.dispatcher.dispatch(calls).await;

        let mut used_tools: Vec<String> = results
            .keys()
            .map(|call| call.tool.wire_name().to_string())
            .collect();
        used_tools.dedup();

        let symbols: Vec<String> = query
            .entities
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();

        match self.composer.compose(&query, &results, &context).await {
            Ok(answer) => {
                self.memory.append_exchange(session_id, &query.text, &answer);
                QueryResponse {
                    answer,
                    used_tools,
                    symbols,
                }
            }
            Err(error) => {
                warn!(%error, "composition failed, returning apology without memory write");
                QueryResponse {
                    answer: APOLOGY_ANSWER.to_string(),
                    used_tools,
                    symbols,
                }
            }
        }
    }
}
