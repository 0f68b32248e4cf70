//! End-to-end flow through the observer, thread metadata and reflector

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use memoria_ai::observational::{
    BatchObservation, CompressionStatus, ObservationalMemoryConfig, ObserverAgent, ReflectorAgent,
    TranscriptMessage, TranscriptRole, has_current_task_section,
    optimize_observations_for_context, parse_observation_groups, persist_thread_state,
};
use memoria_ai::MockLlmClient;
use memoria_traits::{CharEstimateCounter, StoreResult, ThreadMetadata, ThreadMetadataStore};
use tokio::sync::Mutex;

#[derive(Default)]
struct InMemoryThreadStore {
    threads: Mutex<HashMap<String, ThreadMetadata>>,
}

#[async_trait]
impl ThreadMetadataStore for InMemoryThreadStore {
    async fn load(&self, thread_id: &str) -> StoreResult<Option<ThreadMetadata>> {
        Ok(self.threads.lock().await.get(thread_id).cloned())
    }

    async fn save(&self, thread_id: &str, metadata: ThreadMetadata) -> StoreResult<()> {
        self.threads
            .lock()
            .await
            .insert(thread_id.to_string(), metadata);
        Ok(())
    }
}

fn message(role: TranscriptRole, text: &str) -> TranscriptMessage {
    let at = Utc.with_ymd_and_hms(2025, 12, 4, 14, 30, 0).unwrap();
    TranscriptMessage::text(role, text).at(at)
}

const OBSERVER_OUTPUT: &str = "\
<observations>
日期：2025年12月4日
* 🔴 (14:30) User stated they have two kids
* 🟡 (14:31) User asked how to plan a weekend trip [travel]
  * -> assistant suggested three destinations
</observations>

<current-task>
- Primary: plan weekend trip
</current-task>

<suggested-response>
Wait for the user to pick a destination.
</suggested-response>";

#[tokio::test]
async fn observe_then_reflect_under_budget() {
    let llm = MockLlmClient::from_texts(
        "mock",
        [
            OBSERVER_OUTPUT.to_string(),
            // Too large for the budget at level 0.
            format!("<observations>\n{}\n</observations>", "* 🔴 (14:30) x ".repeat(40)),
            "<observations>\n日期：2025年12月4日\n* 🔴 (14:30) User has two kids\n</observations>"
                .to_string(),
        ],
    );
    let config = ObservationalMemoryConfig::default().with_reflection_threshold(50);

    let observer = ObserverAgent::new(Arc::new(llm.clone()), config.clone());
    let observed = observer
        .observe(
            None,
            &[
                message(TranscriptRole::User, "I have two kids. Where should we go?"),
                message(TranscriptRole::Assistant, "Here are three ideas."),
            ],
        )
        .await
        .unwrap();

    assert!(observed.observations.starts_with("日期：2025年12月4日"));
    assert!(!has_current_task_section(&observed.observations));
    assert_eq!(
        observed.current_task.as_deref(),
        Some("- Primary: plan weekend trip")
    );

    let groups = parse_observation_groups(&observed.observations);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].observations.len(), 2);
    assert_eq!(groups[0].observations[1].sub_lines.len(), 1);

    let reflector = ReflectorAgent::new(
        Arc::new(llm.clone()),
        Arc::new(CharEstimateCounter),
        config,
    );
    let outcome = reflector.reflect(&observed.observations, None).await.unwrap();

    assert_eq!(outcome.status, CompressionStatus::Accepted);
    assert_eq!(outcome.attempts_made, 2);
    assert!(outcome.observations().contains("User has two kids"));

    let requests = llm.requests().await;
    assert_eq!(requests.len(), 3);
    let observer_prompt = requests[0].user_prompt().unwrap();
    assert!(observer_prompt.contains("**User (Dec 4, 2025, 2:30 PM):**"));
    let second_reflection = requests[2].user_prompt().unwrap();
    assert!(second_reflection.contains("## 需要压缩"));

    let shown = optimize_observations_for_context(&observed.observations);
    assert!(!shown.contains("🟡"));
    assert!(!shown.contains("[travel]"));
    assert!(shown.contains("🔴"));
}

#[tokio::test]
async fn batched_threads_persist_metadata() {
    let llm = MockLlmClient::from_texts(
        "mock",
        ["<observations>\n\
<thread id=\"work\">\n* 🟡 (09:00) debugging login\n<current-task>fix login</current-task>\n</thread>\n\
<thread id=\"home\">\n* 🔴 (20:00) User stated they prefer tea\n<suggested-response>ask about snacks</suggested-response>\n</thread>\n\
</observations>"],
    );
    let observer = ObserverAgent::new(Arc::new(llm), ObservationalMemoryConfig::default());

    let mut by_thread = HashMap::new();
    by_thread.insert(
        "work".to_string(),
        vec![message(TranscriptRole::User, "login is broken")],
    );
    by_thread.insert(
        "home".to_string(),
        vec![message(TranscriptRole::User, "I prefer tea")],
    );
    let order = vec!["work".to_string(), "home".to_string()];

    let batch = observer
        .observe_threads(Some("* 🔴 (08:00) earlier"), &by_thread, &order)
        .await
        .unwrap();
    assert!(batch.is_attributed());

    let store = InMemoryThreadStore::default();
    let written = persist_thread_state(&store, &batch).await.unwrap();
    assert_eq!(written, 2);

    let work = store.load("work").await.unwrap().unwrap();
    assert_eq!(work.current_task.as_deref(), Some("fix login"));
    assert_eq!(work.suggested_continuation, None);

    let home = store.load("home").await.unwrap().unwrap();
    assert_eq!(home.suggested_continuation.as_deref(), Some("ask about snacks"));
}

#[tokio::test]
async fn batched_threads_without_attribution_fall_back() {
    let llm = MockLlmClient::from_texts(
        "mock",
        ["<observations>\n* 🔴 (09:00) something happened\n</observations>"],
    );
    let observer = ObserverAgent::new(Arc::new(llm), ObservationalMemoryConfig::default());

    let mut by_thread = HashMap::new();
    by_thread.insert("a".to_string(), vec![message(TranscriptRole::User, "hi")]);
    let order = vec!["a".to_string()];

    let batch = observer.observe_threads(None, &by_thread, &order).await.unwrap();
    match batch {
        BatchObservation::Unattributed(result) => {
            assert_eq!(result.observations, "* 🔴 (09:00) something happened");
        }
        BatchObservation::PerThread(_) => panic!("expected single-thread fallback"),
    }

    let store = InMemoryThreadStore::default();
    let batch = BatchObservation::Unattributed(Default::default());
    assert_eq!(persist_thread_state(&store, &batch).await.unwrap(), 0);
}

#[tokio::test]
async fn reflection_exhausts_after_three_levels() {
    let bloated = format!("<observations>\n{}\n</observations>", "* 🟢 (10:00) filler ".repeat(50));
    let llm = MockLlmClient::from_texts("mock", vec![bloated; 4]);
    let reflector = ReflectorAgent::new(
        Arc::new(llm.clone()),
        Arc::new(CharEstimateCounter),
        ObservationalMemoryConfig::default().with_reflection_threshold(10),
    );

    let outcome = reflector.reflect("* 🟢 (10:00) filler", None).await.unwrap();
    assert_eq!(outcome.status, CompressionStatus::ExhaustedRetries);
    assert_eq!(outcome.attempts_made, 3);
    assert_eq!(llm.call_count().await, 3);
    assert!(!outcome.observations().is_empty());
}
