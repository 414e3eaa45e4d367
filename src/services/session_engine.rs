use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};

use crate::constants::{ENDED_SESSION_TTL_SECS, ENGINE_TICK_MS, REGISTRY_SWEEP_EVERY_TICKS};
use crate::error::{AppError, Result};
use crate::game::{GameSession, HitOutcome, SessionOutcome, SessionSnapshot};

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

struct SessionSlot {
    session: GameSession,
    ended_at: Option<i64>,
    outcome_emitted: bool,
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<u64, SessionSlot>,
    next_id: u64,
}

/// Shared store of live sessions. Every mutation runs under the write lock,
/// so tick, hit and spawn transitions are atomic with respect to each other.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl SessionRegistry {
    pub async fn create(&self) -> (u64, SessionSnapshot) {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let session_id = inner.next_id;
        let session = GameSession::new(rand::random::<u64>());
        let snapshot = session.snapshot();
        let slot = SessionSlot {
            session,
            ended_at: None,
            outcome_emitted: false,
        };
        let _ = inner.sessions.insert(session_id, slot);
        (session_id, snapshot)
    }

    pub async fn snapshot(&self, session_id: u64) -> Option<SessionSnapshot> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&session_id)
            .map(|slot| slot.session.snapshot())
    }

    /// Apply a click. A winning hit ends the session under the same lock,
    /// so the returned snapshot already reflects the terminal state.
    pub async fn hit(&self, session_id: u64, target_id: u64) -> Result<(HitOutcome, SessionSnapshot)> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown session {session_id}")))?;

        let outcome = slot.session.hit(target_id);
        if !slot.session.is_active() && slot.ended_at.is_none() {
            slot.ended_at = Some(now_unix());
        }
        Ok((outcome, slot.session.snapshot()))
    }

    /// Advance every live session by one engine tick and collect outcomes
    /// that have not been emitted yet (covering both timeout and winning-hit
    /// endings). Each outcome is handed out exactly once.
    pub async fn tick_all(&self, elapsed_ms: u64) -> Vec<(u64, SessionOutcome)> {
        let mut inner = self.inner.write().await;
        let mut ended = Vec::new();
        for (session_id, slot) in inner.sessions.iter_mut() {
            if slot.session.tick(elapsed_ms).is_some() && slot.ended_at.is_none() {
                slot.ended_at = Some(now_unix());
            }
            if let Some(outcome) = slot.session.outcome() {
                if !slot.outcome_emitted {
                    slot.outcome_emitted = true;
                    ended.push((*session_id, outcome));
                }
            }
        }
        ended
    }

    /// Drop ended sessions past the retention window. Sessions are kept for
    /// a while so state reads and mint verification keep working.
    pub async fn sweep(&self, now: i64) {
        let mut inner = self.inner.write().await;
        inner.sessions.retain(|_, slot| match slot.ended_at {
            Some(ended_at) => now - ended_at < ENDED_SESSION_TTL_SECS,
            None => true,
        });
    }
}

/// Boundary towards outcome collaborators (UI stream, leaderboard
/// submission, NFT mint). Injected so tests can observe emissions.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn publish(&self, session_id: u64, outcome: SessionOutcome);
}

pub struct TracingOutcomeSink;

#[async_trait]
impl OutcomeSink for TracingOutcomeSink {
    async fn publish(&self, session_id: u64, outcome: SessionOutcome) {
        tracing::info!(
            "session_ended session={} score={} won={} time_taken={}s",
            session_id,
            outcome.score,
            outcome.won,
            outcome.time_taken_secs
        );
    }
}

/// Background ticker driving every session's countdown, lifetime decay and
/// spawn schedule on one cadence.
pub struct SessionEngine {
    registry: SessionRegistry,
    sink: Arc<dyn OutcomeSink>,
}

impl SessionEngine {
    pub fn new(registry: SessionRegistry, sink: Arc<dyn OutcomeSink>) -> Self {
        Self { registry, sink }
    }

    /// Start the engine loop
    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_millis(ENGINE_TICK_MS));
            let mut tick_count: u64 = 0;

            loop {
                ticker.tick().await;
                tick_count += 1;
                self.run_tick(tick_count).await;
            }
        });
    }

    async fn run_tick(&self, tick_count: u64) {
        let ended = self.registry.tick_all(ENGINE_TICK_MS).await;
        for (session_id, outcome) in ended {
            self.sink.publish(session_id, outcome).await;
        }

        if tick_count % REGISTRY_SWEEP_EVERY_TICKS == 0 {
            self.registry.sweep(now_unix()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GAME_DURATION_MS;
    use tokio::sync::Mutex;

    struct RecordingSink {
        published: Mutex<Vec<(u64, SessionOutcome)>>,
    }

    #[async_trait]
    impl OutcomeSink for RecordingSink {
        async fn publish(&self, session_id: u64, outcome: SessionOutcome) {
            self.published.lock().await.push((session_id, outcome));
        }
    }

    #[tokio::test]
    async fn hit_on_unknown_session_is_not_found() {
        let registry = SessionRegistry::default();
        let result = registry.hit(999, 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn hit_on_vanished_target_is_ignored() {
        let registry = SessionRegistry::default();
        let (session_id, _) = registry.create().await;
        let (outcome, snapshot) = registry.hit(session_id, 12345).await.unwrap();
        assert_eq!(outcome, HitOutcome::Ignored);
        assert_eq!(snapshot.score, 0);
    }

    #[tokio::test]
    async fn outcome_is_emitted_exactly_once() {
        let registry = SessionRegistry::default();
        let (session_id, _) = registry.create().await;

        let first = registry.tick_all(GAME_DURATION_MS).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].0, session_id);
        assert!(!first[0].1.won);

        let second = registry.tick_all(ENGINE_TICK_MS).await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn engine_publishes_ended_sessions_to_the_sink() {
        let registry = SessionRegistry::default();
        let (session_id, _) = registry.create().await;
        let sink = Arc::new(RecordingSink {
            published: Mutex::new(Vec::new()),
        });
        let engine = SessionEngine::new(registry.clone(), sink.clone());

        let _ = registry.tick_all(GAME_DURATION_MS - ENGINE_TICK_MS).await;
        engine.run_tick(1).await;
        engine.run_tick(2).await;

        let published = sink.published.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, session_id);
        assert!(!published[0].1.won);
    }

    #[tokio::test]
    async fn sweep_evicts_sessions_past_retention() {
        let registry = SessionRegistry::default();
        let (session_id, _) = registry.create().await;
        let _ = registry.tick_all(GAME_DURATION_MS).await;

        registry
            .sweep(now_unix() + ENDED_SESSION_TTL_SECS - 30)
            .await;
        assert!(registry.snapshot(session_id).await.is_some());

        registry
            .sweep(now_unix() + ENDED_SESSION_TTL_SECS + 30)
            .await;
        assert!(registry.snapshot(session_id).await.is_none());
    }

    #[tokio::test]
    async fn active_sessions_survive_sweep() {
        let registry = SessionRegistry::default();
        let (session_id, _) = registry.create().await;

        registry.sweep(now_unix() + ENDED_SESSION_TTL_SECS * 10).await;
        assert!(registry.snapshot(session_id).await.is_some());
    }
}
