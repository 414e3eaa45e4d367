//! Session state machine for the target-clicking game.
//!
//! All mutation happens through `tick`, `spawn` and `hit`; each entry point
//! is a no-op once the session has ended, so late timer callbacks and
//! expiry/click races degrade silently instead of erroring.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::constants::{
    BONUS_PROBABILITY, COMBO_BONUS_THRESHOLD, COMBO_IDLE_WINDOW_MS, FIELD_HEIGHT, FIELD_MARGIN,
    FIELD_WIDTH, GAME_DURATION_MS, LIFETIME_BONUS_MS, LIFETIME_NORMAL_MS, LIFETIME_PENALTY_MS,
    MAX_ACTIVE_TARGETS, PENALTY_DEDUCTION, PENALTY_PROBABILITY, POINTS_BONUS, POINTS_NORMAL,
    SPAWN_ACCEL_PER_POINT_MS, SPAWN_BASE_INTERVAL_MS, SPAWN_MIN_INTERVAL_MS, TARGET_SCORE,
    TARGET_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Normal,
    Bonus,
    Penalty,
}

impl TargetKind {
    /// Single weighted draw over named probabilities; the remainder is normal.
    fn draw(roll: f64) -> Self {
        if roll < BONUS_PROBABILITY {
            Self::Bonus
        } else if roll < BONUS_PROBABILITY + PENALTY_PROBABILITY {
            Self::Penalty
        } else {
            Self::Normal
        }
    }

    fn base_points(self) -> u32 {
        match self {
            Self::Normal => POINTS_NORMAL,
            Self::Bonus => POINTS_BONUS,
            Self::Penalty => 0,
        }
    }

    fn lifetime_ms(self) -> u64 {
        match self {
            Self::Normal => LIFETIME_NORMAL_MS,
            Self::Bonus => LIFETIME_BONUS_MS,
            Self::Penalty => LIFETIME_PENALTY_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub kind: TargetKind,
    pub lifetime_ms: i64,
}

/// Terminal result of a session, produced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub score: u32,
    pub won: bool,
    pub time_taken_secs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum HitOutcome {
    Scored {
        points: u32,
        combo_streak: u32,
        score: u32,
    },
    Penalized {
        score: u32,
    },
    /// The target was already gone (expired or double-clicked). Not an error.
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub kind: TargetKind,
    pub expires_in_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub score: u32,
    pub combo_streak: u32,
    pub time_remaining_ms: u64,
    pub active: bool,
    pub targets: Vec<TargetView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SessionOutcome>,
}

#[derive(Debug)]
pub struct GameSession {
    score: u32,
    combo_streak: u32,
    time_remaining_ms: u64,
    elapsed_ms: u64,
    targets: Vec<Target>,
    active: bool,
    outcome: Option<SessionOutcome>,
    last_hit_at_ms: Option<u64>,
    next_spawn_in_ms: i64,
    next_target_id: u64,
    rng: StdRng,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self {
            score: 0,
            combo_streak: 0,
            time_remaining_ms: GAME_DURATION_MS,
            elapsed_ms: 0,
            targets: Vec::new(),
            active: true,
            outcome: None,
            last_hit_at_ms: None,
            next_spawn_in_ms: SPAWN_BASE_INTERVAL_MS as i64,
            next_target_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Advance the session clock. Decays target lifetimes, drops expired
    /// targets, drives the spawn schedule and ends the session when the
    /// countdown reaches zero. Returns the outcome on the ending tick.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<SessionOutcome> {
        if !self.active {
            return None;
        }

        self.elapsed_ms += elapsed_ms;
        self.time_remaining_ms = self.time_remaining_ms.saturating_sub(elapsed_ms);

        // Expiry runs before anything else in the tick; an expired target is
        // unreachable for any hit processed afterwards.
        for target in &mut self.targets {
            target.lifetime_ms -= elapsed_ms as i64;
        }
        self.targets.retain(|target| target.lifetime_ms > 0);

        if self.time_remaining_ms == 0 {
            let won = self.score >= TARGET_SCORE;
            return Some(self.end(won));
        }

        self.next_spawn_in_ms -= elapsed_ms as i64;
        while self.next_spawn_in_ms <= 0 {
            self.spawn();
            self.next_spawn_in_ms += self.spawn_interval_ms() as i64;
        }

        None
    }

    /// Spawn one target. No-op at the concurrency cap or after the end.
    pub fn spawn(&mut self) {
        if !self.active || self.targets.len() >= MAX_ACTIVE_TARGETS {
            return;
        }

        let kind = TargetKind::draw(self.rng.random::<f64>());
        let x = self
            .rng
            .random_range(FIELD_MARGIN..FIELD_WIDTH - TARGET_SIZE - FIELD_MARGIN);
        let y = self
            .rng
            .random_range(FIELD_MARGIN..FIELD_HEIGHT - TARGET_SIZE - FIELD_MARGIN);

        let id = self.next_target_id;
        self.next_target_id += 1;
        self.targets.push(Target {
            id,
            x,
            y,
            kind,
            lifetime_ms: kind.lifetime_ms() as i64,
        });
    }

    /// Score a click. Unknown ids (expired, already hit) are ignored; a
    /// winning hit ends the session inside the same mutation, so no spawn
    /// or further hit can be observed after it.
    pub fn hit(&mut self, target_id: u64) -> HitOutcome {
        if !self.active {
            return HitOutcome::Ignored;
        }
        let Some(index) = self.targets.iter().position(|t| t.id == target_id) else {
            return HitOutcome::Ignored;
        };
        let target = self.targets.swap_remove(index);

        if target.kind == TargetKind::Penalty {
            self.score = self.score.saturating_sub(PENALTY_DEDUCTION);
            self.combo_streak = 0;
            self.last_hit_at_ms = Some(self.elapsed_ms);
            return HitOutcome::Penalized { score: self.score };
        }

        // The idle gap resets the streak before this hit counts towards it.
        if let Some(last) = self.last_hit_at_ms {
            if self.elapsed_ms.saturating_sub(last) > COMBO_IDLE_WINDOW_MS {
                self.combo_streak = 0;
            }
        }
        self.combo_streak += 1;

        let mut points = target.kind.base_points();
        if self.combo_streak >= COMBO_BONUS_THRESHOLD {
            points += self.combo_streak / COMBO_BONUS_THRESHOLD;
        }
        self.score += points;
        self.last_hit_at_ms = Some(self.elapsed_ms);

        let scored = HitOutcome::Scored {
            points,
            combo_streak: self.combo_streak,
            score: self.score,
        };

        if self.score >= TARGET_SCORE {
            let _ = self.end(true);
        }

        scored
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score,
            combo_streak: self.combo_streak,
            time_remaining_ms: self.time_remaining_ms,
            active: self.active,
            targets: self
                .targets
                .iter()
                .map(|t| TargetView {
                    id: t.id,
                    x: t.x,
                    y: t.y,
                    kind: t.kind,
                    expires_in_ms: t.lifetime_ms.max(0) as u64,
                })
                .collect(),
            outcome: self.outcome,
        }
    }

    fn end(&mut self, won: bool) -> SessionOutcome {
        self.active = false;
        self.targets.clear();
        let outcome = SessionOutcome {
            score: self.score,
            won,
            time_taken_secs: (self.elapsed_ms / 1000) as u32,
        };
        self.outcome = Some(outcome);
        outcome
    }

    fn spawn_interval_ms(&self) -> u64 {
        let accel = u64::from(self.score).saturating_mul(SPAWN_ACCEL_PER_POINT_MS);
        SPAWN_BASE_INTERVAL_MS
            .saturating_sub(accel)
            .max(SPAWN_MIN_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_target(session: &mut GameSession, kind: TargetKind) -> u64 {
        let id = session.next_target_id;
        session.next_target_id += 1;
        session.targets.push(Target {
            id,
            x: 100.0,
            y: 100.0,
            kind,
            lifetime_ms: 10_000,
        });
        id
    }

    fn hit_fresh(session: &mut GameSession, kind: TargetKind) -> HitOutcome {
        let id = put_target(session, kind);
        session.hit(id)
    }

    #[test]
    fn weighted_draw_uses_named_thresholds() {
        assert_eq!(TargetKind::draw(0.0), TargetKind::Bonus);
        assert_eq!(TargetKind::draw(0.149), TargetKind::Bonus);
        assert_eq!(TargetKind::draw(0.15), TargetKind::Penalty);
        assert_eq!(TargetKind::draw(0.249), TargetKind::Penalty);
        assert_eq!(TargetKind::draw(0.25), TargetKind::Normal);
        assert_eq!(TargetKind::draw(0.999), TargetKind::Normal);
    }

    #[test]
    fn score_never_goes_negative() {
        let mut session = GameSession::new(1);
        for _ in 0..5 {
            let outcome = hit_fresh(&mut session, TargetKind::Penalty);
            assert_eq!(outcome, HitOutcome::Penalized { score: 0 });
        }
        assert_eq!(session.score, 0);
    }

    #[test]
    fn penalty_always_resets_combo() {
        let mut session = GameSession::new(1);
        for _ in 0..5 {
            hit_fresh(&mut session, TargetKind::Normal);
        }
        assert_eq!(session.combo_streak, 5);

        hit_fresh(&mut session, TargetKind::Penalty);
        assert_eq!(session.combo_streak, 0);
    }

    #[test]
    fn combo_bonus_on_third_and_sixth_hit() {
        let mut session = GameSession::new(1);
        let mut per_hit_points = Vec::new();
        for _ in 0..6 {
            match hit_fresh(&mut session, TargetKind::Normal) {
                HitOutcome::Scored { points, .. } => per_hit_points.push(points),
                other => panic!("expected Scored, got {other:?}"),
            }
        }
        // +1 bonus lands on the 3rd hit, +2 on the 6th.
        assert_eq!(per_hit_points, vec![1, 1, 2, 2, 2, 3]);
        assert_eq!(session.score, 11);
    }

    #[test]
    fn scoring_scenario_normal_bonus_normal_penalty() {
        let mut session = GameSession::new(1);

        assert_eq!(
            hit_fresh(&mut session, TargetKind::Normal),
            HitOutcome::Scored {
                points: 1,
                combo_streak: 1,
                score: 1
            }
        );
        assert_eq!(
            hit_fresh(&mut session, TargetKind::Bonus),
            HitOutcome::Scored {
                points: 3,
                combo_streak: 2,
                score: 4
            }
        );
        assert_eq!(
            hit_fresh(&mut session, TargetKind::Normal),
            HitOutcome::Scored {
                points: 2,
                combo_streak: 3,
                score: 6
            }
        );
        assert_eq!(
            hit_fresh(&mut session, TargetKind::Penalty),
            HitOutcome::Penalized { score: 5 }
        );
        assert_eq!(session.combo_streak, 0);
    }

    #[test]
    fn idle_gap_resets_combo_before_next_hit() {
        let mut session = GameSession::new(1);
        hit_fresh(&mut session, TargetKind::Normal);
        hit_fresh(&mut session, TargetKind::Normal);
        assert_eq!(session.combo_streak, 2);

        let _ = session.tick(COMBO_IDLE_WINDOW_MS + 500);

        match hit_fresh(&mut session, TargetKind::Normal) {
            HitOutcome::Scored { combo_streak, .. } => assert_eq!(combo_streak, 1),
            other => panic!("expected Scored, got {other:?}"),
        }
    }

    #[test]
    fn winning_hit_ends_session_immediately() {
        let mut session = GameSession::new(1);
        session.score = TARGET_SCORE - 1;
        let _ = session.tick(5_000);

        hit_fresh(&mut session, TargetKind::Normal);

        assert!(!session.is_active());
        let outcome = session.outcome().expect("outcome must exist after win");
        assert!(outcome.won);
        assert_eq!(outcome.score, TARGET_SCORE);
        assert_eq!(outcome.time_taken_secs, 5);
    }

    #[test]
    fn timeout_ends_session_with_current_score() {
        let mut session = GameSession::new(1);
        hit_fresh(&mut session, TargetKind::Bonus);

        let mut outcome = None;
        for _ in 0..(GAME_DURATION_MS / 100) {
            if let Some(o) = session.tick(100) {
                outcome = Some(o);
                break;
            }
        }

        let outcome = outcome.expect("countdown must terminate the session");
        assert!(!outcome.won);
        assert_eq!(outcome.score, 3);
        assert_eq!(outcome.time_taken_secs, 60);
        assert!(!session.is_active());
    }

    #[test]
    fn expired_target_can_no_longer_be_hit() {
        let mut session = GameSession::new(1);
        let id = put_target(&mut session, TargetKind::Normal);
        session.targets[0].lifetime_ms = 100;

        let _ = session.tick(100);
        assert!(session.targets.is_empty());

        assert_eq!(session.hit(id), HitOutcome::Ignored);
        assert_eq!(session.score, 0);
        assert_eq!(session.combo_streak, 0);
    }

    #[test]
    fn spawn_is_noop_at_concurrency_cap() {
        let mut session = GameSession::new(1);
        for _ in 0..MAX_ACTIVE_TARGETS {
            put_target(&mut session, TargetKind::Normal);
        }
        session.spawn();
        assert_eq!(session.targets.len(), MAX_ACTIVE_TARGETS);
    }

    #[test]
    fn tick_and_hit_after_end_are_noops() {
        let mut session = GameSession::new(1);
        let id = put_target(&mut session, TargetKind::Normal);
        let _ = session.end(false);

        assert!(session.tick(100).is_none());
        assert_eq!(session.hit(id), HitOutcome::Ignored);
        session.spawn();
        assert!(session.targets.is_empty());
    }

    #[test]
    fn spawned_targets_stay_within_field_margins() {
        let mut session = GameSession::new(42);
        for _ in 0..50 {
            session.targets.clear();
            session.spawn();
            let target = &session.targets[0];
            assert!(target.x >= FIELD_MARGIN);
            assert!(target.x <= FIELD_WIDTH - TARGET_SIZE - FIELD_MARGIN);
            assert!(target.y >= FIELD_MARGIN);
            assert!(target.y <= FIELD_HEIGHT - TARGET_SIZE - FIELD_MARGIN);
        }
    }

    #[test]
    fn spawn_interval_shrinks_with_score_down_to_floor() {
        let mut session = GameSession::new(1);
        assert_eq!(session.spawn_interval_ms(), SPAWN_BASE_INTERVAL_MS);

        session.score = 10;
        assert_eq!(session.spawn_interval_ms(), 800);

        session.score = 35;
        assert_eq!(session.spawn_interval_ms(), SPAWN_MIN_INTERVAL_MS);

        session.score = 1_000;
        assert_eq!(session.spawn_interval_ms(), SPAWN_MIN_INTERVAL_MS);
    }

    #[test]
    fn tick_drives_the_spawn_schedule() {
        let mut session = GameSession::new(7);
        for _ in 0..9 {
            let _ = session.tick(100);
        }
        assert!(session.targets.is_empty());

        let _ = session.tick(100);
        assert_eq!(session.targets.len(), 1);
    }

    #[test]
    fn unique_ids_across_spawns() {
        let mut session = GameSession::new(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            session.targets.clear();
            session.spawn();
            assert!(seen.insert(session.targets[0].id));
        }
    }
}
