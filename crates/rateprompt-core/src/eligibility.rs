//! Eligibility rules for showing the rating prompt.
//!
//! The evaluator is a pure function of an [`EngagementSnapshot`], the current
//! time, and the configured [`Thresholds`]. Three independent triggers can
//! make the user eligible:
//!
//! - **Uses**: `uses_count >= uses_until_prompt`
//! - **Events**: `event_count >= events_until_prompt`
//! - **Reminder**: more than `days_before_reminding` whole days since the
//!   prompt was last shown
//!
//! Hitting any one is enough. `debug` overrides everything, and a user who
//! already reached a terminal outcome is excluded according to the
//! [`TerminalPolicy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::EngagementSnapshot;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Which recorded outcomes stop the prompt from ever showing again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalPolicy {
    /// Stop only once the user has both rated and declined at some point.
    #[default]
    BothTerminal,
    /// Stop as soon as the user has rated or declined.
    EitherTerminal,
}

/// Thresholds feeding the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub uses_until_prompt: u64,
    pub events_until_prompt: u64,
    pub days_before_reminding: u64,
    pub debug: bool,
    pub terminal_policy: TerminalPolicy,
    /// When the prompt has never been shown, count that as "long ago" for
    /// the reminder trigger instead of ignoring the trigger.
    pub remind_when_never_shown: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            uses_until_prompt: 1,
            events_until_prompt: 1,
            days_before_reminding: 1,
            debug: false,
            terminal_policy: TerminalPolicy::default(),
            remind_when_never_shown: false,
        }
    }
}

/// Why the user is eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Debug,
    Uses,
    Events,
    Reminder,
}

/// Why the user is not eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ineligible {
    AlreadyTerminal,
    BelowThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "lowercase")]
pub enum EligibilityReport {
    Eligible(Trigger),
    Ineligible(Ineligible),
}

impl EligibilityReport {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityReport::Eligible(_))
    }
}

/// Applies [`Thresholds`] to engagement snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    thresholds: Thresholds,
}

impl Evaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Should the prompt be shown right now?
    pub fn is_awaiting_rating(&self, snapshot: &EngagementSnapshot, now: DateTime<Utc>) -> bool {
        self.explain(snapshot, now).is_eligible()
    }

    /// Same decision as [`is_awaiting_rating`](Self::is_awaiting_rating),
    /// with the rule that decided it.
    pub fn explain(&self, snapshot: &EngagementSnapshot, now: DateTime<Utc>) -> EligibilityReport {
        let t = &self.thresholds;
        if t.debug {
            return EligibilityReport::Eligible(Trigger::Debug);
        }

        let rated = snapshot.rated_at.is_some();
        let declined = snapshot.declined_at.is_some();
        let terminal = match t.terminal_policy {
            TerminalPolicy::BothTerminal => rated && declined,
            TerminalPolicy::EitherTerminal => rated || declined,
        };
        if terminal {
            return EligibilityReport::Ineligible(Ineligible::AlreadyTerminal);
        }

        if snapshot.uses_count >= t.uses_until_prompt {
            return EligibilityReport::Eligible(Trigger::Uses);
        }
        if snapshot.event_count >= t.events_until_prompt {
            return EligibilityReport::Eligible(Trigger::Events);
        }
        if self.reminder_due(snapshot.last_seen_at, now) {
            return EligibilityReport::Eligible(Trigger::Reminder);
        }

        EligibilityReport::Ineligible(Ineligible::BelowThresholds)
    }

    fn reminder_due(&self, last_seen_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_seen_at {
            None => self.thresholds.remind_when_never_shown,
            Some(last_seen) => {
                let days = days_since(last_seen, now);
                let limit =
                    i64::try_from(self.thresholds.days_before_reminding).unwrap_or(i64::MAX);
                days > limit
            }
        }
    }
}

/// Whole days elapsed, rounded down. Negative when `then` is in the future.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_milliseconds().div_euclid(MS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn thresholds(uses: u64, events: u64, days: u64) -> Thresholds {
        Thresholds {
            uses_until_prompt: uses,
            events_until_prompt: events,
            days_before_reminding: days,
            ..Thresholds::default()
        }
    }

    fn snapshot(uses: u64, events: u64) -> EngagementSnapshot {
        EngagementSnapshot {
            uses_count: uses,
            event_count: events,
            ..EngagementSnapshot::default()
        }
    }

    #[test]
    fn each_trigger_is_sufficient() {
        let evaluator = Evaluator::new(thresholds(3, 5, 2));
        let now = Utc::now();

        assert_eq!(
            evaluator.explain(&snapshot(3, 0), now),
            EligibilityReport::Eligible(Trigger::Uses)
        );
        assert_eq!(
            evaluator.explain(&snapshot(0, 5), now),
            EligibilityReport::Eligible(Trigger::Events)
        );

        let stale = EngagementSnapshot {
            last_seen_at: Some(now - Duration::days(3)),
            ..snapshot(0, 0)
        };
        assert_eq!(
            evaluator.explain(&stale, now),
            EligibilityReport::Eligible(Trigger::Reminder)
        );
    }

    #[test]
    fn reminder_needs_strictly_more_days() {
        let evaluator = Evaluator::new(thresholds(10, 10, 1));
        let now = Utc::now();
        let seen = |ago: Duration| EngagementSnapshot {
            last_seen_at: Some(now - ago),
            ..snapshot(0, 0)
        };

        assert!(!evaluator.is_awaiting_rating(&seen(Duration::hours(47)), now));
        assert!(evaluator.is_awaiting_rating(&seen(Duration::hours(48)), now));
    }

    #[test]
    fn never_shown_reminder_is_opt_in() {
        let now = Utc::now();
        let fresh = snapshot(0, 0);

        assert!(!Evaluator::new(thresholds(3, 3, 1)).is_awaiting_rating(&fresh, now));

        let eager = Thresholds {
            remind_when_never_shown: true,
            ..thresholds(3, 3, 1)
        };
        assert_eq!(
            Evaluator::new(eager).explain(&fresh, now),
            EligibilityReport::Eligible(Trigger::Reminder)
        );
    }

    #[test]
    fn last_seen_in_the_future_does_not_remind() {
        let now = Utc::now();
        let skewed = EngagementSnapshot {
            last_seen_at: Some(now + Duration::days(30)),
            ..snapshot(0, 0)
        };
        assert!(!Evaluator::new(thresholds(3, 3, 0)).is_awaiting_rating(&skewed, now));
    }

    #[test]
    fn rated_only_under_both_terminal_still_uses_thresholds() {
        let now = Utc::now();
        let rated = EngagementSnapshot {
            rated_at: Some(now - Duration::days(1)),
            ..snapshot(3, 0)
        };
        let evaluator = Evaluator::new(thresholds(3, 3, 1));
        assert!(evaluator.is_awaiting_rating(&rated, now));

        let below = EngagementSnapshot {
            uses_count: 1,
            ..rated.clone()
        };
        assert!(!evaluator.is_awaiting_rating(&below, now));
    }

    #[test]
    fn rated_only_under_either_terminal_is_final() {
        let now = Utc::now();
        let rated = EngagementSnapshot {
            rated_at: Some(now - Duration::days(1)),
            ..snapshot(3, 3)
        };
        let evaluator = Evaluator::new(Thresholds {
            terminal_policy: TerminalPolicy::EitherTerminal,
            ..thresholds(3, 3, 1)
        });
        assert_eq!(
            evaluator.explain(&rated, now),
            EligibilityReport::Ineligible(Ineligible::AlreadyTerminal)
        );
    }

    #[test]
    fn both_terminal_blocks_everything_but_debug() {
        let now = Utc::now();
        let done = EngagementSnapshot {
            rated_at: Some(now),
            declined_at: Some(now),
            ..snapshot(100, 100)
        };
        assert!(!Evaluator::new(thresholds(1, 1, 0)).is_awaiting_rating(&done, now));

        let debug = Thresholds {
            debug: true,
            ..thresholds(1, 1, 0)
        };
        assert!(Evaluator::new(debug).is_awaiting_rating(&done, now));
    }

    #[test]
    fn days_since_rounds_down() {
        let now = Utc::now();
        assert_eq!(days_since(now - Duration::hours(23), now), 0);
        assert_eq!(days_since(now - Duration::hours(25), now), 1);
        assert_eq!(days_since(now + Duration::hours(1), now), -1);
    }

    proptest! {
        #[test]
        fn below_every_threshold_is_never_eligible(
            uses_limit in 1u64..1_000,
            events_limit in 1u64..1_000,
            days_limit in 0u64..365,
            uses_frac in 0.0f64..1.0,
            events_frac in 0.0f64..1.0,
        ) {
            let uses = ((uses_limit as f64) * uses_frac) as u64;
            let events = ((events_limit as f64) * events_frac) as u64;
            prop_assume!(uses < uses_limit && events < events_limit);

            let evaluator = Evaluator::new(thresholds(uses_limit, events_limit, days_limit));
            let now = Utc::now();
            prop_assert!(!evaluator.is_awaiting_rating(&snapshot(uses, events), now));

            let recent = EngagementSnapshot {
                last_seen_at: Some(now),
                ..snapshot(uses, events)
            };
            prop_assert!(!evaluator.is_awaiting_rating(&recent, now));
        }

        #[test]
        fn debug_is_always_eligible(
            uses in 0u64..10,
            events in 0u64..10,
            rated in any::<bool>(),
            declined in any::<bool>(),
            policy_either in any::<bool>(),
        ) {
            let now = Utc::now();
            let snap = EngagementSnapshot {
                uses_count: uses,
                event_count: events,
                rated_at: rated.then_some(now),
                declined_at: declined.then_some(now),
                last_seen_at: Some(now),
            };
            let evaluator = Evaluator::new(Thresholds {
                debug: true,
                terminal_policy: if policy_either {
                    TerminalPolicy::EitherTerminal
                } else {
                    TerminalPolicy::BothTerminal
                },
                ..thresholds(u64::MAX, u64::MAX, u64::MAX)
            });
            prop_assert!(evaluator.is_awaiting_rating(&snap, now));
        }
    }
}
