//! Hold/tap decision for one hotkey trigger
//!
//! From the moment the OS reports the combination, both key states are
//! sampled and the session spin-polls until either the hold threshold
//! elapses with the keys unchanged (hold) or a key changes state first
//! (tap). Spin-polling burns a little CPU but the window is bounded by the
//! hold threshold, and the platform offers no edge-triggered alternative
//! for keys owned by another process.

use std::thread;
use std::time::{Duration, Instant};

use super::backend::{HotkeyBackend, MODIFIER_KEY, TRIGGER_KEY};

/// Cadence of the pre-threshold decision poll.
const DECISION_POLL: Duration = Duration::from_millis(5);

/// Cadence of the release wait once the hold has fired.
const RELEASE_POLL: Duration = Duration::from_millis(10);

/// How one trigger resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    /// Keys stayed down past the threshold; both phases were notified.
    Held,
    /// A key changed state before the threshold; the caller replays the tap.
    Tapped,
    /// The keys were not concurrently down at trigger time.
    Aborted,
}

/// Discrete notifications out of a hold session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    /// The threshold elapsed with both keys still down.
    Press,
    /// A key changed state after the hold fired.
    Release,
}

/// Resolve one trigger into hold or tap.
///
/// On a hold, `notify` receives `Press` exactly once when the threshold
/// elapses and `Release` exactly once when either key then changes state.
/// On a tap or an abort it is never called.
///
/// An unrelated key release can spuriously re-fire the OS notification
/// while the combination is already resolving; the session aborts unless
/// both keys are really down when it starts.
pub fn resolve_hold<B, F>(backend: &B, hold_threshold: Duration, mut notify: F) -> HoldOutcome
where
    B: HotkeyBackend,
    F: FnMut(HoldPhase),
{
    let modifier_at_start = backend.key_down(MODIFIER_KEY);
    let trigger_at_start = backend.key_down(TRIGGER_KEY);
    if !(modifier_at_start && trigger_at_start) {
        return HoldOutcome::Aborted;
    }

    let started = Instant::now();
    while started.elapsed() < hold_threshold {
        if backend.key_down(MODIFIER_KEY) != modifier_at_start
            || backend.key_down(TRIGGER_KEY) != trigger_at_start
        {
            return HoldOutcome::Tapped;
        }
        thread::sleep(DECISION_POLL);
    }

    notify(HoldPhase::Press);
    while backend.key_down(MODIFIER_KEY) == modifier_at_start
        && backend.key_down(TRIGGER_KEY) == trigger_at_start
    {
        thread::sleep(RELEASE_POLL);
    }
    notify(HoldPhase::Release);
    HoldOutcome::Held
}

#[cfg(test)]
mod tests {
    use super::super::backend::testing::FakeBackend;
    use super::*;

    fn phases_of(backend: &FakeBackend, threshold: Duration) -> (HoldOutcome, Vec<HoldPhase>) {
        let mut phases = Vec::new();
        let outcome = resolve_hold(backend, threshold, |phase| phases.push(phase));
        (outcome, phases)
    }

    #[test]
    fn test_keys_held_past_threshold_resolve_as_hold() {
        let backend = FakeBackend::new(Duration::from_millis(60));
        let (outcome, phases) = phases_of(&backend, Duration::from_millis(20));

        assert_eq!(outcome, HoldOutcome::Held);
        assert_eq!(phases, vec![HoldPhase::Press, HoldPhase::Release]);
    }

    #[test]
    fn test_release_before_threshold_resolves_as_tap() {
        let backend = FakeBackend::new(Duration::from_millis(25));
        let (outcome, phases) = phases_of(&backend, Duration::from_millis(200));

        assert_eq!(outcome, HoldOutcome::Tapped);
        assert!(phases.is_empty(), "no phase fires for a tap");
    }

    #[test]
    fn test_trigger_without_keys_down_aborts() {
        // Keys already up when the notification arrives: a ghost re-fire.
        let backend = FakeBackend::new(Duration::ZERO);
        let (outcome, phases) = phases_of(&backend, Duration::from_millis(50));

        assert_eq!(outcome, HoldOutcome::Aborted);
        assert!(phases.is_empty());
    }

    #[test]
    fn test_default_threshold_scenario_fires_each_phase_once() {
        // Hold for 0.2s against the default 0.15s threshold.
        let backend = FakeBackend::new(Duration::from_millis(200));
        let mut presses = 0;
        let mut releases = 0;

        let outcome = resolve_hold(&backend, Duration::from_millis(150), |phase| match phase {
            HoldPhase::Press => presses += 1,
            HoldPhase::Release => releases += 1,
        });

        assert_eq!(outcome, HoldOutcome::Held);
        assert_eq!(presses, 1);
        assert_eq!(releases, 1);
    }
}
