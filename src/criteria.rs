use crate::history::History;
use crate::population::Population;
use crate::statistics::Statistics;
use tracing::debug;

/// A stop predicate over the current population and recorded history.
///
/// All criteria share this signature, so a driver can hold a
/// `Vec<Box<dyn Criterion<T>>>` and stop when any of them fires. Some
/// criteria advance internal state on every call; invoke each one exactly
/// once per generation, after `History::next`.
pub trait Criterion<T> {
    fn should_stop(&mut self, population: &Population<T>, history: &History<T>) -> bool;
}

/// Fires once the newest snapshot's generation counter reaches `limit`.
pub struct GenerationLimit {
    limit: u64,
}

impl GenerationLimit {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<T> Criterion<T> for GenerationLimit {
    fn should_stop(&mut self, _population: &Population<T>, history: &History<T>) -> bool {
        history
            .newest()
            .and_then(Statistics::generation)
            .map(|generation| generation >= self.limit)
            .unwrap_or(false)
    }
}

/// Fires when `reached` holds for a metric extracted from the newest
/// snapshot. A missing snapshot or metric never fires.
pub struct ValueLimit<E, P> {
    extract: E,
    reached: P,
}

impl<E, P> ValueLimit<E, P> {
    pub fn new(extract: E, reached: P) -> Self {
        Self { extract, reached }
    }
}

impl<T, V, E, P> Criterion<T> for ValueLimit<E, P>
where
    E: Fn(&Statistics) -> Option<V>,
    P: Fn(&V) -> bool,
{
    fn should_stop(&mut self, _population: &Population<T>, history: &History<T>) -> bool {
        history
            .newest()
            .and_then(|stats| (self.extract)(stats))
            .map(|value| (self.reached)(&value))
            .unwrap_or(false)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("stagnation window must be at least 1 generation")]
pub struct ZeroWindow;

/// Stagnation detector: fires once `window` consecutive generation
/// transitions pass without the monitored metric improving.
///
/// Keeps the best value seen so far and a stall counter, both advanced on
/// every call; calling it twice for the same generation advances the
/// counter twice. Too little history is "not yet stagnated", never an
/// error, since early generations cannot have stagnated.
pub struct ValueProgress<E, C, V> {
    extract: E,
    improved: C,
    window: usize,
    reference: Option<V>,
    stalled: usize,
}

impl<E, C, V> ValueProgress<E, C, V>
where
    E: Fn(&Statistics) -> Option<V>,
    C: Fn(&V, &V) -> bool,
{
    /// `improved(current, past)` must return true when `current` is an
    /// improvement over `past`. A zero window is a configuration error.
    pub fn new(extract: E, improved: C, window: usize) -> Result<Self, ZeroWindow> {
        if window == 0 {
            return Err(ZeroWindow);
        }
        Ok(Self {
            extract,
            improved,
            window,
            reference: None,
            stalled: 0,
        })
    }
}

impl<T, V, E, C> Criterion<T> for ValueProgress<E, C, V>
where
    E: Fn(&Statistics) -> Option<V>,
    C: Fn(&V, &V) -> bool,
{
    fn should_stop(&mut self, _population: &Population<T>, history: &History<T>) -> bool {
        let Some(current) = history.newest().and_then(|stats| (self.extract)(stats)) else {
            return false;
        };

        match self.reference.take() {
            Some(reference) => {
                if (self.improved)(&current, &reference) {
                    self.stalled = 0;
                    self.reference = Some(current);
                } else {
                    self.stalled += 1;
                    self.reference = Some(reference);
                }
            }
            None => {
                // First call: seed from the previous generation when one
                // is already recorded, so the transition leading up to
                // this call still counts.
                let past = history
                    .value_at(1)
                    .ok()
                    .and_then(|stats| (self.extract)(stats));
                match past {
                    Some(past) if !(self.improved)(&current, &past) => {
                        self.stalled = 1;
                        self.reference = Some(past);
                    }
                    _ => {
                        self.stalled = 0;
                        self.reference = Some(current);
                    }
                }
            }
        }

        if self.stalled >= self.window {
            debug!(
                stalled = self.stalled,
                window = self.window,
                "metric progress stalled"
            );
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Direction, Evaluation, RawOrd};
    use crate::individual::{GenotypeId, Individual};
    use crate::statistics::TrackerSet;

    fn member(id: usize, fitness: f64) -> Individual<()> {
        Individual::new(GenotypeId::new(id), Evaluation::scalar(fitness))
    }

    fn best_raw(stats: &Statistics) -> Option<f64> {
        stats.best_raw_fitness().map(|evaluation| evaluation.raw()[0])
    }

    fn improved(current: &f64, past: &f64) -> bool {
        current > past
    }

    #[test]
    fn generation_limit_fires_at_the_limit() {
        let population: Population<()> = Population::ordered(RawOrd(Direction::Maximize));
        let mut history = History::starting_at(8, 1, TrackerSet::standard()).unwrap();
        let mut criterion = GenerationLimit::new(2);

        assert!(!criterion.should_stop(&population, &history));

        history.next(&population);
        // Newest generation counter is 1.
        assert!(!criterion.should_stop(&population, &history));

        history.next(&population);
        // Counter reached 2.
        assert!(criterion.should_stop(&population, &history));
    }

    #[test]
    fn value_limit_follows_the_recorded_best() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        let mut history = History::new(8, TrackerSet::standard()).unwrap();
        let mut criterion = ValueLimit::new(best_raw, |best: &f64| *best >= 3.0);

        population.insert([member(0, 2.0)]);
        history.next(&population);
        assert!(!criterion.should_stop(&population, &history));

        population.insert([member(1, 3.0)]);
        history.next(&population);
        assert!(criterion.should_stop(&population, &history));
    }

    #[test]
    fn value_limit_without_history_never_fires() {
        let population: Population<()> = Population::ordered(RawOrd(Direction::Maximize));
        let history = History::new(8, TrackerSet::standard()).unwrap();
        let mut criterion = ValueLimit::new(best_raw, |_: &f64| true);

        assert!(!criterion.should_stop(&population, &history));
    }

    #[test]
    fn value_progress_needs_window_stalled_transitions() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        let mut history = History::new(8, TrackerSet::standard()).unwrap();
        let mut criterion = ValueProgress::new(best_raw, improved, 2).unwrap();

        population.insert([member(0, 1.0), member(1, 2.0)]);
        history.next(&population);

        // One more generation with no new best value.
        history.next(&population);
        assert!(!criterion.should_stop(&population, &history));

        // Still no improvement the generation after.
        history.next(&population);
        assert!(criterion.should_stop(&population, &history));
    }

    #[test]
    fn value_progress_resets_on_improvement() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        let mut history = History::new(8, TrackerSet::standard()).unwrap();
        let mut criterion = ValueProgress::new(best_raw, improved, 2).unwrap();

        population.insert([member(0, 1.0)]);
        history.next(&population);
        assert!(!criterion.should_stop(&population, &history));

        history.next(&population);
        assert!(!criterion.should_stop(&population, &history));

        // A better individual arrives before the window closes.
        population.insert([member(1, 5.0)]);
        history.next(&population);
        assert!(!criterion.should_stop(&population, &history));

        // The clock starts over from the improvement.
        history.next(&population);
        assert!(!criterion.should_stop(&population, &history));
        history.next(&population);
        assert!(criterion.should_stop(&population, &history));
    }

    #[test]
    fn value_progress_treats_missing_history_as_not_stagnated() {
        let population: Population<()> = Population::ordered(RawOrd(Direction::Maximize));
        let history = History::new(8, TrackerSet::standard()).unwrap();
        let mut criterion = ValueProgress::new(best_raw, improved, 1).unwrap();

        // No snapshots at all, and the best metric is absent even after
        // one: neither case may fire or fail.
        assert!(!criterion.should_stop(&population, &history));
    }

    #[test]
    fn zero_window_is_a_configuration_error() {
        assert!(ValueProgress::new(best_raw, improved, 0).is_err());
        assert!(ValueProgress::new(best_raw, improved, 1).is_ok());
    }

    #[test]
    fn criteria_compose_behind_one_trait_object() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        let mut history = History::new(8, TrackerSet::standard()).unwrap();

        let mut criteria: Vec<Box<dyn Criterion<()>>> = vec![
            Box::new(GenerationLimit::new(100)),
            Box::new(ValueLimit::new(best_raw, |best: &f64| *best >= 10.0)),
            Box::new(ValueProgress::new(best_raw, improved, 3).unwrap()),
        ];

        population.insert([member(0, 10.5)]);
        history.next(&population);

        let fired: Vec<bool> = criteria
            .iter_mut()
            .map(|criterion| criterion.should_stop(&population, &history))
            .collect();
        assert_eq!(fired, vec![false, true, false]);
    }
}
