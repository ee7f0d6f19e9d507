use crate::evaluation::FitnessOrd;
use crate::individual::Individual;
use std::cmp::Ordering;

/// Secondary comparator breaking ties between equally fit individuals,
/// e.g. by a crowding distance stored in the tag. Implemented for plain
/// closures.
pub trait TieBreak<T> {
    fn tie_break(&self, a: &Individual<T>, b: &Individual<T>) -> Ordering;
}

impl<T, F> TieBreak<T> for F
where
    F: Fn(&Individual<T>, &Individual<T>) -> Ordering,
{
    fn tie_break(&self, a: &Individual<T>, b: &Individual<T>) -> Ordering {
        self(a, b)
    }
}

/// Container of individuals with an injected fitness comparator.
///
/// An ordered population re-establishes best-to-worst order after every
/// insertion. The sort is stable, so equally fit members keep their
/// relative insertion order unless a tie-break comparator is configured.
/// Size is bounded only by what the driver inserts and removes; the
/// container enforces no cohort cap of its own.
pub struct Population<T> {
    members: Vec<Individual<T>>,
    fitness_ord: Box<dyn FitnessOrd>,
    tie_break: Option<Box<dyn TieBreak<T>>>,
    keep_sorted: bool,
}

impl<T> Population<T> {
    /// A population that eagerly maintains best-to-worst order.
    pub fn ordered(fitness_ord: impl FitnessOrd + 'static) -> Self {
        Self {
            members: Vec::new(),
            fitness_ord: Box::new(fitness_ord),
            tie_break: None,
            keep_sorted: true,
        }
    }

    /// A population that leaves members in insertion order.
    pub fn unordered(fitness_ord: impl FitnessOrd + 'static) -> Self {
        Self {
            members: Vec::new(),
            fitness_ord: Box::new(fitness_ord),
            tie_break: None,
            keep_sorted: false,
        }
    }

    pub fn with_tie_break(mut self, tie_break: impl TieBreak<T> + 'static) -> Self {
        self.tie_break = Some(Box::new(tie_break));
        self
    }

    /// Appends a sequence of individuals. Empty input is a no-op; an
    /// ordered population restores global sort order afterwards.
    pub fn insert<I>(&mut self, individuals: I)
    where
        I: IntoIterator<Item = Individual<T>>,
    {
        let before = self.members.len();
        self.members.extend(individuals);
        if self.keep_sorted && self.members.len() > before {
            self.reorder();
        }
    }

    fn reorder(&mut self) {
        let Self {
            members,
            fitness_ord,
            tie_break,
            ..
        } = self;
        members.sort_by(|a, b| {
            match fitness_ord.fitness_ord(a.evaluation(), b.evaluation()) {
                Ordering::Equal => match tie_break {
                    Some(tie) => tie.tie_break(a, b),
                    None => Ordering::Equal,
                },
                decided => decided,
            }
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual<T>> {
        self.members.iter()
    }

    /// Mutable iteration for tag updates. Evaluations stay frozen, so
    /// this cannot invalidate the sort order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Individual<T>> {
        self.members.iter_mut()
    }

    /// The members as a slice, in iteration order. This is the input the
    /// dominance sort consumes.
    pub fn members(&self) -> &[Individual<T>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Best member under the population's own fitness comparator.
    pub fn best(&self) -> Option<&Individual<T>> {
        if self.keep_sorted {
            self.members.first()
        } else {
            self.members
                .iter()
                .min_by(|a, b| self.fitness_ord.fitness_ord(a.evaluation(), b.evaluation()))
        }
    }

    /// The comparator this population was configured with.
    pub fn fitness_ord(&self) -> &dyn FitnessOrd {
        self.fitness_ord.as_ref()
    }

    pub fn retain(&mut self, keep: impl FnMut(&Individual<T>) -> bool) {
        self.members.retain(keep);
    }

    pub fn truncate(&mut self, len: usize) {
        self.members.truncate(len);
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl<'a, T> IntoIterator for &'a Population<T> {
    type Item = &'a Individual<T>;
    type IntoIter = std::slice::Iter<'a, Individual<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Direction, Evaluation, RawOrd};
    use crate::individual::GenotypeId;

    fn member(id: usize, fitness: f64) -> Individual<()> {
        Individual::new(GenotypeId::new(id), Evaluation::scalar(fitness))
    }

    fn fitnesses(population: &Population<()>) -> Vec<f64> {
        population.iter().map(|i| i.evaluation().raw()[0]).collect()
    }

    #[test]
    fn ordered_population_sorts_on_insert() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        population.insert([member(0, 1.0), member(1, 3.0), member(2, 2.0)]);

        assert_eq!(fitnesses(&population), vec![3.0, 2.0, 1.0]);

        population.insert([member(3, 2.5)]);
        assert_eq!(fitnesses(&population), vec![3.0, 2.5, 2.0, 1.0]);
    }

    #[test]
    fn empty_insert_is_a_noop() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        population.insert([member(0, 2.0), member(1, 1.0)]);
        let before = fitnesses(&population);

        population.insert(std::iter::empty());
        assert_eq!(fitnesses(&population), before);
    }

    #[test]
    fn equal_fitness_keeps_insertion_order() {
        let mut population = Population::ordered(RawOrd(Direction::Minimize));
        population.insert([member(0, 1.0), member(1, 1.0), member(2, 0.5)]);

        let ids: Vec<usize> = population.iter().map(|i| i.id().index()).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn tie_break_overrides_insertion_order() {
        let mut population = Population::ordered(RawOrd(Direction::Minimize)).with_tie_break(
            |a: &Individual<()>, b: &Individual<()>| b.id().index().cmp(&a.id().index()),
        );
        population.insert([member(0, 1.0), member(1, 1.0), member(2, 1.0)]);

        let ids: Vec<usize> = population.iter().map(|i| i.id().index()).collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn unordered_population_preserves_insertion_but_finds_best() {
        let mut population = Population::unordered(RawOrd(Direction::Maximize));
        population.insert([member(0, 1.0), member(1, 3.0), member(2, 2.0)]);

        assert_eq!(fitnesses(&population), vec![1.0, 3.0, 2.0]);
        assert_eq!(population.best().unwrap().id().index(), 1);
    }

    #[test]
    fn best_of_empty_population_is_none() {
        let population: Population<()> = Population::ordered(RawOrd(Direction::Maximize));
        assert!(population.best().is_none());
    }

    #[test]
    fn external_operators_can_remove_members() {
        let mut population = Population::ordered(RawOrd(Direction::Maximize));
        population.insert((0..6).map(|i| member(i, i as f64)));

        population.truncate(3);
        assert_eq!(fitnesses(&population), vec![5.0, 4.0, 3.0]);

        population.retain(|i| i.evaluation().raw()[0] > 3.0);
        assert_eq!(fitnesses(&population), vec![5.0, 4.0]);

        population.clear();
        assert!(population.is_empty());
    }
}
