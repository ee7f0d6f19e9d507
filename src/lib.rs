//! Bookkeeping and decision core for evolutionary optimizers.
//!
//! Tracks a population of candidate solutions across generations, ranks
//! candidates by multi-objective dominance, snapshots per-generation
//! statistics into a bounded history, and evaluates stopping criteria.
//! The generational loop itself (selection, crossover, mutation,
//! replacement) stays on the host side: it inserts evaluated
//! individuals, advances the history once per generation, and then asks
//! the configured criteria whether to stop.
//!
//! - [`population::Population`]: individuals under an injected fitness
//!   comparator, optionally kept in best-to-worst order.
//! - [`non_dominated_sort`]: fast non-dominated sort partitioning any
//!   candidate slice into Pareto fronts, plus crowding distances.
//! - [`history::History`]: bounded ring of frozen [`statistics`]
//!   snapshots, one per generation, built from a pluggable tracker
//!   registry.
//! - [`criteria`]: composable stop predicates for generation limits,
//!   value thresholds and stagnation detection.
//!
//! No randomness, I/O or threading happens inside these components; the
//! [`random`] module only defines the index-source contract the
//! surrounding operators consume.

pub mod criteria;
pub mod dominance_ord;
pub mod evaluation;
pub mod history;
pub mod individual;
pub mod non_dominated_sort;
pub mod population;
pub mod random;
pub mod statistics;

pub use crate::criteria::{Criterion, GenerationLimit, ValueLimit, ValueProgress, ZeroWindow};
pub use crate::dominance_ord::{DominanceOrd, MultiObjective, Objective, RawDominance};
pub use crate::evaluation::{
    Direction, Evaluation, FitnessOrd, LexicographicOrd, OrdFn, RawOrd, ScaledOrd,
};
pub use crate::history::{History, OutOfRange, ZeroCapacity};
pub use crate::individual::{GenotypeId, Individual};
pub use crate::non_dominated_sort::{
    assign_crowding_distance, non_dominated_sort, pareto_fronts, AssignedCrowdingDistance, Front,
    Fronts,
};
pub use crate::population::{Population, TieBreak};
pub use crate::random::{IndexSource, RandomIndexes, ScriptedIndexes};
pub use crate::statistics::{
    BestRawFitness, GenerationCounter, Metric, Statistics, Tracker, TrackerSet,
};
