use serde::Serialize;
use std::cmp::Ordering;

/// Whether larger or smaller values of an objective dimension are better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    /// Orders two objective values so that `Ordering::Less` means `a` is
    /// better. Incomparable values (NaN) count as equal.
    pub fn ordering(self, a: f64, b: f64) -> Ordering {
        match self {
            Direction::Minimize => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            Direction::Maximize => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        }
    }
}

/// Fitness of a single individual: a raw objective vector (one entry for
/// scalar problems) and an optional scaled vector used for selection.
///
/// An evaluation is frozen once constructed. There is no intrinsic order
/// between evaluations; "better" is always decided by an injected
/// [`FitnessOrd`], since it depends on the maximize/minimize/dominance
/// policy of the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    raw: Vec<f64>,
    scaled: Option<Vec<f64>>,
}

impl Evaluation {
    /// A single-objective evaluation.
    pub fn scalar(value: f64) -> Self {
        Self {
            raw: vec![value],
            scaled: None,
        }
    }

    /// A multi-objective evaluation from a non-empty objective vector.
    pub fn vector(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "an evaluation needs at least one objective");
        Self {
            raw: values,
            scaled: None,
        }
    }

    /// Attaches a scaled/adjusted fitness, e.g. a scalarized or
    /// sharing-corrected value used by selection. Need not have the same
    /// dimensionality as the raw vector.
    pub fn with_scaled(mut self, scaled: Vec<f64>) -> Self {
        assert!(!scaled.is_empty(), "a scaled fitness needs at least one value");
        self.scaled = Some(scaled);
        self
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    /// The scaled fitness, falling back to the raw vector when none was
    /// attached.
    pub fn scaled(&self) -> &[f64] {
        self.scaled.as_deref().unwrap_or(&self.raw)
    }

    /// Raw value of one objective dimension.
    pub fn objective(&self, dim: usize) -> f64 {
        self.raw[dim]
    }

    pub fn objectives(&self) -> usize {
        self.raw.len()
    }
}

/// Injected comparator deciding which of two evaluations ranks first.
///
/// `Ordering::Less` means `a` is better. Wrap a plain closure in
/// [`OrdFn`] when no named comparator fits.
pub trait FitnessOrd {
    fn fitness_ord(&self, a: &Evaluation, b: &Evaluation) -> Ordering;

    fn better(&self, a: &Evaluation, b: &Evaluation) -> bool {
        self.fitness_ord(a, b) == Ordering::Less
    }
}

/// Adapts a plain closure into a comparator.
pub struct OrdFn<F>(pub F);

impl<F> FitnessOrd for OrdFn<F>
where
    F: Fn(&Evaluation, &Evaluation) -> Ordering,
{
    fn fitness_ord(&self, a: &Evaluation, b: &Evaluation) -> Ordering {
        (self.0)(a, b)
    }
}

/// Compares by the first raw objective only.
pub struct RawOrd(pub Direction);

impl FitnessOrd for RawOrd {
    fn fitness_ord(&self, a: &Evaluation, b: &Evaluation) -> Ordering {
        self.0.ordering(a.raw()[0], b.raw()[0])
    }
}

/// Compares by the first scaled objective, falling back to raw when no
/// scaled fitness was attached.
pub struct ScaledOrd(pub Direction);

impl FitnessOrd for ScaledOrd {
    fn fitness_ord(&self, a: &Evaluation, b: &Evaluation) -> Ordering {
        self.0.ordering(a.scaled()[0], b.scaled()[0])
    }
}

/// Lexicographic comparison across raw objectives, one direction per
/// dimension.
pub struct LexicographicOrd(pub Vec<Direction>);

impl FitnessOrd for LexicographicOrd {
    fn fitness_ord(&self, a: &Evaluation, b: &Evaluation) -> Ordering {
        for ((&direction, &av), &bv) in self.0.iter().zip(a.raw()).zip(b.raw()) {
            match direction.ordering(av, bv) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }
        Ordering::Equal
    }
}
