use rand::Rng;

/// Index generator injected into the operators surrounding the core.
///
/// The trait mirrors the call shapes those operators need: a raw index,
/// an index below a bound, an index within `min..max`, and an index valid
/// for a sized slice. The bookkeeping core itself never draws
/// randomness; determinism tests inject a [`ScriptedIndexes`] source.
pub trait IndexSource {
    fn raw_index(&mut self) -> usize;

    fn index_below(&mut self, bound: usize) -> usize;

    fn index_between(&mut self, min: usize, max: usize) -> usize;

    fn index_for<S>(&mut self, items: &[S]) -> usize {
        self.index_below(items.len())
    }
}

/// Rng-backed source for production drivers.
pub struct RandomIndexes<R: Rng>(pub R);

impl<R: Rng> IndexSource for RandomIndexes<R> {
    fn raw_index(&mut self) -> usize {
        self.0.gen()
    }

    fn index_below(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }

    fn index_between(&mut self, min: usize, max: usize) -> usize {
        self.0.gen_range(min..max)
    }
}

/// Replays a fixed, non-empty sequence of indices, wrapping around at the
/// end and reducing into whatever bound the caller requests.
pub struct ScriptedIndexes {
    values: Vec<usize>,
    cursor: usize,
}

impl ScriptedIndexes {
    pub fn new(values: Vec<usize>) -> Self {
        assert!(!values.is_empty(), "a scripted index source needs at least one value");
        Self { values, cursor: 0 }
    }

    fn advance(&mut self) -> usize {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl IndexSource for ScriptedIndexes {
    fn raw_index(&mut self) -> usize {
        self.advance()
    }

    fn index_below(&mut self, bound: usize) -> usize {
        self.advance() % bound
    }

    fn index_between(&mut self, min: usize, max: usize) -> usize {
        min + self.advance() % (max - min)
    }
}
