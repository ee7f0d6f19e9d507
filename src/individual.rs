use crate::evaluation::Evaluation;
use serde::Serialize;

/// Opaque handle into genotype storage owned by the host. The core
/// stores and copies it but never interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GenotypeId(usize);

impl GenotypeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One candidate record: a genotype handle, its frozen evaluation, and a
/// host-defined tag payload (rank, crowding distance, niche id, ...).
///
/// Individuals are value-like and copied freely; the tag is the only part
/// the ranking machinery mutates in place.
#[derive(Clone, Debug)]
pub struct Individual<T> {
    id: GenotypeId,
    evaluation: Evaluation,
    tag: T,
}

impl<T: Default> Individual<T> {
    pub fn new(id: GenotypeId, evaluation: Evaluation) -> Self {
        Self {
            id,
            evaluation,
            tag: T::default(),
        }
    }
}

impl<T> Individual<T> {
    pub fn with_tag(id: GenotypeId, evaluation: Evaluation, tag: T) -> Self {
        Self { id, evaluation, tag }
    }

    pub fn id(&self) -> GenotypeId {
        self.id
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    pub fn tag_mut(&mut self) -> &mut T {
        &mut self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_defaults_and_mutates_in_place() {
        let mut individual: Individual<u32> =
            Individual::new(GenotypeId::new(7), Evaluation::scalar(1.5));

        assert_eq!(individual.id().index(), 7);
        assert_eq!(*individual.tag(), 0);

        *individual.tag_mut() = 3;
        assert_eq!(*individual.tag(), 3);
        assert_eq!(individual.evaluation().raw(), &[1.5]);
    }

    #[test]
    fn with_tag_keeps_the_given_payload() {
        let individual = Individual::with_tag(GenotypeId::new(0), Evaluation::scalar(0.0), "niche-a");
        assert_eq!(*individual.tag(), "niche-a");
    }
}
