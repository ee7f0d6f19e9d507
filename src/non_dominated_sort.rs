use crate::dominance_ord::{DominanceOrd, MultiObjective};
use std::cmp::Ordering;

type CandidateIdx = usize;

/// One non-domination rank over a caller-owned candidate slice.
///
/// Members are index back-references into that slice, never copies, so a
/// front lives no longer than the sorted input. The struct also carries
/// the domination bookkeeping needed to derive the next rank without
/// re-running the pairwise pass.
#[derive(Debug)]
pub struct Front<'c, C: 'c> {
    // For each candidate, the candidates it dominates.
    dominated: Vec<Vec<CandidateIdx>>,
    // For each candidate, how many candidates still dominate it.
    blocker_count: Vec<usize>,
    // Scratch buffer reused between ranks.
    retired: Vec<CandidateIdx>,
    members: Vec<CandidateIdx>,
    rank: usize,
    candidates: &'c [C],
}

// Clones only the index bookkeeping; the candidate slice is shared, so
// `C` itself need not be `Clone`.
impl<'c, C> Clone for Front<'c, C> {
    fn clone(&self) -> Self {
        Self {
            dominated: self.dominated.clone(),
            blocker_count: self.blocker_count.clone(),
            retired: self.retired.clone(),
            members: self.members.clone(),
            rank: self.rank,
            candidates: self.candidates,
        }
    }
}

impl<'c, C> Front<'c, C> {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member indices into the sorted slice, in deterministic input order.
    pub fn indices(&self) -> &[CandidateIdx] {
        &self.members
    }

    pub fn iter(&self) -> FrontIter<'_, 'c, C> {
        FrontIter {
            front: self,
            cursor: 0,
        }
    }

    /// Consumes this front and derives the next rank: every candidate a
    /// member dominates loses one blocker, and candidates reaching zero
    /// blockers form the next front.
    pub fn next_front(self) -> Self {
        let Front {
            dominated,
            mut blocker_count,
            retired,
            members,
            rank,
            candidates,
        } = self;

        let mut next = retired;
        next.clear();

        for &p in members.iter() {
            for &q in dominated[p].iter() {
                debug_assert!(blocker_count[q] > 0);
                blocker_count[q] -= 1;
                if blocker_count[q] == 0 {
                    next.push(q);
                }
            }
        }

        Self {
            dominated,
            blocker_count,
            retired: members,
            members: next,
            rank: rank + 1,
            candidates,
        }
    }
}

pub struct FrontIter<'f, 'c: 'f, C: 'c> {
    front: &'f Front<'c, C>,
    cursor: usize,
}

impl<'f, 'c: 'f, C: 'c> Iterator for FrontIter<'f, 'c, C> {
    type Item = (&'c C, CandidateIdx);

    fn next(&mut self) -> Option<Self::Item> {
        match self.front.members.get(self.cursor) {
            Some(&idx) => {
                self.cursor += 1;
                Some((&self.front.candidates[idx], idx))
            }
            None => None,
        }
    }
}

impl<'f, 'c: 'f, C: 'c> IntoIterator for &'f Front<'c, C> {
    type Item = (&'c C, CandidateIdx);
    type IntoIter = FrontIter<'f, 'c, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Partitions `candidates` by Pareto dominance and returns rank 0.
///
/// Runs the O(M·N²) pairwise counting pass once; later ranks derive from
/// the recorded counts via [`Front::next_front`]. Sorting the same slice
/// again, with this or any other comparator, has no side effects on the
/// input.
pub fn non_dominated_sort<'c, C, D>(candidates: &'c [C], domination: &D) -> Front<'c, C>
where
    D: DominanceOrd<T = C>,
{
    let mut dominated: Vec<Vec<CandidateIdx>> = vec![Vec::new(); candidates.len()];
    let mut blocker_count: Vec<usize> = vec![0; candidates.len()];
    let mut members: Vec<CandidateIdx> = Vec::new();

    let mut outer = candidates.iter().enumerate();
    while let Some((p, a)) = outer.next() {
        for (q, b) in outer.clone() {
            match domination.dominance_ord(a, b) {
                Ordering::Less => {
                    // a dominates b.
                    dominated[p].push(q);
                    blocker_count[q] += 1;
                }
                Ordering::Greater => {
                    // b dominates a.
                    dominated[q].push(p);
                    blocker_count[p] += 1;
                }
                Ordering::Equal => {}
            }
        }
        // Every pair involving p has been visited at this point.
        if blocker_count[p] == 0 {
            members.push(p);
        }
    }

    Front {
        dominated,
        blocker_count,
        retired: Vec::new(),
        members,
        rank: 0,
        candidates,
    }
}

/// Lazily yields fronts in increasing rank order until the partition is
/// exhausted. Each step advances the bookkeeping of the previous front,
/// never the pairwise pass.
pub struct Fronts<'c, C: 'c> {
    next: Option<Front<'c, C>>,
}

pub fn pareto_fronts<'c, C, D>(candidates: &'c [C], domination: &D) -> Fronts<'c, C>
where
    D: DominanceOrd<T = C>,
{
    Fronts {
        next: Some(non_dominated_sort(candidates, domination)),
    }
}

impl<'c, C> Iterator for Fronts<'c, C> {
    type Item = Front<'c, C>;

    fn next(&mut self) -> Option<Self::Item> {
        let front = self.next.take()?;
        if front.is_empty() {
            return None;
        }
        self.next = Some(front.clone().next_front());
        Some(front)
    }
}

/// A front member annotated with its rank and crowding distance.
pub struct AssignedCrowdingDistance<'c, C>
where
    C: 'c,
{
    pub candidate: &'c C,
    pub index: CandidateIdx,
    pub rank: usize,
    pub crowding_distance: f64,
}

/// Assigns the normalized cuboid crowding distance to every member of
/// `front`. Boundary members of each objective get an infinite distance
/// so selection keeps the spread of the front open.
pub fn assign_crowding_distance<'c, C>(
    front: &Front<'c, C>,
    multi_objective: &MultiObjective<C, f64>,
) -> Vec<AssignedCrowdingDistance<'c, C>> {
    let mut assigned: Vec<_> = front
        .iter()
        .map(|(candidate, index)| AssignedCrowdingDistance {
            candidate,
            index,
            rank: front.rank(),
            crowding_distance: 0.0,
        })
        .collect();

    // With fewer than three members every one sits on a boundary.
    if assigned.len() < 3 {
        for a in assigned.iter_mut() {
            a.crowding_distance = f64::INFINITY;
        }
        return assigned;
    }

    multi_objective.objectives.iter().for_each(|objective| {
        assigned.sort_by(|a, b| objective.total_order(a.candidate, b.candidate));

        assigned.first_mut().unwrap().crowding_distance = f64::INFINITY;
        assigned.last_mut().unwrap().crowding_distance = f64::INFINITY;

        // Spread between the extreme members under this objective.
        let spread = objective
            .distance(assigned.first().unwrap().candidate, assigned.last().unwrap().candidate)
            .abs();
        debug_assert!(spread >= 0.0);

        if spread > 0.0 {
            let norm = 1.0 / (spread * (multi_objective.objectives.len() as f64));

            for i in 1..assigned.len() - 1 {
                let distance = objective
                    .distance(assigned[i + 1].candidate, assigned[i - 1].candidate)
                    .abs();
                assigned[i].crowding_distance += distance * norm;
            }
        }
    });

    assigned
}
