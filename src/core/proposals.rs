use std::collections::{HashMap, VecDeque};

use crate::core::distance::PreferenceLists;

/// Provisional pairing produced by one proposal run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalOutcome {
    /// Matched pairs, each emitted once, ordered by the earlier member's input position
    pub pairs: Vec<(usize, usize)>,
    /// Members left without a partner once their lists ran out
    pub unmatched: Vec<usize>,
    /// Number of proposals made (bounded by n * (n - 1))
    pub proposals: usize,
}

/// Per-run state for the everyone-proposes process
///
/// Every table is indexed by participant position. Nothing here outlives a
/// single call to [`everyone_proposes`].
struct ProposalRun<'a> {
    lists: &'a PreferenceLists,
    /// Position of the next candidate to propose to
    cursor: Vec<usize>,
    /// candidate -> position in the owner's unconsumed list
    ranks: Vec<HashMap<usize, usize>>,
    partner: Vec<Option<usize>>,
    queue: VecDeque<usize>,
    proposals: usize,
}

impl<'a> ProposalRun<'a> {
    fn new(members: &[usize], lists: &'a PreferenceLists) -> Self {
        let size = members
            .iter()
            .map(|&m| m + 1)
            .max()
            .unwrap_or(0)
            .max(lists.len());

        let mut ranks = vec![HashMap::new(); size];
        for &member in members {
            ranks[member] = lists
                .get(member)
                .iter()
                .enumerate()
                .map(|(rank, &candidate)| (candidate, rank))
                .collect();
        }

        Self {
            lists,
            cursor: vec![0; size],
            ranks,
            partner: vec![None; size],
            queue: members.iter().copied().collect(),
            proposals: 0,
        }
    }

    #[inline]
    fn rank(&self, owner: usize, candidate: usize) -> Option<usize> {
        self.ranks.get(owner)?.get(&candidate).copied()
    }

    fn pair(&mut self, a: usize, b: usize) {
        self.partner[a] = Some(b);
        self.partner[b] = Some(a);
    }

    /// Drop `member` from the unmatched queue if it is waiting there
    fn dequeue(&mut self, member: usize) {
        if let Some(pos) = self.queue.iter().position(|&m| m == member) {
            self.queue.remove(pos);
        }
    }

    fn run(&mut self) {
        while let Some(&proposer) = self.queue.front() {
            let Some(&candidate) = self.lists.get(proposer).get(self.cursor[proposer]) else {
                // List exhausted: the proposer leaves the queue for good
                self.queue.pop_front();
                continue;
            };
            self.cursor[proposer] += 1;
            self.proposals += 1;

            if candidate == proposer {
                continue;
            }

            // A candidate only considers proposers it ranks itself; unknown
            // positions have no rank table and reject everyone
            let Some(proposer_rank) = self.rank(candidate, proposer) else {
                continue;
            };

            let current = self.partner[candidate];
            match current {
                None => {
                    self.pair(proposer, candidate);
                    self.queue.pop_front();
                    self.dequeue(candidate);
                }
                Some(current) => {
                    let current_rank = self.rank(candidate, current).unwrap_or(usize::MAX);
                    if proposer_rank < current_rank {
                        self.partner[current] = None;
                        self.pair(proposer, candidate);
                        self.queue.pop_front();
                        self.queue.push_back(current);
                    }
                }
            }
        }
    }

    fn finish(self, members: &[usize]) -> ProposalOutcome {
        let mut emitted = vec![false; self.partner.len()];
        let mut pairs = Vec::new();
        let mut unmatched = Vec::new();

        for &member in members {
            if emitted[member] {
                continue;
            }
            match self.partner[member] {
                Some(other) => {
                    emitted[member] = true;
                    emitted[other] = true;
                    pairs.push((member, other));
                }
                None => unmatched.push(member),
            }
        }

        ProposalOutcome {
            pairs,
            unmatched,
            proposals: self.proposals,
        }
    }
}

/// Run the everyone-proposes process over `members`
///
/// `members` are participant positions in queue order and must be unique.
/// `lists` are the (possibly filtered or restricted) preference lists for the
/// run; candidates outside `members`, including positions past the end of the
/// run, are never accepted.
///
/// Unmatched members sit in a FIFO queue. The front member proposes to its
/// next remaining candidate. An unmatched candidate accepts; a matched one
/// accepts only if it ranks the proposer strictly above its current partner,
/// in which case the displaced partner goes to the back of the queue and later
/// resumes from its own cursor. A member whose list runs out leaves the queue.
pub fn everyone_proposes(members: &[usize], lists: &PreferenceLists) -> ProposalOutcome {
    let mut run = ProposalRun::new(members, lists);
    run.run();
    run.finish(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;
    const D: usize = 3;

    fn lists(raw: &[&[usize]]) -> PreferenceLists {
        PreferenceLists::from_lists(raw.iter().map(|l| l.to_vec()).collect())
    }

    #[test]
    fn test_mutual_nearest_pairs_directly() {
        // Scores A=0, B=1, C=10, D=11
        let prefs = lists(&[&[B, C, D], &[A, C, D], &[D, B, A], &[C, B, A]]);

        let outcome = everyone_proposes(&[A, B, C, D], &prefs);

        assert_eq!(outcome.pairs, vec![(A, B), (C, D)]);
        assert!(outcome.unmatched.is_empty());
        assert_eq!(outcome.proposals, 2);
    }

    #[test]
    fn test_displacement_reenqueues_partner() {
        // Scores A=0, B=3, C=4.5, D=100
        let prefs = lists(&[&[B, C, D], &[C, A, D], &[B, A, D], &[C, B, A]]);

        let outcome = everyone_proposes(&[A, B, C, D], &prefs);

        // A->B accepted, C->B displaces A, D->C and D->B rejected, D->A accepted
        assert_eq!(outcome.pairs, vec![(A, D), (B, C)]);
        assert!(outcome.unmatched.is_empty());
        assert_eq!(outcome.proposals, 5);
    }

    #[test]
    fn test_displaced_member_resumes_from_cursor() {
        let prefs = lists(&[&[B, C], &[C, A], &[B, A]]);

        let outcome = everyone_proposes(&[A, B, C], &prefs);

        // A is displaced by C, then proposes to C (not B again) and runs out
        assert_eq!(outcome.pairs, vec![(B, C)]);
        assert_eq!(outcome.unmatched, vec![A]);
        assert_eq!(outcome.proposals, 3);
    }

    #[test]
    fn test_candidate_rejects_unranked_proposer() {
        // B does not list A at all
        let prefs = lists(&[&[B], &[]]);

        let outcome = everyone_proposes(&[A, B], &prefs);

        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched, vec![A, B]);
        assert_eq!(outcome.proposals, 1);
    }

    #[test]
    fn test_non_members_never_accept() {
        let prefs = lists(&[&[C, B], &[C, A], &[A, B]]);

        let outcome = everyone_proposes(&[A, B], &prefs);

        assert_eq!(outcome.pairs, vec![(A, B)]);
    }

    #[test]
    fn test_out_of_range_candidate_is_skipped() {
        let prefs = lists(&[&[5, B], &[A]]);

        let outcome = everyone_proposes(&[A, B], &prefs);
        assert_eq!(outcome.pairs, vec![(A, B)]);
        assert_eq!(outcome.proposals, 2);

        let outcome = everyone_proposes(&[A], &lists(&[&[5]]));
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched, vec![A]);
    }

    #[test]
    fn test_empty_and_singleton() {
        let outcome = everyone_proposes(&[], &PreferenceLists::default());
        assert_eq!(outcome, ProposalOutcome::default());

        let outcome = everyone_proposes(&[A], &lists(&[&[]]));
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched, vec![A]);
        assert_eq!(outcome.proposals, 0);
    }

    #[test]
    fn test_proposals_bounded() {
        let n = 8;
        let prefs = PreferenceLists::from_lists(
            (0..n)
                .map(|owner| (0..n).filter(|&c| c != owner).rev().collect())
                .collect(),
        );
        let members: Vec<usize> = (0..n).collect();

        let outcome = everyone_proposes(&members, &prefs);

        assert!(outcome.proposals <= n * (n - 1));
        assert_eq!(outcome.pairs.len() * 2 + outcome.unmatched.len(), n);
    }
}
