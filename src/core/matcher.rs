use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::core::{
    distance::build_preference_lists,
    filters::filter_by_orientation,
    proposals::{everyone_proposes, ProposalOutcome},
};
use crate::models::{Pair, PairRound, Participant, RoomType};

/// Errors raised before any pairing happens
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid matching mode: {0}")]
    InvalidMode(String),

    #[error("Too many participants: {count} exceeds the limit of {limit}")]
    TooManyParticipants { count: usize, limit: usize },
}

/// Final pairing for one matching run
///
/// Every input id appears exactly once, either inside `pairs` (a self-pair
/// counts once) or in `unresolved`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub pairs: Vec<Pair>,
    /// Participants left over after every round when more than one remains
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.unresolved.is_empty()
    }

    /// True when nobody was left unresolved
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn self_pair(&self) -> Option<&Pair> {
        self.pairs.iter().find(|p| p.is_self_pair())
    }

    pub fn pairs_in(&self, round: PairRound) -> impl Iterator<Item = &Pair> {
        self.pairs.iter().filter(move |p| p.round == round)
    }

    /// The pair `id` ended up in, if any
    pub fn pair_of(&self, id: &str) -> Option<&Pair> {
        self.pairs.iter().find(|p| p.contains(id))
    }

    /// Partner of `id`, or `id` itself for the self-pair
    pub fn partner_of(&self, id: &str) -> Option<&str> {
        self.pair_of(id).map(|p| {
            if p.first == id {
                p.second.as_str()
            } else {
                p.first.as_str()
            }
        })
    }
}

/// Pairs collected across rounds, by participant position
struct RunDraft {
    matched: Vec<bool>,
    pairs: Vec<(usize, usize, PairRound)>,
}

impl RunDraft {
    fn new(size: usize) -> Self {
        Self {
            matched: vec![false; size],
            pairs: Vec::new(),
        }
    }

    fn extend(&mut self, outcome: &ProposalOutcome, round: PairRound) {
        for &(a, b) in &outcome.pairs {
            self.matched[a] = true;
            self.matched[b] = true;
            self.pairs.push((a, b, round));
        }
    }

    /// Positions absent from every pair so far, in input order
    fn leftovers(&self) -> Vec<usize> {
        (0..self.matched.len()).filter(|&i| !self.matched[i]).collect()
    }

    /// A single leftover becomes a self-pair; several are reported unresolved
    fn finish(mut self, participants: &[Participant]) -> MatchResult {
        let leftovers = self.leftovers();
        let mut unresolved = Vec::new();

        match leftovers.as_slice() {
            [] => {}
            [solo] => self.pairs.push((*solo, *solo, PairRound::Leftover)),
            many => {
                unresolved = many.iter().map(|&i| participants[i].id.clone()).collect();
                tracing::warn!(
                    "{} participants left unmatched after all rounds: {:?}",
                    unresolved.len(),
                    unresolved
                );
            }
        }

        let pairs = self
            .pairs
            .into_iter()
            .map(|(a, b, round)| Pair::new(participants[a].id.clone(), participants[b].id.clone(), round))
            .collect();

        MatchResult { pairs, unresolved }
    }
}

/// Matching orchestrator
///
/// # Modes
/// - **Platonic**: one everyone-proposes run over similarity-ranked lists.
/// - **Romantic**: round 1 honors each participant's accepted genders; the
///   leftovers then get a relaxed round 2 over their unfiltered lists.
///
/// Both modes turn a single leftover into a self-pair.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    max_participants: Option<usize>,
}

impl Matcher {
    pub fn new(max_participants: Option<usize>) -> Self {
        Self { max_participants }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn max_participants(&self) -> Option<usize> {
        self.max_participants
    }

    /// Dispatch on room type
    pub fn compute_matches(
        &self,
        room_type: RoomType,
        participants: &[Participant],
    ) -> Result<MatchResult, MatchError> {
        match room_type {
            RoomType::Platonic => self.compute_platonic_matches(participants),
            RoomType::Romantic => self.compute_romantic_matches(participants),
        }
    }

    pub fn compute_platonic_matches(
        &self,
        participants: &[Participant],
    ) -> Result<MatchResult, MatchError> {
        self.check_participants(participants)?;

        let lists = build_preference_lists(participants)?;
        let members: Vec<usize> = (0..participants.len()).collect();

        let outcome = everyone_proposes(&members, &lists);
        tracing::debug!(
            "Platonic run: {} pairs, {} unmatched, {} proposals",
            outcome.pairs.len(),
            outcome.unmatched.len(),
            outcome.proposals
        );

        let mut draft = RunDraft::new(participants.len());
        draft.extend(&outcome, PairRound::Primary);

        Ok(draft.finish(participants))
    }

    pub fn compute_romantic_matches(
        &self,
        participants: &[Participant],
    ) -> Result<MatchResult, MatchError> {
        self.check_participants(participants)?;

        let base = build_preference_lists(participants)?;
        let oriented = filter_by_orientation(participants, &base);
        let members: Vec<usize> = (0..participants.len()).collect();

        let first = everyone_proposes(&members, &oriented);
        tracing::debug!(
            "Romantic round 1: {} pairs, {} unmatched, {} proposals",
            first.pairs.len(),
            first.unmatched.len(),
            first.proposals
        );

        let mut draft = RunDraft::new(participants.len());
        draft.extend(&first, PairRound::Primary);

        let leftovers = draft.leftovers();
        if leftovers.len() > 1 {
            let relaxed = base.restrict_to(&leftovers);
            let second = everyone_proposes(&leftovers, &relaxed);
            tracing::debug!(
                "Romantic round 2 over {} leftovers: {} fallback pairs, {} proposals",
                leftovers.len(),
                second.pairs.len(),
                second.proposals
            );
            draft.extend(&second, PairRound::Fallback);
        }

        Ok(draft.finish(participants))
    }

    /// Size cap and id uniqueness; score vectors are checked by the ranker
    fn check_participants(&self, participants: &[Participant]) -> Result<(), MatchError> {
        if let Some(limit) = self.max_participants {
            if participants.len() > limit {
                return Err(MatchError::TooManyParticipants {
                    count: participants.len(),
                    limit,
                });
            }
        }

        let mut seen = HashSet::with_capacity(participants.len());
        for participant in participants {
            if !seen.insert(participant.id.as_str()) {
                return Err(MatchError::InvalidInput(format!(
                    "duplicate participant id {}",
                    participant.id
                )));
            }
        }

        Ok(())
    }
}
