use crate::core::MatchError;
use crate::models::Participant;

/// Preference lists for one matching run
///
/// Indexed by the participant's position in the run snapshot. Each list holds
/// the positions of other participants, most similar first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceLists {
    lists: Vec<Vec<usize>>,
}

impl PreferenceLists {
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Self {
        Self { lists }
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Candidates for `owner`, nearest first
    #[inline]
    pub fn get(&self, owner: usize) -> &[usize] {
        self.lists.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keep only the candidates for which `keep(owner, candidate)` holds
    pub fn retain_where<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let lists = self
            .lists
            .iter()
            .enumerate()
            .map(|(owner, list)| {
                list.iter()
                    .copied()
                    .filter(|&candidate| keep(owner, candidate))
                    .collect()
            })
            .collect();

        Self { lists }
    }

    /// Restrict every list to candidates inside `members`
    ///
    /// Owners outside `members` keep an empty list.
    pub fn restrict_to(&self, members: &[usize]) -> Self {
        let mut in_subset = vec![false; self.lists.len()];
        for &m in members {
            if let Some(slot) = in_subset.get_mut(m) {
                *slot = true;
            }
        }

        self.retain_where(|owner, candidate| {
            in_subset[owner] && in_subset.get(candidate).copied().unwrap_or(false)
        })
    }

    /// Resolve positions back to participant ids
    ///
    /// Positions with no matching participant are dropped.
    pub fn to_ids<'a>(&self, participants: &'a [Participant]) -> Vec<(&'a str, Vec<&'a str>)> {
        self.lists
            .iter()
            .zip(participants)
            .map(|(list, owner)| {
                (
                    owner.id.as_str(),
                    list.iter()
                        .filter_map(|&i| participants.get(i))
                        .map(|p| p.id.as_str())
                        .collect(),
                )
            })
            .collect()
    }
}

/// Euclidean distance between two score vectors
///
/// Callers guarantee equal length; see [`validate_scores`].
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Check that every participant carries a finite score vector of the same length
pub fn validate_scores(participants: &[Participant]) -> Result<(), MatchError> {
    let Some(first) = participants.first() else {
        return Ok(());
    };
    let dimension = first.scores.len();

    for participant in participants {
        if participant.scores.len() != dimension {
            return Err(MatchError::InvalidInput(format!(
                "participant {} has {} scores, expected {}",
                participant.id,
                participant.scores.len(),
                dimension
            )));
        }
        if participant.scores.iter().any(|s| !s.is_finite()) {
            return Err(MatchError::InvalidInput(format!(
                "participant {} has a non-finite score",
                participant.id
            )));
        }
    }

    Ok(())
}

/// Rank every other participant by ascending distance, for each participant
///
/// Equal distances keep enumeration order (the sort is stable).
pub fn build_preference_lists(participants: &[Participant]) -> Result<PreferenceLists, MatchError> {
    validate_scores(participants)?;

    let lists = participants
        .iter()
        .enumerate()
        .map(|(owner, participant)| {
            let mut ranked: Vec<(usize, f64)> = participants
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != owner)
                .map(|(other, candidate)| {
                    (other, euclidean_distance(&participant.scores, &candidate.scores))
                })
                .collect();

            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
            ranked.into_iter().map(|(other, _)| other).collect()
        })
        .collect();

    Ok(PreferenceLists { lists })
}
