use crate::core::distance::PreferenceLists;
use crate::models::Participant;

/// Check whether two participants accept each other's gender
#[inline]
pub fn mutually_compatible(a: &Participant, b: &Participant) -> bool {
    a.accepts(b) && b.accepts(a)
}

/// Restrict each participant's list to the genders they accept
///
/// Only the owner's own preference is applied here. Participants accepting
/// "any" keep their full list. Relative order is preserved and `base` is left
/// untouched. Positions past the end of `participants` are dropped.
pub fn filter_by_orientation(
    participants: &[Participant],
    base: &PreferenceLists,
) -> PreferenceLists {
    base.retain_where(|owner, candidate| {
        match (participants.get(owner), participants.get(candidate)) {
            (Some(owner), Some(candidate)) => owner.accepts(candidate),
            _ => false,
        }
    })
}
