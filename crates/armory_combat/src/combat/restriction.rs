//! Restriction checker - может ли актор сейчас использовать оружие
//!
//! Чистый предикат: без side effects, состояние актора не меняется.

use crate::components::ActorMarkers;

/// Источник маркеров актора
pub trait MarkerSource {
    fn has_marker(&self, tag: &str) -> bool;
}

impl MarkerSource for ActorMarkers {
    fn has_marker(&self, tag: &str) -> bool {
        ActorMarkers::has_marker(self, tag)
    }
}

/// Актор без компонента маркеров ничем не ограничен
impl<M: MarkerSource> MarkerSource for Option<&M> {
    fn has_marker(&self, tag: &str) -> bool {
        self.is_some_and(|markers| markers.has_marker(tag))
    }
}

/// Первый тег из списка, который активен на акторе (в порядке списка)
pub fn first_restriction<'a, M>(actor: &M, restrictions: &'a [String]) -> Option<&'a str>
where
    M: MarkerSource + ?Sized,
{
    restrictions
        .iter()
        .find(|tag| actor.has_marker(&tag.to_lowercase()))
        .map(String::as_str)
}

/// true, если хотя бы один тег активен; пустой список → false
pub fn is_restricted<M>(actor: &M, restrictions: &[String]) -> bool
where
    M: MarkerSource + ?Sized,
{
    first_restriction(actor, restrictions).is_some()
}
