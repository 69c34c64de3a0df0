/// Pairing selection engine
///
/// Owns the two independent per-role selection slots and the transient
/// randomization phase. A random draw is split in two halves so the
/// settle delay can run between them as a scheduled task:
///
/// ```text
/// Idle --begin_random()--> Randomizing --finish_random(ticket)--> Idle
/// ```

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::catalog::ActorCatalog;
use super::data::{Actor, ActorId, Role};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    /// A role has nobody to draw from
    #[error("no candidates for {role:?}")]
    NoCandidates { role: Role },
    #[error("a random draw is already in progress")]
    DrawInProgress,
    #[error("draw {0:?} is not the pending draw")]
    StaleDraw(DrawTicket),
    #[error("{0:?} is not in the catalog")]
    UnknownActor(ActorId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Randomizing,
}

/// Handle for a draw that has begun but not yet settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTicket(u64);

pub struct PairingSelector {
    catalog: Arc<ActorCatalog>,
    alpha: Option<ActorId>,
    omega: Option<ActorId>,
    pending: Option<DrawTicket>,
    draws: u64,
}

impl PairingSelector {
    /// Both slots start empty, phase starts Idle
    pub fn new(catalog: Arc<ActorCatalog>) -> Self {
        Self {
            catalog,
            alpha: None,
            omega: None,
            pending: None,
            draws: 0,
        }
    }

    pub fn catalog(&self) -> &ActorCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.pending.is_some() {
            SelectionPhase::Randomizing
        } else {
            SelectionPhase::Idle
        }
    }

    /// The draw waiting to settle, if any
    pub fn pending_draw(&self) -> Option<DrawTicket> {
        self.pending
    }

    pub fn selected_id(&self, role: Role) -> Option<ActorId> {
        match role {
            Role::Alpha => self.alpha,
            Role::Omega => self.omega,
        }
    }

    pub fn selected(&self, role: Role) -> Option<&Actor> {
        self.selected_id(role).and_then(|id| self.catalog.get(id))
    }

    /// True when both slots are filled
    pub fn is_complete(&self) -> bool {
        self.alpha.is_some() && self.omega.is_some()
    }

    /// Put `id` into its role's slot right away.
    ///
    /// The other slot and the phase are untouched. Accepted while a draw is
    /// pending; the draw overwrites it when it settles.
    pub fn select_manual(&mut self, id: ActorId) -> Result<(), PairingError> {
        if self.catalog.get(id).is_none() {
            return Err(PairingError::UnknownActor(id));
        }
        *self.slot_mut(id.role) = Some(id);
        debug!(?id, "manual selection");
        Ok(())
    }

    /// Start a random draw: check both partitions, enter Randomizing and
    /// clear both slots. The caller settles the draw with
    /// [`finish_random`](Self::finish_random) once the settle delay elapses.
    pub fn begin_random(&mut self) -> Result<DrawTicket, PairingError> {
        for role in Role::ALL {
            if self.catalog.roster(role).is_empty() {
                return Err(PairingError::NoCandidates { role });
            }
        }
        if self.pending.is_some() {
            return Err(PairingError::DrawInProgress);
        }

        self.draws += 1;
        let ticket = DrawTicket(self.draws);
        self.pending = Some(ticket);
        self.alpha = None;
        self.omega = None;
        debug!(?ticket, "random draw started");
        Ok(ticket)
    }

    /// Settle the pending draw with one independent uniform pick per role
    pub fn finish_random<R: Rng + ?Sized>(
        &mut self,
        ticket: DrawTicket,
        rng: &mut R,
    ) -> Result<(ActorId, ActorId), PairingError> {
        if self.pending != Some(ticket) {
            return Err(PairingError::StaleDraw(ticket));
        }

        let alpha = draw(&self.catalog, Role::Alpha, rng)?;
        let omega = draw(&self.catalog, Role::Omega, rng)?;

        self.alpha = Some(alpha);
        self.omega = Some(omega);
        self.pending = None;

        if let (Some(a), Some(b)) = (self.catalog.get(alpha), self.catalog.get(omega)) {
            info!(alpha = %a.name, omega = %b.name, "random pairing drawn");
        }
        Ok((alpha, omega))
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<ActorId> {
        match role {
            Role::Alpha => &mut self.alpha,
            Role::Omega => &mut self.omega,
        }
    }
}

/// Uniform pick over one partition
fn draw<R: Rng + ?Sized>(
    catalog: &ActorCatalog,
    role: Role,
    rng: &mut R,
) -> Result<ActorId, PairingError> {
    let len = catalog.roster(role).len();
    if len == 0 {
        return Err(PairingError::NoCandidates { role });
    }
    Ok(ActorId::new(role, rng.random_range(0..len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn actor(name: &str, role: Role) -> Actor {
        Actor {
            name: name.to_string(),
            photo_query: None,
            tags: vec![],
            role,
        }
    }

    fn selector(alpha: &[&str], omega: &[&str]) -> PairingSelector {
        let master = alpha
            .iter()
            .map(|n| actor(n, Role::Alpha))
            .chain(omega.iter().map(|n| actor(n, Role::Omega)))
            .collect();
        PairingSelector::new(Arc::new(ActorCatalog::partition(master)))
    }

    fn name(selector: &PairingSelector, role: Role) -> Option<String> {
        selector.selected(role).map(|a| a.name.clone())
    }

    #[test]
    fn test_starts_empty_and_idle() {
        let s = selector(&["Alice"], &["Carol"]);
        assert_eq!(s.phase(), SelectionPhase::Idle);
        assert!(s.selected(Role::Alpha).is_none());
        assert!(s.selected(Role::Omega).is_none());
        assert!(!s.is_complete());
    }

    #[test]
    fn test_manual_selection_is_independent() {
        let mut s = selector(&["Alice", "Bob"], &["Carol"]);
        let carol = s.catalog().find(Role::Omega, "Carol").unwrap();
        s.select_manual(carol).unwrap();

        let bob = s.catalog().find(Role::Alpha, "Bob").unwrap();
        s.select_manual(bob).unwrap();
        assert_eq!(name(&s, Role::Omega).as_deref(), Some("Carol"));
        assert_eq!(name(&s, Role::Alpha).as_deref(), Some("Bob"));

        let alice = s.catalog().find(Role::Alpha, "Alice").unwrap();
        s.select_manual(alice).unwrap();
        assert_eq!(name(&s, Role::Omega).as_deref(), Some("Carol"));
        assert_eq!(s.phase(), SelectionPhase::Idle);
        assert!(s.is_complete());
    }

    #[test]
    fn test_unknown_actor_is_rejected() {
        let mut s = selector(&["Alice"], &["Carol"]);
        let bogus = ActorId::new(Role::Alpha, 7);
        assert_eq!(s.select_manual(bogus), Err(PairingError::UnknownActor(bogus)));
        assert!(s.selected(Role::Alpha).is_none());
    }

    #[test]
    fn test_random_requires_both_rosters() {
        let mut s = selector(&[], &["Carol"]);
        let carol = s.catalog().find(Role::Omega, "Carol").unwrap();
        s.select_manual(carol).unwrap();

        assert_eq!(
            s.begin_random(),
            Err(PairingError::NoCandidates { role: Role::Alpha })
        );
        assert_eq!(s.phase(), SelectionPhase::Idle);
        assert!(s.selected(Role::Alpha).is_none());
        assert_eq!(name(&s, Role::Omega).as_deref(), Some("Carol"));

        let mut s = selector(&["Alice"], &[]);
        assert_eq!(
            s.begin_random(),
            Err(PairingError::NoCandidates { role: Role::Omega })
        );
        assert_eq!(s.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn test_random_draw_lifecycle() {
        let mut s = selector(&["Alice", "Bob"], &["Carol"]);
        let alice = s.catalog().find(Role::Alpha, "Alice").unwrap();
        s.select_manual(alice).unwrap();

        let ticket = s.begin_random().unwrap();
        assert_eq!(s.phase(), SelectionPhase::Randomizing);
        assert!(s.selected(Role::Alpha).is_none());
        assert!(s.selected(Role::Omega).is_none());

        let mut rng = StdRng::seed_from_u64(7);
        let (a, b) = s.finish_random(ticket, &mut rng).unwrap();
        assert_eq!(s.phase(), SelectionPhase::Idle);
        assert_eq!(a.role, Role::Alpha);
        assert_eq!(b.role, Role::Omega);
        assert_eq!(s.selected_id(Role::Alpha), Some(a));
        assert_eq!(name(&s, Role::Omega).as_deref(), Some("Carol"));
        assert!(s.is_complete());
    }

    #[test]
    fn test_overlapping_draw_is_rejected() {
        let mut s = selector(&["Alice"], &["Carol"]);
        let ticket = s.begin_random().unwrap();
        assert_eq!(s.begin_random(), Err(PairingError::DrawInProgress));
        assert_eq!(s.phase(), SelectionPhase::Randomizing);

        let mut rng = StdRng::seed_from_u64(1);
        s.finish_random(ticket, &mut rng).unwrap();
        assert!(s.begin_random().is_ok());
    }

    #[test]
    fn test_stale_ticket_changes_nothing() {
        let mut s = selector(&["Alice"], &["Carol"]);
        let mut rng = StdRng::seed_from_u64(1);
        let first = s.begin_random().unwrap();
        s.finish_random(first, &mut rng).unwrap();

        let alice = s.catalog().find(Role::Alpha, "Alice").unwrap();
        s.select_manual(alice).unwrap();
        assert_eq!(
            s.finish_random(first, &mut rng),
            Err(PairingError::StaleDraw(first))
        );
        assert_eq!(s.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn test_manual_pick_during_draw_is_overwritten() {
        let mut s = selector(&["Alice", "Bob"], &["Carol"]);
        let ticket = s.begin_random().unwrap();

        let bob = s.catalog().find(Role::Alpha, "Bob").unwrap();
        s.select_manual(bob).unwrap();
        assert_eq!(s.phase(), SelectionPhase::Randomizing);

        let mut rng = StdRng::seed_from_u64(3);
        let (a, _) = s.finish_random(ticket, &mut rng).unwrap();
        assert_eq!(s.selected_id(Role::Alpha), Some(a));
    }

    #[test]
    fn test_draw_is_roughly_uniform() {
        let mut s = selector(&["Alice", "Bob"], &["Carol"]);
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;
        let mut alice = 0;

        for _ in 0..trials {
            let ticket = s.begin_random().unwrap();
            s.finish_random(ticket, &mut rng).unwrap();
            assert_eq!(name(&s, Role::Omega).as_deref(), Some("Carol"));
            if name(&s, Role::Alpha).as_deref() == Some("Alice") {
                alice += 1;
            }
        }

        assert!((4_500..=5_500).contains(&alice), "alice drawn {alice} times");
    }

    #[test]
    fn test_same_name_may_fill_both_slots() {
        let mut s = selector(&["Alex"], &["Alex"]);
        let mut rng = StdRng::seed_from_u64(9);
        let ticket = s.begin_random().unwrap();
        s.finish_random(ticket, &mut rng).unwrap();
        assert_eq!(name(&s, Role::Alpha), name(&s, Role::Omega));
        assert_ne!(s.selected_id(Role::Alpha), s.selected_id(Role::Omega));
    }
}
