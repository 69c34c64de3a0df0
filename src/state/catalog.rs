use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::data::{Actor, ActorId, Role};

/// The roster shipped with the application
const BUNDLED_CATALOG: &str = include_str!("../../assets/actors.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed reading catalog at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The fixed roster, split by role.
///
/// Built once at startup and shared (read-only) by the selector and the
/// roster overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorCatalog {
    alpha: Vec<Actor>,
    omega: Vec<Actor>,
}

impl ActorCatalog {
    /// Stable partition of the master list on role.
    /// Relative order inside each role matches the master list.
    pub fn partition(master: Vec<Actor>) -> Self {
        let (alpha, omega): (Vec<Actor>, Vec<Actor>) =
            master.into_iter().partition(|actor| actor.role == Role::Alpha);

        for (role, roster) in [(Role::Alpha, &alpha), (Role::Omega, &omega)] {
            let mut seen = HashSet::new();
            for actor in roster {
                if !seen.insert(actor.name.as_str()) {
                    warn!(name = %actor.name, ?role, "duplicate actor name in roster");
                }
            }
        }

        Self { alpha, omega }
    }

    /// Parse a JSON array of actors and partition it
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let master: Vec<Actor> = serde_json::from_str(json)?;
        Ok(Self::partition(master))
    }

    /// The roster compiled into the binary
    pub fn bundled() -> Result<Self, CatalogError> {
        let catalog = Self::from_json(BUNDLED_CATALOG)?;
        info!(
            alpha = catalog.alpha.len(),
            omega = catalog.omega.len(),
            "loaded bundled catalog"
        );
        Ok(catalog)
    }

    /// Load a user-supplied roster with the same schema as the bundled one
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            alpha = catalog.alpha.len(),
            omega = catalog.omega.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// All actors of one role, in catalog order
    pub fn roster(&self, role: Role) -> &[Actor] {
        match role {
            Role::Alpha => &self.alpha,
            Role::Omega => &self.omega,
        }
    }

    /// Actors of one role paired with their ids
    pub fn entries(&self, role: Role) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.roster(role)
            .iter()
            .enumerate()
            .map(move |(index, actor)| (ActorId::new(role, index), actor))
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.roster(id.role).get(id.index)
    }

    /// First actor of `role` with this name
    pub fn find(&self, role: Role, name: &str) -> Option<ActorId> {
        self.roster(role)
            .iter()
            .position(|actor| actor.name == name)
            .map(|index| ActorId::new(role, index))
    }

    pub fn len(&self) -> usize {
        self.alpha.len() + self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
