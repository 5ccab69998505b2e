//! Output file naming and collision tracking

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use respacker_core::{Error, Result};
use tracing::warn;

use crate::config::CollisionPolicy;

/// Replace every character other than ASCII letters, digits, `-` and `_` with `_`
///
/// The mapping is per character, so the result has as many characters as the
/// input. An empty name becomes `_`.
pub fn clean_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }

    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Outcome of claiming an output path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// First claim on this path
    New,
    /// Same source claimed the path before
    Repeat,
    /// A different source owned the path; it gets overwritten
    Overwrite { previous: String },
}

/// Tracks which source name owns each output path
#[derive(Debug, Default)]
pub struct NameRegistry {
    owners: HashMap<PathBuf, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source` as the owner of `path`
    pub fn claim(&mut self, source: &str, path: &Path, policy: CollisionPolicy) -> Result<Claim> {
        match self.owners.get(path) {
            None => {
                self.owners.insert(path.to_path_buf(), source.to_string());
                Ok(Claim::New)
            }
            Some(owner) if owner == source => Ok(Claim::Repeat),
            Some(owner) => match policy {
                CollisionPolicy::Error => Err(Error::NameCollision {
                    first: owner.clone(),
                    second: source.to_string(),
                    path: path.to_path_buf(),
                }),
                CollisionPolicy::Overwrite => {
                    let previous = owner.clone();
                    warn!(
                        path = %path.display(),
                        previous = %previous,
                        source = %source,
                        "Output name collision, overwriting"
                    );
                    self.owners.insert(path.to_path_buf(), source.to_string());
                    Ok(Claim::Overwrite { previous })
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Crate.001"), "Crate_001");
        assert_eq!(clean_name("Spawner_Goblin"), "Spawner_Goblin");
        assert_eq!(clean_name("wall/left side"), "wall_left_side");
        assert_eq!(clean_name("Tür"), "T_r");
        assert_eq!(clean_name(""), "_");
    }

    #[test]
    fn test_claim_collision_policies() {
        let path = Path::new("/out/Crate_001.txt");
        let mut registry = NameRegistry::new();

        assert_eq!(registry.claim("Crate.001", path, CollisionPolicy::Error).unwrap(), Claim::New);
        assert_eq!(registry.claim("Crate.001", path, CollisionPolicy::Error).unwrap(), Claim::Repeat);

        let err = registry.claim("Crate 001", path, CollisionPolicy::Error).unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }));

        assert_eq!(
            registry.claim("Crate 001", path, CollisionPolicy::Overwrite).unwrap(),
            Claim::Overwrite { previous: "Crate.001".to_string() }
        );
        assert_eq!(registry.len(), 1);
    }

    proptest! {
        #[test]
        fn clean_name_is_safe_and_stable(name in "\\PC{0,40}") {
            let cleaned = clean_name(&name);
            prop_assert!(cleaned.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            prop_assert_eq!(clean_name(&cleaned), cleaned.clone());
            if !name.is_empty() {
                prop_assert_eq!(cleaned.chars().count(), name.chars().count());
            }
        }
    }
}
