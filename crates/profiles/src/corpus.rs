//! The append-only profile corpus.
//!
//! Profiles are stored in insertion order behind `Arc` so that candidates and
//! recommendations can hand them out without copying. Positions are stable:
//! nothing is ever removed or reordered, which lets model artifacts refer to
//! profiles by position.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{ProfileError, Result};
use crate::types::{Profile, ProfileId};

/// All profiles known to the engine, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    profiles: Vec<Arc<Profile>>,
    positions: HashMap<ProfileId, usize>,
}

impl Corpus {
    /// Creates a new, empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Get a profile by id
    pub fn get(&self, id: &str) -> Option<&Arc<Profile>> {
        self.position(id).map(|pos| &self.profiles[pos])
    }

    /// Insertion position of a profile id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// All profiles as a slice, in insertion order
    pub fn profiles(&self) -> &[Arc<Profile>] {
        &self.profiles
    }

    /// Append a profile, returning its position.
    pub fn push(&mut self, profile: Profile) -> Result<usize> {
        if self.contains(&profile.profile_id) {
            return Err(ProfileError::DuplicateProfile {
                id: profile.profile_id,
            });
        }
        let position = self.profiles.len();
        self.positions.insert(profile.profile_id.clone(), position);
        self.profiles.push(Arc::new(profile));
        Ok(position)
    }

    /// Append several profiles atomically: either all are added or none.
    pub fn extend(&mut self, profiles: Vec<Profile>) -> Result<std::ops::Range<usize>> {
        let mut seen = HashSet::with_capacity(profiles.len());
        for profile in &profiles {
            if self.contains(&profile.profile_id) || !seen.insert(profile.profile_id.as_str()) {
                return Err(ProfileError::DuplicateProfile {
                    id: profile.profile_id.clone(),
                });
            }
        }

        let start = self.profiles.len();
        for profile in profiles {
            self.positions.insert(profile.profile_id.clone(), self.profiles.len());
            self.profiles.push(Arc::new(profile));
        }
        Ok(start..self.profiles.len())
    }

    /// Get (real, mock) counts for logging
    pub fn counts(&self) -> (usize, usize) {
        let mock = self.profiles.iter().filter(|p| p.is_mock).count();
        (self.profiles.len() - mock, mock)
    }
}
