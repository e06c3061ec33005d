//! Per-architecture package slots filled from a classified log

use super::arch::Architecture;
use super::category::PackageCategory;
use log::trace;
use std::collections::HashSet;

/// A single-file manifest slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Empty,
    Filled(String),
}

impl SlotState {
    /// Fill an empty slot. Returns the candidate back when the slot is taken.
    pub fn assign(&mut self, filename: String) -> Option<String> {
        match self {
            SlotState::Empty => {
                *self = SlotState::Filled(filename);
                None
            }
            SlotState::Filled(_) => Some(filename),
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            SlotState::Empty => None,
            SlotState::Filled(name) => Some(name),
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, SlotState::Filled(_))
    }
}

/// Insertion-ordered set of file names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless already present; returns whether it was inserted
    pub fn insert(&mut self, item: String) -> bool {
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &str) -> bool {
        self.seen.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        for item in iter {
            set.insert(item.into());
        }
        set
    }
}

/// Where an assignment ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Slot,
    Oneoff,
    /// File name was already present somewhere in the set
    Duplicate,
}

/// Package files for one architecture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    pub patch: SlotState,
    pub ojvm: SlotState,
    pub opatch: SlotState,
    pub jdk_patch: SlotState,
    pub perl_patch: SlotState,
    pub oneoffs: OrderedSet,
}

impl PackageSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, category: PackageCategory) -> Option<&mut SlotState> {
        match category {
            PackageCategory::BaseRelease => Some(&mut self.patch),
            PackageCategory::OjvmReleaseUpdate => Some(&mut self.ojvm),
            PackageCategory::OPatch => Some(&mut self.opatch),
            PackageCategory::JdkBundlePatch => Some(&mut self.jdk_patch),
            PackageCategory::PerlBundlePatch => Some(&mut self.perl_patch),
            PackageCategory::OtherPatch | PackageCategory::Unknown => None,
        }
    }

    fn slots(&self) -> [&SlotState; 5] {
        [
            &self.patch,
            &self.ojvm,
            &self.opatch,
            &self.jdk_patch,
            &self.perl_patch,
        ]
    }

    /// True if the file name sits in any slot or among the one-offs
    pub fn contains(&self, filename: &str) -> bool {
        self.oneoffs.contains(filename)
            || self
                .slots()
                .iter()
                .any(|slot| slot.as_deref() == Some(filename))
    }

    /// First candidate fills a category's slot; later ones become one-offs
    pub fn assign(&mut self, category: PackageCategory, filename: String) -> Placement {
        if self.contains(&filename) {
            return Placement::Duplicate;
        }

        let demoted = match self.slot_mut(category) {
            Some(slot) => match slot.assign(filename) {
                None => return Placement::Slot,
                Some(name) => name,
            },
            None => filename,
        };

        trace!("📎 {} ({}) goes to one-offs", demoted, category);
        self.oneoffs.insert(demoted);
        Placement::Oneoff
    }

    /// Every file name in the set: slots first, then one-offs
    pub fn filenames(&self) -> Vec<&str> {
        self.slots()
            .iter()
            .filter_map(|slot| slot.as_deref())
            .chain(self.oneoffs.iter())
            .collect()
    }
}

/// One package set per architecture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchPackageSets {
    pub amd64: PackageSet,
    pub arm64: PackageSet,
}

impl ArchPackageSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, arch: Architecture) -> &PackageSet {
        match arch {
            Architecture::Amd64 => &self.amd64,
            Architecture::Arm64 => &self.arm64,
        }
    }

    pub fn get_mut(&mut self, arch: Architecture) -> &mut PackageSet {
        match arch {
            Architecture::Amd64 => &mut self.amd64,
            Architecture::Arm64 => &mut self.arm64,
        }
    }
}
