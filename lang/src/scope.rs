use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::shared::Type;

/// Name lookup for the declared types of one source file. Insertion happens
/// once; a second declaration of the same name leaves the first entry in
/// place and hands it back so the caller can report the collision.
#[derive(Debug, Default)]
pub struct Scope {
    entries: HashMap<String, ScopeEntry>,
}

#[derive(Debug)]
struct ScopeEntry {
    ty: Type,
    imported: bool,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a type of this file. Returns the prior entry on conflict.
    pub fn declare(&mut self, name: &str, ty: Type) -> Option<&Type> {
        self.insert(name, ty, false)
    }

    /// Declares a type merged in from an imported module.
    pub fn declare_imported(&mut self, name: &str, ty: Type) -> Option<&Type> {
        self.insert(name, ty, true)
    }

    fn insert(&mut self, name: &str, ty: Type, imported: bool) -> Option<&Type> {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(entry) => Some(&entry.into_mut().ty),
            Entry::Vacant(entry) => {
                entry.insert(ScopeEntry { ty, imported });
                None
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.entries.get(name).map(|entry| &entry.ty)
    }

    /// Entries this file declared itself. Imports merge only these, which
    /// keeps re-export non-transitive.
    pub fn local_entries(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.imported)
            .map(|(name, entry)| (name.as_str(), &entry.ty))
    }
}
