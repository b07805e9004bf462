//! String interning for gqlc.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// An interned text identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Text(u32);

impl Text {
    /// `__typename`, always interned first.
    pub const TYPENAME: Self = Self(0);
    /// `__schema`
    pub const SCHEMA: Self = Self(1);
    /// `__type`
    pub const TYPE: Self = Self(2);

    /// Creates a new text from a raw index.
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// Names the interner registers up front, in the order the `Text`
/// constants rely on.
const PRELUDE: &[&str] = &[
    "__typename",
    "__schema",
    "__type",
    "Int",
    "Float",
    "String",
    "Boolean",
    "ID",
    "skip",
    "include",
    "deprecated",
    "if",
    "reason",
];

/// A string interner that deduplicates strings.
#[derive(Debug)]
pub struct Interner {
    /// Map from string to index.
    map: RefCell<FxHashMap<String, Text>>,
    /// Stored strings.
    strings: RefCell<Vec<String>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates a new interner with the GraphQL meta-field names and
    /// built-in scalars pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let interner = Self {
            map: RefCell::new(FxHashMap::default()),
            strings: RefCell::new(Vec::new()),
        };

        for name in PRELUDE {
            interner.intern(name);
        }

        interner
    }

    /// Interns a string, returning its identifier.
    pub fn intern(&self, s: &str) -> Text {
        let mut map = self.map.borrow_mut();
        if let Some(&id) = map.get(s) {
            return id;
        }

        let mut strings = self.strings.borrow_mut();
        let id = Text(u32::try_from(strings.len()).unwrap_or(u32::MAX));
        strings.push(s.to_string());
        map.insert(s.to_string(), id);
        id
    }

    /// Returns the identifier of an already interned string.
    #[must_use]
    pub fn lookup(&self, s: &str) -> Option<Text> {
        self.map.borrow().get(s).copied()
    }

    /// Gets the string for an identifier.
    #[must_use]
    pub fn get(&self, id: Text) -> String {
        let strings = self.strings.borrow();
        strings.get(id.0 as usize).cloned().unwrap_or_default()
    }

    /// Returns true if `id` was interned from `s`.
    #[must_use]
    pub fn is(&self, id: Text, s: &str) -> bool {
        self.strings
            .borrow()
            .get(id.0 as usize)
            .is_some_and(|stored| stored == s)
    }

    /// Returns the number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    /// Returns true if no strings are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern() {
        let interner = Interner::new();
        let id1 = interner.intern("hero");
        let id2 = interner.intern("hero");
        let id3 = interner.intern("droid");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_get() {
        let interner = Interner::new();
        let id = interner.intern("primaryFunction");
        assert_eq!(interner.get(id), "primaryFunction");
        assert!(interner.is(id, "primaryFunction"));
    }

    #[test]
    fn test_meta_field_constants() {
        let interner = Interner::new();
        assert_eq!(interner.intern("__typename"), Text::TYPENAME);
        assert_eq!(interner.intern("__schema"), Text::SCHEMA);
        assert_eq!(interner.intern("__type"), Text::TYPE);
        assert_eq!(interner.lookup("Episode"), None);
    }
}
