//! Interned identifiers for step and transition names.
//!
//! Step names are the join key between transitions, the layout graph and the
//! emitted diagram, so they are stored once in a global interner and passed
//! around as a small `Copy` handle.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Runs `f` with exclusive access to the global interner.
fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// An interned name, such as a step or transition identifier.
///
/// # Examples
///
/// ```
/// use sfcgraph_core::identifier::Id;
///
/// let step = Id::new("S_Home");
/// assert_eq!(step, "S_Home");
/// assert_eq!(step, Id::new("S_Home"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its handle.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns an owned copy of the interned string.
    pub fn resolve(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_owned()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_same_name_same_id() {
        let a = Id::new("S1");
        let b = Id::new("S1");
        let c = Id::new("S2");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_and_resolve() {
        let id = Id::new("Step_Wait_Clamp");
        assert_eq!(id.to_string(), "Step_Wait_Clamp");
        assert_eq!(id.resolve(), "Step_Wait_Clamp");
    }

    #[test]
    fn test_compare_with_str() {
        let id = Id::new("T12");
        assert!(id == "T12");
        assert!(id != "T1");

        let owned = String::from("T12");
        assert!(id == owned.as_str());
    }

    #[test]
    fn test_from_str_and_into() {
        let parsed: Id = "S9".parse().unwrap();
        let converted: Id = "S9".into();
        assert_eq!(parsed, converted);
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Id::new("S1"), 1);
        map.insert(Id::new("S2"), 2);

        assert_eq!(map.get(&Id::new("S1")), Some(&1));
        assert_eq!(map.len(), 2);
    }
}
