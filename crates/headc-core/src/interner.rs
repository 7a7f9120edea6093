//! String interning for identifiers shared across symbols, types and scopes.

use lasso::{Rodeo, Spur};
use smol_str::SmolStr;

/// An interned string handle. Cheap to copy and compare; resolve back to text
/// through the [`Interner`] that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Atom(Spur);

impl std::fmt::Debug for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Atom({:?})", self.0)
    }
}

/// A single-threaded string interner.
///
/// Every `ClassSymbol`, `FieldSymbol` and `MethodSymbol` stores its name as an
/// [`Atom`] rather than an owned `String`; binary names repeat constantly
/// across a compilation (every reference to `java/lang/Object` reuses the
/// same entry).
#[derive(Default)]
pub struct Interner {
    rodeo: Rodeo,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Atom {
        Atom(self.rodeo.get_or_intern(text))
    }

    pub fn intern_smol(&mut self, text: SmolStr) -> Atom {
        Atom(self.rodeo.get_or_intern(text.as_str()))
    }

    pub fn resolve(&self, atom: Atom) -> &str {
        self.rodeo.resolve(&atom.0)
    }

    pub fn get(&self, text: &str) -> Option<Atom> {
        self.rodeo.get(text).map(Atom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedupes() {
        let mut interner = Interner::new();
        let a = interner.intern("java/lang/Object");
        let b = interner.intern("java/lang/Object");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "java/lang/Object");
    }
}
