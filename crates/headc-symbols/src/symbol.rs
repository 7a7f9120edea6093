//! Flyweight symbol identifiers.
//!
//! Every symbol here is `Copy`, owns no data of its own beyond an interned
//! [`Atom`], and is value-equal by its contents. Symbols may be freely
//! shared and compared without going back to an [`Interner`]; resolving one
//! to readable text is the only operation that needs one.

use headc_core::{Atom, Interner};

/// A class, interface, enum or annotation type, identified by its fully
/// qualified binary name (`/` separates packages, `$` separates nesting
/// levels, e.g. `com/example/Outer$Inner`).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassSymbol(Atom);

impl std::fmt::Debug for ClassSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClassSymbol({:?})", self.0)
    }
}

impl ClassSymbol {
    pub fn new(interner: &mut Interner, binary_name: &str) -> Self {
        Self(interner.intern(binary_name))
    }

    pub fn binary_name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.0)
    }

    /// A synthetic error-sentinel symbol substituted when a name cannot be
    /// resolved, so later phases still have a `ClassSymbol` to hang off of.
    pub fn error_sentinel(interner: &mut Interner) -> Self {
        Self::new(interner, "<error>")
    }

    pub fn is_error_sentinel(&self, interner: &Interner) -> bool {
        self.binary_name(interner) == "<error>"
    }

    /// The simple name: the text after the last `/` and the last `$`.
    pub fn simple_name<'a>(&self, interner: &'a Interner) -> &'a str {
        let full = self.binary_name(interner);
        let after_package = full.rsplit('/').next().unwrap_or(full);
        after_package.rsplit('$').next().unwrap_or(after_package)
    }

    /// The binary name of the immediately enclosing class, if this class is
    /// a nested (member or local) type.
    pub fn outer(&self, interner: &mut Interner) -> Option<ClassSymbol> {
        let full = self.binary_name(interner).to_string();
        let last_slash = full.rfind('/').map(|i| i + 1).unwrap_or(0);
        let last_dollar = full[last_slash..].rfind('$').map(|i| last_slash + i);
        last_dollar.map(|idx| ClassSymbol::new(interner, &full[..idx]))
    }

    /// The dotted package name this class lives in.
    pub fn package<'a>(&self, interner: &'a Interner) -> &'a str {
        let full = self.binary_name(interner);
        match full.rfind('/') {
            Some(idx) => &full[..idx],
            None => "",
        }
    }
}

/// A `.`-separated package name, e.g. `com.example.util`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PackageSymbol(Atom);

impl std::fmt::Debug for PackageSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PackageSymbol({:?})", self.0)
    }
}

impl PackageSymbol {
    pub fn new(interner: &mut Interner, dotted_name: &str) -> Self {
        Self(interner.intern(dotted_name))
    }

    pub fn dotted_name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.0)
    }

    pub fn is_unnamed(&self, interner: &Interner) -> bool {
        self.dotted_name(interner).is_empty()
    }
}

/// A field, identified by its owning class and simple name.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldSymbol {
    pub owner: ClassSymbol,
    name: Atom,
}

impl std::fmt::Debug for FieldSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldSymbol({:?}, {:?})", self.owner, self.name)
    }
}

impl FieldSymbol {
    pub fn new(interner: &mut Interner, owner: ClassSymbol, name: &str) -> Self {
        Self {
            owner,
            name: interner.intern(name),
        }
    }

    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.name)
    }
}

/// A method, identified by owning class, simple name, and an erased
/// signature key (e.g. `(ILjava/lang/String;)V`) so overloads remain
/// distinct symbols.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    pub owner: ClassSymbol,
    name: Atom,
    erased_signature: Atom,
}

impl std::fmt::Debug for MethodSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MethodSymbol({:?}, {:?}, {:?})",
            self.owner, self.name, self.erased_signature
        )
    }
}

impl MethodSymbol {
    pub fn new(
        interner: &mut Interner,
        owner: ClassSymbol,
        name: &str,
        erased_signature: &str,
    ) -> Self {
        Self {
            owner,
            name: interner.intern(name),
            erased_signature: interner.intern(erased_signature),
        }
    }

    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.name)
    }

    pub fn erased_signature<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.erased_signature)
    }

    pub fn is_constructor(&self, interner: &Interner) -> bool {
        self.name(interner) == "<init>"
    }
}

/// The declaration a type variable is scoped to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TyVarOwner {
    Class(ClassSymbol),
    Method(MethodSymbol),
}

/// A type parameter (`T` in `class List<T>` or `<U> U identity(U u)`),
/// identified by its owning declaration and name.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct TyVarSymbol {
    pub owner: TyVarOwner,
    name: Atom,
}

impl std::fmt::Debug for TyVarSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TyVarSymbol({:?}, {:?})", self.owner, self.name)
    }
}

impl TyVarSymbol {
    pub fn new(interner: &mut Interner, owner: TyVarOwner, name: &str) -> Self {
        Self {
            owner,
            name: interner.intern(name),
        }
    }

    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_symbol_name_parts() {
        let mut interner = Interner::new();
        let sym = ClassSymbol::new(&mut interner, "com/example/Outer$Inner");
        assert_eq!(sym.simple_name(&interner), "Inner");
        assert_eq!(sym.package(&interner), "com/example");
        let outer = sym.outer(&mut interner).unwrap();
        assert_eq!(outer.binary_name(&interner), "com/example/Outer");
    }

    #[test]
    fn top_level_class_has_no_outer() {
        let mut interner = Interner::new();
        let sym = ClassSymbol::new(&mut interner, "com/example/Outer");
        assert_eq!(sym.outer(&mut interner), None);
        assert_eq!(sym.simple_name(&interner), "Outer");
    }

    #[test]
    fn method_symbols_distinguish_overloads() {
        let mut interner = Interner::new();
        let owner = ClassSymbol::new(&mut interner, "com/example/C");
        let a = MethodSymbol::new(&mut interner, owner, "m", "(I)V");
        let b = MethodSymbol::new(&mut interner, owner, "m", "(Ljava/lang/String;)V");
        assert_ne!(a, b);
    }
}
