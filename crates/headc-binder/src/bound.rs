//! The bound class model the five phases fill in.
//!
//! The header fields (kind, owner, member types, type-parameter symbols) are
//! complete after Phase I; `super_class`/`interfaces` after Phase III;
//! `type_param_bounds`/`fields`/`methods`/`retention` after Phase IV; field
//! `constant_value`s and annotation-use `resolved` maps after Phase V. A
//! `BoundClass` reachable from [`crate::BoundProgram`] has every phase's
//! output already merged in, whether it came from a source compilation unit
//! or a classpath jar (see [`crate::classpath::bound_class_from_stub`]).

use headc_ast::Expr;
use headc_core::Span;
use headc_symbols::{AnnotationUse, ClassSymbol, Const, MethodSymbol, Type, TyVarSymbol};
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Retention {
    Source,
    Class,
    Runtime,
}

/// Where a bound class came from. The binder itself never branches on this;
/// it exists so diagnostics can tell a user their own source apart from a
/// dependency, and so `headc_lower` skips writing a class-file record for
/// anything that isn't `Source`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Source,
    ClassPath,
}

/// The enclosing scope a top-level type or a package lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Owner {
    Package,
    Class(ClassSymbol),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamBound {
    pub symbol: TyVarSymbol,
    /// `None` means the implicit `java/lang/Object` bound.
    pub class_bound: Option<Type>,
    pub interface_bounds: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundField {
    pub symbol: headc_symbols::FieldSymbol,
    pub ty: Type,
    pub access: headc_ast::Modifiers,
    pub annotations: Vec<AnnotationUse>,
    pub declaration_span: Span,
    /// Raw initializer, kept so Phase V can (re-)evaluate it; absent for
    /// classpath-origin fields, which carry their resolved value directly.
    pub initializer: Option<Expr>,
    pub constant_value: Option<Const>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundParam {
    pub ty: Type,
    pub name: String,
    pub annotations: Vec<AnnotationUse>,
    pub is_synthetic: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundMethod {
    pub symbol: MethodSymbol,
    pub type_params: Vec<TypeParamBound>,
    pub return_type: Type,
    pub params: Vec<BoundParam>,
    pub thrown: Vec<Type>,
    pub access: headc_ast::Modifiers,
    pub annotations: Vec<AnnotationUse>,
    pub declaration_span: Span,
    /// Raw default-value expression for an annotation element; the resolved
    /// constant sits alongside once Phase V runs.
    pub default_value_raw: Option<Expr>,
    pub default_value: Option<Const>,
    pub is_synthetic: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundClass {
    pub symbol: ClassSymbol,
    pub kind: ClassKind,
    pub access: headc_ast::Modifiers,
    pub owner: Owner,
    pub simple_name: String,
    pub member_types: Vec<ClassSymbol>,
    pub type_params: Vec<TyVarSymbol>,
    pub origin: Origin,
    pub declaration_span: Span,

    /// `None` only for `java/lang/Object` itself, or a classpath class whose
    /// superclass byte-decoded to an absent index (interfaces).
    pub super_class: Option<ClassSymbol>,
    pub interfaces: Vec<ClassSymbol>,

    pub type_param_bounds: Vec<TypeParamBound>,
    pub super_class_type: Option<Type>,
    pub interface_types: Vec<Type>,
    pub fields: Vec<BoundField>,
    pub methods: Vec<BoundMethod>,
    pub annotations: Vec<AnnotationUse>,
    pub retention: Option<Retention>,
    /// Enum constants in declaration order, for enum synthetic lowering.
    pub enum_constants: Vec<String>,
}

impl BoundClass {
    pub fn field(&self, name: &str, interner: &headc_core::Interner) -> Option<&BoundField> {
        self.fields.iter().find(|f| f.symbol.name(interner) == name)
    }

    pub fn declares_enum_constant(&self, name: &str) -> bool {
        self.enum_constants.iter().any(|c| c == name)
    }
}

/// A flat arena of bound classes, keyed by symbol. Cycles among supertype
/// references are fine here: lookups go back through the map rather than
/// through an owning pointer.
#[derive(Default)]
pub struct BoundProgram {
    pub classes: FxHashMap<ClassSymbol, BoundClass>,
    /// Source-origin classes in Phase III topological order (every
    /// superclass/interface precedes its subtype). Classpath classes are not
    /// included since their own supertypes are resolved lazily on demand.
    pub order: Vec<ClassSymbol>,
}

impl BoundProgram {
    pub fn get(&self, symbol: ClassSymbol) -> Option<&BoundClass> {
        self.classes.get(&symbol)
    }
}
