//! The boundary the binder crosses into C3 (the class-path reader).
//!
//! headc-binder never touches a filesystem or archive itself — per the
//! concurrency model, class-path bytes are fetched through an injected
//! lookup the caller may cache. `headc_classpath` (or a test harness) hands
//! the binder a [`ClassPathLookup`]; this module decodes hits into the same
//! [`BoundClass`] shape Phase I–IV produce for source, via
//! `headc_classfile`'s [`ClassStub`].

use headc_classfile::{ClassFile, ClassStub};
use headc_core::Interner;
use headc_symbols::{ClassSymbol, Type};

use crate::bound::{BoundClass, BoundField, BoundMethod, BoundParam, ClassKind, Origin, Owner, Retention};

/// `(binary name) -> class bytes`, exactly the C3 contract. Implementors may
/// cache however they like; the binder calls this at most once per distinct
/// symbol it needs to decode.
pub trait ClassPathLookup {
    fn lookup(&mut self, binary_name: &str) -> Option<Vec<u8>>;
}

/// A lookup that never finds anything, for binder runs with no class-path
/// (tests, or a self-contained compilation unit set referencing only
/// `java/lang/Object`... which will then itself fail to resolve).
pub struct EmptyClassPath;

impl ClassPathLookup for EmptyClassPath {
    fn lookup(&mut self, _binary_name: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Probes the class-path for `binary_name` without fully decoding it; used
/// by Phase II/III name resolution, which only needs to know whether a name
/// exists.
pub fn exists(classpath: &mut dyn ClassPathLookup, binary_name: &str) -> bool {
    classpath.lookup(binary_name).is_some()
}

#[derive(Debug)]
pub enum ClassPathDecodeError {
    Malformed(String),
}

/// Fully decodes `binary_name` from the class-path and lifts it to a
/// [`BoundClass`] already filled to the type-bound layer, per C3. Erased
/// descriptors only carry raw class-type segments (no resolved type
/// arguments) unless a `Signature` attribute was present, matching what a
/// real `.class` file can tell us.
pub fn bound_class_from_classpath(
    classpath: &mut dyn ClassPathLookup,
    interner: &mut Interner,
    symbol: ClassSymbol,
) -> Result<Option<BoundClass>, ClassPathDecodeError> {
    let binary_name = symbol.binary_name(interner).to_string();
    let Some(bytes) = classpath.lookup(&binary_name) else {
        return Ok(None);
    };
    let class_file = ClassFile::parse(&bytes).map_err(|e| ClassPathDecodeError::Malformed(e.to_string()))?;
    let stub = class_file.stub().map_err(|e| ClassPathDecodeError::Malformed(e.to_string()))?;
    Ok(Some(bound_class_from_stub(&stub, interner, symbol)))
}

pub fn bound_class_from_stub(stub: &ClassStub, interner: &mut Interner, symbol: ClassSymbol) -> BoundClass {
    let kind = classify(stub.access_flags);
    let owner = match symbol.outer(interner) {
        Some(outer) => Owner::Class(outer),
        None => Owner::Package,
    };

    let super_class = stub
        .super_class
        .as_deref()
        .map(|name| ClassSymbol::new(interner, name));
    let interfaces = stub
        .interfaces
        .iter()
        .map(|name| ClassSymbol::new(interner, name))
        .collect::<Vec<_>>();

    let super_class_type = super_class.map(Type::as_non_parameterized_class_ty);
    let interface_types = interfaces.iter().copied().map(Type::as_non_parameterized_class_ty).collect();

    let self_binary_name = symbol.binary_name(interner).to_string();
    let member_types = stub
        .inner_classes
        .iter()
        .filter(|ic| ic.outer_class.as_deref() == Some(self_binary_name.as_str()))
        .map(|ic| ClassSymbol::new(interner, &ic.inner_class))
        .collect::<Vec<_>>();

    let fields = stub
        .fields
        .iter()
        .map(|f| BoundField {
            symbol: headc_symbols::FieldSymbol::new(interner, symbol, &f.name),
            ty: resolve_field_type(&f.parsed_descriptor, interner),
            access: modifiers_from_access(f.access_flags),
            annotations: Vec::new(),
            declaration_span: headc_core::Span::synthetic(),
            initializer: None,
            constant_value: f.constant_value.as_ref().map(const_value_to_const),
        })
        .collect::<Vec<_>>();

    let methods = stub
        .methods
        .iter()
        .map(|m| BoundMethod {
            symbol: headc_symbols::MethodSymbol::new(interner, symbol, &m.name, &m.descriptor),
            type_params: Vec::new(),
            return_type: resolve_return_type(&m.parsed_descriptor.return_type, interner),
            params: m
                .parsed_descriptor
                .params
                .iter()
                .enumerate()
                .map(|(i, ft)| BoundParam {
                    ty: resolve_field_type(ft, interner),
                    name: format!("arg{i}"),
                    annotations: Vec::new(),
                    is_synthetic: false,
                })
                .collect(),
            thrown: Vec::new(),
            access: modifiers_from_access(m.access_flags),
            annotations: Vec::new(),
            declaration_span: headc_core::Span::synthetic(),
            default_value_raw: None,
            default_value: None,
            is_synthetic: false,
        })
        .collect::<Vec<_>>();

    BoundClass {
        symbol,
        kind,
        access: modifiers_from_access(stub.access_flags),
        owner,
        simple_name: symbol.simple_name(interner).to_string(),
        member_types,
        type_params: Vec::new(),
        origin: Origin::ClassPath,
        declaration_span: headc_core::Span::synthetic(),
        super_class,
        interfaces,
        type_param_bounds: Vec::new(),
        super_class_type,
        interface_types,
        fields,
        methods,
        annotations: Vec::new(),
        retention: if kind == ClassKind::Annotation { Some(Retention::Class) } else { None },
        enum_constants: Vec::new(),
    }
}

fn classify(access_flags: u16) -> ClassKind {
    const ACC_INTERFACE: u16 = 0x0200;
    const ACC_ANNOTATION: u16 = 0x2000;
    const ACC_ENUM: u16 = 0x4000;
    if access_flags & ACC_ANNOTATION != 0 {
        ClassKind::Annotation
    } else if access_flags & ACC_INTERFACE != 0 {
        ClassKind::Interface
    } else if access_flags & ACC_ENUM != 0 {
        ClassKind::Enum
    } else {
        ClassKind::Class
    }
}

fn modifiers_from_access(access_flags: u16) -> headc_ast::Modifiers {
    use headc_ast::Modifiers as M;
    const ACC_PUBLIC: u16 = 0x0001;
    const ACC_PRIVATE: u16 = 0x0002;
    const ACC_PROTECTED: u16 = 0x0004;
    const ACC_STATIC: u16 = 0x0008;
    const ACC_FINAL: u16 = 0x0010;
    const ACC_ABSTRACT: u16 = 0x0400;
    const ACC_NATIVE: u16 = 0x0100;

    let mut m = M::empty();
    if access_flags & ACC_PUBLIC != 0 {
        m |= M::PUBLIC;
    }
    if access_flags & ACC_PRIVATE != 0 {
        m |= M::PRIVATE;
    }
    if access_flags & ACC_PROTECTED != 0 {
        m |= M::PROTECTED;
    }
    if access_flags & ACC_STATIC != 0 {
        m |= M::STATIC;
    }
    if access_flags & ACC_FINAL != 0 {
        m |= M::FINAL;
    }
    if access_flags & ACC_ABSTRACT != 0 {
        m |= M::ABSTRACT;
    }
    if access_flags & ACC_NATIVE != 0 {
        m |= M::NATIVE;
    }
    m
}

/// Lifts a descriptor-erased [`FieldType`](headc_classfile::FieldType) to a
/// bound [`Type`]. Classpath-origin classes only carry this erased shape
/// unless a `Signature` attribute is present; resolving that richer generic
/// form would require re-binding the foreign class's own type-parameter
/// scope, which headc does not attempt for dependencies (only for source).
fn resolve_field_type(ft: &headc_classfile::FieldType, interner: &mut Interner) -> Type {
    use headc_classfile::{BaseType, FieldType};
    match ft {
        FieldType::Base(base) => Type::Prim(match base {
            BaseType::Byte => headc_symbols::PrimKind::Byte,
            BaseType::Char => headc_symbols::PrimKind::Char,
            BaseType::Double => headc_symbols::PrimKind::Double,
            BaseType::Float => headc_symbols::PrimKind::Float,
            BaseType::Int => headc_symbols::PrimKind::Int,
            BaseType::Long => headc_symbols::PrimKind::Long,
            BaseType::Short => headc_symbols::PrimKind::Short,
            BaseType::Boolean => headc_symbols::PrimKind::Boolean,
        }),
        FieldType::Object(internal_name) => {
            Type::as_non_parameterized_class_ty(ClassSymbol::new(interner, internal_name))
        }
        FieldType::Array(elem) => Type::array_of(resolve_field_type(elem, interner)),
    }
}

fn resolve_return_type(rt: &headc_classfile::ReturnType, interner: &mut Interner) -> Type {
    match rt {
        headc_classfile::ReturnType::Void => Type::Void,
        headc_classfile::ReturnType::Type(ft) => resolve_field_type(ft, interner),
    }
}

fn const_value_to_const(v: &headc_classfile::ConstValueAttr) -> headc_symbols::Const {
    use headc_classfile::ConstValueAttr as C;
    use headc_symbols::Const;
    match v {
        C::Int(i) => Const::Int(*i),
        C::Float(f) => Const::Float(*f),
        C::Long(l) => Const::Long(*l),
        C::Double(d) => Const::Double(*d),
        C::String(s) => Const::String(s.clone()),
    }
}
