//! Assembles `Signature` attribute strings from the bound type model.
//!
//! `headc_classfile::signature` owns the grammar parser and the
//! per-[`Type`] encoder; this module only decides, per declaration, whether
//! a signature is needed and stitches the per-type fragments into the
//! class/method/field productions (JVMS §4.7.9.1), none of which
//! `headc_classfile` assembles on its own since it has no notion of a
//! "declaration".

use headc_binder::TypeParamBound;
use headc_classfile::{class_signature_required, encode_type_signature, type_uses_generics};
use headc_core::Interner;
use headc_symbols::Type;

fn encode_type_parameters(type_params: &[TypeParamBound], interner: &Interner, out: &mut String) {
    if type_params.is_empty() {
        return;
    }
    out.push('<');
    for tp in type_params {
        out.push_str(tp.symbol.name(interner));
        out.push(':');
        match &tp.class_bound {
            Some(ty) => encode_type_signature(ty, interner, out),
            None => {
                if tp.interface_bounds.is_empty() {
                    out.push_str("Ljava/lang/Object;");
                }
            }
        }
        for ib in &tp.interface_bounds {
            out.push(':');
            encode_type_signature(ib, interner, out);
        }
    }
    out.push('>');
}

/// Builds the `ClassSignature` string, if the declaration actually needs
/// one. `super_ty`/`interfaces` are the signature-level supertypes, which
/// for an enum (parameterized `Enum<Self>`) or an interface/annotation
/// (always `Object`, never emitted as a signature since interfaces carry no
/// class bound there) differ from what `BoundClass` stores directly; the
/// caller is responsible for passing the right shape (see `class.rs`).
pub fn class_signature(
    type_params: &[TypeParamBound],
    header_type_params: &[headc_symbols::TyVarSymbol],
    super_ty: &Type,
    interfaces: &[Type],
    interner: &Interner,
) -> Option<String> {
    if !class_signature_required(header_type_params, super_ty, interfaces) {
        return None;
    }
    let mut out = String::new();
    encode_type_parameters(type_params, interner, &mut out);
    encode_type_signature(super_ty, interner, &mut out);
    for iface in interfaces {
        encode_type_signature(iface, interner, &mut out);
    }
    Some(out)
}

pub fn method_signature_required(
    type_params: &[TypeParamBound],
    params: &[Type],
    return_type: &Type,
    thrown: &[Type],
) -> bool {
    !type_params.is_empty()
        || params.iter().any(type_uses_generics)
        || (!matches!(return_type, Type::Void) && type_uses_generics(return_type))
        || thrown.iter().any(type_uses_generics)
}

pub fn method_signature(
    type_params: &[TypeParamBound],
    params: &[Type],
    return_type: &Type,
    thrown: &[Type],
    interner: &Interner,
) -> Option<String> {
    if !method_signature_required(type_params, params, return_type, thrown) {
        return None;
    }
    let mut out = String::new();
    encode_type_parameters(type_params, interner, &mut out);
    out.push('(');
    for param in params {
        encode_type_signature(param, interner, &mut out);
    }
    out.push(')');
    if matches!(return_type, Type::Void) {
        out.push('V');
    } else {
        encode_type_signature(return_type, interner, &mut out);
    }
    for t in thrown {
        out.push('^');
        encode_type_signature(t, interner, &mut out);
    }
    Some(out)
}

pub fn field_signature(ty: &Type, interner: &Interner) -> Option<String> {
    if !type_uses_generics(ty) {
        return None;
    }
    let mut out = String::new();
    encode_type_signature(ty, interner, &mut out);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use headc_core::Interner;
    use headc_symbols::{ClassSymbol, PrimKind, TyVarOwner, TyVarSymbol};

    #[test]
    fn field_signature_omitted_for_plain_primitive() {
        let interner = Interner::new();
        assert_eq!(field_signature(&Type::Prim(PrimKind::Int), &interner), None);
    }

    #[test]
    fn field_signature_present_for_type_variable() {
        let mut interner = Interner::new();
        let owner = ClassSymbol::new(&mut interner, "p/L");
        let tv = TyVarSymbol::new(&mut interner, TyVarOwner::Class(owner), "T");
        let ty = Type::TyVar(tv, vec![]);
        assert_eq!(field_signature(&ty, &interner).as_deref(), Some("TT;"));
    }

    #[test]
    fn class_signature_for_bounded_type_param() {
        let mut interner = Interner::new();
        let owner = ClassSymbol::new(&mut interner, "p/L");
        let number = ClassSymbol::new(&mut interner, "java/lang/Number");
        let object = ClassSymbol::new(&mut interner, "java/lang/Object");
        let tv = TyVarSymbol::new(&mut interner, TyVarOwner::Class(owner), "T");
        let bound = TypeParamBound {
            symbol: tv,
            class_bound: Some(Type::as_non_parameterized_class_ty(number)),
            interface_bounds: vec![],
        };
        let super_ty = Type::as_non_parameterized_class_ty(object);
        let sig = class_signature(&[bound], &[tv], &super_ty, &[], &interner).unwrap();
        assert_eq!(sig, "<T:Ljava/lang/Number;>Ljava/lang/Object;");
    }

    #[test]
    fn class_signature_omitted_without_generics() {
        let mut interner = Interner::new();
        let object = ClassSymbol::new(&mut interner, "java/lang/Object");
        let super_ty = Type::as_non_parameterized_class_ty(object);
        assert_eq!(class_signature(&[], &[], &super_ty, &[], &interner), None);
    }
}
