//! Field and method descriptors: the erased, JVM-level type encoding used in
//! the constant pool's `NameAndType` entries. Distinct from a *signature*
//! (see [`crate::signature`]), which additionally carries generics.

use crate::error::{Error, Result};
use headc_symbols::{PrimKind, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let mut chars = desc.chars();
    if chars.next() != Some('(') {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    let mut idx = 1usize;
    let mut params = Vec::new();
    while idx < desc.len() {
        let b = desc.as_bytes()[idx] as char;
        if b == ')' {
            idx += 1;
            break;
        }
        let (param, rest) = parse_field_type(&desc[idx..])?;
        idx = desc.len() - rest.len();
        params.push(param);
    }

    if idx > desc.len() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    let return_part = &desc[idx..];
    if return_part.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    let (return_type, rest) = if let Some(rest) = return_part.strip_prefix('V') {
        (ReturnType::Void, rest)
    } else {
        let (ty, rest) = parse_field_type(return_part)?;
        (ReturnType::Type(ty), rest)
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor { params, return_type })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return Err(Error::InvalidDescriptor(input.to_string()));
    }
    match bytes[0] as char {
        'B' => Ok((FieldType::Base(BaseType::Byte), &input[1..])),
        'C' => Ok((FieldType::Base(BaseType::Char), &input[1..])),
        'D' => Ok((FieldType::Base(BaseType::Double), &input[1..])),
        'F' => Ok((FieldType::Base(BaseType::Float), &input[1..])),
        'I' => Ok((FieldType::Base(BaseType::Int), &input[1..])),
        'J' => Ok((FieldType::Base(BaseType::Long), &input[1..])),
        'S' => Ok((FieldType::Base(BaseType::Short), &input[1..])),
        'Z' => Ok((FieldType::Base(BaseType::Boolean), &input[1..])),
        'L' => {
            if let Some(end) = input.find(';') {
                let name = &input[1..end];
                Ok((FieldType::Object(name.to_string()), &input[end + 1..]))
            } else {
                Err(Error::InvalidDescriptor(input.to_string()))
            }
        }
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}

fn base_type_of(prim: PrimKind) -> BaseType {
    match prim {
        PrimKind::Boolean => BaseType::Boolean,
        PrimKind::Byte => BaseType::Byte,
        PrimKind::Char => BaseType::Char,
        PrimKind::Short => BaseType::Short,
        PrimKind::Int => BaseType::Int,
        PrimKind::Long => BaseType::Long,
        PrimKind::Float => BaseType::Float,
        PrimKind::Double => BaseType::Double,
    }
}

fn base_type_char(b: BaseType) -> char {
    match b {
        BaseType::Byte => 'B',
        BaseType::Char => 'C',
        BaseType::Double => 'D',
        BaseType::Float => 'F',
        BaseType::Int => 'I',
        BaseType::Long => 'J',
        BaseType::Short => 'S',
        BaseType::Boolean => 'Z',
    }
}

/// Erases a bound [`Type`] to the [`FieldType`] that would appear in a
/// descriptor: type arguments and annotations are dropped, a type variable
/// erases to its leftmost bound (`Object` if unbounded).
pub fn erase_to_field_type(ty: &Type, interner: &headc_core::Interner) -> FieldType {
    match ty {
        Type::Prim(p) => FieldType::Base(base_type_of(*p)),
        Type::Class(segments) => {
            let class = segments.last().expect("ClassTy has at least one segment");
            FieldType::Object(class.class.binary_name(interner).to_string())
        }
        Type::Array(element, _) => FieldType::Array(Box::new(erase_to_field_type(element, interner))),
        Type::TyVar(tv, _) => FieldType::Object(erase_ty_var_bound(tv)),
        Type::Wild(..) => unreachable!("a wildcard cannot appear as an erased field type"),
        Type::Void => unreachable!("void cannot appear as a field type"),
    }
}

/// `headc_binder` resolves a type variable's first bound during Phase IV;
/// by the time lowering calls into this encoder the erasure is already a
/// concrete class, recorded on the symbol's owner. Until that wiring lands,
/// unbounded type variables erase to `java/lang/Object`, matching platform
/// semantics for `<T> T`.
fn erase_ty_var_bound(_tv: &headc_symbols::TyVarSymbol) -> String {
    "java/lang/Object".to_string()
}

pub fn encode_field_type(ty: &FieldType, out: &mut String) {
    match ty {
        FieldType::Base(b) => out.push(base_type_char(*b)),
        FieldType::Object(name) => {
            out.push('L');
            out.push_str(name);
            out.push(';');
        }
        FieldType::Array(element) => {
            out.push('[');
            encode_field_type(element, out);
        }
    }
}

pub fn encode_field_descriptor(ty: &Type, interner: &headc_core::Interner) -> String {
    let mut out = String::new();
    encode_field_type(&erase_to_field_type(ty, interner), &mut out);
    out
}

pub fn encode_method_descriptor(params: &[Type], return_type: &Type, interner: &headc_core::Interner) -> String {
    let mut out = String::new();
    out.push('(');
    for param in params {
        encode_field_type(&erase_to_field_type(param, interner), &mut out);
    }
    out.push(')');
    if matches!(return_type, Type::Void) {
        out.push('V');
    } else {
        encode_field_type(&erase_to_field_type(return_type, interner), &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_descriptor_primitives_and_arrays() {
        assert_eq!(parse_field_descriptor("I").unwrap(), FieldType::Base(BaseType::Int));
        assert_eq!(
            parse_field_descriptor("[[Ljava/lang/String;").unwrap(),
            FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Object(
                "java/lang/String".to_string()
            )))))
        );
    }

    #[test]
    fn parse_method_descriptor_basic() {
        let desc = parse_method_descriptor("(ILjava/lang/String;)[I").unwrap();
        assert_eq!(
            desc.params,
            vec![
                FieldType::Base(BaseType::Int),
                FieldType::Object("java/lang/String".to_string())
            ]
        );
        assert_eq!(
            desc.return_type,
            ReturnType::Type(FieldType::Array(Box::new(FieldType::Base(BaseType::Int))))
        );
    }

    #[test]
    fn encode_field_descriptor_erases_parameterized_class() {
        let mut interner = headc_core::Interner::new();
        let list = headc_symbols::ClassSymbol::new(&mut interner, "java/util/List");
        let string = headc_symbols::ClassSymbol::new(&mut interner, "java/lang/String");
        let ty = Type::as_class_ty(vec![headc_symbols::ClassTySegment {
            class: list,
            type_args: vec![Type::as_non_parameterized_class_ty(string)],
            annotations: vec![],
        }]);
        assert_eq!(encode_field_descriptor(&ty, &interner), "Ljava/util/List;");
    }

    #[test]
    fn encode_method_descriptor_roundtrips_through_parser() {
        let mut interner = headc_core::Interner::new();
        let string = headc_symbols::ClassSymbol::new(&mut interner, "java/lang/String");
        let encoded = encode_method_descriptor(
            &[Type::Prim(PrimKind::Int), Type::as_non_parameterized_class_ty(string)],
            &Type::array_of(Type::Prim(PrimKind::Int)),
            &interner,
        );
        assert_eq!(encoded, "(ILjava/lang/String;)[I");
        let parsed = parse_method_descriptor(&encoded).unwrap();
        assert_eq!(parsed.params.len(), 2);
    }
}
