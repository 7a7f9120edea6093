//! Generic signatures: the platform signature-attribute grammar, layered on
//! top of [`crate::descriptor`]'s erased types. A signature is only emitted
//! when a declaration actually uses generics (see `headc_lower`'s policy);
//! this module just parses and encodes the grammar itself.

use crate::descriptor::BaseType;
use crate::error::{Error, Result};
use headc_symbols::{ClassTySegment, PrimKind, Type, WildKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<FieldTypeSignature>,
    pub interface_bounds: Vec<FieldTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    pub return_type: Option<TypeSignature>, // None => void
    pub throws: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub package: Vec<String>,
    pub segments: Vec<ClassTypeSegment>,
}

impl ClassTypeSignature {
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package.join("/"));
            out.push('/');
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&seg.name);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSegment {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Any,
    Exact(Box<FieldTypeSignature>),
    Extends(Box<FieldTypeSignature>),
    Super(Box<FieldTypeSignature>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Array(Box<TypeSignature>),
    Class(ClassTypeSignature),
    TypeVariable(String),
}

pub type FieldTypeSignature = TypeSignature;

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.parse_type_parameters_if_present()?;
    let super_class = p.parse_class_type_signature()?;
    let mut interfaces = Vec::new();
    while !p.is_eof() {
        interfaces.push(p.parse_class_type_signature()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.parse_type_parameters_if_present()?;
    p.expect('(')?;
    let mut parameters = Vec::new();
    while !p.is_eof() && p.peek() != Some(')') {
        parameters.push(p.parse_type_signature()?);
    }
    p.expect(')')?;
    let return_type = if p.peek() == Some('V') {
        p.bump();
        None
    } else {
        Some(p.parse_type_signature()?)
    };

    let mut throws = Vec::new();
    while p.peek() == Some('^') {
        p.bump();
        let ty = match p.peek() {
            Some('T') => p.parse_type_variable_signature()?,
            Some('L') => TypeSignature::Class(p.parse_class_type_signature()?),
            _ => return Err(Error::InvalidSignature(sig.to_string())),
        };
        throws.push(ty);
    }

    if !p.is_eof() {
        return Err(Error::InvalidSignature(sig.to_string()));
    }

    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<FieldTypeSignature> {
    let mut p = Parser::new(sig);
    let ty = p.parse_field_type_signature()?;
    if !p.is_eof() {
        return Err(Error::InvalidSignature(sig.to_string()));
    }
    Ok(ty)
}

struct Parser<'a> {
    sig: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(sig: &'a str) -> Self {
        Self {
            sig,
            bytes: sig.as_bytes(),
            pos: 0,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).copied().map(|b| b as char)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == ch => Ok(()),
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_type_parameters_if_present(&mut self) -> Result<Vec<TypeParameter>> {
        if self.peek() != Some('<') {
            return Ok(Vec::new());
        }
        self.expect('<')?;
        let mut out = Vec::new();
        while self.peek() != Some('>') {
            if self.is_eof() {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            out.push(self.parse_type_parameter()?);
        }
        self.expect('>')?;
        Ok(out)
    }

    fn parse_type_parameter(&mut self) -> Result<TypeParameter> {
        let name = self.parse_identifier_until(':')?;
        self.expect(':')?;

        let class_bound = match self.peek() {
            Some(':') => None,
            Some('L') | Some('T') | Some('[') => Some(self.parse_field_type_signature()?),
            _ => return Err(Error::InvalidSignature(self.sig.to_string())),
        };

        let mut interface_bounds = Vec::new();
        while self.peek() == Some(':') {
            self.bump();
            interface_bounds.push(self.parse_field_type_signature()?);
        }

        Ok(TypeParameter {
            name,
            class_bound,
            interface_bounds,
        })
    }

    fn parse_type_signature(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some('B') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Byte))
            }
            Some('C') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Char))
            }
            Some('D') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Double))
            }
            Some('F') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Float))
            }
            Some('I') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Int))
            }
            Some('J') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Long))
            }
            Some('S') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Short))
            }
            Some('Z') => {
                self.bump();
                Ok(TypeSignature::Base(BaseType::Boolean))
            }
            Some('L') | Some('T') | Some('[') => self.parse_field_type_signature(),
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_field_type_signature(&mut self) -> Result<FieldTypeSignature> {
        match self.peek() {
            Some('L') => Ok(TypeSignature::Class(self.parse_class_type_signature()?)),
            Some('T') => self.parse_type_variable_signature(),
            Some('[') => {
                self.bump();
                let component = self.parse_type_signature()?;
                Ok(TypeSignature::Array(Box::new(component)))
            }
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_type_variable_signature(&mut self) -> Result<TypeSignature> {
        self.expect('T')?;
        let name = self.parse_identifier_until(';')?;
        self.expect(';')?;
        Ok(TypeSignature::TypeVariable(name))
    }

    fn parse_class_type_signature(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;

        let mut package = Vec::new();
        let mut first = self.parse_identifier()?;
        while self.peek() == Some('/') {
            self.bump();
            package.push(first);
            first = self.parse_identifier()?;
        }

        let mut segments = Vec::new();
        let type_arguments = self.parse_type_arguments_if_present()?;
        segments.push(ClassTypeSegment {
            name: first,
            type_arguments,
        });

        while self.peek() == Some('.') {
            self.bump();
            let name = self.parse_identifier()?;
            let type_arguments = self.parse_type_arguments_if_present()?;
            segments.push(ClassTypeSegment { name, type_arguments });
        }

        self.expect(';')?;
        Ok(ClassTypeSignature { package, segments })
    }

    fn parse_type_arguments_if_present(&mut self) -> Result<Vec<TypeArgument>> {
        if self.peek() != Some('<') {
            return Ok(Vec::new());
        }
        self.expect('<')?;
        let mut args = Vec::new();
        while self.peek() != Some('>') {
            if self.is_eof() {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            args.push(self.parse_type_argument()?);
        }
        self.expect('>')?;
        Ok(args)
    }

    fn parse_type_argument(&mut self) -> Result<TypeArgument> {
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(TypeArgument::Any)
            }
            Some('+') => {
                self.bump();
                Ok(TypeArgument::Extends(Box::new(self.parse_field_type_signature()?)))
            }
            Some('-') => {
                self.bump();
                Ok(TypeArgument::Super(Box::new(self.parse_field_type_signature()?)))
            }
            Some('L') | Some('T') | Some('[') => {
                Ok(TypeArgument::Exact(Box::new(self.parse_field_type_signature()?)))
            }
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_identifier_until(&mut self, delim: char) -> Result<String> {
        let start = self.pos;
        while !self.is_eof() && self.peek() != Some(delim) {
            let ch = self.peek().unwrap();
            if is_forbidden_in_identifier(ch) {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            self.pos += 1;
        }
        if self.is_eof() {
            return Err(Error::InvalidSignature(self.sig.to_string()));
        }
        if start == self.pos {
            return Err(Error::InvalidSignature(self.sig.to_string()));
        }
        Ok(self.sig[start..self.pos].to_string())
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while !self.is_eof() {
            let ch = self.peek().unwrap();
            if ch == '/' || ch == ';' || ch == '<' || ch == '>' || ch == '.' || ch == ':' {
                break;
            }
            if is_forbidden_in_identifier(ch) {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            self.pos += 1;
        }

        if start == self.pos {
            return Err(Error::InvalidSignature(self.sig.to_string()));
        }

        Ok(self.sig[start..self.pos].to_string())
    }
}

fn is_forbidden_in_identifier(ch: char) -> bool {
    matches!(ch, '[' | '^' | '(' | ')' | '*' | '+' | '-')
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

/// Encodes a bound [`Type`] as a signature-grammar `TypeSignature`, keeping
/// type arguments and type variables that [`crate::descriptor`] erases away.
pub fn encode_type_signature(ty: &Type, interner: &headc_core::Interner, out: &mut String) {
    match ty {
        Type::Prim(p) => out.push(base_type_char(base_type_of(*p))),
        Type::Class(segments) => encode_class_type_signature(segments, interner, out),
        Type::Array(element, _) => {
            out.push('[');
            encode_type_signature(element, interner, out);
        }
        Type::TyVar(tv, _) => {
            out.push('T');
            out.push_str(tv.name(interner));
            out.push(';');
        }
        Type::Wild(kind, _) => encode_wildcard(kind, interner, out),
        Type::Void => unreachable!("void has no signature encoding"),
    }
}

fn encode_wildcard(kind: &WildKind, interner: &headc_core::Interner, out: &mut String) {
    match kind {
        WildKind::Unbounded => out.push('*'),
        WildKind::Extends(inner) => {
            out.push('+');
            encode_type_signature(inner, interner, out);
        }
        WildKind::Super(inner) => {
            out.push('-');
            encode_type_signature(inner, interner, out);
        }
    }
}

fn encode_class_type_signature(segments: &[ClassTySegment], interner: &headc_core::Interner, out: &mut String) {
    out.push('L');
    let outermost = segments.first().expect("ClassTy has at least one segment");
    let package = outermost.class.package(interner);
    out.push_str(&package.replace('.', "/"));
    if !package.is_empty() {
        out.push('/');
    }
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            out.push('.');
        }
        out.push_str(segment.class.simple_name(interner));
        if !segment.type_args.is_empty() {
            out.push('<');
            for arg in &segment.type_args {
                encode_type_signature(arg, interner, out);
            }
            out.push('>');
        }
    }
    out.push(';');
}

/// Whether a class-level `Signature` attribute is needed: any type parameter
/// on the class itself, or any parameterization in its supertype/interfaces.
pub fn class_signature_required(
    type_parameters: &[headc_symbols::TyVarSymbol],
    super_class: &Type,
    interfaces: &[Type],
) -> bool {
    !type_parameters.is_empty() || type_uses_generics(super_class) || interfaces.iter().any(type_uses_generics)
}

pub fn type_uses_generics(ty: &Type) -> bool {
    match ty {
        Type::Prim(_) | Type::Void => false,
        Type::Class(segments) => segments.iter().any(|s| !s.type_args.is_empty()),
        Type::Array(element, _) => type_uses_generics(element),
        Type::TyVar(..) => true,
        Type::Wild(..) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_class_signature_with_bound() {
        let sig = parse_class_signature("<T:Ljava/lang/Number;>Ljava/lang/Object;").unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(sig.type_parameters[0].name, "T");
        assert_eq!(
            sig.type_parameters[0].class_bound,
            Some(TypeSignature::Class(ClassTypeSignature {
                package: vec!["java".into(), "lang".into()],
                segments: vec![ClassTypeSegment {
                    name: "Number".into(),
                    type_arguments: vec![]
                }]
            }))
        );
        assert_eq!(sig.super_class.internal_name(), "java/lang/Object");
    }

    #[test]
    fn parse_method_signature_with_type_param() {
        let sig = parse_method_signature("<U:Ljava/lang/Object;>(TU;)TU;").unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(sig.type_parameters[0].name, "U");
        assert_eq!(sig.parameters.len(), 1);
        assert_eq!(sig.parameters[0], TypeSignature::TypeVariable("U".to_string()));
        assert_eq!(sig.return_type, Some(TypeSignature::TypeVariable("U".to_string())));
    }

    #[test]
    fn encode_type_signature_keeps_type_arguments() {
        let mut interner = headc_core::Interner::new();
        let list = headc_symbols::ClassSymbol::new(&mut interner, "java/util/List");
        let string = headc_symbols::ClassSymbol::new(&mut interner, "java/lang/String");
        let ty = Type::as_class_ty(vec![headc_symbols::ClassTySegment {
            class: list,
            type_args: vec![Type::as_non_parameterized_class_ty(string)],
            annotations: vec![],
        }]);
        let mut out = String::new();
        encode_type_signature(&ty, &interner, &mut out);
        assert_eq!(out, "Ljava/util/List<Ljava/lang/String;>;");
    }
}
