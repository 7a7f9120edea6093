//! Compilation units and type declarations.

use crate::expr::{AnnotationUseNode, Expr};
use crate::modifiers::Modifiers;
use crate::ty::TypeRefNode;
use headc_core::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub source_path: String,
    /// Dotted package name, e.g. `com.example`. `None` for the unnamed package.
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Dotted path, e.g. `java.util.List` or `java.util` for an on-demand import.
    pub path: String,
    pub is_static: bool,
    pub is_on_demand: bool,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUseNode>,
    pub name: String,
    pub type_params: Vec<TypeParamNode>,
    pub superclass: Option<TypeRefNode>,
    pub interfaces: Vec<TypeRefNode>,
    pub members: Vec<MemberDecl>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeParamNode {
    pub name: String,
    pub bounds: Vec<TypeRefNode>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MemberDecl {
    Field(FieldDecl),
    Method(MethodDecl),
    NestedType(Box<TypeDecl>),
    EnumConstant(EnumConstantDecl),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUseNode>,
    pub ty: TypeRefNode,
    pub name: String,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUseNode>,
    pub type_params: Vec<TypeParamNode>,
    /// `None` denotes a constructor (`<init>`); the return type is void by
    /// construction and the descriptor mangler never emits one for it.
    pub return_type: Option<TypeRefNode>,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub thrown: Vec<TypeRefNode>,
    /// Present only on an annotation type's elements, e.g. `int value() default 0;`.
    pub default_value: Option<Expr>,
    pub has_body: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUseNode>,
    pub ty: TypeRefNode,
    pub name: String,
    pub is_varargs: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumConstantDecl {
    pub name: String,
    pub args: Vec<Expr>,
    pub class_body: Option<Box<TypeDecl>>,
    pub span: Span,
}
