//! Class-file byte-level plumbing: the constant pool, descriptors,
//! signatures, annotations, and the reader/writer pair built on top of them.
//!
//! This crate knows nothing about headc's bound program; it only knows the
//! class-file wire format in both directions. `headc_classpath` uses the
//! read side to turn `.class` bytes into a [`ClassStub`]; `headc_lower`
//! builds a [`ClassDef`] from the bound program and hands it to
//! [`write_class_file`].

mod access;
mod annotation;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod pool;
mod reader;
mod signature;
mod stub;
mod writer;

pub use crate::access::{
    ACC_ABSTRACT, ACC_ANNOTATION, ACC_BRIDGE, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_NATIVE, ACC_PRIVATE,
    ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_STRICT, ACC_SUPER, ACC_SYNCHRONIZED, ACC_SYNTHETIC, ACC_TRANSIENT,
    ACC_VARARGS, ACC_VOLATILE,
};
pub use crate::annotation::{
    descriptor_to_internal_name, Annotation, ConstValue, ElementValue, TypeAnnotation, TypeAnnotationTarget,
    TypePathKind,
};
pub use crate::classfile::{ClassFile, ClassMember, ConstValueAttr, InnerClassInfo};
pub use crate::constant_pool::{encode_modified_utf8, ConstantPool, CpInfo};
pub use crate::descriptor::{
    encode_field_descriptor, encode_field_type, encode_method_descriptor, erase_to_field_type, parse_field_descriptor,
    parse_method_descriptor, BaseType, FieldType, MethodDescriptor, ReturnType,
};
pub use crate::error::{Error, Result};
pub use crate::pool::PoolBuilder;
pub use crate::reader::{Reader, Writer};
pub use crate::signature::{
    class_signature_required, encode_type_signature, parse_class_signature, parse_field_signature,
    parse_method_signature, type_uses_generics, ClassSignature, ClassTypeSignature, FieldTypeSignature,
    MethodSignature, TypeArgument, TypeParameter, TypeSignature,
};
pub use crate::stub::{ClassStub, FieldStub, MethodStub};
pub use crate::writer::{
    assertion_error_code, write_class_file, AttributeSet, ClassDef, CodeDef, FieldDef, MethodDef,
    DEFAULT_MAJOR_VERSION,
};
