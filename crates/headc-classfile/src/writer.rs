//! The two-pass class-file writer: abstract records in, class-file bytes out.
//!
//! `headc_lower` builds a [`ClassDef`] per bound class; this module is the
//! only place that knows how to turn one into bytes. The "two-pass" shape
//! mirrors the read side's attribute handling: every attribute is built into
//! its own scratch [`Writer`] first (so its `attribute_length` is known
//! before it is spliced into the enclosing buffer), and the constant pool
//! itself is only serialized once every field, method, and attribute has
//! finished registering the pool entries it needs — the pool's final byte
//! layout is the second pass, emitted ahead of everything else because
//! `constant_pool_count` precedes the rest of the class file on the wire.

use crate::annotation::{Annotation, ElementValue, TypeAnnotation};
use crate::classfile::{ConstValueAttr, InnerClassInfo};
use crate::error::Result;
use crate::pool::PoolBuilder;
use crate::reader::Writer;

pub const DEFAULT_MAJOR_VERSION: u16 = 52;
const MINOR_VERSION: u16 = 0;
const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    pub signature: Option<String>,
    pub visible_annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
    pub visible_type_annotations: Vec<TypeAnnotation>,
    pub invisible_type_annotations: Vec<TypeAnnotation>,
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub inner_classes: Vec<InnerClassInfo>,
    pub attributes: AttributeSet,
    pub major_version: u16,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub constant_value: Option<ConstValueAttr>,
    pub attributes: AttributeSet,
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub exceptions: Vec<String>,
    pub annotation_default: Option<ElementValue>,
    pub code: Option<CodeDef>,
    pub attributes: AttributeSet,
}

/// A minimal `Code` attribute body: headc never analyzes or emits real
/// bytecode, so every method that needs one gets the fixed
/// `throw new AssertionError()` sequence built by [`assertion_error_code`].
#[derive(Debug, Clone)]
pub struct CodeDef {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

/// Builds the 4-instruction `Code` body headc emits for every concrete
/// method: `new AssertionError; dup; invokespecial <init>()V; athrow`.
pub fn assertion_error_code(pool: &mut PoolBuilder, max_locals: u16) -> Result<CodeDef> {
    let class_index = pool.add_class("java/lang/AssertionError")?;
    let ctor_index = pool.add_methodref("java/lang/AssertionError", "<init>", "()V")?;

    let mut code = Vec::with_capacity(8);
    code.push(0xBB); // new
    code.extend_from_slice(&class_index.to_be_bytes());
    code.push(0x59); // dup
    code.push(0xB7); // invokespecial
    code.extend_from_slice(&ctor_index.to_be_bytes());
    code.push(0xBF); // athrow

    Ok(CodeDef {
        max_stack: 2,
        max_locals,
        code,
    })
}

pub fn write_class_file(def: &ClassDef) -> Result<Vec<u8>> {
    let mut pool = PoolBuilder::new();

    let this_class_index = pool.add_class(&def.this_class)?;
    let super_class_index = match &def.super_class {
        Some(name) => pool.add_class(name)?,
        None => 0,
    };
    let interface_indices = def
        .interfaces
        .iter()
        .map(|name| pool.add_class(name))
        .collect::<Result<Vec<_>>>()?;

    let mut field_bodies = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        field_bodies.push(write_field(&mut pool, field)?);
    }

    let mut method_bodies = Vec::with_capacity(def.methods.len());
    for method in &def.methods {
        method_bodies.push(write_method(&mut pool, method)?);
    }

    let class_attrs = write_class_attributes(&mut pool, &def.attributes, &def.inner_classes)?;

    // Second pass: the pool is now closed, so it is serialized first even
    // though every other section was built before it.
    let mut out = Writer::new();
    out.write_u4(MAGIC);
    out.write_u2(MINOR_VERSION);
    out.write_u2(def.major_version);
    pool.write(&mut out);

    out.write_u2(def.access_flags);
    out.write_u2(this_class_index);
    out.write_u2(super_class_index);
    out.write_u2(interface_indices.len() as u16);
    for idx in interface_indices {
        out.write_u2(idx);
    }

    out.write_u2(field_bodies.len() as u16);
    for body in field_bodies {
        out.write_bytes(&body.into_bytes());
    }

    out.write_u2(method_bodies.len() as u16);
    for body in method_bodies {
        out.write_bytes(&body.into_bytes());
    }

    out.write_bytes(&class_attrs.into_bytes());

    Ok(out.into_bytes())
}

fn write_field(pool: &mut PoolBuilder, field: &FieldDef) -> Result<Writer> {
    let mut out = Writer::new();
    out.write_u2(field.access_flags);
    out.write_u2(pool.add_utf8(&field.name)?);
    out.write_u2(pool.add_utf8(&field.descriptor)?);

    let mut attr_bodies: Vec<(u16, Writer)> = Vec::new();

    if let Some(value) = &field.constant_value {
        let mut body = Writer::new();
        let index = match value {
            ConstValueAttr::Int(v) => pool.add_integer(*v)?,
            ConstValueAttr::Float(v) => pool.add_float(*v)?,
            ConstValueAttr::Long(v) => pool.add_long(*v)?,
            ConstValueAttr::Double(v) => pool.add_double(*v)?,
            ConstValueAttr::String(s) => pool.add_string(s)?,
        };
        body.write_u2(index);
        attr_bodies.push((pool.add_utf8("ConstantValue")?, body));
    }

    append_common_attributes(pool, &field.attributes, &mut attr_bodies)?;

    out.write_u2(attr_bodies.len() as u16);
    for (name_index, body) in &attr_bodies {
        out.write_attribute(*name_index, body);
    }
    Ok(out)
}

fn write_method(pool: &mut PoolBuilder, method: &MethodDef) -> Result<Writer> {
    let mut out = Writer::new();
    out.write_u2(method.access_flags);
    out.write_u2(pool.add_utf8(&method.name)?);
    out.write_u2(pool.add_utf8(&method.descriptor)?);

    let mut attr_bodies: Vec<(u16, Writer)> = Vec::new();

    if let Some(code) = &method.code {
        let mut body = Writer::new();
        body.write_u2(code.max_stack);
        body.write_u2(code.max_locals);
        body.write_u4(code.code.len() as u32);
        body.write_bytes(&code.code);
        body.write_u2(0); // exception_table_length
        body.write_u2(0); // attributes_count
        attr_bodies.push((pool.add_utf8("Code")?, body));
    }

    if !method.exceptions.is_empty() {
        let mut body = Writer::new();
        body.write_u2(method.exceptions.len() as u16);
        for exc in &method.exceptions {
            body.write_u2(pool.add_class(exc)?);
        }
        attr_bodies.push((pool.add_utf8("Exceptions")?, body));
    }

    if let Some(default) = &method.annotation_default {
        let mut body = Writer::new();
        default.write(pool, &mut body)?;
        attr_bodies.push((pool.add_utf8("AnnotationDefault")?, body));
    }

    append_common_attributes(pool, &method.attributes, &mut attr_bodies)?;

    out.write_u2(attr_bodies.len() as u16);
    for (name_index, body) in &attr_bodies {
        out.write_attribute(*name_index, body);
    }
    Ok(out)
}

fn write_class_attributes(
    pool: &mut PoolBuilder,
    attrs: &AttributeSet,
    inner_classes: &[InnerClassInfo],
) -> Result<Writer> {
    let mut attr_bodies: Vec<(u16, Writer)> = Vec::new();

    if !inner_classes.is_empty() {
        let mut body = Writer::new();
        body.write_u2(inner_classes.len() as u16);
        for info in inner_classes {
            body.write_u2(pool.add_class(&info.inner_class)?);
            body.write_u2(match &info.outer_class {
                Some(name) => pool.add_class(name)?,
                None => 0,
            });
            body.write_u2(match &info.inner_name {
                Some(name) => pool.add_utf8(name)?,
                None => 0,
            });
            body.write_u2(info.access_flags);
        }
        attr_bodies.push((pool.add_utf8("InnerClasses")?, body));
    }

    append_common_attributes(pool, attrs, &mut attr_bodies)?;

    let mut out = Writer::new();
    out.write_u2(attr_bodies.len() as u16);
    for (name_index, body) in &attr_bodies {
        out.write_attribute(*name_index, body);
    }
    Ok(out)
}

/// Appends the attributes shared by class, field, and method declarations:
/// `Signature`, the two annotation-list attributes, the two type-annotation
/// attributes, and `Deprecated`.
fn append_common_attributes(
    pool: &mut PoolBuilder,
    attrs: &AttributeSet,
    out: &mut Vec<(u16, Writer)>,
) -> Result<()> {
    if let Some(sig) = &attrs.signature {
        let mut body = Writer::new();
        body.write_u2(pool.add_utf8(sig)?);
        out.push((pool.add_utf8("Signature")?, body));
    }

    if !attrs.visible_annotations.is_empty() {
        out.push((
            pool.add_utf8("RuntimeVisibleAnnotations")?,
            write_annotation_list(pool, &attrs.visible_annotations)?,
        ));
    }
    if !attrs.invisible_annotations.is_empty() {
        out.push((
            pool.add_utf8("RuntimeInvisibleAnnotations")?,
            write_annotation_list(pool, &attrs.invisible_annotations)?,
        ));
    }
    if !attrs.visible_type_annotations.is_empty() {
        out.push((
            pool.add_utf8("RuntimeVisibleTypeAnnotations")?,
            write_type_annotation_list(pool, &attrs.visible_type_annotations)?,
        ));
    }
    if !attrs.invisible_type_annotations.is_empty() {
        out.push((
            pool.add_utf8("RuntimeInvisibleTypeAnnotations")?,
            write_type_annotation_list(pool, &attrs.invisible_type_annotations)?,
        ));
    }
    if attrs.deprecated {
        out.push((pool.add_utf8("Deprecated")?, Writer::new()));
    }

    Ok(())
}

fn write_annotation_list(pool: &mut PoolBuilder, annotations: &[Annotation]) -> Result<Writer> {
    let mut body = Writer::new();
    body.write_u2(annotations.len() as u16);
    for anno in annotations {
        anno.write(pool, &mut body)?;
    }
    Ok(body)
}

fn write_type_annotation_list(pool: &mut PoolBuilder, annotations: &[TypeAnnotation]) -> Result<Writer> {
    let mut body = Writer::new();
    body.write_u2(annotations.len() as u16);
    for anno in annotations {
        anno.write(pool, &mut body)?;
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_minimal_class_with_magic_and_version() {
        let def = ClassDef {
            access_flags: 0x0021, // public, super
            this_class: "p/Simple".to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            inner_classes: vec![],
            attributes: AttributeSet::default(),
            major_version: DEFAULT_MAJOR_VERSION,
        };
        let bytes = write_class_file(&def).unwrap();
        assert_eq!(&bytes[0..4], &0xCAFEBABEu32.to_be_bytes());
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), DEFAULT_MAJOR_VERSION);

        let parsed = crate::classfile::ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.this_class, "p/Simple");
        assert_eq!(parsed.super_class.as_deref(), Some("java/lang/Object"));
    }

    #[test]
    fn method_with_stub_body_round_trips() {
        let mut pool_probe = PoolBuilder::new();
        let code = assertion_error_code(&mut pool_probe, 1).unwrap();
        let def = ClassDef {
            access_flags: 0x0021,
            this_class: "p/Simple".to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: vec![],
            fields: vec![],
            methods: vec![MethodDef {
                access_flags: 0x0001,
                name: "go".to_string(),
                descriptor: "()V".to_string(),
                exceptions: vec![],
                annotation_default: None,
                code: Some(code),
                attributes: AttributeSet::default(),
            }],
            inner_classes: vec![],
            attributes: AttributeSet::default(),
            major_version: DEFAULT_MAJOR_VERSION,
        };
        let bytes = write_class_file(&def).unwrap();
        let parsed = crate::classfile::ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.methods.len(), 1);
        assert_eq!(parsed.methods[0].name, "go");
    }
}
