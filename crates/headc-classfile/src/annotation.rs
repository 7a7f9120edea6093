//! `RuntimeVisible/InvisibleAnnotations` and the type-annotation variant
//! (`RuntimeVisible/InvisibleTypeAnnotations`), both decode- and encode-side.
//!
//! A plain [`Annotation`] is what `RuntimeVisibleAnnotations` carries; a
//! [`TypeAnnotation`] wraps one with the `target_type`/`target_path` pair the
//! type-annotation attributes additionally carry (§4.3.2 of the JVM spec,
//! consumed here only for the handful of target kinds headc's type-bound
//! layer can produce: class extends/implements and type parameter bounds).

use crate::constant_pool::{ConstantPool, CpInfo};
use crate::error::{Error, Result};
use crate::pool::PoolBuilder;
use crate::reader::{Reader, Writer};

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub type_internal_name: Option<String>,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let type_index = reader.read_u2()?;
        let type_descriptor = cp.get_utf8(type_index)?.to_string();
        let type_internal_name = descriptor_to_internal_name(&type_descriptor);

        let num_element_value_pairs = reader.read_u2()? as usize;
        let mut elements = Vec::with_capacity(num_element_value_pairs);
        for _ in 0..num_element_value_pairs {
            let element_name_index = reader.read_u2()?;
            let name = cp.get_utf8(element_name_index)?.to_string();
            let value = ElementValue::parse(reader, cp)?;
            elements.push((name, value));
        }

        Ok(Self {
            type_descriptor,
            type_internal_name,
            elements,
        })
    }

    pub(crate) fn write(&self, pool: &mut PoolBuilder, out: &mut Writer) -> Result<()> {
        let type_index = pool.add_utf8(&self.type_descriptor)?;
        out.write_u2(type_index);
        out.write_u2(self.elements.len() as u16);
        for (name, value) in &self.elements {
            let name_index = pool.add_utf8(name)?;
            out.write_u2(name_index);
            value.write(pool, out)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let tag = reader.read_u1()? as char;
        match tag {
            'B' | 'C' | 'I' | 'S' | 'Z' => {
                let idx = reader.read_u2()?;
                let value = match cp.get(idx)? {
                    CpInfo::Integer(v) => *v,
                    other => {
                        return Err(Error::ConstantPoolTypeMismatch {
                            index: idx,
                            expected: "Integer",
                            found: other.kind(),
                        })
                    }
                };

                let cv = match tag {
                    'B' => ConstValue::Byte(value as i8),
                    'C' => ConstValue::Char(
                        char::from_u32(value as u32).ok_or(Error::MalformedAttribute("RuntimeVisibleAnnotations"))?,
                    ),
                    'I' => ConstValue::Int(value),
                    'S' => ConstValue::Short(value as i16),
                    'Z' => ConstValue::Boolean(value != 0),
                    _ => unreachable!(),
                };
                Ok(ElementValue::Const(cv))
            }
            'D' => {
                let idx = reader.read_u2()?;
                let value = match cp.get(idx)? {
                    CpInfo::Double(v) => *v,
                    other => {
                        return Err(Error::ConstantPoolTypeMismatch {
                            index: idx,
                            expected: "Double",
                            found: other.kind(),
                        })
                    }
                };
                Ok(ElementValue::Const(ConstValue::Double(value)))
            }
            'F' => {
                let idx = reader.read_u2()?;
                let value = match cp.get(idx)? {
                    CpInfo::Float(v) => *v,
                    other => {
                        return Err(Error::ConstantPoolTypeMismatch {
                            index: idx,
                            expected: "Float",
                            found: other.kind(),
                        })
                    }
                };
                Ok(ElementValue::Const(ConstValue::Float(value)))
            }
            'J' => {
                let idx = reader.read_u2()?;
                let value = match cp.get(idx)? {
                    CpInfo::Long(v) => *v,
                    other => {
                        return Err(Error::ConstantPoolTypeMismatch {
                            index: idx,
                            expected: "Long",
                            found: other.kind(),
                        })
                    }
                };
                Ok(ElementValue::Const(ConstValue::Long(value)))
            }
            's' => {
                let idx = reader.read_u2()?;
                let value = cp.get_string_constant(idx)?;
                Ok(ElementValue::Const(ConstValue::String(value)))
            }
            'e' => {
                let type_name_index = reader.read_u2()?;
                let const_name_index = reader.read_u2()?;
                Ok(ElementValue::Enum {
                    type_descriptor: cp.get_utf8(type_name_index)?.to_string(),
                    const_name: cp.get_utf8(const_name_index)?.to_string(),
                })
            }
            'c' => {
                let class_info_index = reader.read_u2()?;
                Ok(ElementValue::Class(cp.get_utf8(class_info_index)?.to_string()))
            }
            '@' => Ok(ElementValue::Annotation(Box::new(Annotation::parse(reader, cp)?))),
            '[' => {
                let num_values = reader.read_u2()? as usize;
                let mut values = Vec::with_capacity(num_values);
                for _ in 0..num_values {
                    values.push(ElementValue::parse(reader, cp)?);
                }
                Ok(ElementValue::Array(values))
            }
            _ => Err(Error::MalformedAttribute("RuntimeVisibleAnnotations")),
        }
    }

    pub(crate) fn write(&self, pool: &mut PoolBuilder, out: &mut Writer) -> Result<()> {
        match self {
            ElementValue::Const(ConstValue::Byte(v)) => {
                out.write_u1(b'B');
                out.write_u2(pool.add_integer(*v as i32)?);
            }
            ElementValue::Const(ConstValue::Char(v)) => {
                out.write_u1(b'C');
                out.write_u2(pool.add_integer(*v as i32)?);
            }
            ElementValue::Const(ConstValue::Short(v)) => {
                out.write_u1(b'S');
                out.write_u2(pool.add_integer(*v as i32)?);
            }
            ElementValue::Const(ConstValue::Int(v)) => {
                out.write_u1(b'I');
                out.write_u2(pool.add_integer(*v)?);
            }
            ElementValue::Const(ConstValue::Boolean(v)) => {
                out.write_u1(b'Z');
                out.write_u2(pool.add_integer(*v as i32)?);
            }
            ElementValue::Const(ConstValue::Double(v)) => {
                out.write_u1(b'D');
                out.write_u2(pool.add_double(*v)?);
            }
            ElementValue::Const(ConstValue::Float(v)) => {
                out.write_u1(b'F');
                out.write_u2(pool.add_float(*v)?);
            }
            ElementValue::Const(ConstValue::Long(v)) => {
                out.write_u1(b'J');
                out.write_u2(pool.add_long(*v)?);
            }
            ElementValue::Const(ConstValue::String(s)) => {
                out.write_u1(b's');
                out.write_u2(pool.add_string(s)?);
            }
            ElementValue::Enum {
                type_descriptor,
                const_name,
            } => {
                out.write_u1(b'e');
                out.write_u2(pool.add_utf8(type_descriptor)?);
                out.write_u2(pool.add_utf8(const_name)?);
            }
            ElementValue::Class(descriptor) => {
                out.write_u1(b'c');
                out.write_u2(pool.add_utf8(descriptor)?);
            }
            ElementValue::Annotation(anno) => {
                out.write_u1(b'@');
                anno.write(pool, out)?;
            }
            ElementValue::Array(values) => {
                out.write_u1(b'[');
                out.write_u2(values.len() as u16);
                for value in values {
                    value.write(pool, out)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

pub fn descriptor_to_internal_name(desc: &str) -> Option<String> {
    desc.strip_prefix('L').and_then(|rest| rest.strip_suffix(';')).map(|name| name.to_string())
}

/// The `target_type` byte of a type annotation (JVMS §4.7.20.1), restricted
/// to the handful of targets headc's lowering stage actually produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAnnotationTarget {
    ClassTypeParameterBound { type_parameter_index: u8, bound_index: u8 },
    ClassExtends { supertype_index: u16 },
    FieldType,
    MethodReturnType,
    MethodReceiverType,
    MethodFormalParameter { index: u8 },
    MethodTypeParameterBound { type_parameter_index: u8, bound_index: u8 },
}

impl TypeAnnotationTarget {
    fn tag(&self) -> u8 {
        match self {
            TypeAnnotationTarget::ClassTypeParameterBound { .. } => 0x10,
            TypeAnnotationTarget::ClassExtends { .. } => 0x10,
            TypeAnnotationTarget::FieldType => 0x13,
            TypeAnnotationTarget::MethodReturnType => 0x14,
            TypeAnnotationTarget::MethodReceiverType => 0x15,
            TypeAnnotationTarget::MethodFormalParameter { .. } => 0x16,
            TypeAnnotationTarget::MethodTypeParameterBound { .. } => 0x12,
        }
    }

    fn write(&self, out: &mut Writer) {
        out.write_u1(self.tag());
        match self {
            TypeAnnotationTarget::ClassTypeParameterBound {
                type_parameter_index,
                bound_index,
            }
            | TypeAnnotationTarget::MethodTypeParameterBound {
                type_parameter_index,
                bound_index,
            } => {
                out.write_u1(*type_parameter_index);
                out.write_u1(*bound_index);
            }
            TypeAnnotationTarget::ClassExtends { supertype_index } => out.write_u2(*supertype_index),
            TypeAnnotationTarget::FieldType
            | TypeAnnotationTarget::MethodReturnType
            | TypeAnnotationTarget::MethodReceiverType => {}
            TypeAnnotationTarget::MethodFormalParameter { index } => out.write_u1(*index),
        }
    }
}

/// One step of a `type_path` (JVMS §4.7.20.2): headc only ever emits type
/// annotations directly on a top-level type, so every path is empty, but the
/// structure is kept so a future nested-generic target does not need a
/// format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePathKind {
    Array,
    Nested,
    Bound,
    TypeArgument(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub target: TypeAnnotationTarget,
    pub path: Vec<TypePathKind>,
    pub annotation: Annotation,
}

impl TypeAnnotation {
    pub fn write(&self, pool: &mut PoolBuilder, out: &mut Writer) -> Result<()> {
        self.target.write(out);
        out.write_u1(self.path.len() as u8);
        for step in &self.path {
            let (kind, arg) = match step {
                TypePathKind::Array => (0u8, 0u8),
                TypePathKind::Nested => (1, 0),
                TypePathKind::Bound => (2, 0),
                TypePathKind::TypeArgument(idx) => (3, *idx),
            };
            out.write_u1(kind);
            out.write_u1(arg);
        }
        self.annotation.write(pool, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_round_trips_through_writer_and_parser() {
        let mut pool = PoolBuilder::new();
        let anno = Annotation {
            type_descriptor: "Ljava/lang/Deprecated;".to_string(),
            type_internal_name: Some("java/lang/Deprecated".to_string()),
            elements: vec![("value".to_string(), ElementValue::Const(ConstValue::Int(1)))],
        };
        let mut body = Writer::new();
        anno.write(&mut pool, &mut body).unwrap();

        let mut cp_writer = Writer::new();
        pool.write(&mut cp_writer);
        let bytes = cp_writer.into_bytes();
        let mut cp_reader = Reader::new(&bytes);
        let cp = ConstantPool::parse(&mut cp_reader).unwrap();

        let mut reader = Reader::new(&body.into_bytes());
        let parsed = Annotation::parse(&mut reader, &cp).unwrap();
        assert_eq!(parsed.type_descriptor, "Ljava/lang/Deprecated;");
        assert_eq!(parsed.elements.len(), 1);
    }
}
