//! JVM access-flag bit constants (JVMS §4.1, §4.5, §4.6), shared by every
//! `access_flags: u16` field on [`crate::writer::ClassDef`]/[`crate::writer::FieldDef`]/
//! [`crate::writer::MethodDef`] and by [`crate::classfile::InnerClassInfo`].
//! Several bits are reused across contexts with different meanings (`0x0020`
//! is `ACC_SUPER` on a class and `ACC_SYNCHRONIZED` on a method); `headc_lower`
//! picks the constant that matches the position it's setting.

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_STRICT: u16 = 0x0800;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
