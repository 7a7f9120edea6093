//! The writer-side constant pool: an insertion-order, deduplicating builder.
//!
//! Every `add_*` method returns the existing index if an equal entry was
//! already inserted, so emitting the same literal or class reference twice
//! (a field's descriptor and an annotation naming the same class, say) never
//! grows the pool. `Long`/`Double` consume two slots, matching the read-side
//! layout in [`crate::constant_pool`].

use crate::error::{Error, Result};
use crate::reader::Writer;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Key {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    Fieldref(u16, u16),
    Methodref(u16, u16),
    InterfaceMethodref(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
}

enum Entry {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    Fieldref(u16, u16),
    Methodref(u16, u16),
    InterfaceMethodref(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
}

#[derive(Default)]
pub struct PoolBuilder {
    entries: Vec<Entry>,
    index: FxHashMap<Key, u16>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry count, including the implicit zero slot (so this is the
    /// value `constant_pool_count` would take if the pool were closed now).
    fn next_index(&self) -> Result<u16> {
        let next = self.entries.len() + 1;
        u16::try_from(next).map_err(|_| Error::PoolOverflow)
    }

    fn insert(&mut self, key: Key, entry_for: impl FnOnce() -> Entry, width: u16) -> Result<u16> {
        if let Some(&idx) = self.index.get(&key) {
            return Ok(idx);
        }
        let idx = self.next_index()?;
        self.entries.push(entry_for());
        if width == 2 {
            // Long/Double reserve the following slot; push a placeholder so
            // later indices stay aligned with the read-side numbering.
            self.entries.push(Entry::Integer(0));
        }
        self.index.insert(key, idx);
        Ok(idx)
    }

    pub fn add_utf8(&mut self, s: &str) -> Result<u16> {
        self.insert(Key::Utf8(s.to_string()), || Entry::Utf8(s.to_string()), 1)
    }

    pub fn add_class(&mut self, internal_name: &str) -> Result<u16> {
        let name_index = self.add_utf8(internal_name)?;
        self.insert(Key::Class(name_index), || Entry::Class(name_index), 1)
    }

    pub fn add_string(&mut self, value: &str) -> Result<u16> {
        let utf8 = self.add_utf8(value)?;
        self.insert(Key::String(utf8), || Entry::String(utf8), 1)
    }

    pub fn add_integer(&mut self, v: i32) -> Result<u16> {
        self.insert(Key::Integer(v), || Entry::Integer(v), 1)
    }

    pub fn add_float(&mut self, v: f32) -> Result<u16> {
        self.insert(Key::Float(v.to_bits()), || Entry::Float(v.to_bits()), 1)
    }

    pub fn add_long(&mut self, v: i64) -> Result<u16> {
        self.insert(Key::Long(v), || Entry::Long(v), 2)
    }

    pub fn add_double(&mut self, v: f64) -> Result<u16> {
        self.insert(Key::Double(v.to_bits()), || Entry::Double(v.to_bits()), 2)
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.insert(
            Key::NameAndType(name_index, descriptor_index),
            || Entry::NameAndType(name_index, descriptor_index),
            1,
        )
    }

    pub fn add_fieldref(&mut self, class_name: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class_index = self.add_class(class_name)?;
        let nat_index = self.add_name_and_type(name, descriptor)?;
        self.insert(
            Key::Fieldref(class_index, nat_index),
            || Entry::Fieldref(class_index, nat_index),
            1,
        )
    }

    pub fn add_methodref(&mut self, class_name: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class_index = self.add_class(class_name)?;
        let nat_index = self.add_name_and_type(name, descriptor)?;
        self.insert(
            Key::Methodref(class_index, nat_index),
            || Entry::Methodref(class_index, nat_index),
            1,
        )
    }

    pub fn add_interface_methodref(
        &mut self,
        class_name: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16> {
        let class_index = self.add_class(class_name)?;
        let nat_index = self.add_name_and_type(name, descriptor)?;
        self.insert(
            Key::InterfaceMethodref(class_index, nat_index),
            || Entry::InterfaceMethodref(class_index, nat_index),
            1,
        )
    }

    pub fn add_method_type(&mut self, descriptor: &str) -> Result<u16> {
        let descriptor_index = self.add_utf8(descriptor)?;
        self.insert(
            Key::MethodType(descriptor_index),
            || Entry::MethodType(descriptor_index),
            1,
        )
    }

    pub fn add_method_handle(&mut self, reference_kind: u8, reference_index: u16) -> Result<u16> {
        self.insert(
            Key::MethodHandle(reference_kind, reference_index),
            || Entry::MethodHandle(reference_kind, reference_index),
            1,
        )
    }

    /// `constant_pool_count`, one past the highest occupied index.
    pub fn count(&self) -> u16 {
        (self.entries.len() + 1) as u16
    }

    /// Serializes every entry in insertion order, matching the layout
    /// `ConstantPool::parse` expects on the read side.
    pub fn write(&self, out: &mut Writer) {
        out.write_u2(self.count());
        for entry in &self.entries {
            match entry {
                Entry::Utf8(s) => {
                    out.write_u1(1);
                    let bytes = crate::constant_pool::encode_modified_utf8(s);
                    out.write_u2(bytes.len() as u16);
                    out.write_bytes(&bytes);
                }
                Entry::Integer(v) => {
                    out.write_u1(3);
                    out.write_i4(*v);
                }
                Entry::Float(bits) => {
                    out.write_u1(4);
                    out.write_u4(*bits);
                }
                Entry::Long(v) => {
                    out.write_u1(5);
                    out.write_i8(*v);
                }
                Entry::Double(bits) => {
                    out.write_u1(6);
                    out.write_i8(*bits as i64);
                }
                Entry::Class(name_index) => {
                    out.write_u1(7);
                    out.write_u2(*name_index);
                }
                Entry::String(string_index) => {
                    out.write_u1(8);
                    out.write_u2(*string_index);
                }
                Entry::Fieldref(c, nat) => {
                    out.write_u1(9);
                    out.write_u2(*c);
                    out.write_u2(*nat);
                }
                Entry::Methodref(c, nat) => {
                    out.write_u1(10);
                    out.write_u2(*c);
                    out.write_u2(*nat);
                }
                Entry::InterfaceMethodref(c, nat) => {
                    out.write_u1(11);
                    out.write_u2(*c);
                    out.write_u2(*nat);
                }
                Entry::NameAndType(name_index, descriptor_index) => {
                    out.write_u1(12);
                    out.write_u2(*name_index);
                    out.write_u2(*descriptor_index);
                }
                Entry::MethodHandle(kind, index) => {
                    out.write_u1(15);
                    out.write_u1(*kind);
                    out.write_u2(*index);
                }
                Entry::MethodType(descriptor_index) => {
                    out.write_u1(16);
                    out.write_u2(*descriptor_index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_utf8_dedups() {
        let mut pool = PoolBuilder::new();
        let a = pool.add_utf8("java/lang/String").unwrap();
        let b = pool.add_utf8("java/lang/String").unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn long_reserves_two_slots() {
        let mut pool = PoolBuilder::new();
        let idx = pool.add_long(42).unwrap();
        let next = pool.add_utf8("after").unwrap();
        assert_eq!(next, idx + 2);
    }

    #[test]
    fn class_dedups_through_shared_utf8() {
        let mut pool = PoolBuilder::new();
        let a = pool.add_class("p/Foo").unwrap();
        let b = pool.add_class("p/Foo").unwrap();
        assert_eq!(a, b);
    }
}
