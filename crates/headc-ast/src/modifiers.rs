//! Source-level modifiers, mirrored onto class-file access flags during
//! lowering (see `headc_classfile::access`).

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct Modifiers: u32 {
        const PUBLIC       = 1 << 0;
        const PRIVATE      = 1 << 1;
        const PROTECTED    = 1 << 2;
        const STATIC       = 1 << 3;
        const FINAL        = 1 << 4;
        const ABSTRACT     = 1 << 5;
        const SYNCHRONIZED = 1 << 6;
        const NATIVE       = 1 << 7;
        const TRANSIENT    = 1 << 8;
        const VOLATILE     = 1 << 9;
        const STRICTFP     = 1 << 10;
        const DEFAULT      = 1 << 11;
        const VARARGS      = 1 << 12;
    }
}
