//! End-to-end coverage: AST fixture in, output jar out, decoded class file
//! checked on the wire. Each test builds its fixture as a real
//! `headc_ast::CompilationUnit` value (rather than hand-written JSON) so it
//! stays correct across any change to the AST's serde shape.

use std::path::Path;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use headc_ast::*;
use headc_classfile::{ACC_ENUM, ACC_FINAL, ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
use headc_core::Span;

fn headc() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("headc"))
}

fn write_fixture(dir: &TempDir, name: &str, unit: &CompilationUnit) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(unit).unwrap()).unwrap();
    path
}

fn class_ref(name: &str) -> TypeRefNode {
    TypeRefNode::Class {
        segments: name
            .split('.')
            .map(|s| TypeRefSegment { name: s.to_string(), type_args: Vec::new() })
            .collect(),
        span: Span::synthetic(),
    }
}

fn read_only_class(archive_path: &Path, entry: &str) -> headc_classfile::ClassFile {
    let mut reader = headc_archive::ArchiveReader::open(archive_path).unwrap();
    let bytes = reader.read(entry).unwrap();
    headc_classfile::ClassFile::parse(&bytes).unwrap()
}

#[test]
fn simple_class_lowers_to_a_single_class_file_with_a_default_constructor() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "A.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![TypeDecl {
            kind: TypeDeclKind::Class,
            modifiers: Modifiers::PUBLIC,
            annotations: Vec::new(),
            name: "A".to_string(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            span: Span::synthetic(),
        }],
    };
    let fixture = write_fixture(&temp, "A.json", &unit);
    let output = temp.path().join("out.jar");

    headc().arg("--sources").arg(&fixture).arg("--output").arg(&output).assert().success();

    let class = read_only_class(&output, "A.class");
    assert_eq!(class.this_class, "A");
    assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
    assert!(class.access_flags & ACC_PUBLIC != 0);
    assert!(class.access_flags & ACC_SUPER != 0);
    assert!(class.signature.is_none());
    assert_eq!(class.methods.len(), 1);
    let ctor = &class.methods[0];
    assert_eq!(ctor.name, "<init>");
    assert_eq!(ctor.descriptor, "()V");
    assert!(class.inner_classes.is_empty());
}

#[test]
fn enum_constants_lower_to_the_synthetic_enum_suite() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "E.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![TypeDecl {
            kind: TypeDeclKind::Enum,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            name: "E".to_string(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: vec![
                MemberDecl::EnumConstant(EnumConstantDecl {
                    name: "X".to_string(),
                    args: Vec::new(),
                    class_body: None,
                    span: Span::synthetic(),
                }),
                MemberDecl::EnumConstant(EnumConstantDecl {
                    name: "Y".to_string(),
                    args: Vec::new(),
                    class_body: None,
                    span: Span::synthetic(),
                }),
            ],
            span: Span::synthetic(),
        }],
    };
    let fixture = write_fixture(&temp, "E.json", &unit);
    let output = temp.path().join("out.jar");

    headc().arg("--sources").arg(&fixture).arg("--output").arg(&output).assert().success();

    let class = read_only_class(&output, "E.class");
    assert_eq!(class.super_class.as_deref(), Some("java/lang/Enum"));
    assert!(class.access_flags & ACC_FINAL != 0);
    let field_names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
    assert!(field_names.contains(&"X"));
    assert!(field_names.contains(&"Y"));
    assert!(field_names.contains(&"$VALUES"));
    let x_field = class.fields.iter().find(|f| f.name == "X").unwrap();
    assert!(x_field.access_flags & ACC_STATIC != 0);
    assert!(x_field.access_flags & ACC_ENUM != 0);
    let method_names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
    assert!(method_names.contains(&"values"));
    assert!(method_names.contains(&"valueOf"));
    assert!(class.inner_classes.is_empty());
}

#[test]
fn a_static_final_constant_field_gets_a_constant_value_attribute() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "K.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![TypeDecl {
            kind: TypeDeclKind::Class,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            name: "K".to_string(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: vec![MemberDecl::Field(FieldDecl {
                modifiers: Modifiers::STATIC | Modifiers::FINAL,
                annotations: Vec::new(),
                ty: TypeRefNode::Primitive(PrimitiveKind::Int, Span::synthetic()),
                name: "N".to_string(),
                initializer: Some(Expr::Binary {
                    op: BinaryOp::Add,
                    left: Box::new(Expr::Literal(LiteralNode::Int(1), Span::synthetic())),
                    right: Box::new(Expr::Binary {
                        op: BinaryOp::Mul,
                        left: Box::new(Expr::Literal(LiteralNode::Int(2), Span::synthetic())),
                        right: Box::new(Expr::Literal(LiteralNode::Int(3), Span::synthetic())),
                        span: Span::synthetic(),
                    }),
                    span: Span::synthetic(),
                }),
                span: Span::synthetic(),
            })],
            span: Span::synthetic(),
        }],
    };
    let fixture = write_fixture(&temp, "K.json", &unit);
    let output = temp.path().join("out.jar");

    headc().arg("--sources").arg(&fixture).arg("--output").arg(&output).assert().success();

    let class = read_only_class(&output, "K.class");
    let field = &class.fields[0];
    assert_eq!(
        field.constant_value,
        Some(headc_classfile::ConstValueAttr::Int(7))
    );
}

#[test]
fn a_bounded_generic_field_gets_a_field_signature() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "L.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![TypeDecl {
            kind: TypeDeclKind::Class,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            name: "L".to_string(),
            type_params: vec![TypeParamNode {
                name: "T".to_string(),
                bounds: vec![class_ref("java.lang.Number")],
                span: Span::synthetic(),
            }],
            superclass: None,
            interfaces: Vec::new(),
            members: vec![MemberDecl::Field(FieldDecl {
                modifiers: Modifiers::empty(),
                annotations: Vec::new(),
                ty: TypeRefNode::Class {
                    segments: vec![TypeRefSegment { name: "T".to_string(), type_args: Vec::new() }],
                    span: Span::synthetic(),
                },
                name: "head".to_string(),
                initializer: None,
                span: Span::synthetic(),
            })],
            span: Span::synthetic(),
        }],
    };
    let fixture = write_fixture(&temp, "L.json", &unit);
    let output = temp.path().join("out.jar");

    headc().arg("--sources").arg(&fixture).arg("--output").arg(&output).assert().success();

    let class = read_only_class(&output, "L.class");
    assert_eq!(class.signature.as_deref(), Some("<T:Ljava/lang/Number;>Ljava/lang/Object;"));
    let field = &class.fields[0];
    assert_eq!(field.descriptor, "Ljava/lang/Number;");
    assert_eq!(field.signature.as_deref(), Some("TT;"));
}

#[test]
fn a_cyclic_hierarchy_is_reported_and_produces_no_output() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "Cycle.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![
            TypeDecl {
                kind: TypeDeclKind::Class,
                modifiers: Modifiers::empty(),
                annotations: Vec::new(),
                name: "A".to_string(),
                type_params: Vec::new(),
                superclass: Some(class_ref("B")),
                interfaces: Vec::new(),
                members: Vec::new(),
                span: Span::synthetic(),
            },
            TypeDecl {
                kind: TypeDeclKind::Class,
                modifiers: Modifiers::empty(),
                annotations: Vec::new(),
                name: "B".to_string(),
                type_params: Vec::new(),
                superclass: Some(class_ref("A")),
                interfaces: Vec::new(),
                members: Vec::new(),
                span: Span::synthetic(),
            },
        ],
    };
    let fixture = write_fixture(&temp, "Cycle.json", &unit);
    let output = temp.path().join("out.jar");

    let result = headc().arg("--sources").arg(&fixture).arg("--output").arg(&output).output().unwrap();
    assert_eq!(result.status.code(), Some(1));
    assert!(!output.exists());
}

#[test]
fn an_out_of_range_release_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "A.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![TypeDecl {
            kind: TypeDeclKind::Class,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            name: "A".to_string(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            span: Span::synthetic(),
        }],
    };
    let fixture = write_fixture(&temp, "A.json", &unit);
    let output = temp.path().join("out.jar");

    headc()
        .arg("--sources")
        .arg(&fixture)
        .arg("--output")
        .arg(&output)
        .arg("--release")
        .arg("3")
        .assert()
        .code(2);
}

#[test]
fn repeated_runs_produce_byte_identical_archives() {
    let temp = TempDir::new().unwrap();
    let unit = CompilationUnit {
        source_path: "A.java".to_string(),
        package: None,
        imports: Vec::new(),
        types: vec![TypeDecl {
            kind: TypeDeclKind::Class,
            modifiers: Modifiers::PUBLIC,
            annotations: Vec::new(),
            name: "A".to_string(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            span: Span::synthetic(),
        }],
    };
    let fixture = write_fixture(&temp, "A.json", &unit);
    let out1 = temp.path().join("out1.jar");
    let out2 = temp.path().join("out2.jar");

    headc().arg("--sources").arg(&fixture).arg("--output").arg(&out1).assert().success();
    headc().arg("--sources").arg(&fixture).arg("--output").arg(&out2).assert().success();

    assert_eq!(std::fs::read(&out1).unwrap(), std::fs::read(&out2).unwrap());
}
