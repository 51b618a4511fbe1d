/// Spec tests for the Toolman compilation pipeline.
///
/// Each test compiles a fixture under `tests/testdata/` and asserts on the
/// resolved document and the collected diagnostics. Fatal conditions
/// (missing files, import cycles) are asserted on the `Err` branch.
use std::path::PathBuf;
use std::rc::Rc;

use tm_lang::{
    CompileError, CompileResult, Compiler, FatalError, Literal, PrimitiveKind, PrimitiveValue,
    Type,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata")
        .join(name)
}

fn compile(name: &str) -> (CompileResult, Compiler) {
    let mut compiler = Compiler::new();
    let result = compiler.compile(fixture(name)).expect("no fatal error");
    (result, compiler)
}

fn assert_primitive(ty: &Type, kind: PrimitiveKind) {
    match ty {
        Type::Primitive(primitive) => assert_eq!(primitive.kind, kind),
        other => panic!("expected {kind:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Structs and containers
// ---------------------------------------------------------------------------

#[test]
fn basic_struct() {
    let (result, compiler) = compile("point.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);
    assert_eq!(result.document.struct_types.len(), 1);

    let point = result.document.struct_types[0].get(compiler.types());
    assert_eq!(point.name, "Point");
    assert!(point.is_public);
    assert_eq!(point.fields.len(), 2);
    assert_eq!(point.fields[0].name, "x");
    assert_primitive(&point.fields[0].type_, PrimitiveKind::I32);
    assert_primitive(&point.fields[1].type_, PrimitiveKind::I32);
    assert!(!point.fields[0].optional);
}

#[test]
fn nested_containers() {
    let (result, compiler) = compile("nested.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);

    let s = result.document.struct_types[0].get(compiler.types());
    let map = s.fields[0].type_.as_map().expect("map field type");
    assert_eq!(map.key.kind, PrimitiveKind::String);
    let list = map.value.as_list().expect("list value type");
    assert_primitive(&list.elem, PrimitiveKind::I32);
}

#[test]
fn forward_reference_resolves_to_the_same_handle() {
    let (result, compiler) = compile("forward.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);
    assert_eq!(result.document.struct_types.len(), 2);

    let a = result.document.struct_types[0].get(compiler.types());
    let b_handle = a.fields[0].type_.as_struct().expect("struct field type");
    assert_eq!(b_handle, result.document.struct_types[1]);
    assert_eq!(b_handle.get(compiler.types()).name, "B");
}

#[test]
fn doc_comments_and_optional_marker() {
    let (result, compiler) = compile("docs.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);

    let shape = result.document.struct_types[0].get(compiler.types());
    let name = &shape.fields[0];
    assert!(name.optional);
    assert_eq!(
        name.doc_comments,
        vec!["The display name.", "Used in generated docs."]
    );
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn default_literals_resolve() {
    let (result, compiler) = compile("defaults.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);

    let settings = result.document.struct_types[0].get(compiler.types());
    match settings.fields[0].default_literal.as_ref().expect("xs default") {
        Literal::List(list) => {
            assert_eq!(list.elements.len(), 2);
            match &list.elements[0] {
                Literal::Primitive(p) => assert_eq!(p.value, PrimitiveValue::Int(1)),
                other => panic!("unexpected element: {other:?}"),
            }
        }
        other => panic!("unexpected literal: {other:?}"),
    }
    match settings.fields[1].default_literal.as_ref().expect("flags default") {
        Literal::Map(map) => {
            assert_eq!(map.entries.len(), 2);
            assert_eq!(map.entries[0].0.value, PrimitiveValue::String("debug".into()));
            match &map.entries[0].1 {
                Literal::Primitive(p) => assert_eq!(p.value, PrimitiveValue::Bool(true)),
                other => panic!("unexpected value: {other:?}"),
            }
        }
        other => panic!("unexpected literal: {other:?}"),
    }
    match settings.fields[2].default_literal.as_ref().expect("name default") {
        Literal::Primitive(p) => assert_eq!(p.value, PrimitiveValue::String("toolman".into())),
        other => panic!("unexpected literal: {other:?}"),
    }
    // The default's declared type structurally equals the field's type.
    let ratio = &settings.fields[3];
    assert_eq!(
        ratio.default_literal.as_ref().expect("ratio default").ty(),
        ratio.type_.clone()
    );
}

#[test]
fn any_accepts_every_literal() {
    let (result, _compiler) = compile("any_default.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);
}

#[test]
fn literal_type_mismatch_is_reported() {
    let (result, _compiler) = compile("bad_default.tm");
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        CompileError::LiteralElementTypeMismatch {
            expected, found, ..
        } => {
            assert_eq!(expected, "i32");
            assert_eq!(found, "string");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Semantic errors
// ---------------------------------------------------------------------------

#[test]
fn map_key_violation_still_produces_a_document() {
    let (result, compiler) = compile("bad_map_key.tm");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        CompileError::MapKeyTypeMustBePrimitive { .. }
    ));
    // The offending field is dropped; the struct itself survives.
    assert_eq!(result.document.struct_types.len(), 1);
    let s = result.document.struct_types[0].get(compiler.types());
    assert!(s.fields.is_empty());
}

#[test]
fn missing_custom_type_drops_only_that_field() {
    let (result, compiler) = compile("missing_type.tm");
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        CompileError::CustomTypeNotFound { name, .. } => assert_eq!(name, "Unknown"),
        other => panic!("unexpected error: {other:?}"),
    }
    let s = result.document.struct_types[0].get(compiler.types());
    assert_eq!(s.fields.len(), 1);
    assert_eq!(s.fields[0].name, "n");
}

#[test]
fn duplicate_struct_keeps_the_first_declaration() {
    let (result, compiler) = compile("dup_struct.tm");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        CompileError::DuplicateDecl { .. }
    ));
    assert_eq!(result.document.struct_types.len(), 1);
    let t = result.document.struct_types[0].get(compiler.types());
    assert_eq!(t.fields.len(), 1);
    assert_eq!(t.fields[0].name, "x");
}

#[test]
fn duplicate_field_names_are_reported_once() {
    let (result, compiler) = compile("dup_field.tm");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        CompileError::DuplicateFieldName { .. }
    ));
    let s = result.document.struct_types[0].get(compiler.types());
    assert_eq!(s.fields.len(), 1);
}

#[test]
fn parse_error_is_collected_not_raised() {
    let dir = fixture("");
    let path = dir.join("broken.tm");
    std::fs::write(&path, "struct {").unwrap();
    let mut compiler = Compiler::new();
    let result = compiler.compile(&path).expect("parse errors are not fatal");
    std::fs::remove_file(&path).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], CompileError::Parse { .. }));
    assert!(result.document.struct_types.is_empty());
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[test]
fn enum_declaration_and_reference() {
    let (result, compiler) = compile("enums.tm");
    assert!(result.is_success(), "errors: {:?}", result.errors);
    assert_eq!(result.document.enum_types.len(), 1);

    let color = result.document.enum_types[0].get(compiler.types());
    assert_eq!(color.name, "Color");
    assert!(color.is_public);
    let variants: Vec<_> = color
        .variants
        .iter()
        .map(|v| (v.name.as_str(), v.value))
        .collect();
    assert_eq!(variants, vec![("Red", 1), ("Green", 2), ("Blue", 3)]);

    let pixel = result.document.struct_types[0].get(compiler.types());
    let handle = pixel.fields[0].type_.as_enum().expect("enum field type");
    assert_eq!(handle, result.document.enum_types[0]);
}

#[test]
fn duplicate_enum_variant_name() {
    let (result, compiler) = compile("enum_dup_variant.tm");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        CompileError::DuplicateEnumVariant { .. }
    ));
    let e = result.document.enum_types[0].get(compiler.types());
    assert_eq!(e.variants.len(), 1);
}

#[test]
fn duplicate_enum_value() {
    let (result, compiler) = compile("enum_dup_value.tm");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        CompileError::DuplicateEnumValue { .. }
    ));
    let e = result.document.enum_types[0].get(compiler.types());
    assert_eq!(e.variants.len(), 1);
}

// ---------------------------------------------------------------------------
// Imports and the module cache
// ---------------------------------------------------------------------------

#[test]
fn duplicate_decl_across_imports_points_at_the_prior_site() {
    let (result, _compiler) = compile("imports/b.tm");
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        CompileError::DuplicateDecl { name, prior, .. } => {
            assert_eq!(name, "T");
            assert!(prior.source().ends_with("a.tm"), "prior: {prior}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn imports_merge_only_public_types() {
    let (result, compiler) = compile("imports/uses.tm");
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        CompileError::CustomTypeNotFound { name, .. } => assert_eq!(name, "Hidden"),
        other => panic!("unexpected error: {other:?}"),
    }
    let app = result.document.struct_types[0].get(compiler.types());
    assert_eq!(app.fields.len(), 1);
    assert_eq!(app.fields[0].name, "s");
}

#[test]
fn import_cycle_is_fatal() {
    let mut compiler = Compiler::new();
    match compiler.compile(fixture("cycle/x.tm")) {
        Err(FatalError::ImportCycle { path_chain }) => {
            assert!(path_chain.len() >= 3);
            assert!(path_chain.first().unwrap().ends_with("x.tm"));
            assert!(path_chain.last().unwrap().ends_with("x.tm"));
        }
        other => panic!("expected an import cycle, got {other:?}"),
    }
}

#[test]
fn missing_file_is_fatal() {
    let mut compiler = Compiler::new();
    assert!(matches!(
        compiler.compile(fixture("nope.tm")),
        Err(FatalError::FileNotFound { .. })
    ));
}

#[test]
fn compile_module_is_idempotent() {
    let mut compiler = Compiler::new();
    let first = compiler.compile_module(fixture("point.tm")).unwrap();
    let second = compiler.compile_module(fixture("point.tm")).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert!(first.errors.is_empty());
}

#[test]
fn textually_different_paths_share_one_module() {
    let mut compiler = Compiler::new();
    let direct = compiler.compile_module(fixture("point.tm")).unwrap();
    let indirect = compiler
        .compile_module(fixture("../testdata/point.tm"))
        .unwrap();
    assert!(Rc::ptr_eq(&direct, &indirect));
}

#[test]
fn module_carries_its_own_declaration_errors() {
    let mut compiler = Compiler::new();
    let module = compiler.compile_module(fixture("imports/b.tm")).unwrap();
    assert_eq!(module.errors.len(), 1);
    assert!(matches!(
        module.errors[0],
        CompileError::DuplicateDecl { .. }
    ));
    assert!(module.scope.lookup("T").is_some());
}
