use std::io::{self, Write};

use heck::ToSnakeCase;
use tm_lang::{
    Document, EnumType, Literal, PrimitiveKind, PrimitiveLiteral, PrimitiveValue, StructType,
    Type, TypeTable,
};

use super::common::{document_stem, Generator};
use crate::naming::capitalize;

/// Emits Go struct and enum declarations with exported field names and
/// `json` tags carrying the original schema names.
pub struct GolangGenerator;

impl Generator for GolangGenerator {
    fn before_generate_document(
        &self,
        out: &mut dyn Write,
        document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        writeln!(out, "// Code generated by toolman. DO NOT EDIT.")?;
        writeln!(out)?;
        writeln!(out, "package {}", document_stem(document).to_snake_case())?;
        writeln!(out)
    }

    fn generate_struct(
        &self,
        out: &mut dyn Write,
        struct_type: &StructType,
        types: &TypeTable,
    ) -> io::Result<()> {
        let name = capitalize(&struct_type.name);
        writeln!(out, "type {} struct {{", name)?;
        for field in &struct_type.fields {
            for doc in &field.doc_comments {
                writeln!(out, "\t// {}", doc)?;
            }
            let mut go_type = type_to_go_type(&field.type_, types);
            let tag = if field.optional {
                go_type = format!("*{}", go_type);
                format!("`json:\"{},omitempty\"`", field.name)
            } else {
                format!("`json:\"{}\"`", field.name)
            };
            writeln!(out, "\t{} {} {}", capitalize(&field.name), go_type, tag)?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;

        if struct_type
            .fields
            .iter()
            .any(|field| field.default_literal.is_some())
        {
            writeln!(out, "func New{}() *{} {{", name, name)?;
            writeln!(out, "\treturn &{}{{", name)?;
            for field in &struct_type.fields {
                if let Some(literal) = &field.default_literal {
                    writeln!(
                        out,
                        "\t\t{}: {},",
                        capitalize(&field.name),
                        literal_to_go(literal, types)
                    )?;
                }
            }
            writeln!(out, "\t}}")?;
            writeln!(out, "}}")?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn generate_enum(
        &self,
        out: &mut dyn Write,
        enum_type: &EnumType,
        _types: &TypeTable,
    ) -> io::Result<()> {
        let name = capitalize(&enum_type.name);
        writeln!(out, "type {} int32", name)?;
        writeln!(out)?;
        writeln!(out, "const (")?;
        for variant in &enum_type.variants {
            writeln!(
                out,
                "\t{}{} {} = {}",
                name,
                capitalize(&variant.name),
                name,
                variant.value
            )?;
        }
        writeln!(out, ")")?;
        writeln!(out)
    }
}

fn primitive_to_go_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::I32 => "int32",
        PrimitiveKind::U32 => "uint32",
        PrimitiveKind::I64 => "int64",
        PrimitiveKind::U64 => "uint64",
        PrimitiveKind::F32 => "float32",
        PrimitiveKind::F64 => "float64",
        PrimitiveKind::String => "string",
        PrimitiveKind::Any => "interface{}",
    }
}

fn type_to_go_type(type_: &Type, types: &TypeTable) -> String {
    match type_ {
        Type::Primitive(primitive) => primitive_to_go_type(primitive.kind).to_string(),
        Type::List(list) => format!("[]{}", type_to_go_type(&list.elem, types)),
        Type::Map(map) => format!(
            "map[{}]{}",
            primitive_to_go_type(map.key.kind),
            type_to_go_type(&map.value, types)
        ),
        Type::Struct(handle) => capitalize(&handle.get(types).name),
        Type::Enum(handle) => capitalize(&handle.get(types).name),
    }
}

fn primitive_literal_to_go(literal: &PrimitiveLiteral) -> String {
    match &literal.value {
        PrimitiveValue::Bool(value) => value.to_string(),
        PrimitiveValue::Int(value) => value.to_string(),
        PrimitiveValue::Float(value) => format!("{value:?}"),
        PrimitiveValue::String(value) => format!("{value:?}"),
    }
}

fn literal_to_go(literal: &Literal, types: &TypeTable) -> String {
    match literal {
        Literal::Primitive(primitive) => primitive_literal_to_go(primitive),
        Literal::List(list) => {
            let elements: Vec<String> = list
                .elements
                .iter()
                .map(|element| literal_to_go(element, types))
                .collect();
            format!(
                "[]{}{{{}}}",
                type_to_go_type(&list.ty().elem, types),
                elements.join(", ")
            )
        }
        Literal::Map(map) => {
            let entries: Vec<String> = map
                .entries
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}: {}",
                        primitive_literal_to_go(key),
                        literal_to_go(value, types)
                    )
                })
                .collect();
            format!(
                "map[{}]{}{{{}}}",
                primitive_to_go_type(map.ty().key.kind),
                type_to_go_type(&map.ty().value, types),
                entries.join(", ")
            )
        }
    }
}
