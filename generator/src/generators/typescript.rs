use std::io::{self, Write};

use heck::{ToLowerCamelCase, ToPascalCase};
use tm_lang::{
    Document, EnumType, Literal, PrimitiveKind, PrimitiveLiteral, PrimitiveValue, StructType,
    Type, TypeTable,
};

use super::common::Generator;

/// Emits TypeScript interfaces with lowerCamelCase field names, numeric
/// enums, and a `Partial` defaults factory where the schema declares
/// default literals.
pub struct TypescriptGenerator;

impl Generator for TypescriptGenerator {
    fn before_generate_document(
        &self,
        out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        writeln!(out, "// Code generated by toolman. DO NOT EDIT.")?;
        writeln!(out)
    }

    fn generate_struct(
        &self,
        out: &mut dyn Write,
        struct_type: &StructType,
        types: &TypeTable,
    ) -> io::Result<()> {
        let name = struct_type.name.to_pascal_case();
        writeln!(out, "export interface {} {{", name)?;
        for field in &struct_type.fields {
            for doc in &field.doc_comments {
                writeln!(out, "  /** {} */", doc)?;
            }
            writeln!(
                out,
                "  {}{}: {};",
                field.name.to_lower_camel_case(),
                if field.optional { "?" } else { "" },
                type_to_ts_type(&field.type_, types)
            )?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;

        if struct_type
            .fields
            .iter()
            .any(|field| field.default_literal.is_some())
        {
            writeln!(
                out,
                "export function new{}(): Partial<{}> {{",
                name, name
            )?;
            writeln!(out, "  return {{")?;
            for field in &struct_type.fields {
                if let Some(literal) = &field.default_literal {
                    writeln!(
                        out,
                        "    {}: {},",
                        field.name.to_lower_camel_case(),
                        literal_to_ts(literal)
                    )?;
                }
            }
            writeln!(out, "  }};")?;
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
        writeln!(out, "export enum {} {{", enum_type.name.to_pascal_case())?;
        for variant in &enum_type.variants {
            writeln!(out, "  {} = {},", variant.name.to_pascal_case(), variant.value)?;
        }
        writeln!(out, "}}")?;
        writeln!(out)
    }
}

fn type_to_ts_type(type_: &Type, types: &TypeTable) -> String {
    match type_ {
        // TODO i64/u64 lose precision beyond 2^53; switch to bigint once
        // all supported consumers accept it in JSON bindings.
        Type::Primitive(primitive) => match primitive.kind {
            PrimitiveKind::Bool => "boolean".to_string(),
            PrimitiveKind::I32
            | PrimitiveKind::U32
            | PrimitiveKind::I64
            | PrimitiveKind::U64
            | PrimitiveKind::F32
            | PrimitiveKind::F64 => "number".to_string(),
            PrimitiveKind::String => "string".to_string(),
            PrimitiveKind::Any => "unknown".to_string(),
        },
        Type::List(list) => format!("{}[]", type_to_ts_type(&list.elem, types)),
        Type::Map(map) => format!(
            "Record<{}, {}>",
            ts_key_type(map.key.kind),
            type_to_ts_type(&map.value, types)
        ),
        Type::Struct(handle) => handle.get(types).name.to_pascal_case(),
        Type::Enum(handle) => handle.get(types).name.to_pascal_case(),
    }
}

fn ts_key_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::I32
        | PrimitiveKind::U32
        | PrimitiveKind::I64
        | PrimitiveKind::U64
        | PrimitiveKind::F32
        | PrimitiveKind::F64 => "number",
        _ => "string",
    }
}

fn primitive_literal_to_ts(literal: &PrimitiveLiteral) -> String {
    match &literal.value {
        PrimitiveValue::Bool(value) => value.to_string(),
        PrimitiveValue::Int(value) => value.to_string(),
        PrimitiveValue::Float(value) => format!("{value:?}"),
        PrimitiveValue::String(value) => format!("{value:?}"),
    }
}

fn literal_to_ts(literal: &Literal) -> String {
    match literal {
        Literal::Primitive(primitive) => primitive_literal_to_ts(primitive),
        Literal::List(list) => {
            let elements: Vec<String> = list.elements.iter().map(literal_to_ts).collect();
            format!("[{}]", elements.join(", "))
        }
        Literal::Map(map) => {
            let entries: Vec<String> = map
                .entries
                .iter()
                .map(|(key, value)| {
                    format!("{}: {}", primitive_literal_to_ts(key), literal_to_ts(value))
                })
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
    }
}
