use std::io::{self, Write};

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase};
use tm_lang::{
    Document, EnumType, Literal, PrimitiveKind, PrimitiveLiteral, PrimitiveValue, StructType,
    Type, TypeTable,
};

use super::common::{document_stem, Generator};

/// Emits one Java compilation unit: a `public final class` named after the
/// source file, wrapping a static nested POJO per struct and a
/// value-carrying enum per enum declaration. Defaults become field
/// initializers; optional fields use boxed types.
pub struct JavaGenerator;

impl Generator for JavaGenerator {
    fn before_generate_document(
        &self,
        out: &mut dyn Write,
        document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        let wrapper = document_stem(document).to_pascal_case();
        writeln!(out, "// Code generated by toolman. DO NOT EDIT.")?;
        writeln!(out)?;
        writeln!(out, "import java.util.List;")?;
        writeln!(out, "import java.util.Map;")?;
        writeln!(out)?;
        writeln!(out, "public final class {} {{", wrapper)?;
        writeln!(out)?;
        writeln!(out, "    private {}() {{}}", wrapper)?;
        writeln!(out)
    }

    fn after_generate_document(
        &self,
        out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        writeln!(out, "}}")
    }

    fn generate_struct(
        &self,
        out: &mut dyn Write,
        struct_type: &StructType,
        types: &TypeTable,
    ) -> io::Result<()> {
        writeln!(
            out,
            "    public static final class {} {{",
            struct_type.name.to_pascal_case()
        )?;
        for field in &struct_type.fields {
            if !field.doc_comments.is_empty() {
                writeln!(out, "        /** {} */", field.doc_comments.join(" "))?;
            }
            let java_type = type_to_java_type(&field.type_, types, field.optional);
            match &field.default_literal {
                Some(literal) => writeln!(
                    out,
                    "        public {} {} = {};",
                    java_type,
                    field.name.to_lower_camel_case(),
                    literal_to_java(literal, types)
                )?,
                None => writeln!(
                    out,
                    "        public {} {};",
                    java_type,
                    field.name.to_lower_camel_case()
                )?,
            }
        }
        writeln!(out, "    }}")?;
        writeln!(out)
    }

    fn generate_enum(
        &self,
        out: &mut dyn Write,
        enum_type: &EnumType,
        _types: &TypeTable,
    ) -> io::Result<()> {
        let name = enum_type.name.to_pascal_case();
        writeln!(out, "    public enum {} {{", name)?;
        for (i, variant) in enum_type.variants.iter().enumerate() {
            let separator = if i + 1 == enum_type.variants.len() {
                ";"
            } else {
                ","
            };
            writeln!(
                out,
                "        {}({}){}",
                variant.name.to_shouty_snake_case(),
                variant.value,
                separator
            )?;
        }
        writeln!(out)?;
        writeln!(out, "        public final int value;")?;
        writeln!(out)?;
        writeln!(out, "        {}(int value) {{", name)?;
        writeln!(out, "            this.value = value;")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out)
    }
}

fn primitive_to_java_type(kind: PrimitiveKind, boxed: bool) -> &'static str {
    if boxed {
        match kind {
            PrimitiveKind::Bool => "Boolean",
            PrimitiveKind::I32 => "Integer",
            // Java has no unsigned integers; unsigned kinds widen.
            PrimitiveKind::U32 | PrimitiveKind::I64 | PrimitiveKind::U64 => "Long",
            PrimitiveKind::F32 => "Float",
            PrimitiveKind::F64 => "Double",
            PrimitiveKind::String => "String",
            PrimitiveKind::Any => "Object",
        }
    } else {
        match kind {
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::I32 => "int",
            PrimitiveKind::U32 | PrimitiveKind::I64 | PrimitiveKind::U64 => "long",
            PrimitiveKind::F32 => "float",
            PrimitiveKind::F64 => "double",
            PrimitiveKind::String => "String",
            PrimitiveKind::Any => "Object",
        }
    }
}

fn type_to_java_type(type_: &Type, types: &TypeTable, boxed: bool) -> String {
    match type_ {
        Type::Primitive(primitive) => primitive_to_java_type(primitive.kind, boxed).to_string(),
        Type::List(list) => format!("List<{}>", type_to_java_type(&list.elem, types, true)),
        Type::Map(map) => format!(
            "Map<{}, {}>",
            primitive_to_java_type(map.key.kind, true),
            type_to_java_type(&map.value, types, true)
        ),
        Type::Struct(handle) => handle.get(types).name.to_pascal_case(),
        Type::Enum(handle) => handle.get(types).name.to_pascal_case(),
    }
}

fn primitive_literal_to_java(literal: &PrimitiveLiteral) -> String {
    match &literal.value {
        PrimitiveValue::Bool(value) => value.to_string(),
        PrimitiveValue::Int(value) => match literal.ty().kind {
            PrimitiveKind::U32 | PrimitiveKind::I64 | PrimitiveKind::U64 => format!("{}L", value),
            PrimitiveKind::F32 => format!("{}f", value),
            _ => value.to_string(),
        },
        PrimitiveValue::Float(value) => match literal.ty().kind {
            PrimitiveKind::F32 => format!("{value:?}f"),
            _ => format!("{value:?}"),
        },
        PrimitiveValue::String(value) => format!("{value:?}"),
    }
}

fn literal_to_java(literal: &Literal, types: &TypeTable) -> String {
    match literal {
        Literal::Primitive(primitive) => primitive_literal_to_java(primitive),
        Literal::List(list) => {
            let elements: Vec<String> = list
                .elements
                .iter()
                .map(|element| literal_to_java(element, types))
                .collect();
            format!("List.of({})", elements.join(", "))
        }
        Literal::Map(map) => {
            let entries: Vec<String> = map
                .entries
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}, {}",
                        primitive_literal_to_java(key),
                        literal_to_java(value, types)
                    )
                })
                .collect();
            format!("Map.of({})", entries.join(", "))
        }
    }
}
