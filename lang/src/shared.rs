use crate::components::{Ref, TypeTable};
use crate::enum_type::EnumType;
use crate::list_type::ListType;
use crate::map_type::MapType;
use crate::primitive_type::PrimitiveType;
use crate::stmt_info::StmtInfo;
use crate::struct_type::StructType;

/// A field-level type: one variant per category. Container variants own
/// their payload; named variants are handles into the [`TypeTable`].
#[derive(Clone, Debug)]
pub enum Type {
    Primitive(PrimitiveType),
    List(ListType),
    Map(MapType),
    Struct(Ref<StructType>),
    Enum(Ref<EnumType>),
}

impl Type {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Type::Map(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Type::Enum(_))
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveType> {
        match self {
            Type::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListType> {
        match self {
            Type::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapType> {
        match self {
            Type::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<Ref<StructType>> {
        match self {
            Type::Struct(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<Ref<EnumType>> {
        match self {
            Type::Enum(handle) => Some(*handle),
            _ => None,
        }
    }

    /// `bool`, `i32`, `[T]`, `{K:V}`, or the declared name.
    pub fn display(&self, types: &TypeTable) -> String {
        match self {
            Type::Primitive(primitive) => primitive.kind.name().to_string(),
            Type::List(list) => format!("[{}]", list.elem.display(types)),
            Type::Map(map) => {
                format!("{{{}:{}}}", map.key.kind.name(), map.value.display(types))
            }
            Type::Struct(handle) => handle.get(types).name.clone(),
            Type::Enum(handle) => handle.get(types).name.clone(),
        }
    }

    pub fn stmt_info<'a>(&'a self, types: &'a TypeTable) -> &'a StmtInfo {
        match self {
            Type::Primitive(primitive) => &primitive.stmt_info,
            Type::List(list) => &list.stmt_info,
            Type::Map(map) => &map.stmt_info,
            Type::Struct(handle) => &handle.get(types).name_stmt_info,
            Type::Enum(handle) => &handle.get(types).name_stmt_info,
        }
    }

    pub fn is_public(&self, types: &TypeTable) -> bool {
        match self {
            Type::Struct(handle) => handle.get(types).is_public,
            Type::Enum(handle) => handle.get(types).is_public,
            _ => false,
        }
    }
}

// Structural equality with identity semantics for named types: primitive
// kinds compare exactly (no widening), containers compare recursively, and
// struct/enum references compare by declaration handle.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::List(a), Type::List(b)) => a == b,
            (Type::Map(a), Type::Map(b)) => a == b,
            (Type::Struct(a), Type::Struct(b)) => a == b,
            (Type::Enum(a), Type::Enum(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Type {}
