//! Compilation core of the Toolman schema language: a pest grammar
//! front-end, a two-phase semantic analyzer over the parse tree, and the
//! resolved [`Document`] representation consumed by code generators.

pub mod compiler;
pub mod components;
pub mod document;
pub mod enum_type;
pub mod error;
pub mod field;
pub mod list_type;
pub mod literal;
pub mod map_type;
pub mod parser;
pub mod primitive_type;
pub mod scope;
pub mod shared;
pub mod stmt_info;
pub mod struct_type;
pub mod walker;

pub use compiler::{CompileResult, Compiler, Module};
pub use components::{Ref, TypeTable};
pub use document::Document;
pub use enum_type::{EnumType, EnumVariant};
pub use error::{CompileError, FatalError};
pub use field::Field;
pub use list_type::ListType;
pub use literal::{ListLiteral, Literal, MapLiteral, PrimitiveLiteral, PrimitiveValue};
pub use map_type::MapType;
pub use primitive_type::{PrimitiveKind, PrimitiveType};
pub use scope::Scope;
pub use shared::Type;
pub use stmt_info::StmtInfo;
pub use struct_type::StructType;
