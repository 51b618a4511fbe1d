use crate::components::TypeTable;
use crate::error::CompileError;
use crate::list_type::ListType;
use crate::map_type::MapType;
use crate::primitive_type::{PrimitiveKind, PrimitiveType};
use crate::shared::Type;
use crate::stmt_info::StmtInfo;

/// A literal default value. Mirrors [`Type`]: every literal carries the
/// declared type it was validated against.
#[derive(Clone, Debug)]
pub enum Literal {
    Primitive(PrimitiveLiteral),
    List(ListLiteral),
    Map(MapLiteral),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Primitive(primitive) => Type::Primitive(primitive.ty().clone()),
            Literal::List(list) => Type::List(list.ty().clone()),
            Literal::Map(map) => Type::Map(map.ty().clone()),
        }
    }

    pub fn stmt_info(&self) -> &StmtInfo {
        match self {
            Literal::Primitive(primitive) => &primitive.stmt_info,
            Literal::List(list) => &list.stmt_info,
            Literal::Map(map) => &map.stmt_info,
        }
    }
}

/// The lexical value of a primitive literal token.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PrimitiveValue {
    /// The lexical category, as rendered in mismatch diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            PrimitiveValue::Bool(_) => "bool",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Float(_) => "float",
            PrimitiveValue::String(_) => "string",
        }
    }

    fn fits(&self, kind: PrimitiveKind) -> bool {
        match self {
            PrimitiveValue::Bool(_) => matches!(kind, PrimitiveKind::Bool | PrimitiveKind::Any),
            PrimitiveValue::Int(_) => matches!(
                kind,
                PrimitiveKind::I32
                    | PrimitiveKind::U32
                    | PrimitiveKind::I64
                    | PrimitiveKind::U64
                    | PrimitiveKind::F32
                    | PrimitiveKind::F64
                    | PrimitiveKind::Any
            ),
            PrimitiveValue::Float(_) => matches!(
                kind,
                PrimitiveKind::F32 | PrimitiveKind::F64 | PrimitiveKind::Any
            ),
            PrimitiveValue::String(_) => {
                matches!(kind, PrimitiveKind::String | PrimitiveKind::Any)
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct PrimitiveLiteral {
    pub value: PrimitiveValue,
    type_: PrimitiveType,
    pub stmt_info: StmtInfo,
}

impl PrimitiveLiteral {
    /// Builds a primitive literal from its lexical token and the declared
    /// primitive kind; a token the kind cannot hold is a
    /// `LiteralElementTypeMismatch`.
    pub fn new(
        value: PrimitiveValue,
        declared: PrimitiveType,
        stmt_info: StmtInfo,
    ) -> Result<Self, CompileError> {
        if !value.fits(declared.kind) {
            return Err(CompileError::LiteralElementTypeMismatch {
                expected: declared.kind.name().to_string(),
                found: value.category().to_string(),
                stmt_info,
            });
        }
        Ok(Self {
            value,
            type_: declared,
            stmt_info,
        })
    }

    pub fn ty(&self) -> &PrimitiveType {
        &self.type_
    }
}

#[derive(Clone, Debug)]
pub struct ListLiteral {
    type_: ListType,
    pub elements: Vec<Literal>,
    pub stmt_info: StmtInfo,
}

impl ListLiteral {
    pub fn new(type_: ListType, stmt_info: StmtInfo) -> Self {
        Self {
            type_,
            elements: Vec::new(),
            stmt_info,
        }
    }

    pub fn ty(&self) -> &ListType {
        &self.type_
    }

    pub fn push(&mut self, element: Literal, types: &TypeTable) -> Result<(), CompileError> {
        let elem_is_any =
            matches!(self.type_.elem.as_ref(), Type::Primitive(p) if p.kind == PrimitiveKind::Any);
        if !elem_is_any && element.ty() != *self.type_.elem {
            return Err(CompileError::LiteralElementTypeMismatch {
                expected: self.type_.elem.display(types),
                found: element.ty().display(types),
                stmt_info: element.stmt_info().clone(),
            });
        }
        self.elements.push(element);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct MapLiteral {
    type_: MapType,
    pub entries: Vec<(PrimitiveLiteral, Literal)>,
    pub stmt_info: StmtInfo,
}

impl MapLiteral {
    pub fn new(type_: MapType, stmt_info: StmtInfo) -> Self {
        Self {
            type_,
            entries: Vec::new(),
            stmt_info,
        }
    }

    pub fn ty(&self) -> &MapType {
        &self.type_
    }

    pub fn insert(
        &mut self,
        key: PrimitiveLiteral,
        value: Literal,
        types: &TypeTable,
    ) -> Result<(), CompileError> {
        if key.ty().kind != self.type_.key.kind && self.type_.key.kind != PrimitiveKind::Any {
            return Err(CompileError::LiteralElementTypeMismatch {
                expected: self.type_.key.kind.name().to_string(),
                found: key.ty().kind.name().to_string(),
                stmt_info: key.stmt_info.clone(),
            });
        }
        let value_is_any =
            matches!(self.type_.value.as_ref(), Type::Primitive(p) if p.kind == PrimitiveKind::Any);
        if !value_is_any && value.ty() != *self.type_.value {
            return Err(CompileError::LiteralElementTypeMismatch {
                expected: self.type_.value.display(types),
                found: value.ty().display(types),
                stmt_info: value.stmt_info().clone(),
            });
        }
        self.entries.push((key, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn si() -> StmtInfo {
        StmtInfo::new((1, 1), (1, 1), Arc::new(PathBuf::from("test.tm")))
    }

    fn prim(kind: PrimitiveKind) -> PrimitiveType {
        PrimitiveType::new(kind, si())
    }

    fn int_lit(value: i64, kind: PrimitiveKind) -> PrimitiveLiteral {
        PrimitiveLiteral::new(PrimitiveValue::Int(value), prim(kind), si()).unwrap()
    }

    #[test]
    fn string_token_does_not_fit_i32() {
        let err = PrimitiveLiteral::new(
            PrimitiveValue::String("hello".into()),
            prim(PrimitiveKind::I32),
            si(),
        )
        .unwrap_err();
        match err {
            CompileError::LiteralElementTypeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "i32");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn int_token_fits_float_and_any() {
        assert!(PrimitiveLiteral::new(PrimitiveValue::Int(1), prim(PrimitiveKind::F64), si()).is_ok());
        assert!(PrimitiveLiteral::new(PrimitiveValue::Int(1), prim(PrimitiveKind::Any), si()).is_ok());
        assert!(
            PrimitiveLiteral::new(PrimitiveValue::Float(1.5), prim(PrimitiveKind::I64), si())
                .is_err()
        );
    }

    #[test]
    fn list_push_rejects_mismatched_element() {
        let types = TypeTable::new();
        let mut list = ListLiteral::new(
            ListType::new(Type::Primitive(prim(PrimitiveKind::I32)), si()),
            si(),
        );
        list.push(Literal::Primitive(int_lit(1, PrimitiveKind::I32)), &types)
            .unwrap();
        let err = list
            .push(
                Literal::Primitive(
                    PrimitiveLiteral::new(
                        PrimitiveValue::Bool(true),
                        prim(PrimitiveKind::Bool),
                        si(),
                    )
                    .unwrap(),
                ),
                &types,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::LiteralElementTypeMismatch { .. }
        ));
        assert_eq!(list.elements.len(), 1);
    }

    #[test]
    fn map_insert_checks_key_and_value() {
        let types = TypeTable::new();
        let map_type = MapType::new(
            prim(PrimitiveKind::String),
            Type::Primitive(prim(PrimitiveKind::I32)),
            si(),
        );
        let mut map = MapLiteral::new(map_type, si());
        let key = PrimitiveLiteral::new(
            PrimitiveValue::String("a".into()),
            prim(PrimitiveKind::String),
            si(),
        )
        .unwrap();
        map.insert(
            key.clone(),
            Literal::Primitive(int_lit(1, PrimitiveKind::I32)),
            &types,
        )
        .unwrap();

        let bad_key = int_lit(2, PrimitiveKind::I64);
        assert!(map
            .insert(
                bad_key,
                Literal::Primitive(int_lit(1, PrimitiveKind::I32)),
                &types
            )
            .is_err());
        let bad_value = Literal::Primitive(
            PrimitiveLiteral::new(PrimitiveValue::Bool(true), prim(PrimitiveKind::Bool), si())
                .unwrap(),
        );
        assert!(map.insert(key, bad_value, &types).is_err());
        assert_eq!(map.entries.len(), 1);
    }
}
