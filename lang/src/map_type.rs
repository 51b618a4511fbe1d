use crate::primitive_type::PrimitiveType;
use crate::shared::Type;
use crate::stmt_info::StmtInfo;

/// A map type. The key is constrained to a primitive kind at construction
/// time; the builder rejects anything else before a `MapType` exists.
#[derive(Clone, Debug)]
pub struct MapType {
    pub key: PrimitiveType,
    pub value: Box<Type>,
    pub stmt_info: StmtInfo,
}

impl MapType {
    pub fn new(key: PrimitiveType, value: Type, stmt_info: StmtInfo) -> Self {
        Self {
            key,
            value: Box::new(value),
            stmt_info,
        }
    }
}

impl PartialEq for MapType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Eq for MapType {}
