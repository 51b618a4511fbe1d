use crate::field::Field;
use crate::stmt_info::StmtInfo;

/// A named struct declaration. The declaration phase creates an empty shell
/// so forward and mutual references resolve regardless of textual order;
/// the reference phase fills in `fields`.
#[derive(Clone, Debug)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<Field>,
    pub is_public: bool,
    /// Position of the whole declaration.
    pub stmt_info: StmtInfo,
    /// Position of the declared identifier.
    pub name_stmt_info: StmtInfo,
}

impl StructType {
    pub fn shell(
        name: String,
        is_public: bool,
        stmt_info: StmtInfo,
        name_stmt_info: StmtInfo,
    ) -> Self {
        Self {
            name,
            fields: Vec::new(),
            is_public,
            stmt_info,
            name_stmt_info,
        }
    }
}
