use crate::stmt_info::StmtInfo;

/// A named enum declaration; variants are filled in by the reference phase.
#[derive(Clone, Debug)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub is_public: bool,
    pub stmt_info: StmtInfo,
    pub name_stmt_info: StmtInfo,
}

impl EnumType {
    pub fn shell(
        name: String,
        is_public: bool,
        stmt_info: StmtInfo,
        name_stmt_info: StmtInfo,
    ) -> Self {
        Self {
            name,
            variants: Vec::new(),
            is_public,
            stmt_info,
            name_stmt_info,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnumVariant {
    pub name: String,
    pub value: i32,
    pub stmt_info: StmtInfo,
}
