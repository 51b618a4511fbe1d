use crate::literal::Literal;
use crate::shared::Type;
use crate::stmt_info::StmtInfo;

/// A struct field: its resolved type, optionality, default literal and the
/// doc comments that preceded it in source.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub type_: Type,
    pub optional: bool,
    pub default_literal: Option<Literal>,
    pub doc_comments: Vec<String>,
    pub stmt_info: StmtInfo,
}
