use crate::shared::Type;
use crate::stmt_info::StmtInfo;

#[derive(Clone, Debug)]
pub struct ListType {
    pub elem: Box<Type>,
    pub stmt_info: StmtInfo,
}

impl ListType {
    pub fn new(elem: Type, stmt_info: StmtInfo) -> Self {
        Self {
            elem: Box::new(elem),
            stmt_info,
        }
    }
}

impl PartialEq for ListType {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem
    }
}

impl Eq for ListType {}
