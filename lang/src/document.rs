use std::path::PathBuf;
use std::sync::Arc;

use crate::components::Ref;
use crate::enum_type::EnumType;
use crate::struct_type::StructType;

/// The resolved output of one compilation: the top-level declarations of a
/// source file, in declaration order. Handles are read through the
/// [`TypeTable`](crate::components::TypeTable) of the `Compiler` that
/// produced the document.
#[derive(Debug)]
pub struct Document {
    pub struct_types: Vec<Ref<StructType>>,
    pub enum_types: Vec<Ref<EnumType>>,
    pub source: Arc<PathBuf>,
}

impl Document {
    pub fn new(source: Arc<PathBuf>) -> Self {
        Self {
            struct_types: Vec::new(),
            enum_types: Vec::new(),
            source,
        }
    }
}
