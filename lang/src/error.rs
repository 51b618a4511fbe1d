use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::stmt_info::StmtInfo;

/// A syntax or semantic problem. These accumulate during the walk so one
/// compile reports as many of them as possible; none of them stops it.
#[derive(Clone, Debug, Error)]
pub enum CompileError {
    #[error("{message}")]
    Parse { message: String, stmt_info: StmtInfo },

    #[error("`{name}` is declared more than once (previous declaration at {prior})")]
    DuplicateDecl {
        name: String,
        prior: StmtInfo,
        stmt_info: StmtInfo,
    },

    #[error("custom type `{name}` not found")]
    CustomTypeNotFound { name: String, stmt_info: StmtInfo },

    #[error("the key of a map must be a primitive type, found `{found}`")]
    MapKeyTypeMustBePrimitive { found: String, stmt_info: StmtInfo },

    #[error("mismatched types: expected `{expected}`, found `{found}`")]
    LiteralElementTypeMismatch {
        expected: String,
        found: String,
        stmt_info: StmtInfo,
    },

    #[error("field `{name}` is defined more than once (previous definition at {prior})")]
    DuplicateFieldName {
        name: String,
        prior: StmtInfo,
        stmt_info: StmtInfo,
    },

    #[error("enum variant `{name}` is defined more than once (previous definition at {prior})")]
    DuplicateEnumVariant {
        name: String,
        prior: StmtInfo,
        stmt_info: StmtInfo,
    },

    #[error("enum value `{value}` is assigned more than once (previous assignment at {prior})")]
    DuplicateEnumValue {
        value: i32,
        prior: StmtInfo,
        stmt_info: StmtInfo,
    },
}

impl CompileError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Parse { .. } => "parse-error",
            CompileError::DuplicateDecl { .. } => "duplicate-decl",
            CompileError::CustomTypeNotFound { .. } => "custom-type-not-found",
            CompileError::MapKeyTypeMustBePrimitive { .. } => "map-key-type-must-be-primitive",
            CompileError::LiteralElementTypeMismatch { .. } => "literal-element-type-mismatch",
            CompileError::DuplicateFieldName { .. } => "duplicate-field-name",
            CompileError::DuplicateEnumVariant { .. } => "duplicate-enum-variant",
            CompileError::DuplicateEnumValue { .. } => "duplicate-enum-value",
        }
    }

    pub fn stmt_info(&self) -> &StmtInfo {
        match self {
            CompileError::Parse { stmt_info, .. }
            | CompileError::DuplicateDecl { stmt_info, .. }
            | CompileError::CustomTypeNotFound { stmt_info, .. }
            | CompileError::MapKeyTypeMustBePrimitive { stmt_info, .. }
            | CompileError::LiteralElementTypeMismatch { stmt_info, .. }
            | CompileError::DuplicateFieldName { stmt_info, .. }
            | CompileError::DuplicateEnumVariant { stmt_info, .. }
            | CompileError::DuplicateEnumValue { stmt_info, .. } => stmt_info,
        }
    }

    /// `path:line:col: kind: message`, one diagnostic per line.
    pub fn render(&self) -> String {
        let info = self.stmt_info();
        format!(
            "{}:{}:{}: {}: {}",
            info.source().display(),
            info.start_line(),
            info.start_column(),
            self.kind(),
            self
        )
    }
}

/// A condition that aborts the compilation immediately.
#[derive(Debug)]
pub enum FatalError {
    FileNotFound { path: PathBuf },
    ImportCycle { path_chain: Vec<PathBuf> },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path } => write!(f, "file not found: {}", path.display()),
            Self::ImportCycle { path_chain } => {
                write!(f, "import cycle:")?;
                for (i, path) in path_chain.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ->")?;
                    }
                    write!(f, " {}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FatalError {}
