//! The module cache and the glue that runs both phases over one parse tree.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::components::TypeTable;
use crate::document::Document;
use crate::error::{CompileError, FatalError};
use crate::parser;
use crate::scope::Scope;
use crate::stmt_info::StmtInfo;
use crate::walker::{DeclPhaseWalker, RefPhaseWalker};

/// The declaration-phase result for one source file: its scope plus the
/// errors that phase accumulated. Modules are immutable once cached.
#[derive(Debug)]
pub struct Module {
    pub scope: Scope,
    pub source: Arc<PathBuf>,
    pub errors: Vec<CompileError>,
}

/// A resolved document together with every diagnostic from both phases.
/// `errors.is_empty()` is the success test.
#[derive(Debug)]
pub struct CompileResult {
    pub document: Document,
    pub errors: Vec<CompileError>,
}

impl CompileResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Owns the type table and the module cache. One compiler per thread; no
/// state crosses compilations except the cache and the table.
#[derive(Default)]
pub struct Compiler {
    types: TypeTable,
    modules: HashMap<PathBuf, Rc<Module>>,
    in_progress: Vec<PathBuf>,
    // Errors of freshly compiled imported modules, reported once by the
    // compile() call that pulled them in.
    pending_errors: Vec<CompileError>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub(crate) fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    fn normalize(path: &Path) -> Result<PathBuf, FatalError> {
        fs::canonicalize(path).map_err(|_| FatalError::FileNotFound {
            path: path.to_path_buf(),
        })
    }

    fn read_source(path: &Path) -> Result<String, FatalError> {
        fs::read_to_string(path).map_err(|_| FatalError::FileNotFound {
            path: path.to_path_buf(),
        })
    }

    /// Runs the declaration phase for `src_path`, deduplicated by the
    /// canonicalized source path: a second call with a path normalizing to
    /// the same file returns the cached module without re-walking.
    pub fn compile_module(&mut self, src_path: impl AsRef<Path>) -> Result<Rc<Module>, FatalError> {
        let source = Self::normalize(src_path.as_ref())?;
        if let Some(module) = self.modules.get(&source) {
            return Ok(Rc::clone(module));
        }
        if self.in_progress.contains(&source) {
            let mut path_chain = self.in_progress.clone();
            path_chain.push(source);
            return Err(FatalError::ImportCycle { path_chain });
        }

        let text = Self::read_source(&source)?;
        let source_arc = Arc::new(source.clone());
        let (scope, errors) = match parser::parse_document(&text) {
            Err(failure) => (Scope::new(), vec![parse_failure_error(failure, &source_arc)]),
            Ok(tree) => {
                self.in_progress.push(source.clone());
                let outcome = {
                    let mut walker = DeclPhaseWalker::new(self, Arc::clone(&source_arc));
                    parser::walk(&mut walker, tree).map(|()| walker.into_parts())
                };
                self.in_progress.pop();
                outcome?
            }
        };

        let module = Rc::new(Module {
            scope,
            source: source_arc,
            errors,
        });
        self.pending_errors.extend(module.errors.iter().cloned());
        self.modules.insert(source, Rc::clone(&module));
        Ok(module)
    }

    /// Compiles a root source file: declaration phase, then reference phase
    /// over the same tree, with the diagnostics of both (and of any freshly
    /// imported module) merged into the result.
    pub fn compile(&mut self, src_path: impl AsRef<Path>) -> Result<CompileResult, FatalError> {
        let source = Self::normalize(src_path.as_ref())?;
        let text = Self::read_source(&source)?;
        let source_arc = Arc::new(source.clone());

        let tree = match parser::parse_document(&text) {
            Ok(tree) => tree,
            Err(failure) => {
                let mut errors = vec![parse_failure_error(failure, &source_arc)];
                errors.extend(self.pending_errors.drain(..));
                return Ok(CompileResult {
                    document: Document::new(source_arc),
                    errors,
                });
            }
        };

        self.in_progress.push(source);
        let decl_outcome = {
            let mut walker = DeclPhaseWalker::new(self, Arc::clone(&source_arc));
            parser::walk(&mut walker, tree.clone()).map(|()| walker.into_parts())
        };
        self.in_progress.pop();
        let (scope, mut errors) = decl_outcome?;
        errors.extend(self.pending_errors.drain(..));

        let mut ref_walker = RefPhaseWalker::new(&mut self.types, &scope, source_arc);
        parser::walk(&mut ref_walker, tree)?;
        let (document, ref_errors) = ref_walker.into_result();
        errors.extend(ref_errors);

        Ok(CompileResult { document, errors })
    }
}

fn parse_failure_error(failure: parser::ParseFailure, source: &Arc<PathBuf>) -> CompileError {
    CompileError::Parse {
        message: failure.message,
        stmt_info: StmtInfo::new(
            (failure.line, failure.line),
            (failure.column, failure.column),
            Arc::clone(source),
        ),
    }
}
