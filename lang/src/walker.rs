//! The two semantic phases over the parse tree, and the builder stack
//! machines that reassemble nested types and literals from the flat
//! enter/exit event stream.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::compiler::Compiler;
use crate::components::{Ref, TypeTable};
use crate::document::Document;
use crate::enum_type::{EnumType, EnumVariant};
use crate::error::{CompileError, FatalError};
use crate::field::Field;
use crate::list_type::ListType;
use crate::literal::{ListLiteral, Literal, MapLiteral, PrimitiveLiteral, PrimitiveValue};
use crate::map_type::MapType;
use crate::parser::{self, Node, Rule, TreeListener};
use crate::primitive_type::{PrimitiveKind, PrimitiveType};
use crate::scope::Scope;
use crate::shared::Type;
use crate::stmt_info::StmtInfo;
use crate::struct_type::StructType;

fn doc_text(raw: &str) -> String {
    let stripped = raw.strip_prefix("///").unwrap_or(raw);
    stripped.strip_prefix(' ').unwrap_or(stripped).to_string()
}

// ---------------------------------------------------------------------------
// Declaration phase
// ---------------------------------------------------------------------------

/// First pass: registers every top-level type name as an empty shell so the
/// reference phase can resolve forward and mutual references, and pulls in
/// imported modules.
pub struct DeclPhaseWalker<'c> {
    compiler: &'c mut Compiler,
    scope: Scope,
    errors: Vec<CompileError>,
    source: Arc<PathBuf>,
}

impl<'c> DeclPhaseWalker<'c> {
    pub fn new(compiler: &'c mut Compiler, source: Arc<PathBuf>) -> Self {
        Self {
            compiler,
            scope: Scope::new(),
            errors: Vec::new(),
            source,
        }
    }

    pub fn into_parts(self) -> (Scope, Vec<CompileError>) {
        (self.scope, self.errors)
    }

    fn decl_stmt_infos(&self, node: &Node) -> (String, StmtInfo, StmtInfo) {
        let ident = parser::child(node, Rule::identifier_name)
            .expect("grammar: a declaration has an identifierName");
        (
            ident.as_str().to_string(),
            parser::stmt_info(node, &self.source),
            parser::stmt_info(&ident, &self.source),
        )
    }

    fn declare(&mut self, name: String, ty: Type, name_stmt_info: StmtInfo) {
        if let Some(existing) = self.scope.declare(&name, ty) {
            let prior = existing.stmt_info(self.compiler.types()).clone();
            self.errors.push(CompileError::DuplicateDecl {
                name,
                prior,
                stmt_info: name_stmt_info,
            });
        }
    }

    fn decl_struct(&mut self, node: &Node) {
        let (name, stmt_info, name_stmt_info) = self.decl_stmt_infos(node);
        let is_public = parser::child(node, Rule::pub_modifier).is_some();
        let handle = self.compiler.types_mut().create(StructType::shell(
            name.clone(),
            is_public,
            stmt_info,
            name_stmt_info.clone(),
        ));
        self.declare(name, Type::Struct(handle), name_stmt_info);
    }

    fn decl_enum(&mut self, node: &Node) {
        let (name, stmt_info, name_stmt_info) = self.decl_stmt_infos(node);
        let is_public = parser::child(node, Rule::pub_modifier).is_some();
        let handle = self.compiler.types_mut().create(EnumType::shell(
            name.clone(),
            is_public,
            stmt_info,
            name_stmt_info.clone(),
        ));
        self.declare(name, Type::Enum(handle), name_stmt_info);
    }

    fn import(&mut self, node: &Node) -> Result<(), FatalError> {
        let path_node = parser::child(node, Rule::string_literal)
            .expect("grammar: importDecl has a path literal");
        let mut path = PathBuf::from(parser::string_value(&path_node));
        if path.is_relative() {
            if let Some(dir) = self.source.parent() {
                path = dir.join(path);
            }
        }
        let module = self.compiler.compile_module(&path)?;
        let stmt_info = parser::stmt_info(node, &self.source);

        // Sort for a deterministic error order; only the module's own public
        // types are re-exported.
        let mut exported: Vec<(String, Type)> = module
            .scope
            .local_entries()
            .filter(|(_, ty)| ty.is_public(self.compiler.types()))
            .map(|(name, ty)| (name.to_string(), ty.clone()))
            .collect();
        exported.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, ty) in exported {
            if let Some(existing) = self.scope.declare_imported(&name, ty) {
                let prior = existing.stmt_info(self.compiler.types()).clone();
                self.errors.push(CompileError::DuplicateDecl {
                    name,
                    prior,
                    stmt_info: stmt_info.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'c, 'i> TreeListener<'i> for DeclPhaseWalker<'c> {
    fn enter(&mut self, node: &Node<'i>) -> Result<(), FatalError> {
        match node.as_rule() {
            Rule::import_decl => self.import(node)?,
            Rule::struct_decl => self.decl_struct(node),
            Rule::enum_decl => self.decl_enum(node),
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, _node: &Node<'i>) -> Result<(), FatalError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field type builder
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TypeLocation {
    #[default]
    Top,
    ListElement,
    MapKey,
    MapValue,
}

#[derive(Debug)]
enum PartialContainer {
    List {
        elem: Option<Type>,
        stmt_info: StmtInfo,
        slot: TypeLocation,
    },
    Map {
        key: Option<PrimitiveType>,
        value: Option<Type>,
        stmt_info: StmtInfo,
        slot: TypeLocation,
    },
}

/// Reassembles a (possibly nested) field type from the event stream.
///
/// Containers are pushed open; a type that completes while the stack is
/// non-empty attaches to the top container at the slot the `Location`
/// register held when it started. Popping the last frame (or ending a leaf
/// with an empty stack) yields the finished field-level type.
#[derive(Debug, Default)]
pub struct FieldTypeBuilder {
    stack: Vec<PartialContainer>,
    last_leaf: Option<Type>,
    location: TypeLocation,
}

impl FieldTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.last_leaf = None;
        self.location = TypeLocation::Top;
    }

    pub fn set_type_location(&mut self, location: TypeLocation) {
        self.location = location;
    }

    pub fn start_list(&mut self, stmt_info: StmtInfo) {
        self.stack.push(PartialContainer::List {
            elem: None,
            stmt_info,
            slot: self.location,
        });
    }

    pub fn start_map(&mut self, stmt_info: StmtInfo) {
        self.stack.push(PartialContainer::Map {
            key: None,
            value: None,
            stmt_info,
            slot: self.location,
        });
    }

    pub fn start_leaf(&mut self, ty: Type, types: &TypeTable) -> Result<(), CompileError> {
        if self.stack.is_empty() {
            self.last_leaf = Some(ty);
            Ok(())
        } else {
            self.attach(ty, self.location, types)
        }
    }

    /// Non-`None` means the returned type is the current field's type.
    pub fn end_leaf(&mut self) -> Option<Type> {
        if self.stack.is_empty() {
            self.last_leaf.take()
        } else {
            None
        }
    }

    /// Non-`None` means the returned type is the current field's type.
    pub fn end_container(&mut self, types: &TypeTable) -> Result<Option<Type>, CompileError> {
        let frame = match self.stack.pop() {
            Some(frame) => frame,
            None => return Ok(None),
        };
        let (completed, slot) = match frame {
            PartialContainer::List {
                elem: Some(elem),
                stmt_info,
                slot,
            } => (Type::List(ListType::new(elem, stmt_info)), slot),
            PartialContainer::Map {
                key: Some(key),
                value: Some(value),
                stmt_info,
                slot,
            } => (Type::Map(MapType::new(key, value, stmt_info)), slot),
            // A part failed to resolve; the error is already recorded.
            _ => return Ok(None),
        };
        if self.stack.is_empty() {
            Ok(Some(completed))
        } else {
            self.attach(completed, slot, types)?;
            Ok(None)
        }
    }

    fn attach(
        &mut self,
        ty: Type,
        slot: TypeLocation,
        types: &TypeTable,
    ) -> Result<(), CompileError> {
        let top = self
            .stack
            .last_mut()
            .expect("attach requires an open container");
        match (top, slot) {
            (PartialContainer::List { elem, .. }, TypeLocation::ListElement) => {
                *elem = Some(ty);
                Ok(())
            }
            (PartialContainer::Map { key, .. }, TypeLocation::MapKey) => match ty {
                Type::Primitive(primitive) => {
                    *key = Some(primitive);
                    Ok(())
                }
                other => Err(CompileError::MapKeyTypeMustBePrimitive {
                    found: other.display(types),
                    stmt_info: other.stmt_info(types).clone(),
                }),
            },
            (PartialContainer::Map { value, .. }, TypeLocation::MapValue) => {
                *value = Some(ty);
                Ok(())
            }
            // Unreachable with a well-formed tree.
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Literal builder
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LiteralLocation {
    #[default]
    Top,
    ListElement,
    MapKey,
    MapValue,
}

#[derive(Debug)]
enum PartialLiteral {
    List {
        literal: ListLiteral,
        slot: LiteralLocation,
    },
    Map {
        literal: MapLiteral,
        // Holds the finished key until the following MapValue closes.
        pending_key: Option<PrimitiveLiteral>,
        slot: LiteralLocation,
    },
}

/// The literal-side twin of [`FieldTypeBuilder`]. Additionally tracks the
/// declared type expected at the current position so every inserted element
/// is validated, and suppresses subtrees that already failed so one bad
/// initializer produces one error.
#[derive(Debug, Default)]
pub struct LiteralBuilder {
    stack: Vec<PartialLiteral>,
    last_leaf: Option<Literal>,
    location: LiteralLocation,
    top_expected: Option<Type>,
    active: bool,
    suppressed: u32,
}

impl LiteralBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on entering a field initializer. `None` means the field's type
    /// never resolved; the whole initializer is then ignored.
    pub fn begin(&mut self, expected: Option<Type>) {
        self.stack.clear();
        self.last_leaf = None;
        self.location = LiteralLocation::Top;
        self.suppressed = 0;
        self.active = expected.is_some();
        self.top_expected = expected;
    }

    pub fn finish(&mut self) {
        self.active = false;
        self.top_expected = None;
        self.stack.clear();
        self.last_leaf = None;
        self.suppressed = 0;
    }

    pub fn set_literal_location(&mut self, location: LiteralLocation) {
        self.location = location;
    }

    fn expected_here(&self) -> Option<Type> {
        match self.stack.last() {
            None => self.top_expected.clone(),
            Some(PartialLiteral::List { literal, .. }) => Some((*literal.ty().elem).clone()),
            Some(PartialLiteral::Map { literal, .. }) => match self.location {
                LiteralLocation::MapKey => Some(Type::Primitive(literal.ty().key.clone())),
                LiteralLocation::MapValue => Some((*literal.ty().value).clone()),
                _ => None,
            },
        }
    }

    pub fn start_list(
        &mut self,
        stmt_info: StmtInfo,
        types: &TypeTable,
    ) -> Result<(), CompileError> {
        if !self.active {
            return Ok(());
        }
        if self.suppressed > 0 {
            self.suppressed += 1;
            return Ok(());
        }
        let expected = match self.expected_here() {
            Some(expected) => expected,
            None => {
                self.suppressed += 1;
                return Ok(());
            }
        };
        let slot = self.location;
        match expected {
            Type::List(list_type) => {
                self.stack.push(PartialLiteral::List {
                    literal: ListLiteral::new(list_type, stmt_info),
                    slot,
                });
                Ok(())
            }
            Type::Primitive(p) if p.kind == PrimitiveKind::Any => {
                let elem = Type::Primitive(PrimitiveType::new(
                    PrimitiveKind::Any,
                    stmt_info.clone(),
                ));
                self.stack.push(PartialLiteral::List {
                    literal: ListLiteral::new(
                        ListType::new(elem, stmt_info.clone()),
                        stmt_info,
                    ),
                    slot,
                });
                Ok(())
            }
            other => {
                self.suppressed += 1;
                Err(CompileError::LiteralElementTypeMismatch {
                    expected: other.display(types),
                    found: "list".to_string(),
                    stmt_info,
                })
            }
        }
    }

    pub fn start_map(
        &mut self,
        stmt_info: StmtInfo,
        types: &TypeTable,
    ) -> Result<(), CompileError> {
        if !self.active {
            return Ok(());
        }
        if self.suppressed > 0 {
            self.suppressed += 1;
            return Ok(());
        }
        let expected = match self.expected_here() {
            Some(expected) => expected,
            None => {
                self.suppressed += 1;
                return Ok(());
            }
        };
        let slot = self.location;
        match expected {
            Type::Map(map_type) => {
                self.stack.push(PartialLiteral::Map {
                    literal: MapLiteral::new(map_type, stmt_info),
                    pending_key: None,
                    slot,
                });
                Ok(())
            }
            Type::Primitive(p) if p.kind == PrimitiveKind::Any => {
                let key = PrimitiveType::new(PrimitiveKind::Any, stmt_info.clone());
                let value =
                    Type::Primitive(PrimitiveType::new(PrimitiveKind::Any, stmt_info.clone()));
                self.stack.push(PartialLiteral::Map {
                    literal: MapLiteral::new(
                        MapType::new(key, value, stmt_info.clone()),
                        stmt_info,
                    ),
                    pending_key: None,
                    slot,
                });
                Ok(())
            }
            other => {
                self.suppressed += 1;
                Err(CompileError::LiteralElementTypeMismatch {
                    expected: other.display(types),
                    found: "map".to_string(),
                    stmt_info,
                })
            }
        }
    }

    pub fn start_primitive(
        &mut self,
        value: PrimitiveValue,
        stmt_info: StmtInfo,
        types: &TypeTable,
    ) -> Result<(), CompileError> {
        if !self.active || self.suppressed > 0 {
            return Ok(());
        }
        let expected = match self.expected_here() {
            Some(expected) => expected,
            None => return Ok(()),
        };
        let declared = match expected {
            Type::Primitive(primitive) => primitive,
            other => {
                return Err(CompileError::LiteralElementTypeMismatch {
                    expected: other.display(types),
                    found: value.category().to_string(),
                    stmt_info,
                })
            }
        };
        let literal = PrimitiveLiteral::new(value, declared, stmt_info)?;
        if self.stack.is_empty() {
            self.last_leaf = Some(Literal::Primitive(literal));
            Ok(())
        } else {
            self.attach(Literal::Primitive(literal), self.location, types)
        }
    }

    /// Non-`None` means the returned literal is the field's default.
    pub fn end_leaf(&mut self) -> Option<Literal> {
        if self.active && self.suppressed == 0 && self.stack.is_empty() {
            self.last_leaf.take()
        } else {
            None
        }
    }

    /// Non-`None` means the returned literal is the field's default.
    pub fn end_container(&mut self, types: &TypeTable) -> Result<Option<Literal>, CompileError> {
        if !self.active {
            return Ok(None);
        }
        if self.suppressed > 0 {
            self.suppressed -= 1;
            return Ok(None);
        }
        let frame = match self.stack.pop() {
            Some(frame) => frame,
            None => return Ok(None),
        };
        let (completed, slot) = match frame {
            PartialLiteral::List { literal, slot } => (Literal::List(literal), slot),
            PartialLiteral::Map { literal, slot, .. } => (Literal::Map(literal), slot),
        };
        if self.stack.is_empty() {
            Ok(Some(completed))
        } else {
            self.attach(completed, slot, types)?;
            Ok(None)
        }
    }

    fn attach(
        &mut self,
        literal: Literal,
        slot: LiteralLocation,
        types: &TypeTable,
    ) -> Result<(), CompileError> {
        let top = self
            .stack
            .last_mut()
            .expect("attach requires an open container literal");
        match (top, slot) {
            (PartialLiteral::List { literal: list, .. }, LiteralLocation::ListElement) => {
                list.push(literal, types)
            }
            (PartialLiteral::Map { pending_key, .. }, LiteralLocation::MapKey) => {
                if let Literal::Primitive(key) = literal {
                    *pending_key = Some(key);
                }
                Ok(())
            }
            (
                PartialLiteral::Map {
                    literal: map,
                    pending_key,
                    ..
                },
                LiteralLocation::MapValue,
            ) => match pending_key.take() {
                Some(key) => map.insert(key, literal, types),
                // The key failed earlier; its error is already recorded.
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Struct builder
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct FieldDraft {
    name: String,
    optional: bool,
    doc_comments: Vec<String>,
    stmt_info: StmtInfo,
    resolved_type: Option<Type>,
    default_literal: Option<Literal>,
}

/// Accumulates the fields of the struct currently being walked and writes
/// them into the struct's shell when the declaration closes.
#[derive(Debug, Default)]
pub struct StructTypeBuilder {
    current_struct: Option<Ref<StructType>>,
    fields: Vec<Field>,
    current_field: Option<FieldDraft>,
}

impl StructTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_struct(&mut self, handle: Ref<StructType>) {
        self.current_struct = Some(handle);
        self.fields.clear();
        self.current_field = None;
    }

    pub fn start_field(&mut self, name: String, doc_comments: Vec<String>, stmt_info: StmtInfo) {
        self.current_field = Some(FieldDraft {
            name,
            optional: false,
            doc_comments,
            stmt_info,
            resolved_type: None,
            default_literal: None,
        });
    }

    pub fn mark_current_field_optional(&mut self) {
        if let Some(field) = &mut self.current_field {
            field.optional = true;
        }
    }

    pub fn set_current_field_type(&mut self, ty: Type) {
        if let Some(field) = &mut self.current_field {
            field.resolved_type = Some(ty);
        }
    }

    pub fn current_field_type(&self) -> Option<&Type> {
        self.current_field.as_ref()?.resolved_type.as_ref()
    }

    pub fn set_current_field_literal(&mut self, literal: Literal) {
        if let Some(field) = &mut self.current_field {
            field.default_literal = Some(literal);
        }
    }

    /// Closes the current field. A field whose type never resolved is
    /// dropped; the resolution error is already recorded.
    pub fn end_field(&mut self) -> Result<(), CompileError> {
        let draft = match self.current_field.take() {
            Some(draft) => draft,
            None => return Ok(()),
        };
        let ty = match draft.resolved_type {
            Some(ty) => ty,
            None => return Ok(()),
        };
        if let Some(prior) = self.fields.iter().find(|field| field.name == draft.name) {
            return Err(CompileError::DuplicateFieldName {
                name: draft.name,
                prior: prior.stmt_info.clone(),
                stmt_info: draft.stmt_info,
            });
        }
        self.fields.push(Field {
            name: draft.name,
            type_: ty,
            optional: draft.optional,
            default_literal: draft.default_literal,
            doc_comments: draft.doc_comments,
            stmt_info: draft.stmt_info,
        });
        Ok(())
    }

    pub fn end_struct(&mut self, types: &mut TypeTable) -> Option<Ref<StructType>> {
        let handle = self.current_struct.take()?;
        types.get_mut(handle).fields = std::mem::take(&mut self.fields);
        Some(handle)
    }
}

// ---------------------------------------------------------------------------
// Reference phase
// ---------------------------------------------------------------------------

/// Second pass: resolves field types and defaults against the scope built by
/// the declaration phase and produces the [`Document`].
pub struct RefPhaseWalker<'t> {
    types: &'t mut TypeTable,
    scope: &'t Scope,
    source: Arc<PathBuf>,
    document: Document,
    struct_builder: StructTypeBuilder,
    field_type_builder: FieldTypeBuilder,
    literal_builder: LiteralBuilder,
    current_enum: Option<Ref<EnumType>>,
    visited_structs: HashSet<Ref<StructType>>,
    visited_enums: HashSet<Ref<EnumType>>,
    skip_struct: bool,
    errors: Vec<CompileError>,
}

impl<'t> RefPhaseWalker<'t> {
    pub fn new(types: &'t mut TypeTable, scope: &'t Scope, source: Arc<PathBuf>) -> Self {
        let document = Document::new(Arc::clone(&source));
        Self {
            types,
            scope,
            source,
            document,
            struct_builder: StructTypeBuilder::new(),
            field_type_builder: FieldTypeBuilder::new(),
            literal_builder: LiteralBuilder::new(),
            current_enum: None,
            visited_structs: HashSet::new(),
            visited_enums: HashSet::new(),
            skip_struct: false,
            errors: Vec::new(),
        }
    }

    pub fn into_result(self) -> (Document, Vec<CompileError>) {
        (self.document, self.errors)
    }

    fn record(&mut self, outcome: Result<(), CompileError>) {
        if let Err(error) = outcome {
            self.errors.push(error);
        }
    }

    fn enter_struct_decl(&mut self, node: &Node) {
        let ident = parser::child(node, Rule::identifier_name)
            .expect("grammar: structDecl has an identifierName");
        let handle = match self.scope.lookup(ident.as_str()) {
            Some(Type::Struct(handle)) => *handle,
            // The name was re-used for another category by a duplicate
            // declaration; the DuplicateDecl from phase one covers it.
            _ => {
                self.skip_struct = true;
                return;
            }
        };
        if !self.visited_structs.insert(handle) {
            self.skip_struct = true;
            return;
        }
        self.struct_builder.start_struct(handle);
    }

    fn enter_struct_field(&mut self, node: &Node) {
        let ident = parser::child(node, Rule::identifier_name)
            .expect("grammar: structField has an identifierName");
        let doc_comments = parser::children(node, Rule::doc_comment)
            .map(|doc| doc_text(doc.as_str()))
            .collect();
        self.field_type_builder.reset();
        self.struct_builder.start_field(
            ident.as_str().to_string(),
            doc_comments,
            parser::stmt_info(node, &self.source),
        );
    }

    fn enter_primitive_type(&mut self, node: &Node) {
        let kind = PrimitiveKind::from_keyword(node.as_str())
            .expect("grammar: primitiveType keywords are a closed set");
        let ty = Type::Primitive(PrimitiveType::new(
            kind,
            parser::stmt_info(node, &self.source),
        ));
        let outcome = self.field_type_builder.start_leaf(ty, self.types);
        self.record(outcome);
    }

    fn enter_custom_type_name(&mut self, node: &Node) {
        let ident = parser::child(node, Rule::identifier_name)
            .expect("grammar: customTypeName has an identifierName");
        match self.scope.lookup(ident.as_str()) {
            Some(ty) => {
                let ty = ty.clone();
                let outcome = self.field_type_builder.start_leaf(ty, self.types);
                self.record(outcome);
            }
            None => self.errors.push(CompileError::CustomTypeNotFound {
                name: ident.as_str().to_string(),
                stmt_info: parser::stmt_info(node, &self.source),
            }),
        }
    }

    fn enter_primitive_literal(&mut self, node: &Node) {
        let token = node
            .clone()
            .into_inner()
            .next()
            .expect("grammar: primitiveLiteral wraps one token");
        let stmt_info = parser::stmt_info(node, &self.source);
        let value = match token.as_rule() {
            Rule::bool_literal => PrimitiveValue::Bool(token.as_str() == "true"),
            Rule::int_literal => match token.as_str().parse::<i64>() {
                Ok(value) => PrimitiveValue::Int(value),
                Err(err) => {
                    self.errors.push(CompileError::Parse {
                        message: format!("invalid integer literal: {err}"),
                        stmt_info,
                    });
                    return;
                }
            },
            Rule::float_literal => match token.as_str().parse::<f64>() {
                Ok(value) => PrimitiveValue::Float(value),
                Err(err) => {
                    self.errors.push(CompileError::Parse {
                        message: format!("invalid float literal: {err}"),
                        stmt_info,
                    });
                    return;
                }
            },
            Rule::string_literal => PrimitiveValue::String(parser::string_value(&token)),
            _ => return,
        };
        let outcome = self
            .literal_builder
            .start_primitive(value, stmt_info, self.types);
        self.record(outcome);
    }

    fn enter_enum_decl(&mut self, node: &Node) {
        let ident = parser::child(node, Rule::identifier_name)
            .expect("grammar: enumDecl has an identifierName");
        let handle = match self.scope.lookup(ident.as_str()) {
            Some(Type::Enum(handle)) => *handle,
            _ => {
                self.current_enum = None;
                return;
            }
        };
        if !self.visited_enums.insert(handle) {
            self.current_enum = None;
            return;
        }
        self.current_enum = Some(handle);
    }

    fn enter_enum_field(&mut self, node: &Node) {
        let Some(handle) = self.current_enum else {
            return;
        };
        let ident = parser::child(node, Rule::identifier_name)
            .expect("grammar: enumField has an identifierName");
        let value_node =
            parser::child(node, Rule::int_literal).expect("grammar: enumField has a value");
        let stmt_info = parser::stmt_info(node, &self.source);
        let value: i32 = match value_node.as_str().parse() {
            Ok(value) => value,
            Err(err) => {
                self.errors.push(CompileError::Parse {
                    message: format!("invalid enum value: {err}"),
                    stmt_info,
                });
                return;
            }
        };
        let name = ident.as_str().to_string();

        let enum_type = self.types.get_mut(handle);
        if let Some(prior) = enum_type.variants.iter().find(|v| v.name == name) {
            let prior = prior.stmt_info.clone();
            self.errors.push(CompileError::DuplicateEnumVariant {
                name,
                prior,
                stmt_info,
            });
            return;
        }
        if let Some(prior) = enum_type.variants.iter().find(|v| v.value == value) {
            let prior = prior.stmt_info.clone();
            self.errors.push(CompileError::DuplicateEnumValue {
                value,
                prior,
                stmt_info,
            });
            return;
        }
        enum_type.variants.push(EnumVariant {
            name,
            value,
            stmt_info,
        });
    }
}

impl<'t, 'i> TreeListener<'i> for RefPhaseWalker<'t> {
    fn enter(&mut self, node: &Node<'i>) -> Result<(), FatalError> {
        if self.skip_struct {
            return Ok(());
        }
        match node.as_rule() {
            Rule::struct_decl => self.enter_struct_decl(node),
            Rule::struct_field => self.enter_struct_field(node),
            Rule::optional_marker => self.struct_builder.mark_current_field_optional(),
            Rule::field_type => self.field_type_builder.set_type_location(TypeLocation::Top),
            Rule::list_type => {
                let stmt_info = parser::stmt_info(node, &self.source);
                self.field_type_builder.start_list(stmt_info);
            }
            Rule::map_type => {
                let stmt_info = parser::stmt_info(node, &self.source);
                self.field_type_builder.start_map(stmt_info);
            }
            Rule::list_element_type => self
                .field_type_builder
                .set_type_location(TypeLocation::ListElement),
            Rule::map_key_type => self
                .field_type_builder
                .set_type_location(TypeLocation::MapKey),
            Rule::map_value_type => self
                .field_type_builder
                .set_type_location(TypeLocation::MapValue),
            Rule::primitive_type => self.enter_primitive_type(node),
            Rule::custom_type_name => self.enter_custom_type_name(node),
            Rule::struct_field_init => {
                let expected = self.struct_builder.current_field_type().cloned();
                self.literal_builder.begin(expected);
                self.literal_builder
                    .set_literal_location(LiteralLocation::Top);
            }
            Rule::list_literal => {
                let stmt_info = parser::stmt_info(node, &self.source);
                let outcome = self.literal_builder.start_list(stmt_info, self.types);
                self.record(outcome);
            }
            Rule::map_literal => {
                let stmt_info = parser::stmt_info(node, &self.source);
                let outcome = self.literal_builder.start_map(stmt_info, self.types);
                self.record(outcome);
            }
            Rule::list_literal_element => self
                .literal_builder
                .set_literal_location(LiteralLocation::ListElement),
            Rule::map_literal_key => self
                .literal_builder
                .set_literal_location(LiteralLocation::MapKey),
            Rule::map_literal_value => self
                .literal_builder
                .set_literal_location(LiteralLocation::MapValue),
            Rule::primitive_literal => self.enter_primitive_literal(node),
            Rule::enum_decl => self.enter_enum_decl(node),
            Rule::enum_field => self.enter_enum_field(node),
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, node: &Node<'i>) -> Result<(), FatalError> {
        if self.skip_struct {
            if node.as_rule() == Rule::struct_decl {
                self.skip_struct = false;
            }
            return Ok(());
        }
        match node.as_rule() {
            Rule::struct_decl => {
                if let Some(handle) = self.struct_builder.end_struct(self.types) {
                    self.document.struct_types.push(handle);
                }
            }
            Rule::struct_field => {
                let outcome = self.struct_builder.end_field();
                self.record(outcome);
            }
            Rule::struct_field_init => self.literal_builder.finish(),
            Rule::list_type | Rule::map_type => {
                match self.field_type_builder.end_container(self.types) {
                    Ok(Some(ty)) => self.struct_builder.set_current_field_type(ty),
                    Ok(None) => {}
                    Err(error) => self.errors.push(error),
                }
            }
            Rule::primitive_type | Rule::custom_type_name => {
                if let Some(ty) = self.field_type_builder.end_leaf() {
                    self.struct_builder.set_current_field_type(ty);
                }
            }
            Rule::list_literal | Rule::map_literal => {
                match self.literal_builder.end_container(self.types) {
                    Ok(Some(literal)) => self.struct_builder.set_current_field_literal(literal),
                    Ok(None) => {}
                    Err(error) => self.errors.push(error),
                }
            }
            Rule::primitive_literal => {
                if let Some(literal) = self.literal_builder.end_leaf() {
                    self.struct_builder.set_current_field_literal(literal);
                }
            }
            Rule::enum_decl => {
                if let Some(handle) = self.current_enum.take() {
                    self.document.enum_types.push(handle);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn si() -> StmtInfo {
        StmtInfo::new((1, 1), (1, 1), Arc::new(PathBuf::from("test.tm")))
    }

    fn prim(kind: PrimitiveKind) -> Type {
        Type::Primitive(PrimitiveType::new(kind, si()))
    }

    #[test]
    fn field_type_builder_assembles_nested_map() {
        // {string: [i32]}
        let types = TypeTable::new();
        let mut builder = FieldTypeBuilder::new();
        builder.set_type_location(TypeLocation::Top);
        builder.start_map(si());
        builder.set_type_location(TypeLocation::MapKey);
        builder
            .start_leaf(prim(PrimitiveKind::String), &types)
            .unwrap();
        assert!(builder.end_leaf().is_none());
        builder.set_type_location(TypeLocation::MapValue);
        builder.start_list(si());
        builder.set_type_location(TypeLocation::ListElement);
        builder.start_leaf(prim(PrimitiveKind::I32), &types).unwrap();
        assert!(builder.end_leaf().is_none());
        assert!(builder.end_container(&types).unwrap().is_none());

        let ty = builder
            .end_container(&types)
            .unwrap()
            .expect("the map is the field-level type");
        let map = ty.as_map().expect("map type");
        assert_eq!(map.key.kind, PrimitiveKind::String);
        let value_list = map.value.as_list().expect("list value");
        assert_eq!(*value_list.elem, prim(PrimitiveKind::I32));
    }

    #[test]
    fn field_type_builder_rejects_container_map_keys() {
        // {[i32]: i32}
        let types = TypeTable::new();
        let mut builder = FieldTypeBuilder::new();
        builder.set_type_location(TypeLocation::Top);
        builder.start_map(si());
        builder.set_type_location(TypeLocation::MapKey);
        builder.start_list(si());
        builder.set_type_location(TypeLocation::ListElement);
        builder.start_leaf(prim(PrimitiveKind::I32), &types).unwrap();
        assert!(builder.end_leaf().is_none());

        let err = builder.end_container(&types).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MapKeyTypeMustBePrimitive { .. }
        ));
        // The enclosing map never completes.
        assert!(builder.end_container(&types).unwrap().is_none());
    }

    #[test]
    fn field_type_builder_returns_plain_leaf() {
        let types = TypeTable::new();
        let mut builder = FieldTypeBuilder::new();
        builder.set_type_location(TypeLocation::Top);
        builder.start_leaf(prim(PrimitiveKind::Bool), &types).unwrap();
        assert_eq!(builder.end_leaf(), Some(prim(PrimitiveKind::Bool)));
    }

    #[test]
    fn literal_builder_checks_list_elements() {
        // xs: [i32] = [1, true]
        let types = TypeTable::new();
        let mut builder = LiteralBuilder::new();
        builder.begin(Some(Type::List(ListType::new(
            prim(PrimitiveKind::I32),
            si(),
        ))));
        builder.set_literal_location(LiteralLocation::Top);
        builder.start_list(si(), &types).unwrap();
        builder.set_literal_location(LiteralLocation::ListElement);
        builder
            .start_primitive(PrimitiveValue::Int(1), si(), &types)
            .unwrap();
        assert!(builder.end_leaf().is_none());
        let err = builder
            .start_primitive(PrimitiveValue::Bool(true), si(), &types)
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::LiteralElementTypeMismatch { .. }
        ));

        let literal = builder
            .end_container(&types)
            .unwrap()
            .expect("list closes at field level");
        match literal {
            Literal::List(list) => assert_eq!(list.elements.len(), 1),
            other => panic!("unexpected literal: {other:?}"),
        }
    }

    #[test]
    fn literal_builder_pairs_map_keys_with_values() {
        // m: {string: i32} = {"a": 1}
        let types = TypeTable::new();
        let mut builder = LiteralBuilder::new();
        let map_type = MapType::new(
            PrimitiveType::new(PrimitiveKind::String, si()),
            prim(PrimitiveKind::I32),
            si(),
        );
        builder.begin(Some(Type::Map(map_type)));
        builder.set_literal_location(LiteralLocation::Top);
        builder.start_map(si(), &types).unwrap();
        builder.set_literal_location(LiteralLocation::MapKey);
        builder
            .start_primitive(PrimitiveValue::String("a".into()), si(), &types)
            .unwrap();
        assert!(builder.end_leaf().is_none());
        builder.set_literal_location(LiteralLocation::MapValue);
        builder
            .start_primitive(PrimitiveValue::Int(1), si(), &types)
            .unwrap();
        assert!(builder.end_leaf().is_none());

        let literal = builder
            .end_container(&types)
            .unwrap()
            .expect("map closes at field level");
        match literal {
            Literal::Map(map) => {
                assert_eq!(map.entries.len(), 1);
                assert_eq!(map.entries[0].0.value, PrimitiveValue::String("a".into()));
            }
            other => panic!("unexpected literal: {other:?}"),
        }
    }

    #[test]
    fn literal_builder_suppresses_mismatched_subtrees() {
        // n: i32 = [1, 2] -- one error, nothing attached
        let types = TypeTable::new();
        let mut builder = LiteralBuilder::new();
        builder.begin(Some(prim(PrimitiveKind::I32)));
        builder.set_literal_location(LiteralLocation::Top);
        let err = builder.start_list(si(), &types).unwrap_err();
        assert!(matches!(
            err,
            CompileError::LiteralElementTypeMismatch { .. }
        ));
        builder.set_literal_location(LiteralLocation::ListElement);
        builder
            .start_primitive(PrimitiveValue::Int(1), si(), &types)
            .unwrap();
        assert!(builder.end_leaf().is_none());
        assert!(builder.end_container(&types).unwrap().is_none());
    }

    #[test]
    fn struct_builder_rejects_duplicate_field_names() {
        let mut types = TypeTable::new();
        let handle = types.create(StructType::shell("S".into(), false, si(), si()));
        let mut builder = StructTypeBuilder::new();
        builder.start_struct(handle);

        builder.start_field("x".into(), Vec::new(), si());
        builder.set_current_field_type(prim(PrimitiveKind::I32));
        builder.end_field().unwrap();

        builder.start_field("x".into(), Vec::new(), si());
        builder.set_current_field_type(prim(PrimitiveKind::I32));
        let err = builder.end_field().unwrap_err();
        assert!(matches!(err, CompileError::DuplicateFieldName { .. }));

        let finished = builder.end_struct(&mut types).unwrap();
        assert_eq!(finished.get(&types).fields.len(), 1);
    }

    #[test]
    fn struct_builder_drops_unresolved_fields() {
        let mut types = TypeTable::new();
        let handle = types.create(StructType::shell("S".into(), false, si(), si()));
        let mut builder = StructTypeBuilder::new();
        builder.start_struct(handle);
        builder.start_field("broken".into(), Vec::new(), si());
        builder.end_field().unwrap();
        let finished = builder.end_struct(&mut types).unwrap();
        assert!(finished.get(&types).fields.is_empty());
    }
}
