//! The scope tree and symbol table (C1, spec §4.1).
//!
//! Per the design notes in spec §9, scopes and symbols live in flat arenas
//! owned by a single [`ScopeTable`] and are addressed by index ([`ScopeId`],
//! [`SymbolId`]) rather than through a reference-counted graph. A symbol's
//! owning scope is a plain index, never an ownership edge.

use std::collections::HashMap;

use crate::diagnostics::{Diagnosed, DiagnosticBag, DiagnosticGroup};
use crate::span::Span;

use super::error::{
    AmbiguousReference, DuplicateFieldInit, InaccessibleSymbol, MissingStructFields, NotAFunction,
    Redefinition, ScopeError, StaticInstanceMisuse, SupertraitCycle, UndefinedSymbol,
    UnknownStructField,
};
use super::symbol::{
    AccessModifier, FieldDecl, Parameter, ScopeId, Symbol, SymbolCategory, SymbolId, SymbolKind,
};
use super::types::Type;

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub name: Option<String>,
    pub parent: Option<ScopeId>,
    pub nest_level: usize,
    pub children: Vec<ScopeId>,
    pub associations: Vec<ScopeId>,
    pub symbols: HashMap<String, Vec<SymbolId>>,
}

impl Scope {
    fn new(id: ScopeId, parent: Option<ScopeId>, nest_level: usize, name: Option<String>) -> Self {
        Scope {
            id,
            name,
            parent,
            nest_level,
            children: Vec::new(),
            associations: Vec::new(),
            symbols: HashMap::new(),
        }
    }
}

/// One section of a qualified name: an identifier with optional template
/// arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct NameSection {
    pub ident: String,
    pub type_args: Vec<Type>,
    pub position: Span,
}

impl NameSection {
    pub fn plain(ident: impl Into<String>, position: Span) -> Self {
        NameSection {
            ident: ident.into(),
            type_args: Vec::new(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub sections: Vec<NameSection>,
    pub globally_qualified: bool,
}

impl QualifiedName {
    pub fn single(section: NameSection) -> Self {
        QualifiedName {
            sections: vec![section],
            globally_qualified: false,
        }
    }
}

/// Which family of [`SymbolKind`] a resolution is allowed to land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    AnyType,
    AnyCallable,
    Function,
    AnyVariable,
    Field,
    Struct,
    Trait,
    Module,
    Any,
}

impl KindFilter {
    fn matches(&self, kind: &SymbolKind) -> bool {
        match self {
            KindFilter::AnyType => kind.is_type(),
            KindFilter::AnyCallable => kind.is_callable(),
            KindFilter::Function => matches!(kind, SymbolKind::Function { .. }),
            KindFilter::AnyVariable => kind.is_variable(),
            KindFilter::Field => matches!(kind, SymbolKind::Field(_)),
            KindFilter::Struct => matches!(kind, SymbolKind::Struct { .. }),
            KindFilter::Trait => matches!(kind, SymbolKind::Trait { .. }),
            KindFilter::Module => matches!(kind, SymbolKind::Module),
            KindFilter::Any => true,
        }
    }
}

/// Everything [`ScopeTable::declare_symbol`] needs to construct a new
/// [`Symbol`] before it has an id.
pub struct SymbolBuilder {
    pub name: String,
    pub position: Span,
    pub access: AccessModifier,
    pub category: SymbolCategory,
    pub kind: SymbolKind,
    pub type_params: Vec<SymbolId>,
}

pub struct ScopeTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    instances: HashMap<(SymbolId, Vec<SymbolId>), SymbolId>,
    error_static: SymbolId,
    error_instance: SymbolId,
}

const ROOT: ScopeId = ScopeId(0);

impl ScopeTable {
    pub fn new() -> Self {
        let root = Scope::new(ROOT, None, 0, None);
        let mut table = ScopeTable {
            scopes: vec![root],
            symbols: Vec::new(),
            instances: HashMap::new(),
            error_static: SymbolId(0),
            error_instance: SymbolId(0),
        };

        table.error_static = table.push_symbol(Symbol {
            id: SymbolId(0),
            name: "<error>".into(),
            position: Span::default(),
            owning_scope: ROOT,
            access: AccessModifier::Public,
            category: SymbolCategory::Static,
            kind: SymbolKind::Error,
            type_params: Vec::new(),
        });
        table.error_instance = table.push_symbol(Symbol {
            id: SymbolId(0),
            name: "<error>".into(),
            position: Span::default(),
            owning_scope: ROOT,
            access: AccessModifier::Public,
            category: SymbolCategory::Instance,
            kind: SymbolKind::Error,
            type_params: Vec::new(),
        });

        table
    }

    fn push_symbol(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        symbol.id = id;
        self.symbols.push(symbol);
        id
    }

    pub fn root(&self) -> ScopeId {
        ROOT
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn error_symbol(&self, category: SymbolCategory) -> SymbolId {
        match category {
            SymbolCategory::Static => self.error_static,
            SymbolCategory::Instance => self.error_instance,
        }
    }

    /// `Scope::GetOrCreateChild` equivalent: always creates a fresh child
    /// (parser/binder spawn a new scope per lexical region, so there is no
    /// reuse-by-name in this layer).
    pub fn create_child(&mut self, parent: ScopeId, name: Option<String>) -> ScopeId {
        let nest_level = self.scopes[parent.0].nest_level + 1;
        let id = ScopeId(self.scopes.len());
        log::trace!("creating scope {:?} under {:?} ({:?})", id, parent, name);
        self.scopes.push(Scope::new(id, Some(parent), nest_level, name));
        self.scopes[parent.0].children.push(id);
        id
    }

    pub fn declare_association(&mut self, scope: ScopeId, association: ScopeId) {
        self.scopes[scope.0].associations.push(association);
    }

    /// `DeclareSymbol` (spec §4.1). A same-kind symbol with the same name
    /// and generic arity already present is treated as a partial
    /// redeclaration: it is reported but the pre-existing symbol is
    /// returned so the caller can keep going. A name clash across
    /// incompatible kind families yields the category-appropriate error
    /// symbol.
    pub fn declare_symbol(&mut self, owning_scope: ScopeId, builder: SymbolBuilder) -> Diagnosed<SymbolId> {
        let SymbolBuilder {
            name,
            position,
            access,
            category,
            kind,
            type_params,
        } = builder;

        let existing = self.scopes[owning_scope.0]
            .symbols
            .get(&name)
            .cloned()
            .unwrap_or_default();

        for candidate_id in &existing {
            let candidate = &self.symbols[candidate_id.0];
            let same_family = same_kind_family(&candidate.kind, &kind);
            if !same_family {
                continue;
            }
            let exact_signature = candidate.type_params.len() == type_params.len();
            if exact_signature {
                let group = ScopeError::Redefinition(Redefinition {
                    name: name.clone(),
                    position,
                    previous: candidate.position.clone(),
                })
                .to_diagnostic_group();
                return Diagnosed::with_group(*candidate_id, group);
            }
        }

        let has_incompatible_family = existing.iter().any(|id| {
            let candidate = &self.symbols[id.0];
            !same_kind_family(&candidate.kind, &kind)
        });
        if has_incompatible_family {
            let group = ScopeError::Redefinition(Redefinition {
                name: name.clone(),
                position,
                previous: self.symbols[existing[0].0].position.clone(),
            })
            .to_diagnostic_group();
            return Diagnosed::with_group(self.error_symbol(category), group);
        }

        let id = self.push_symbol(Symbol {
            id: SymbolId(0),
            name: name.clone(),
            position,
            owning_scope,
            access,
            category,
            kind,
            type_params,
        });
        self.scopes[owning_scope.0]
            .symbols
            .entry(name)
            .or_default()
            .push(id);
        Diagnosed::ok(id)
    }

    /// Declares a fresh, uniquely-named label symbol in `scope` (spec §4.4:
    /// `if`/`while` lowering synthesizes jump targets that never existed in
    /// source). The `$` prefix keeps it outside the identifier grammar, so
    /// it can never collide with a user declaration.
    pub fn declare_label(&mut self, scope: ScopeId, position: Span) -> SymbolId {
        let name = format!("$label{}", self.symbols.len());
        self.declare_symbol(
            scope,
            SymbolBuilder {
                name,
                position,
                access: AccessModifier::Private,
                category: SymbolCategory::Static,
                kind: SymbolKind::Label,
                type_params: Vec::new(),
            },
        )
        .value
    }

    /// Declares a fresh scratch local (spec §4.4 `and`/`or` desugaring:
    /// "a boolean scratch slot").
    pub fn declare_scratch(&mut self, scope: ScopeId, ty: Type, position: Span) -> SymbolId {
        let name = format!("$scratch{}", self.symbols.len());
        self.declare_symbol(
            scope,
            SymbolBuilder {
                name,
                position,
                access: AccessModifier::Private,
                category: SymbolCategory::Static,
                kind: SymbolKind::Local { ty, mutable: true },
                type_params: Vec::new(),
            },
        )
        .value
    }

    /// Scope, if any, owned by a type/module-like symbol — the set of
    /// places a following name section can continue searching in.
    fn scope_of(&self, symbol: &Symbol) -> Option<ScopeId> {
        match &symbol.kind {
            SymbolKind::Struct { scope, .. } => Some(*scope),
            SymbolKind::Trait { scope, .. } => Some(*scope),
            SymbolKind::Function { body_scope, .. } => Some(*body_scope),
            _ => None,
        }
    }

    fn resolution_scopes(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut scopes = vec![scope];
        scopes.extend(self.scopes[scope.0].associations.iter().copied());
        scopes
    }

    /// Resolves a bare type name (a struct or trait) against `from_scope`'s
    /// ancestor chain. The non-generic slice of `ResolveStaticSymbol<AnyType>`
    /// (spec §4.1) that a surface `TypeName::Literal` needs: no qualified
    /// sections, no instantiation, just "is this name a type in scope".
    pub fn resolve_type_symbol(&self, from_scope: ScopeId, name: &str) -> Option<Type> {
        let scope = self.find_ancestor_declaring(from_scope, name)?;
        let candidates = self.matching_candidates(scope, name, KindFilter::AnyType);
        if candidates.len() != 1 {
            return None;
        }
        let id = candidates[0];
        match &self.symbols[id.0].kind {
            SymbolKind::Struct { .. } => Some(Type::Struct(id)),
            SymbolKind::Trait { .. } => Some(Type::Trait(id)),
            _ => None,
        }
    }

    /// `ResolveStaticSymbol<Kind>` (spec §4.1 algorithm).
    pub fn resolve_static_symbol(
        &mut self,
        from_scope: ScopeId,
        name: &QualifiedName,
        filter: KindFilter,
    ) -> Diagnosed<SymbolId> {
        let mut bag = DiagnosticBag::new();

        let Some(first) = name.sections.first() else {
            return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
        };

        let start_scope = if name.globally_qualified {
            Some(ROOT)
        } else {
            self.find_ancestor_declaring(from_scope, &first.ident)
        };

        let Some(mut current_scope) = start_scope else {
            bag.push(
                ScopeError::UndefinedSymbol(UndefinedSymbol {
                    name: first.ident.clone(),
                    position: first.position.clone(),
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
        };

        let mut resolved: Option<SymbolId> = None;

        for (index, section) in name.sections.iter().enumerate() {
            let is_last = index + 1 == name.sections.len();
            let section_filter = if is_last { filter } else { KindFilter::AnyType };

            let candidates = self.matching_candidates(current_scope, &section.ident, section_filter);

            let symbol_id = match candidates.len() {
                0 => {
                    bag.push(
                        ScopeError::UndefinedSymbol(UndefinedSymbol {
                            name: section.ident.clone(),
                            position: section.position.clone(),
                        })
                        .to_diagnostic_group(),
                    );
                    return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
                }
                1 => candidates[0],
                _ => {
                    bag.push(
                        ScopeError::AmbiguousReference(AmbiguousReference {
                            name: section.ident.clone(),
                            position: section.position.clone(),
                            candidates: candidates
                                .iter()
                                .map(|id| self.symbols[id.0].position.clone())
                                .collect(),
                        })
                        .to_diagnostic_group(),
                    );
                    return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
                }
            };

            let symbol_id = if !section.type_args.is_empty() {
                self.collect_generic_instance(symbol_id, section.type_args.clone())
            } else {
                symbol_id
            };

            if !is_last {
                let symbol = &self.symbols[symbol_id.0];
                match self.scope_of(symbol) {
                    Some(scope) => current_scope = scope,
                    None => {
                        bag.push(
                            ScopeError::StaticInstanceMisuse(StaticInstanceMisuse {
                                name: section.ident.clone(),
                                position: section.position.clone(),
                                declaration: symbol.position.clone(),
                                used_statically: false,
                            })
                            .to_diagnostic_group(),
                        );
                        return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
                    }
                }
            }

            resolved = Some(symbol_id);
        }

        let resolved = resolved.expect("non-empty qualified name always resolves or returns early");
        let symbol = &self.symbols[resolved.0];

        if symbol.category == SymbolCategory::Instance {
            bag.push(
                ScopeError::StaticInstanceMisuse(StaticInstanceMisuse {
                    name: symbol.name.clone(),
                    position: name.sections.last().unwrap().position.clone(),
                    declaration: symbol.position.clone(),
                    used_statically: true,
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
        }

        if symbol.access == AccessModifier::Private && !self.is_ancestor_or_self(symbol.owning_scope, from_scope) {
            bag.push(
                ScopeError::InaccessibleSymbol(InaccessibleSymbol {
                    name: symbol.name.clone(),
                    position: name.sections.last().unwrap().position.clone(),
                    declaration: symbol.position.clone(),
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new(self.error_symbol(SymbolCategory::Static), bag);
        }

        Diagnosed::new(resolved, bag)
    }

    /// Whether `scope` is `ancestor` or lies anywhere under it — the static
    /// counterpart of [`Self::struct_scope_matches`]'s "same module subtree"
    /// approximation (spec §4.1 step 5), here walking the scope's own parent
    /// chain rather than comparing a receiver's struct scope.
    fn is_ancestor_or_self(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.scopes[id.0].parent;
        }
        false
    }

    /// `ResolveInstanceSymbol<Kind>` (spec §4.1): a single name section on a
    /// receiver type.
    pub fn resolve_instance_symbol(
        &mut self,
        receiver: &Type,
        section: &NameSection,
        filter: KindFilter,
        requester_same_module: bool,
    ) -> Diagnosed<SymbolId> {
        let mut bag = DiagnosticBag::new();

        let Some(struct_id) = self.struct_symbol_of(receiver) else {
            bag.push(
                ScopeError::UndefinedSymbol(UndefinedSymbol {
                    name: section.ident.clone(),
                    position: section.position.clone(),
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new(self.error_symbol(SymbolCategory::Instance), bag);
        };

        let struct_symbol = &self.symbols[struct_id.0];
        let SymbolKind::Struct { fields, scope } = &struct_symbol.kind else {
            bag.push(
                ScopeError::UndefinedSymbol(UndefinedSymbol {
                    name: section.ident.clone(),
                    position: section.position.clone(),
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new(self.error_symbol(SymbolCategory::Instance), bag);
        };
        let struct_scope = *scope;
        let struct_name = struct_symbol.name.clone();
        let struct_position = struct_symbol.position.clone();

        if filter == KindFilter::Field {
            if let Some(field) = fields.iter().find(|f| f.name == section.ident) {
                if field.access == AccessModifier::Private && !requester_same_module {
                    bag.push(
                        ScopeError::InaccessibleSymbol(InaccessibleSymbol {
                            name: field.name.clone(),
                            position: section.position.clone(),
                            declaration: field.position.clone(),
                        })
                        .to_diagnostic_group(),
                    );
                    return Diagnosed::new(self.error_symbol(SymbolCategory::Instance), bag);
                }
                // Fields are not stored as standalone symbols; synthesize
                // one on demand so callers get a uniform `SymbolId`.
                let id = self.push_symbol(Symbol {
                    id: SymbolId(0),
                    name: field.name.clone(),
                    position: field.position.clone(),
                    owning_scope: struct_scope,
                    access: field.access,
                    category: SymbolCategory::Instance,
                    kind: SymbolKind::Field(field.ty.clone()),
                    type_params: Vec::new(),
                });
                return Diagnosed::new(id, bag);
            }

            bag.push(
                ScopeError::UnknownStructField(UnknownStructField {
                    struct_name,
                    field_name: section.ident.clone(),
                    position: section.position.clone(),
                    declaration: struct_position,
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new(self.error_symbol(SymbolCategory::Instance), bag);
        }

        let candidates = self.matching_candidates(struct_scope, &section.ident, filter);
        match candidates.len() {
            1 => Diagnosed::new(candidates[0], bag),
            0 => {
                bag.push(
                    ScopeError::UnknownStructField(UnknownStructField {
                        struct_name,
                        field_name: section.ident.clone(),
                        position: section.position.clone(),
                        declaration: struct_position,
                    })
                    .to_diagnostic_group(),
                );
                Diagnosed::new(self.error_symbol(SymbolCategory::Instance), bag)
            }
            _ => {
                bag.push(
                    ScopeError::AmbiguousReference(AmbiguousReference {
                        name: section.ident.clone(),
                        position: section.position.clone(),
                        candidates: candidates
                            .iter()
                            .map(|id| self.symbols[id.0].position.clone())
                            .collect(),
                    })
                    .to_diagnostic_group(),
                );
                Diagnosed::new(self.error_symbol(SymbolCategory::Instance), bag)
            }
        }
    }

    /// The type carried by a variable-shaped symbol, for recovering the
    /// receiver type of a bound symbol literal or field access.
    pub fn symbol_type(&self, id: SymbolId) -> Type {
        match &self.symbols[id.0].kind {
            SymbolKind::Local { ty, .. } => ty.clone(),
            SymbolKind::Parameter(ty) => ty.clone(),
            SymbolKind::SelfParameter(ty) => ty.clone(),
            SymbolKind::Static { ty } => ty.clone(),
            SymbolKind::Field(ty) => ty.clone(),
            _ => Type::Error,
        }
    }

    /// Approximates "requester is in the same module subtree" (spec §4.1
    /// step 5) as "requester is lexically inside the struct's own scope" —
    /// this crate does not model a separate module-path syntax.
    pub fn struct_scope_matches(&self, ty: &Type, scope: ScopeId) -> bool {
        let Type::Struct(id) = ty.get_without_ref() else {
            return false;
        };
        matches!(&self.symbols[id.0].kind, SymbolKind::Struct { scope: s, .. } if *s == scope)
    }

    fn struct_symbol_of(&self, ty: &Type) -> Option<SymbolId> {
        match ty.get_without_ref() {
            Type::Struct(id) => Some(id),
            _ => None,
        }
    }

    /// Looks up a user-defined conversion operator `from -> to` in `from`'s
    /// type scope (spec §4.3 "look up a user-defined implicit conversion
    /// operator"). `allow_explicit` widens the search to `as`-only
    /// operators as well, matching the permissive explicit-conversion rule.
    pub fn find_conversion_operator(
        &self,
        from: &Type,
        to: &Type,
        allow_explicit: bool,
    ) -> Option<SymbolId> {
        let struct_id = self.struct_symbol_of(from)?;
        let SymbolKind::Struct { scope, .. } = &self.symbols[struct_id.0].kind else {
            return None;
        };
        for ids in self.scopes[scope.0].symbols.values() {
            for id in ids {
                if let SymbolKind::Operator { op, return_type, .. } = &self.symbols[id.0].kind {
                    let usable = matches!(op, super::symbol::OperatorKind::ImplicitConversion)
                        || (allow_explicit
                            && matches!(op, super::symbol::OperatorKind::ExplicitConversion));
                    if usable && return_type.does_eq(to) {
                        return Some(*id);
                    }
                }
            }
        }
        None
    }

    /// Looks up a user-defined arithmetic/unary operator overload for
    /// `ty` (spec §4.4 "user-defined operators lower to a static call").
    /// `rhs` is `Some` for binary operators (matched against the
    /// operator's single parameter) and `None` for unary ones.
    pub fn find_operator(
        &self,
        ty: &Type,
        op: super::symbol::OperatorKind,
        rhs: Option<&Type>,
    ) -> Option<SymbolId> {
        let struct_id = self.struct_symbol_of(ty)?;
        let SymbolKind::Struct { scope, .. } = &self.symbols[struct_id.0].kind else {
            return None;
        };
        for ids in self.scopes[scope.0].symbols.values() {
            for id in ids {
                let SymbolKind::Operator {
                    op: candidate_op,
                    params,
                    ..
                } = &self.symbols[id.0].kind
                else {
                    continue;
                };
                if *candidate_op != op {
                    continue;
                }
                let matches = match rhs {
                    Some(rhs_ty) => params.len() == 1 && params[0].ty.does_eq(rhs_ty),
                    None => params.is_empty(),
                };
                if matches {
                    return Some(*id);
                }
            }
        }
        None
    }

    fn matching_candidates(&self, scope: ScopeId, name: &str, filter: KindFilter) -> Vec<SymbolId> {
        let mut same_scope = Vec::new();
        let mut from_associations = Vec::new();

        if let Some(ids) = self.scopes[scope.0].symbols.get(name) {
            same_scope.extend(ids.iter().copied().filter(|id| filter.matches(&self.symbols[id.0].kind)));
        }

        if same_scope.is_empty() {
            for assoc in &self.scopes[scope.0].associations {
                if let Some(ids) = self.scopes[assoc.0].symbols.get(name) {
                    from_associations.extend(
                        ids.iter()
                            .copied()
                            .filter(|id| filter.matches(&self.symbols[id.0].kind)),
                    );
                }
            }
        }

        if !same_scope.is_empty() {
            same_scope
        } else {
            from_associations
        }
    }

    fn find_ancestor_declaring(&self, from: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(from);
        while let Some(scope_id) = current {
            if self.scopes[scope_id.0].symbols.contains_key(name) {
                return Some(scope_id);
            }
            for assoc in &self.scopes[scope_id.0].associations {
                if self.scopes[assoc.0].symbols.contains_key(name) {
                    return Some(scope_id);
                }
            }
            current = self.scopes[scope_id.0].parent;
        }
        None
    }

    /// `CollectGenericInstance` (spec §4.1): canonical, memoized
    /// monomorphization.
    pub fn collect_generic_instance(&mut self, generic: SymbolId, args: Vec<Type>) -> SymbolId {
        let arg_ids: Vec<SymbolId> = args
            .iter()
            .map(|ty| self.intern_type_as_symbol(ty))
            .collect();
        let key = (generic, arg_ids.clone());

        if let Some(existing) = self.instances.get(&key) {
            log::debug!("generic instance cache hit for {:?}", generic);
            return *existing;
        }
        log::debug!("generic instance cache miss for {:?}, instantiating", generic);

        let generic_symbol = self.symbols[generic.0].clone();
        let parent_scope = generic_symbol.owning_scope;
        let instance_scope = self.create_child(parent_scope, Some(format!("{}<...>", generic_symbol.name)));

        for (param, arg_id) in generic_symbol.type_params.iter().zip(arg_ids.iter()) {
            let param_name = self.symbols[param.0].name.clone();
            let position = self.symbols[param.0].position.clone();
            let _ = self.declare_symbol(
                instance_scope,
                SymbolBuilder {
                    name: param_name,
                    position,
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Alias(*arg_id),
                    type_params: Vec::new(),
                },
            );
        }

        let instance_id = self.push_symbol(Symbol {
            id: SymbolId(0),
            name: generic_symbol.name.clone(),
            position: generic_symbol.position.clone(),
            owning_scope: instance_scope,
            access: generic_symbol.access,
            category: generic_symbol.category,
            kind: generic_symbol.kind.clone(),
            type_params: Vec::new(),
        });

        self.instances.insert(key, instance_id);
        instance_id
    }

    /// Types that appear as generic arguments need a stable identity for
    /// memoization; struct/trait/param types already have one (their
    /// symbol), everything else gets an on-demand alias symbol so the
    /// `(generic, args)` key stays `SymbolId`-shaped.
    fn intern_type_as_symbol(&mut self, ty: &Type) -> SymbolId {
        match ty {
            Type::Struct(id) | Type::Trait(id) | Type::TypeParam(id) => *id,
            other => self.push_symbol(Symbol {
                id: SymbolId(0),
                name: other.to_string(),
                position: Span::default(),
                owning_scope: ROOT,
                access: AccessModifier::Public,
                category: SymbolCategory::Static,
                kind: SymbolKind::Alias(self.error_static),
                type_params: Vec::new(),
            }),
        }
    }

    /// Supertrait-cycle detection at supertrait-edge creation (spec §4.1).
    pub fn add_supertrait(
        &mut self,
        trait_id: SymbolId,
        supertrait_id: SymbolId,
        position: Span,
    ) -> Diagnosed<()> {
        let mut bag = DiagnosticBag::new();

        if let Some(cycle) = self.find_supertrait_cycle(trait_id, supertrait_id) {
            bag.push(
                ScopeError::SupertraitCycle(SupertraitCycle {
                    trait_name: self.symbols[trait_id.0].name.clone(),
                    position,
                    cycle,
                })
                .to_diagnostic_group(),
            );
            return Diagnosed::new((), bag);
        }

        if let SymbolKind::Trait { supertraits, .. } = &mut self.symbols[trait_id.0].kind {
            supertraits.push(supertrait_id);
        }

        Diagnosed::new((), bag)
    }

    /// Records a declared method prototype against its owning trait symbol.
    pub fn add_trait_method(&mut self, trait_id: SymbolId, method_id: SymbolId) {
        if let SymbolKind::Trait { methods, .. } = &mut self.symbols[trait_id.0].kind {
            methods.push(method_id);
        }
    }

    fn find_supertrait_cycle(&self, trait_id: SymbolId, new_super: SymbolId) -> Option<Vec<String>> {
        let mut path = vec![self.symbols[trait_id.0].name.clone()];
        let mut stack = vec![new_super];
        let mut visited = std::collections::HashSet::new();

        while let Some(current) = stack.pop() {
            if current == trait_id {
                path.push(self.symbols[current.0].name.clone());
                return Some(path);
            }
            if !visited.insert(current) {
                continue;
            }
            path.push(self.symbols[current.0].name.clone());
            if let SymbolKind::Trait { supertraits, .. } = &self.symbols[current.0].kind {
                stack.extend(supertraits.iter().copied());
            }
        }

        None
    }

    pub fn declare_struct(
        &mut self,
        owning_scope: ScopeId,
        name: impl Into<String>,
        position: Span,
        access: AccessModifier,
        fields: Vec<FieldDecl>,
    ) -> Diagnosed<SymbolId> {
        let struct_scope = self.create_child(owning_scope, Some(name.into()));
        let name_for_symbol = self.scopes[struct_scope.0]
            .name
            .clone()
            .unwrap_or_default();
        self.declare_symbol(
            owning_scope,
            SymbolBuilder {
                name: name_for_symbol,
                position,
                access,
                category: SymbolCategory::Static,
                kind: SymbolKind::Struct {
                    fields,
                    scope: struct_scope,
                },
                type_params: Vec::new(),
            },
        )
    }

    /// Checks a struct-construction argument list against the struct's
    /// declared fields (spec §4.2, scenarios S4/S5/S6).
    pub fn check_struct_construction(
        &self,
        struct_id: SymbolId,
        position: &Span,
        provided: &[(String, Span)],
    ) -> DiagnosticBag {
        let mut bag = DiagnosticBag::new();
        let Symbol {
            kind: SymbolKind::Struct { fields, .. },
            name: struct_name,
            position: struct_position,
            ..
        } = &self.symbols[struct_id.0]
        else {
            return bag;
        };

        let mut seen: HashMap<&str, &Span> = HashMap::new();
        for (field_name, field_position) in provided {
            if let Some(first) = seen.get(field_name.as_str()) {
                bag.push(
                    ScopeError::DuplicateFieldInit(DuplicateFieldInit {
                        field_name: field_name.clone(),
                        position: field_position.clone(),
                        first: (*first).clone(),
                    })
                    .to_diagnostic_group(),
                );
                continue;
            }
            seen.insert(field_name, field_position);

            if !fields.iter().any(|f| &f.name == field_name) {
                bag.push(
                    ScopeError::UnknownStructField(UnknownStructField {
                        struct_name: struct_name.clone(),
                        field_name: field_name.clone(),
                        position: field_position.clone(),
                        declaration: struct_position.clone(),
                    })
                    .to_diagnostic_group(),
                );
            }
        }

        let missing: Vec<String> = fields
            .iter()
            .map(|f| f.name.clone())
            .filter(|name| !seen.contains_key(name.as_str()))
            .collect();

        if !missing.is_empty() {
            bag.push(
                ScopeError::MissingStructFields(MissingStructFields {
                    struct_name: struct_name.clone(),
                    position: position.clone(),
                    missing,
                    declaration: struct_position.clone(),
                })
                .to_diagnostic_group(),
            );
        }

        bag
    }

    pub fn expect_function(&self, id: SymbolId, position: Span) -> Diagnosed<SymbolId> {
        let mut bag = DiagnosticBag::new();
        let symbol = &self.symbols[id.0];
        if symbol.is_error() || matches!(symbol.kind, SymbolKind::Function { .. } | SymbolKind::Operator { .. }) {
            return Diagnosed::new(id, bag);
        }
        bag.push(
            ScopeError::NotAFunction(NotAFunction {
                name: symbol.name.clone(),
                position,
                declaration: symbol.position.clone(),
            })
            .to_diagnostic_group(),
        );
        Diagnosed::new(self.error_symbol(symbol.category), bag)
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

fn same_kind_family(a: &SymbolKind, b: &SymbolKind) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl_local(table: &mut ScopeTable, scope: ScopeId, name: &str, ty: Type) -> SymbolId {
        table
            .declare_symbol(
                scope,
                SymbolBuilder {
                    name: name.into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Local { ty, mutable: false },
                    type_params: Vec::new(),
                },
            )
            .value
    }

    fn decl_function(
        table: &mut ScopeTable,
        scope: ScopeId,
        name: &str,
        params: Vec<Parameter>,
    ) -> Diagnosed<SymbolId> {
        let body_scope = table.create_child(scope, None);
        table.declare_symbol(
            scope,
            SymbolBuilder {
                name: name.into(),
                position: Span::default(),
                access: AccessModifier::Public,
                category: SymbolCategory::Static,
                kind: SymbolKind::Function {
                    params,
                    return_type: Type::Void,
                    self_param: None,
                    body_scope,
                    dyn_dispatchable: false,
                },
                type_params: Vec::new(),
            },
        )
    }

    /// S1 — ambiguous call: two `call` overloads, resolving the bare name
    /// is ambiguous because overload resolution is not done at this layer.
    #[test]
    fn s1_ambiguous_call_resolution() {
        let mut table = ScopeTable::new();
        let root = table.root();
        decl_function(
            &mut table,
            root,
            "call",
            vec![Parameter {
                name: "x".into(),
                ty: Type::Integer,
            }],
        );
        decl_function(
            &mut table,
            root,
            "call",
            vec![
                Parameter {
                    name: "x".into(),
                    ty: Type::Integer,
                },
                Parameter {
                    name: "y".into(),
                    ty: Type::Integer,
                },
            ],
        );

        let name = QualifiedName::single(NameSection::plain("call", Span::default()));
        let resolved = table.resolve_static_symbol(root, &name, KindFilter::Function);

        assert!(resolved.bag.has_errors());
        assert_eq!(resolved.bag.groups()[0].0.len(), 3);
        assert!(table.symbol(resolved.value).is_error());
    }

    /// S2 — scope-qualified access of a local.
    #[test]
    fn s2_scope_access_of_local() {
        let mut table = ScopeTable::new();
        let root = table.root();
        decl_local(&mut table, root, "label", Type::Integer);

        let name = QualifiedName {
            sections: vec![
                NameSection::plain("label", Span::default()),
                NameSection::plain("pes", Span::default()),
            ],
            globally_qualified: false,
        };
        let resolved = table.resolve_static_symbol(root, &name, KindFilter::Any);

        assert!(resolved.bag.has_errors());
        assert!(table.symbol(resolved.value).is_error());
    }

    /// S4/S5/S6 — struct construction completeness, duplication, unknown
    /// field.
    #[test]
    fn struct_construction_checks() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let fields = vec![
            FieldDecl {
                name: "x".into(),
                ty: Type::Integer,
                access: AccessModifier::Private,
                position: Span::default(),
            },
            FieldDecl {
                name: "y".into(),
                ty: Type::Integer,
                access: AccessModifier::Private,
                position: Span::default(),
            },
            FieldDecl {
                name: "z".into(),
                ty: Type::Integer,
                access: AccessModifier::Private,
                position: Span::default(),
            },
        ];
        let struct_id = table
            .declare_struct(root, "Vector2", Span::default(), AccessModifier::Public, fields)
            .value;

        // S4: missing fields.
        let bag = table.check_struct_construction(struct_id, &Span::default(), &[]);
        assert!(bag.has_errors());

        // S5 + S6: duplicate `x`, unknown `z2` substituting for legitimate z, plus correct y.
        let bag = table.check_struct_construction(
            struct_id,
            &Span::default(),
            &[
                ("x".into(), Span::default()),
                ("x".into(), Span::default()),
                ("y".into(), Span::default()),
                ("z".into(), Span::default()),
            ],
        );
        assert_eq!(bag.groups().len(), 1);
    }

    /// S3 — private field access from outside the declaring module.
    #[test]
    fn s3_private_field_inaccessible() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let fields = vec![FieldDecl {
            name: "x".into(),
            ty: Type::Integer,
            access: AccessModifier::Private,
            position: Span::default(),
        }];
        let struct_id = table
            .declare_struct(root, "Vector2", Span::default(), AccessModifier::Public, fields)
            .value;
        let struct_symbol = table.symbol(struct_id).clone();
        let SymbolKind::Struct { scope, .. } = struct_symbol.kind else {
            unreachable!()
        };
        let _ = scope;

        let receiver = Type::Struct(struct_id);
        let section = NameSection::plain("x", Span::default());
        let resolved = table.resolve_instance_symbol(&receiver, &section, KindFilter::Field, false);

        assert!(resolved.bag.has_errors());
        assert!(table.symbol(resolved.value).is_error());
    }

    /// Step 5 of `ResolveStaticSymbol` (spec §4.1): a private static member
    /// reached through a qualified name (`Vector2::helper`) from a scope
    /// outside `Vector2`'s own subtree is rejected, mirroring
    /// `s3_private_field_inaccessible` for the instance-symbol path.
    #[test]
    fn private_static_symbol_is_inaccessible_from_outside_its_scope() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let struct_id = table
            .declare_struct(root, "Vector2", Span::default(), AccessModifier::Public, Vec::new())
            .value;
        let SymbolKind::Struct { scope: struct_scope, .. } = table.symbol(struct_id).kind.clone() else {
            unreachable!()
        };
        table
            .declare_symbol(
                struct_scope,
                SymbolBuilder {
                    name: "helper".into(),
                    position: Span::default(),
                    access: AccessModifier::Private,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Local { ty: Type::Integer, mutable: false },
                    type_params: Vec::new(),
                },
            )
            .value;

        let outside_scope = table.create_child(root, None);
        let name = QualifiedName {
            sections: vec![
                NameSection::plain("Vector2", Span::default()),
                NameSection::plain("helper", Span::default()),
            ],
            globally_qualified: false,
        };
        let resolved = table.resolve_static_symbol(outside_scope, &name, KindFilter::AnyVariable);

        assert!(resolved.bag.has_errors());
        assert!(table.symbol(resolved.value).is_error());
    }

    #[test]
    fn generic_instantiation_is_canonical() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let param = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "T".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::TypeParam,
                    type_params: Vec::new(),
                },
            )
            .value;
        let body_scope = table.create_child(root, None);
        let generic_fn = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "identity".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Function {
                        params: vec![Parameter {
                            name: "x".into(),
                            ty: Type::TypeParam(param),
                        }],
                        return_type: Type::TypeParam(param),
                        self_param: None,
                        body_scope,
                        dyn_dispatchable: false,
                    },
                    type_params: vec![param],
                },
            )
            .value;

        let a = table.collect_generic_instance(generic_fn, vec![Type::Integer]);
        let b = table.collect_generic_instance(generic_fn, vec![Type::Integer]);
        let c = table.collect_generic_instance(generic_fn, vec![Type::Bool]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn supertrait_cycle_is_rejected() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let scope_a = table.create_child(root, None);
        let scope_b = table.create_child(root, None);
        let trait_a = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "A".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Trait {
                        supertraits: Vec::new(),
                        methods: Vec::new(),
                        scope: scope_a,
                    },
                    type_params: Vec::new(),
                },
            )
            .value;
        let trait_b = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "B".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Trait {
                        supertraits: Vec::new(),
                        methods: Vec::new(),
                        scope: scope_b,
                    },
                    type_params: Vec::new(),
                },
            )
            .value;

        let ok = table.add_supertrait(trait_a, trait_b, Span::default());
        assert!(!ok.bag.has_errors());

        let cyclic = table.add_supertrait(trait_b, trait_a, Span::default());
        assert!(cyclic.bag.has_errors());
    }
}
