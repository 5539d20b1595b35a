//! C2 — the syntax-to-sema binder (spec §4.2).
//!
//! Each syntax node is walked top-down, threading the current scope;
//! every referenced name is resolved against the [`ScopeTable`] and the
//! node it produces carries a [`BoundInfo`] with whatever symbol and
//! (possibly still-unknown) type came out of that resolution. Resolution
//! failures are local: an unresolved name produces an error symbol and
//! binding continues into the rest of the tree (spec §4.2 "Invariants
//! after binding").

pub mod bound_ast;

pub use bound_ast::{BoundBlock, BoundExpr, BoundFunction, BoundInfo, BoundStmt};

use crate::diagnostics::{Diagnosed, DiagnosticBag};
use crate::scope::{
    AccessModifier, KindFilter, NameSection, QualifiedName, ScopeId, ScopeTable, SymbolCategory,
    Type,
};
use crate::syntax;

/// C2's per-compilation state: the scope table plus the current binding
/// position (teacher's `Context { scope }`, extended with a module-root
/// marker used for the approximate visibility check in §4.1 step 5).
pub struct Binder<'a> {
    pub table: &'a mut ScopeTable,
    pub scope: ScopeId,
    /// The scope of the nearest enclosing `impl`/struct body, if any —
    /// used to approximate "requester is in the same module subtree" for
    /// private-field visibility, since this crate does not model a
    /// separate module-path syntax.
    pub enclosing_type_scope: Option<ScopeId>,
}

impl<'a> Binder<'a> {
    pub fn new(table: &'a mut ScopeTable, scope: ScopeId) -> Self {
        Binder {
            table,
            scope,
            enclosing_type_scope: None,
        }
    }

    pub fn bind_expr(&mut self, expr: syntax::Expr<()>) -> Diagnosed<BoundExpr> {
        let mut bag = DiagnosticBag::new();
        let bound = self.bind_expr_inner(expr, &mut bag);
        Diagnosed::new(bound, bag)
    }

    fn bind_expr_inner(&mut self, expr: syntax::Expr<()>, bag: &mut DiagnosticBag) -> BoundExpr {
        use syntax::Expr::*;
        match expr {
            IntLiteral { value, position, .. } => IntLiteral {
                value,
                info: BoundInfo::with_type(None, Type::Integer),
                position,
            },
            FloatLiteral { value, position, .. } => FloatLiteral {
                value,
                info: BoundInfo::with_type(None, Type::Float),
                position,
            },
            BoolLiteral { value, position, .. } => BoolLiteral {
                value,
                info: BoundInfo::with_type(None, Type::Bool),
                position,
            },
            CharLiteral { value, position, .. } => CharLiteral {
                value,
                info: BoundInfo::with_type(None, Type::Char),
                position,
            },
            StringLiteral { value, position, .. } => StringLiteral {
                value,
                info: BoundInfo::with_type(None, Type::Str),
                position,
            },
            SymbolLiteral { name, position, .. } => {
                let resolved = self.table.resolve_static_symbol(self.scope, &name, KindFilter::AnyVariable);
                let symbol_id = bag.collect(resolved);
                let ty = self.table.symbol_type(symbol_id);
                SymbolLiteral {
                    name,
                    info: BoundInfo::with_type(Some(symbol_id), ty),
                    position,
                }
            }
            FieldAccess {
                receiver,
                field,
                position,
                ..
            } => {
                let receiver = Box::new(self.bind_expr_inner(*receiver, bag));
                let receiver_ty = receiver.info().get_type().unwrap_or(Type::Error);
                let same_module = self
                    .enclosing_type_scope
                    .map(|s| self.table.struct_scope_matches(&receiver_ty, s))
                    .unwrap_or(false);
                let resolved = self.table.resolve_instance_symbol(
                    &receiver_ty,
                    &field,
                    KindFilter::Field,
                    same_module,
                );
                let symbol_id = bag.collect(resolved);
                let ty = self.table.symbol_type(symbol_id);
                FieldAccess {
                    receiver,
                    field,
                    info: BoundInfo::with_type(Some(symbol_id), ty),
                    position,
                }
            }
            StaticCall {
                callee,
                args,
                position,
                ..
            } => {
                let resolved = self
                    .table
                    .resolve_static_symbol(self.scope, &callee, KindFilter::AnyCallable);
                let symbol_id = bag.collect(resolved);
                let checked = bag.collect(self.table.expect_function(symbol_id, position.clone()));
                let args = args
                    .into_iter()
                    .map(|a| self.bind_expr_inner(a, bag))
                    .collect();
                StaticCall {
                    callee,
                    args,
                    info: BoundInfo::new(Some(checked)),
                    position,
                }
            }
            InstanceCall {
                receiver,
                method,
                args,
                position,
                ..
            } => {
                let receiver = Box::new(self.bind_expr_inner(*receiver, bag));
                let receiver_ty = receiver.info().get_type().unwrap_or(Type::Error);
                let resolved = self.table.resolve_instance_symbol(
                    &receiver_ty,
                    &method,
                    KindFilter::AnyCallable,
                    false,
                );
                let symbol_id = bag.collect(resolved);
                let args = args
                    .into_iter()
                    .map(|a| self.bind_expr_inner(a, bag))
                    .collect();
                InstanceCall {
                    receiver,
                    method,
                    args,
                    info: BoundInfo::new(Some(symbol_id)),
                    position,
                }
            }
            UserUnary {
                op,
                operand,
                position,
                ..
            } => UserUnary {
                op,
                operand: Box::new(self.bind_expr_inner(*operand, bag)),
                info: BoundInfo::new(None),
                position,
            },
            UserBinary {
                op,
                lhs,
                rhs,
                position,
                ..
            } => UserBinary {
                op,
                lhs: Box::new(self.bind_expr_inner(*lhs, bag)),
                rhs: Box::new(self.bind_expr_inner(*rhs, bag)),
                info: BoundInfo::new(None),
                position,
            },
            And {
                lhs,
                rhs,
                position,
                ..
            } => And {
                lhs: Box::new(self.bind_expr_inner(*lhs, bag)),
                rhs: Box::new(self.bind_expr_inner(*rhs, bag)),
                info: BoundInfo::with_type(None, Type::Bool),
                position,
            },
            Or {
                lhs,
                rhs,
                position,
                ..
            } => Or {
                lhs: Box::new(self.bind_expr_inner(*lhs, bag)),
                rhs: Box::new(self.bind_expr_inner(*rhs, bag)),
                info: BoundInfo::with_type(None, Type::Bool),
                position,
            },
            LogicalNegation {
                operand, position, ..
            } => LogicalNegation {
                operand: Box::new(self.bind_expr_inner(*operand, bag)),
                info: BoundInfo::with_type(None, Type::Bool),
                position,
            },
            AddressOf {
                operand, position, ..
            } => {
                let operand = Box::new(self.bind_expr_inner(*operand, bag));
                let ty = operand.info().get_type().map(|t| t.get_with_ref());
                AddressOf {
                    operand,
                    info: match ty {
                        Some(t) => BoundInfo::with_type(None, t),
                        None => BoundInfo::new(None),
                    },
                    position,
                }
            }
            Dereference {
                operand, position, ..
            } => Dereference {
                operand: Box::new(self.bind_expr_inner(*operand, bag)),
                info: BoundInfo::new(None),
                position,
            },
            DerefAs {
                operand,
                target,
                position,
                ..
            } => {
                let operand = Box::new(self.bind_expr_inner(*operand, bag));
                let ty = resolve_type_name(&target, self.table, self.scope);
                DerefAs {
                    operand,
                    target,
                    info: BoundInfo::new_with_optional_type(ty),
                    position,
                }
            }
            Cast {
                operand,
                target,
                position,
                ..
            } => {
                let operand = Box::new(self.bind_expr_inner(*operand, bag));
                let ty = resolve_type_name(&target, self.table, self.scope);
                Cast {
                    operand,
                    target,
                    info: BoundInfo::new_with_optional_type(ty),
                    position,
                }
            }
            SizeOf {
                target, position, ..
            } => SizeOf {
                target,
                info: BoundInfo::with_type(None, Type::Integer),
                position,
            },
            StructInitialisation {
                name,
                fields,
                position,
                ..
            } => {
                let struct_ty = resolve_type_name(&name, self.table, self.scope);
                let field_positions: Vec<(String, crate::span::Span)> = fields
                    .iter()
                    .map(|f| (f.name.clone(), f.position.clone()))
                    .collect();
                if let Type::Struct(struct_id) = struct_ty.clone().unwrap_or(Type::Error) {
                    let diags = self
                        .table
                        .check_struct_construction(struct_id, &position, &field_positions);
                    for group in diags.into_groups() {
                        bag.push(group);
                    }
                }
                let fields = fields
                    .into_iter()
                    .map(|f| {
                        let value = match f.value {
                            Some(v) => self.bind_expr_inner(v, bag),
                            // Construction shorthand (`Vector2 { x, y }`):
                            // the value is a symbol literal named after the
                            // field, resolved in the surrounding scope.
                            None => self.bind_expr_inner(
                                SymbolLiteral {
                                    name: QualifiedName::single(NameSection::plain(
                                        f.name.clone(),
                                        f.position.clone(),
                                    )),
                                    info: (),
                                    position: f.position.clone(),
                                },
                                bag,
                            ),
                        };
                        syntax::FieldInit {
                            name: f.name,
                            value: Some(value),
                            position: f.position,
                        }
                    })
                    .collect();
                StructInitialisation {
                    name,
                    fields,
                    info: BoundInfo::new_with_optional_type(struct_ty),
                    position,
                }
            }
            Boxed {
                operand, position, ..
            } => {
                let operand = Box::new(self.bind_expr_inner(*operand, bag));
                let ty = operand
                    .info()
                    .get_type()
                    .map(|t| Type::StrongPointer(std::boxed::Box::new(t)));
                Boxed {
                    operand,
                    info: BoundInfo::new_with_optional_type(ty),
                    position,
                }
            }
            Lock {
                operand, position, ..
            } => {
                let operand = Box::new(self.bind_expr_inner(*operand, bag));
                let ty = operand.info().get_type().and_then(|t| t.get_without_weak_pointer());
                Lock {
                    operand,
                    info: BoundInfo::new_with_optional_type(ty),
                    position,
                }
            }
            Unbox {
                operand, position, ..
            } => {
                let operand = Box::new(self.bind_expr_inner(*operand, bag));
                let ty = operand
                    .info()
                    .get_type()
                    .and_then(|t| t.get_without_strong_pointer());
                Unbox {
                    operand,
                    info: BoundInfo::new_with_optional_type(ty),
                    position,
                }
            }
            Array {
                elements, position, ..
            } => {
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|e| self.bind_expr_inner(e, bag))
                    .collect();
                let ty = elements
                    .first()
                    .and_then(|e| e.info().get_type())
                    .map(|t| Type::Array(std::boxed::Box::new(t)));
                Array {
                    elements,
                    info: BoundInfo::new_with_optional_type(ty),
                    position,
                }
            }
            Tuple {
                elements, position, ..
            } => {
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|e| self.bind_expr_inner(e, bag))
                    .collect();
                let types: Option<Vec<Type>> = elements.iter().map(|e| e.info().get_type()).collect();
                Tuple {
                    elements,
                    info: BoundInfo::new_with_optional_type(types.map(Type::Tuple)),
                    position,
                }
            }
            ReferenceOf {
                operand, position, ..
            } => ReferenceOf {
                operand: Box::new(self.bind_expr_inner(*operand, bag)),
                info: BoundInfo::new(None),
                position,
            },
            ConversionCall {
                operand,
                operator,
                position,
                ..
            } => ConversionCall {
                operand: Box::new(self.bind_expr_inner(*operand, bag)),
                operator,
                info: BoundInfo::new(None),
                position,
            },
        }
    }

    pub fn bind_block(&mut self, block: syntax::Block<()>) -> Diagnosed<BoundBlock> {
        let mut bag = DiagnosticBag::new();
        let statements = block
            .statements
            .into_iter()
            .map(|s| self.bind_stmt_inner(s, &mut bag))
            .collect();
        Diagnosed::new(
            BoundBlock {
                statements,
                position: block.position,
            },
            bag,
        )
    }

    fn bind_stmt_inner(&mut self, stmt: syntax::Stmt<()>, bag: &mut DiagnosticBag) -> BoundStmt {
        use syntax::Stmt::*;
        match stmt {
            Expression(e) => Expression(self.bind_expr_inner(e, bag)),
            Var {
                name,
                mutable,
                type_name,
                value,
                position,
                ..
            } => {
                let value = self.bind_expr_inner(value, bag);
                let ty = type_name
                    .as_ref()
                    .and_then(|t| resolve_type_name(t, self.table, self.scope))
                    .or_else(|| value.info().get_type())
                    .unwrap_or(Type::Error);
                let declared = self.table.declare_symbol(
                    self.scope,
                    crate::scope::SymbolBuilder {
                        name: name.clone(),
                        position: position.clone(),
                        access: AccessModifier::Public,
                        category: SymbolCategory::Static,
                        kind: crate::scope::SymbolKind::Local { ty, mutable },
                        type_params: Vec::new(),
                    },
                );
                let symbol_id = bag.collect(declared);
                Var {
                    name,
                    mutable,
                    type_name,
                    value,
                    info: BoundInfo::new(Some(symbol_id)),
                    position,
                }
            }
            Const {
                name,
                type_name,
                value,
                position,
                ..
            } => {
                let value = self.bind_expr_inner(value, bag);
                let ty = type_name
                    .as_ref()
                    .and_then(|t| resolve_type_name(t, self.table, self.scope))
                    .or_else(|| value.info().get_type())
                    .unwrap_or(Type::Error);
                let declared = self.table.declare_symbol(
                    self.scope,
                    crate::scope::SymbolBuilder {
                        name: name.clone(),
                        position: position.clone(),
                        access: AccessModifier::Public,
                        category: SymbolCategory::Static,
                        kind: crate::scope::SymbolKind::Static { ty },
                        type_params: Vec::new(),
                    },
                );
                let symbol_id = bag.collect(declared);
                Const {
                    name,
                    type_name,
                    value,
                    info: BoundInfo::new(Some(symbol_id)),
                    position,
                }
            }
            Assignment {
                op,
                target,
                value,
                position,
            } => Assignment {
                op,
                target: self.bind_expr_inner(target, bag),
                value: self.bind_expr_inner(value, bag),
                position,
            },
            If {
                conditions,
                branches,
                else_branch,
                position,
            } => {
                let conditions = conditions
                    .into_iter()
                    .map(|c| self.bind_expr_inner(c, bag))
                    .collect();
                let branches = branches
                    .into_iter()
                    .map(|b| bag.collect(self.bind_block(b)))
                    .collect();
                let else_branch = else_branch.map(|b| bag.collect(self.bind_block(b)));
                If {
                    conditions,
                    branches,
                    else_branch,
                    position,
                }
            }
            While {
                condition,
                body,
                position,
            } => {
                let condition = self.bind_expr_inner(condition, bag);
                let body = bag.collect(self.bind_block(body));
                While {
                    condition,
                    body,
                    position,
                }
            }
            Assert { condition, position } => Assert {
                condition: self.bind_expr_inner(condition, bag),
                position,
            },
            Return { value, position } => Return {
                value: value.map(|v| self.bind_expr_inner(v, bag)),
                position,
            },
            Block(b) => Block(bag.collect(self.bind_block(b))),
            Comment(c) => Comment(c),
        }
    }
}

pub type BoundModule = Vec<syntax::TopLevelItem<BoundInfo>>;

impl<'a> Binder<'a> {
    /// Binds every top-level item. Struct and function symbols are declared
    /// in a first pass so forward references resolve, then each function
    /// body is bound in a second pass.
    pub fn bind_module(&mut self, module: syntax::Module<()>) -> Diagnosed<BoundModule> {
        let mut bag = DiagnosticBag::new();
        let module_scope = self.scope;

        enum Pending {
            Function(syntax::Function<()>),
            Struct(syntax::StructDecl),
            Trait(syntax::TraitDecl),
            Impl {
                target: syntax::TypeName,
                trait_name: Option<syntax::TypeName>,
                functions: Vec<syntax::Function<()>>,
                impl_scope: ScopeId,
                position: crate::span::Span,
            },
            Const {
                name: String,
                type_name: Option<syntax::TypeName>,
                value: syntax::Expr<()>,
                position: crate::span::Span,
            },
            Comment(String),
        }

        let mut pending = Vec::new();

        for item in module {
            match item {
                syntax::TopLevelItem::Struct(decl) => {
                    let fields = decl
                        .fields
                        .iter()
                        .map(|f| crate::scope::FieldDecl {
                            name: f.name.clone(),
                            ty: resolve_type_name(&f.type_name, self.table, module_scope).unwrap_or(Type::Error),
                            access: if f.public {
                                AccessModifier::Public
                            } else {
                                AccessModifier::Private
                            },
                            position: f.position.clone(),
                        })
                        .collect();
                    let access = if decl.public {
                        AccessModifier::Public
                    } else {
                        AccessModifier::Private
                    };
                    let declared = self.table.declare_struct(
                        module_scope,
                        decl.name.clone(),
                        decl.position.clone(),
                        access,
                        fields,
                    );
                    bag.collect(declared);
                    pending.push(Pending::Struct(decl));
                }
                syntax::TopLevelItem::Function(function) => {
                    pending.push(Pending::Function(function));
                }
                syntax::TopLevelItem::Const {
                    name,
                    type_name,
                    value,
                    position,
                } => {
                    pending.push(Pending::Const {
                        name,
                        type_name,
                        value,
                        position,
                    });
                }
                syntax::TopLevelItem::Trait(decl) => {
                    let trait_scope = self.table.create_child(module_scope, Some(decl.name.clone()));
                    let access = if decl.public {
                        AccessModifier::Public
                    } else {
                        AccessModifier::Private
                    };
                    let declared = self.table.declare_symbol(
                        module_scope,
                        crate::scope::SymbolBuilder {
                            name: decl.name.clone(),
                            position: decl.position.clone(),
                            access,
                            category: SymbolCategory::Static,
                            kind: crate::scope::SymbolKind::Trait {
                                supertraits: Vec::new(),
                                methods: Vec::new(),
                                scope: trait_scope,
                            },
                            type_params: Vec::new(),
                        },
                    );
                    let trait_id = bag.collect(declared);

                    for method in &decl.methods {
                        let params: Vec<crate::scope::Parameter> = method
                            .params
                            .iter()
                            .map(|p| crate::scope::Parameter {
                                name: p.name.clone(),
                                ty: resolve_type_name(&p.type_name, self.table, trait_scope)
                                    .unwrap_or(Type::Error),
                            })
                            .collect();
                        let self_param = method.params.iter().find(|p| p.is_self).map(|p| {
                            resolve_type_name(&p.type_name, self.table, trait_scope).unwrap_or(Type::Error)
                        });
                        let return_type = method
                            .return_type
                            .as_ref()
                            .and_then(|t| resolve_type_name(t, self.table, trait_scope))
                            .unwrap_or(Type::Void);
                        let declared_method = self.table.declare_symbol(
                            trait_scope,
                            crate::scope::SymbolBuilder {
                                name: method.name.clone(),
                                position: method.position.clone(),
                                access: AccessModifier::Public,
                                category: SymbolCategory::Static,
                                kind: crate::scope::SymbolKind::Prototype {
                                    params,
                                    return_type,
                                    self_param,
                                },
                                type_params: Vec::new(),
                            },
                        );
                        let method_id = bag.collect(declared_method);
                        self.table.add_trait_method(trait_id, method_id);
                    }

                    for supertrait in &decl.supertraits {
                        let resolved = resolve_type_name(supertrait, self.table, module_scope);
                        if let Some(Type::Trait(supertrait_id)) = resolved {
                            let added =
                                self.table.add_supertrait(trait_id, supertrait_id, decl.position.clone());
                            bag.collect(added);
                        }
                    }

                    pending.push(Pending::Trait(decl));
                }
                syntax::TopLevelItem::Impl(impl_decl) => {
                    let syntax::ImplDecl {
                        target,
                        trait_name,
                        functions,
                        position,
                    } = impl_decl;
                    let target_ty = resolve_type_name(&target, self.table, module_scope);
                    let impl_scope = self.table.create_child(module_scope, None);

                    if let Some(Type::Struct(struct_id)) = target_ty {
                        let target_scope = match &self.table.symbol(struct_id).kind {
                            crate::scope::SymbolKind::Struct { scope, .. } => Some(*scope),
                            _ => None,
                        };
                        if let Some(target_scope) = target_scope {
                            self.table.declare_association(target_scope, impl_scope);
                        }
                    }

                    pending.push(Pending::Impl {
                        target,
                        trait_name,
                        functions,
                        impl_scope,
                        position,
                    });
                }
                syntax::TopLevelItem::Comment(c) => pending.push(Pending::Comment(c)),
            }
        }

        let mut items = Vec::new();
        for item in pending {
            match item {
                Pending::Function(function) => {
                    let bound = self.declare_and_bind_function(function, &mut bag);
                    items.push(syntax::TopLevelItem::Function(bound));
                }
                Pending::Struct(decl) => items.push(syntax::TopLevelItem::Struct(decl)),
                Pending::Trait(decl) => items.push(syntax::TopLevelItem::Trait(decl)),
                Pending::Impl {
                    target,
                    trait_name,
                    functions,
                    impl_scope,
                    position,
                } => {
                    let previous_scope = self.scope;
                    self.scope = impl_scope;
                    let functions = functions
                        .into_iter()
                        .map(|f| self.declare_and_bind_function(f, &mut bag))
                        .collect();
                    self.scope = previous_scope;
                    items.push(syntax::TopLevelItem::Impl(syntax::ImplDecl {
                        target,
                        trait_name,
                        functions,
                        position,
                    }));
                }
                Pending::Const {
                    name,
                    type_name,
                    value,
                    position,
                } => {
                    let value = self.bind_expr_inner(value, &mut bag);
                    items.push(syntax::TopLevelItem::Const {
                        name,
                        type_name,
                        value,
                        position,
                    });
                }
                Pending::Comment(c) => items.push(syntax::TopLevelItem::Comment(c)),
            }
        }

        Diagnosed::new(items, bag)
    }

    fn declare_and_bind_function(
        &mut self,
        function: syntax::Function<()>,
        bag: &mut DiagnosticBag,
    ) -> BoundFunction {
        let body_scope = self.table.create_child(self.scope, Some(function.name.clone()));
        let params: Vec<crate::scope::Parameter> = function
            .params
            .iter()
            .map(|p| crate::scope::Parameter {
                name: p.name.clone(),
                ty: resolve_type_name(&p.type_name, self.table, self.scope).unwrap_or(Type::Error),
            })
            .collect();
        let return_type = function
            .return_type
            .as_ref()
            .and_then(|t| resolve_type_name(t, self.table, self.scope))
            .unwrap_or(Type::Void);

        let declared = self.table.declare_symbol(
            self.scope,
            crate::scope::SymbolBuilder {
                name: function.name.clone(),
                position: function.position.clone(),
                access: AccessModifier::Public,
                category: SymbolCategory::Static,
                kind: crate::scope::SymbolKind::Function {
                    params: params.clone(),
                    return_type: return_type.clone(),
                    self_param: None,
                    body_scope,
                    dyn_dispatchable: false,
                },
                type_params: Vec::new(),
            },
        );
        bag.collect(declared);

        for param in &function.params {
            let ty = resolve_type_name(&param.type_name, self.table, body_scope).unwrap_or(Type::Error);
            let declared = self.table.declare_symbol(
                body_scope,
                crate::scope::SymbolBuilder {
                    name: param.name.clone(),
                    position: function.position.clone(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: if param.is_self {
                        crate::scope::SymbolKind::SelfParameter(ty)
                    } else {
                        crate::scope::SymbolKind::Parameter(ty)
                    },
                    type_params: Vec::new(),
                },
            );
            bag.collect(declared);
        }

        let mut body = BoundBlock {
            statements: Vec::new(),
            position: function.body.position.clone(),
        };
        let previous_scope = self.scope;
        self.scope = body_scope;
        body.statements = function
            .body
            .statements
            .into_iter()
            .map(|s| self.bind_stmt_inner(s, bag))
            .collect();
        self.scope = previous_scope;

        BoundFunction {
            name: function.name,
            generics: function.generics,
            params: function.params,
            return_type: function.return_type,
            body,
            position: function.position,
        }
    }
}

impl BoundInfo {
    fn new_with_optional_type(ty: Option<Type>) -> Self {
        match ty {
            Some(t) => BoundInfo::with_type(None, t),
            None => BoundInfo::new(None),
        }
    }
}

/// Resolves a surface `TypeName` to a concrete `Type`, consulting `table`
/// for any name that isn't one of the built-in primitives — every
/// user-declared struct or trait goes through [`ScopeTable::resolve_type_symbol`]
/// from `scope` outward, so `fn make() -> Vector2` resolves the same way a
/// qualified static reference to `Vector2` would.
pub(crate) fn resolve_type_name(name: &syntax::TypeName, table: &ScopeTable, scope: ScopeId) -> Option<Type> {
    use syntax::TypeName::*;
    match name {
        Literal { name, .. } => crate::scope::BUILTIN_TYPE_NAMES
            .get(name.as_str())
            .cloned()
            .or_else(|| table.resolve_type_symbol(scope, name)),
        Reference(inner, _) => resolve_type_name(inner, table, scope).map(|t| t.get_with_ref()),
        StrongPointer(inner, _) => {
            resolve_type_name(inner, table, scope).map(|t| Type::StrongPointer(std::boxed::Box::new(t)))
        }
        WeakPointer(inner, _) => {
            resolve_type_name(inner, table, scope).map(|t| Type::WeakPointer(std::boxed::Box::new(t)))
        }
        DynStrongPointer(inner, _) => resolve_type_name(inner, table, scope)
            .map(|t| Type::DynStrongPointer(std::boxed::Box::new(t))),
        Tuple(items, _) => items
            .iter()
            .map(|t| resolve_type_name(t, table, scope))
            .collect::<Option<Vec<_>>>()
            .map(Type::Tuple),
        Array(inner, _) => {
            resolve_type_name(inner, table, scope).map(|t| Type::Array(std::boxed::Box::new(t)))
        }
        Fn {
            params,
            return_type,
            ..
        } => {
            let params = params
                .iter()
                .map(|t| resolve_type_name(t, table, scope))
                .collect::<Option<Vec<_>>>()?;
            let return_type = resolve_type_name(return_type, table, scope)?;
            Some(Type::Function {
                params,
                return_type: std::boxed::Box::new(return_type),
            })
        }
        Generic { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{AccessModifier, FieldDecl, SymbolBuilder, SymbolCategory, SymbolKind};
    use crate::span::Span;

    #[test]
    fn binds_int_literal_to_integer_type() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);
        let bound = binder
            .bind_expr(syntax::Expr::IntLiteral {
                value: 42,
                info: (),
                position: Span::default(),
            })
            .value;
        assert_eq!(bound.info().get_type(), Some(Type::Integer));
    }

    #[test]
    fn binds_undeclared_symbol_literal_to_error() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);
        let diagnosed = binder.bind_expr(syntax::Expr::SymbolLiteral {
            name: QualifiedName::single(NameSection::plain("missing", Span::default())),
            info: (),
            position: Span::default(),
        });
        assert!(diagnosed.bag.has_errors());
    }

    #[test]
    fn s3_binding_a_private_field_access_emits_inaccessible_field() {
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
        let vec_local = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "vec".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Local {
                        ty: Type::Struct(struct_id),
                        mutable: true,
                    },
                    type_params: Vec::new(),
                },
            )
            .value;
        let _ = vec_local;

        let mut binder = Binder::new(&mut table, root);
        let receiver = syntax::Expr::SymbolLiteral {
            name: QualifiedName::single(NameSection::plain("vec", Span::default())),
            info: (),
            position: Span::default(),
        };
        let access = syntax::Expr::FieldAccess {
            receiver: Box::new(receiver),
            field: NameSection::plain("x", Span::default()),
            info: (),
            position: Span::default(),
        };
        let diagnosed = binder.bind_expr(access);
        assert!(diagnosed.bag.has_errors());
    }

    /// A struct with a struct-typed field, plus an `impl` block whose
    /// method returns `Self` by name, bound end to end through
    /// `bind_module`: both the field's and the method's return type must
    /// resolve to the struct rather than falling back to `Type::Error`.
    #[test]
    fn binds_a_struct_with_a_struct_typed_field_and_an_impl_block() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);

        let module = vec![
            syntax::TopLevelItem::Struct(syntax::StructDecl {
                name: "Vector2".into(),
                generics: Vec::new(),
                fields: vec![syntax::StructField {
                    name: "x".into(),
                    type_name: syntax::TypeName::Literal {
                        name: "int".into(),
                        position: Span::default(),
                    },
                    public: true,
                    position: Span::default(),
                }],
                public: true,
                position: Span::default(),
            }),
            syntax::TopLevelItem::Struct(syntax::StructDecl {
                name: "Line".into(),
                generics: Vec::new(),
                fields: vec![syntax::StructField {
                    name: "start".into(),
                    type_name: syntax::TypeName::Literal {
                        name: "Vector2".into(),
                        position: Span::default(),
                    },
                    public: true,
                    position: Span::default(),
                }],
                public: true,
                position: Span::default(),
            }),
            syntax::TopLevelItem::Impl(syntax::ImplDecl {
                target: syntax::TypeName::Literal {
                    name: "Vector2".into(),
                    position: Span::default(),
                },
                trait_name: None,
                functions: vec![syntax::Function {
                    name: "origin".into(),
                    generics: Vec::new(),
                    params: Vec::new(),
                    return_type: Some(syntax::TypeName::Literal {
                        name: "Vector2".into(),
                        position: Span::default(),
                    }),
                    body: syntax::Block {
                        statements: vec![syntax::Stmt::Return {
                            value: Some(syntax::Expr::StructInitialisation {
                                name: syntax::TypeName::Literal {
                                    name: "Vector2".into(),
                                    position: Span::default(),
                                },
                                fields: vec![syntax::FieldInit {
                                    name: "x".into(),
                                    value: Some(syntax::Expr::IntLiteral {
                                        value: 0,
                                        info: (),
                                        position: Span::default(),
                                    }),
                                    position: Span::default(),
                                }],
                                info: (),
                                position: Span::default(),
                            }),
                            position: Span::default(),
                        }],
                        position: Span::default(),
                    },
                    position: Span::default(),
                }],
                position: Span::default(),
            }),
        ];

        let bound = binder.bind_module(module);
        assert!(!bound.bag.has_errors());

        let line_decl = bound.value.iter().find_map(|item| match item {
            syntax::TopLevelItem::Struct(decl) if decl.name == "Line" => Some(decl),
            _ => None,
        });
        assert!(line_decl.is_some());

        let impl_decl = bound.value.iter().find_map(|item| match item {
            syntax::TopLevelItem::Impl(decl) => Some(decl),
            _ => None,
        });
        let impl_decl = impl_decl.expect("impl block survives binding");
        assert_eq!(impl_decl.functions.len(), 1);
        assert_eq!(
            impl_decl.functions[0].body.statements.len(),
            1,
            "method body is bound"
        );

        // `Line.start`'s field type resolved to the `Vector2` struct symbol
        // rather than falling back to `Type::Error`.
        let line_ty = table
            .resolve_type_symbol(root, "Line")
            .expect("Line resolves as a type");
        let Type::Struct(line_id) = line_ty else {
            panic!("Line did not resolve to a struct");
        };
        let SymbolKind::Struct { fields, .. } = &table.symbol(line_id).kind else {
            panic!("Line symbol is not a struct");
        };
        assert!(matches!(fields[0].ty, Type::Struct(_)));
    }
}
