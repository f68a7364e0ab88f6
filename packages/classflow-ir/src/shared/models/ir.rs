//! Class-based IR model
//!
//! Flat arena program representation: classes, fields, methods, variables
//! and statements are interned into vectors and referenced by `u32` ids.
//! Statements form a sum type; the analyses pattern-match on `StmtKind`
//! instead of dispatching through statement objects.
//!
//! The registry also keeps per-variable reverse indexes (stores, loads,
//! invokes on a given base variable). The pointer-analysis main loop walks
//! these when the points-to set of a receiver grows.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ClassflowError, Result};

/// Unique identifier for classes
pub type ClassId = u32;
/// Unique identifier for fields
pub type FieldId = u32;
/// Unique identifier for methods
pub type MethodId = u32;
/// Unique identifier for variables (interned index, method-local names)
pub type VarId = u32;
/// Unique identifier for statements, assigned in creation order.
/// Doubles as the statement index used to sort analysis output.
pub type StmtId = u32;

/// Static type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// 8/16/32-bit integral or boolean. The only kind the constant lattice tracks.
    Int,
    /// Reference to an instance of a class
    Reference(ClassId),
    /// Reference to an array. Element type is irrelevant to the analyses:
    /// arrays collapse to a single index slot.
    Array,
    /// Anything else (long, float, ...); passes through all analyses untouched
    Other,
}

impl TypeKind {
    /// True exactly for the types the integer lattice models.
    #[inline]
    pub fn can_hold_int(&self) -> bool {
        matches!(self, TypeKind::Int)
    }
}

/// How a call site binds its callee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallKind {
    Static,
    Virtual,
    Interface,
    /// Constructors, private and super calls: receiver present, dispatch static
    Special,
    Dynamic,
}

impl CallKind {
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, CallKind::Static)
    }
}

/// Binary operators of the IR expression language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Ushr,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    /// DIV and REM may raise at runtime; everything else is total.
    #[inline]
    pub fn is_division(&self) -> bool {
        matches!(self, BinaryOp::Div | BinaryOp::Rem)
    }
}

/// Right-hand sides of `Assign` statements and `If` conditions.
///
/// Three-address form: binary operands are always variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exp {
    Var(VarId),
    IntLiteral(i32),
    Binary { op: BinaryOp, lhs: VarId, rhs: VarId },
    /// Checked cast. Evaluates to not-a-constant and may throw.
    Cast { var: VarId, to: ClassId },
}

impl Exp {
    /// True when evaluating the expression can never raise or touch the heap.
    pub fn is_side_effect_free(&self) -> bool {
        match self {
            Exp::Var(_) | Exp::IntLiteral(_) => true,
            Exp::Binary { op, .. } => !op.is_division(),
            Exp::Cast { .. } => false,
        }
    }
}

/// Reference to a method as written at a call site (declared class + name/arity)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub class: ClassId,
    pub name: String,
    pub arity: usize,
}

impl MethodRef {
    pub fn new(class: ClassId, name: impl Into<String>, arity: usize) -> Self {
        Self {
            class,
            name: name.into(),
            arity,
        }
    }
}

/// A call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoke {
    /// Call-result variable, absent when the value is discarded
    pub result: Option<VarId>,
    pub callee: MethodRef,
    /// Receiver variable; `None` for static calls
    pub base: Option<VarId>,
    pub args: Vec<VarId>,
    pub kind: CallKind,
}

/// What a `New` statement allocates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewKind {
    Object(ClassId),
    Array,
}

impl NewKind {
    /// Class of the allocated object; arrays have none (never dispatched on).
    #[inline]
    pub fn class(&self) -> Option<ClassId> {
        match self {
            NewKind::Object(c) => Some(*c),
            NewKind::Array => None,
        }
    }
}

/// Statement sum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtKind {
    New { lhs: VarId, alloc: NewKind },
    Copy { lhs: VarId, rhs: VarId },
    /// `base.field = rhs`, or `C.field = rhs` when `base` is `None`
    StoreField { base: Option<VarId>, field: FieldId, rhs: VarId },
    /// `lhs = base.field`, or `lhs = C.field` when `base` is `None`
    LoadField { lhs: VarId, base: Option<VarId>, field: FieldId },
    StoreArray { base: VarId, index: VarId, rhs: VarId },
    LoadArray { lhs: VarId, base: VarId, index: VarId },
    Invoke(Invoke),
    Assign { lhs: VarId, rhs: Exp },
    /// Branch targets live on CFG edges (IfTrue / IfFalse), not in the IR
    If { cond: Exp },
    /// Case targets live on CFG edges (SwitchCase / SwitchDefault)
    Switch { var: VarId },
    Return { value: Option<VarId> },
    Goto,
    Nop,
}

impl StmtKind {
    /// Variable defined by this statement, if any
    pub fn def_var(&self) -> Option<VarId> {
        match self {
            StmtKind::New { lhs, .. }
            | StmtKind::Copy { lhs, .. }
            | StmtKind::LoadField { lhs, .. }
            | StmtKind::LoadArray { lhs, .. }
            | StmtKind::Assign { lhs, .. } => Some(*lhs),
            StmtKind::Invoke(inv) => inv.result,
            _ => None,
        }
    }

    /// Variables read by this statement, pushed into `out`
    pub fn collect_uses(&self, out: &mut Vec<VarId>) {
        let mut exp_uses = |e: &Exp, out: &mut Vec<VarId>| match e {
            Exp::Var(v) => out.push(*v),
            Exp::IntLiteral(_) => {}
            Exp::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            Exp::Cast { var, .. } => out.push(*var),
        };
        match self {
            StmtKind::New { .. } | StmtKind::Goto | StmtKind::Nop => {}
            StmtKind::Copy { rhs, .. } => out.push(*rhs),
            StmtKind::StoreField { base, rhs, .. } => {
                if let Some(b) = base {
                    out.push(*b);
                }
                out.push(*rhs);
            }
            StmtKind::LoadField { base, .. } => {
                if let Some(b) = base {
                    out.push(*b);
                }
            }
            StmtKind::StoreArray { base, index, rhs } => {
                out.push(*base);
                out.push(*index);
                out.push(*rhs);
            }
            StmtKind::LoadArray { base, index, .. } => {
                out.push(*base);
                out.push(*index);
            }
            StmtKind::Invoke(inv) => {
                if let Some(b) = inv.base {
                    out.push(b);
                }
                out.extend_from_slice(&inv.args);
            }
            StmtKind::Assign { rhs, .. } => exp_uses(rhs, out),
            StmtKind::If { cond } => exp_uses(cond, out),
            StmtKind::Switch { var } => out.push(*var),
            StmtKind::Return { value } => {
                if let Some(v) = value {
                    out.push(*v);
                }
            }
        }
    }
}

/// A statement together with its owning method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    pub id: StmtId,
    pub method: MethodId,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub superclass: Option<ClassId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub class: ClassId,
    pub name: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Var {
    pub id: VarId,
    pub method: MethodId,
    pub name: String,
    pub ty: TypeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub id: MethodId,
    pub class: ClassId,
    pub name: String,
    pub params: Vec<VarId>,
    /// Variables returned by `Return` statements, collected at build time
    pub return_vars: Vec<VarId>,
    /// Receiver variable; `None` for static methods
    pub this_var: Option<VarId>,
    pub stmts: Vec<StmtId>,
    pub is_static: bool,
    pub is_abstract: bool,
}

impl Method {
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Whole program: arena of entities plus reverse indexes
#[derive(Debug, Clone, Default)]
pub struct Program {
    classes: Vec<Class>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    vars: Vec<Var>,
    stmts: Vec<Stmt>,
    entry: Option<MethodId>,

    // Reverse indexes keyed by the *base* variable of the access.
    store_fields: FxHashMap<VarId, Vec<StmtId>>,
    load_fields: FxHashMap<VarId, Vec<StmtId>>,
    store_arrays: FxHashMap<VarId, Vec<StmtId>>,
    load_arrays: FxHashMap<VarId, Vec<StmtId>>,
    invokes: FxHashMap<VarId, Vec<StmtId>>,
}

const NO_STMTS: &[StmtId] = &[];

impl Program {
    #[inline]
    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id as usize]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id as usize]
    }

    #[inline]
    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id as usize]
    }

    #[inline]
    pub fn var(&self, id: VarId) -> &Var {
        &self.vars[id as usize]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id as usize]
    }

    #[inline]
    pub fn entry(&self) -> MethodId {
        self.entry.expect("program has a validated entry method")
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn stmts(&self) -> impl Iterator<Item = &Stmt> {
        self.stmts.iter()
    }

    pub fn num_stmts(&self) -> usize {
        self.stmts.len()
    }

    /// True when the variable's static type is tracked by the integer lattice
    #[inline]
    pub fn can_hold_int(&self, var: VarId) -> bool {
        self.var(var).ty.can_hold_int()
    }

    /// Instance field stores whose base is `var` (`var.f = x`)
    pub fn store_fields_of(&self, var: VarId) -> &[StmtId] {
        self.store_fields.get(&var).map_or(NO_STMTS, Vec::as_slice)
    }

    /// Instance field loads whose base is `var` (`x = var.f`)
    pub fn load_fields_of(&self, var: VarId) -> &[StmtId] {
        self.load_fields.get(&var).map_or(NO_STMTS, Vec::as_slice)
    }

    /// Array stores whose base is `var` (`var[i] = x`)
    pub fn store_arrays_of(&self, var: VarId) -> &[StmtId] {
        self.store_arrays.get(&var).map_or(NO_STMTS, Vec::as_slice)
    }

    /// Array loads whose base is `var` (`x = var[i]`)
    pub fn load_arrays_of(&self, var: VarId) -> &[StmtId] {
        self.load_arrays.get(&var).map_or(NO_STMTS, Vec::as_slice)
    }

    /// Instance invokes whose receiver is `var` (`var.m(...)`)
    pub fn invokes_of(&self, var: VarId) -> &[StmtId] {
        self.invokes.get(&var).map_or(NO_STMTS, Vec::as_slice)
    }
}

/// Incremental program assembly with validation at `finish()`.
///
/// A dangling reference anywhere in the statement list is fatal: `finish`
/// reports the first offending statement and produces nothing.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&mut self, name: impl Into<String>, superclass: Option<ClassId>) -> ClassId {
        let id = self.program.classes.len() as ClassId;
        self.program.classes.push(Class {
            id,
            name: name.into(),
            superclass,
        });
        id
    }

    pub fn field(&mut self, class: ClassId, name: impl Into<String>, is_static: bool) -> FieldId {
        let id = self.program.fields.len() as FieldId;
        self.program.fields.push(Field {
            id,
            class,
            name: name.into(),
            is_static,
        });
        id
    }

    pub fn method(&mut self, class: ClassId, name: impl Into<String>, is_static: bool) -> MethodId {
        let id = self.program.methods.len() as MethodId;
        self.program.methods.push(Method {
            id,
            class,
            name: name.into(),
            params: Vec::new(),
            return_vars: Vec::new(),
            this_var: None,
            stmts: Vec::new(),
            is_static,
            is_abstract: false,
        });
        id
    }

    /// Declare a method with a body that is never analyzed (no implementation)
    pub fn abstract_method(&mut self, class: ClassId, name: impl Into<String>) -> MethodId {
        let id = self.method(class, name, false);
        self.program.methods[id as usize].is_abstract = true;
        id
    }

    pub fn var(&mut self, method: MethodId, name: impl Into<String>, ty: TypeKind) -> VarId {
        let id = self.program.vars.len() as VarId;
        self.program.vars.push(Var {
            id,
            method,
            name: name.into(),
            ty,
        });
        id
    }

    /// Create a variable and append it to the method's parameter list
    pub fn param(&mut self, method: MethodId, name: impl Into<String>, ty: TypeKind) -> VarId {
        let v = self.var(method, name, ty);
        self.program.methods[method as usize].params.push(v);
        v
    }

    /// Create the receiver variable of an instance method
    pub fn this(&mut self, method: MethodId, ty: TypeKind) -> VarId {
        let v = self.var(method, "this", ty);
        self.program.methods[method as usize].this_var = Some(v);
        v
    }

    pub fn stmt(&mut self, method: MethodId, kind: StmtKind) -> StmtId {
        let id = self.program.stmts.len() as StmtId;
        self.program.stmts.push(Stmt { id, method, kind });
        self.program.methods[method as usize].stmts.push(id);
        id
    }

    pub fn entry(&mut self, method: MethodId) {
        self.program.entry = Some(method);
    }

    /// Validate, build reverse indexes and seal the program.
    pub fn finish(mut self) -> Result<Program> {
        self.validate()?;
        self.index();
        Ok(self.program)
    }

    fn validate(&self) -> Result<()> {
        let p = &self.program;
        match p.entry {
            None => return Err(ClassflowError::analysis("no entry method set")),
            Some(m) if m as usize >= p.methods.len() => {
                return Err(ClassflowError::analysis("entry method does not exist"))
            }
            _ => {}
        }
        for stmt in &p.stmts {
            self.validate_stmt(stmt)?;
        }
        Ok(())
    }

    fn validate_stmt(&self, stmt: &Stmt) -> Result<()> {
        let p = &self.program;
        let check_var = |v: VarId| -> Result<()> {
            let var = p
                .vars
                .get(v as usize)
                .ok_or_else(|| ClassflowError::malformed(stmt.id, format!("unknown variable {v}")))?;
            if var.method != stmt.method {
                return Err(ClassflowError::malformed(
                    stmt.id,
                    format!("variable `{}` belongs to another method", var.name),
                ));
            }
            Ok(())
        };
        let check_field = |f: FieldId| -> Result<()> {
            if f as usize >= p.fields.len() {
                return Err(ClassflowError::malformed(stmt.id, format!("unknown field {f}")));
            }
            Ok(())
        };
        let check_class = |c: ClassId| -> Result<()> {
            if c as usize >= p.classes.len() {
                return Err(ClassflowError::malformed(stmt.id, format!("unknown class {c}")));
            }
            Ok(())
        };

        if let Some(d) = stmt.kind.def_var() {
            check_var(d)?;
        }
        let mut uses = Vec::new();
        stmt.kind.collect_uses(&mut uses);
        for u in uses {
            check_var(u)?;
        }
        match &stmt.kind {
            StmtKind::New { alloc, .. } => {
                if let Some(c) = alloc.class() {
                    check_class(c)?;
                }
            }
            StmtKind::StoreField { base, field, .. } | StmtKind::LoadField { base, field, .. } => {
                check_field(*field)?;
                let is_static_access = base.is_none();
                if p.fields[*field as usize].is_static != is_static_access {
                    return Err(ClassflowError::malformed(
                        stmt.id,
                        "static/instance field access mismatch",
                    ));
                }
            }
            StmtKind::Invoke(inv) => {
                check_class(inv.callee.class)?;
                if inv.args.len() != inv.callee.arity {
                    return Err(ClassflowError::malformed(
                        stmt.id,
                        "argument count does not match callee arity",
                    ));
                }
                if inv.kind.is_static() != inv.base.is_none() {
                    return Err(ClassflowError::malformed(
                        stmt.id,
                        "static invoke with receiver (or instance invoke without)",
                    ));
                }
            }
            StmtKind::Assign { rhs: Exp::Cast { to, .. }, .. } => check_class(*to)?,
            _ => {}
        }
        Ok(())
    }

    fn index(&mut self) {
        let p = &mut self.program;
        for stmt in &p.stmts {
            match &stmt.kind {
                StmtKind::StoreField { base: Some(b), .. } => {
                    p.store_fields.entry(*b).or_default().push(stmt.id)
                }
                StmtKind::LoadField { base: Some(b), .. } => {
                    p.load_fields.entry(*b).or_default().push(stmt.id)
                }
                StmtKind::StoreArray { base, .. } => {
                    p.store_arrays.entry(*base).or_default().push(stmt.id)
                }
                StmtKind::LoadArray { base, .. } => {
                    p.load_arrays.entry(*base).or_default().push(stmt.id)
                }
                StmtKind::Invoke(inv) => {
                    if let Some(b) = inv.base {
                        p.invokes.entry(b).or_default().push(stmt.id)
                    }
                }
                StmtKind::Return { value: Some(v) } => {
                    let m = &mut p.methods[stmt.method as usize];
                    if !m.return_vars.contains(v) {
                        m.return_vars.push(*v);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Class hierarchy with per-class method tables; resolves virtual dispatch.
#[derive(Debug, Clone)]
pub struct ClassHierarchy {
    superclass: Vec<Option<ClassId>>,
    /// class -> (name, arity) -> method declared in that class
    tables: Vec<FxHashMap<(String, usize), MethodId>>,
}

impl ClassHierarchy {
    pub fn build(program: &Program) -> Self {
        let superclass = program.classes().map(|c| c.superclass).collect();
        let mut tables: Vec<FxHashMap<(String, usize), MethodId>> =
            vec![FxHashMap::default(); program.classes().count()];
        for m in program.methods() {
            tables[m.class as usize].insert((m.name.clone(), m.arity()), m.id);
        }
        Self { superclass, tables }
    }

    /// Walk the superclass chain from `class` looking for a method matching
    /// the reference. The first declaration found wins.
    fn lookup(&self, class: ClassId, name: &str, arity: usize) -> Option<MethodId> {
        let mut cur = Some(class);
        let key = (name.to_string(), arity);
        while let Some(c) = cur {
            if let Some(&m) = self.tables[c as usize].get(&key) {
                return Some(m);
            }
            cur = self.superclass[c as usize];
        }
        None
    }

    /// Resolve the declared target of a method reference, ignoring any
    /// receiver. Used for static calls and for matching taint configuration
    /// entries against call sites.
    pub fn resolve_ref(&self, mref: &MethodRef) -> Option<MethodId> {
        self.lookup(mref.class, &mref.name, mref.arity)
    }

    /// Resolve the callee of a call site given the runtime class of the
    /// receiver object. Returns `None` when dispatch fails (no declaration,
    /// or the found declaration is abstract); the caller drops the call edge.
    pub fn resolve_callee(
        &self,
        program: &Program,
        recv_class: Option<ClassId>,
        invoke: &Invoke,
    ) -> Option<MethodId> {
        let found = match invoke.kind {
            CallKind::Static | CallKind::Special => self.resolve_ref(&invoke.callee),
            CallKind::Virtual | CallKind::Interface | CallKind::Dynamic => {
                let recv = recv_class?;
                self.lookup(recv, &invoke.callee.name, invoke.callee.arity)
            }
        }?;
        if program.method(found).is_abstract {
            None
        } else {
            Some(found)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_program() -> (ProgramBuilder, MethodId, VarId) {
        let mut b = ProgramBuilder::new();
        let c = b.class("Main", None);
        let main = b.method(c, "main", true);
        let x = b.var(main, "x", TypeKind::Int);
        b.entry(main);
        (b, main, x)
    }

    #[test]
    fn test_builder_roundtrip() {
        let (mut b, main, x) = tiny_program();
        let s = b.stmt(main, StmtKind::Assign { lhs: x, rhs: Exp::IntLiteral(7) });
        let p = b.finish().expect("valid program");
        assert_eq!(p.entry(), main);
        assert_eq!(p.stmt(s).method, main);
        assert!(p.can_hold_int(x));
    }

    #[test]
    fn test_cross_method_var_is_malformed() {
        let (mut b, main, _) = tiny_program();
        let c2 = b.class("Other", None);
        let other = b.method(c2, "f", true);
        let y = b.var(other, "y", TypeKind::Int);
        b.stmt(main, StmtKind::Assign { lhs: y, rhs: Exp::IntLiteral(0) });
        let err = b.finish().unwrap_err();
        assert!(matches!(err, ClassflowError::MalformedIr { .. }));
    }

    #[test]
    fn test_unknown_var_is_malformed() {
        let (mut b, main, x) = tiny_program();
        b.stmt(main, StmtKind::Copy { lhs: x, rhs: 99 });
        assert!(b.finish().is_err());
    }

    #[test]
    fn test_arity_mismatch_is_malformed() {
        let (mut b, main, _) = tiny_program();
        let c = b.class("A", None);
        b.stmt(
            main,
            StmtKind::Invoke(Invoke {
                result: None,
                callee: MethodRef::new(c, "m", 2),
                base: None,
                args: vec![],
                kind: CallKind::Static,
            }),
        );
        assert!(b.finish().is_err());
    }

    #[test]
    fn test_reverse_indexes() {
        let mut b = ProgramBuilder::new();
        let c = b.class("A", None);
        let f = b.field(c, "f", false);
        let main = b.method(c, "main", true);
        let a = b.var(main, "a", TypeKind::Reference(c));
        let x = b.var(main, "x", TypeKind::Reference(c));
        b.entry(main);
        let st = b.stmt(main, StmtKind::StoreField { base: Some(a), field: f, rhs: x });
        let ld = b.stmt(main, StmtKind::LoadField { lhs: x, base: Some(a), field: f });
        let p = b.finish().unwrap();
        assert_eq!(p.store_fields_of(a), &[st]);
        assert_eq!(p.load_fields_of(a), &[ld]);
        assert!(p.store_fields_of(x).is_empty());
    }

    #[test]
    fn test_return_vars_collected() {
        let mut b = ProgramBuilder::new();
        let c = b.class("A", None);
        let m = b.method(c, "f", true);
        let r = b.var(m, "r", TypeKind::Int);
        b.stmt(m, StmtKind::Return { value: Some(r) });
        b.stmt(m, StmtKind::Return { value: Some(r) });
        b.entry(m);
        let p = b.finish().unwrap();
        assert_eq!(p.method(m).return_vars, vec![r]);
    }

    #[test]
    fn test_dispatch_walks_superclass_chain() {
        let mut b = ProgramBuilder::new();
        let a = b.class("A", None);
        let bb = b.class("B", Some(a));
        let m_a = b.method(a, "m", false);
        b.this(m_a, TypeKind::Reference(a));
        let main = b.method(a, "main", true);
        let recv = b.var(main, "recv", TypeKind::Reference(a));
        b.entry(main);
        let p = b.finish().unwrap();
        let ch = ClassHierarchy::build(&p);

        let inv = Invoke {
            result: None,
            callee: MethodRef::new(a, "m", 0),
            base: Some(recv),
            args: vec![],
            kind: CallKind::Virtual,
        };
        // B declares no m; dispatch on B finds A.m
        assert_eq!(ch.resolve_callee(&p, Some(bb), &inv), Some(m_a));
        // no receiver class for a virtual call: unresolved
        assert_eq!(ch.resolve_callee(&p, None, &inv), None);
    }

    #[test]
    fn test_dispatch_override_shadows_super() {
        let mut b = ProgramBuilder::new();
        let a = b.class("A", None);
        let bb = b.class("B", Some(a));
        let m_a = b.method(a, "m", false);
        b.this(m_a, TypeKind::Reference(a));
        let m_b = b.method(bb, "m", false);
        b.this(m_b, TypeKind::Reference(bb));
        let main = b.method(a, "main", true);
        let recv = b.var(main, "recv", TypeKind::Reference(a));
        b.entry(main);
        let p = b.finish().unwrap();
        let ch = ClassHierarchy::build(&p);

        let inv = Invoke {
            result: None,
            callee: MethodRef::new(a, "m", 0),
            base: Some(recv),
            args: vec![],
            kind: CallKind::Virtual,
        };
        assert_eq!(ch.resolve_callee(&p, Some(bb), &inv), Some(m_b));
        assert_eq!(ch.resolve_callee(&p, Some(a), &inv), Some(m_a));
    }

    #[test]
    fn test_abstract_target_is_unresolved() {
        let mut b = ProgramBuilder::new();
        let a = b.class("A", None);
        b.abstract_method(a, "m");
        let main = b.method(a, "main", true);
        let recv = b.var(main, "recv", TypeKind::Reference(a));
        b.entry(main);
        let p = b.finish().unwrap();
        let ch = ClassHierarchy::build(&p);
        let inv = Invoke {
            result: None,
            callee: MethodRef::new(a, "m", 0),
            base: Some(recv),
            args: vec![],
            kind: CallKind::Virtual,
        };
        assert_eq!(ch.resolve_callee(&p, Some(a), &inv), None);
    }
}
