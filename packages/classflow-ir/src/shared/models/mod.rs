//! Shared program model consumed by every analysis feature.

pub mod cfg;
pub mod icfg;
pub mod ir;

pub use cfg::{Cfg, CfgEdge, CfgEdgeKind};
pub use icfg::{Icfg, IcfgEdge, IcfgEdgeKind};
pub use ir::{
    BinaryOp, CallKind, Class, ClassHierarchy, ClassId, Exp, Field, FieldId, Invoke, Method,
    MethodId, MethodRef, NewKind, Program, ProgramBuilder, Stmt, StmtId, StmtKind, TypeKind, Var,
    VarId,
};
