// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Thunk-compiled evaluator.
//!
//! An [`ast::Expr`] compiles once into a tree of closures. Evaluating the resulting [`Expression`]
//! against a [`Session`] runs those closures; no tree walking happens at run time.

pub mod aggregate;
pub mod ast;
pub mod compile;
pub mod environment;
pub mod function;
pub mod options;
pub mod session;
pub mod signal;
pub mod statement;
pub mod thunk;

pub use compile::{Compiler, Expression, compile};
pub use environment::Environment;
pub use function::{CallError, CallResult, ExprFunction, FunctionSignature, Functions};
pub use options::{CompileOptions, ErrorHandler, ProjectionIterationBehavior, TypingMode, UndefinedVariableBehavior};
pub use session::{Session, SessionBuilder};
pub use statement::{Output, Program, Statement};
