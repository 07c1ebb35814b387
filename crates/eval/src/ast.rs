// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Syntax tree consumed by the compiler.
//!
//! The tree is produced by a parser outside this crate. Every node carries [`Meta`] with the source
//! fragment used for error reporting and an optional declared integer width.

use quill_value::{BindingCase, BindingName, Fragment, Time, Type, Value, bag::BagOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
	W8,
	W16,
	W32,
	W64,
}

impl IntWidth {
	pub fn bits(&self) -> u32 {
		match self {
			IntWidth::W8 => 8,
			IntWidth::W16 => 16,
			IntWidth::W32 => 32,
			IntWidth::W64 => 64,
		}
	}

	pub fn contains(&self, value: i64) -> bool {
		match self {
			IntWidth::W8 => i8::try_from(value).is_ok(),
			IntWidth::W16 => i16::try_from(value).is_ok(),
			IntWidth::W32 => i32::try_from(value).is_ok(),
			IntWidth::W64 => true,
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct Meta {
	pub fragment: Fragment,
	pub int_width: Option<IntWidth>,
}

#[derive(Debug, Clone)]
pub struct Expr {
	pub kind: ExprKind,
	pub meta: Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
	Not,
	Plus,
	Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaryOp {
	Add,
	Sub,
	Mul,
	Div,
	Mod,
	Concat,
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	And,
	Or,
}

impl NaryOp {
	pub fn as_str(&self) -> &'static str {
		match self {
			NaryOp::Add => "+",
			NaryOp::Sub => "-",
			NaryOp::Mul => "*",
			NaryOp::Div => "/",
			NaryOp::Mod => "%",
			NaryOp::Concat => "||",
			NaryOp::Eq => "=",
			NaryOp::Ne => "<>",
			NaryOp::Lt => "<",
			NaryOp::Le => "<=",
			NaryOp::Gt => ">",
			NaryOp::Ge => ">=",
			NaryOp::And => "AND",
			NaryOp::Or => "OR",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
	/// Resolved through the current bindings view.
	Unqualified,
	/// `@name`: local bindings first.
	LocalsFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
	Count,
	Sum,
	Avg,
	Min,
	Max,
}

impl AggregateFunc {
	pub fn as_str(&self) -> &'static str {
		match self {
			AggregateFunc::Count => "COUNT",
			AggregateFunc::Sum => "SUM",
			AggregateFunc::Avg => "AVG",
			AggregateFunc::Min => "MIN",
			AggregateFunc::Max => "MAX",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetQuantifier {
	#[default]
	All,
	Distinct,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
	Literal(Value),
	/// `TIME [WITH TIME ZONE] '...'`; a zoned literal without an offset takes the session default.
	Time {
		time: Time,
		with_time_zone: bool,
	},
	Variable {
		name: String,
		case: BindingCase,
		scope: VariableScope,
	},
	/// 1-based positional parameter.
	Parameter(usize),
	Unary {
		op: UnaryOp,
		operand: Box<Expr>,
	},
	Nary {
		op: NaryOp,
		operands: Vec<Expr>,
	},
	Between {
		value: Box<Expr>,
		from: Box<Expr>,
		to: Box<Expr>,
		negated: bool,
	},
	/// `IS [NOT] <type>`; `Type::Null` tests for either unknown.
	Is {
		value: Box<Expr>,
		ty: Type,
		negated: bool,
	},
	Like {
		value: Box<Expr>,
		pattern: Box<Expr>,
		escape: Option<Box<Expr>>,
		negated: bool,
	},
	In {
		value: Box<Expr>,
		collection: Box<Expr>,
		negated: bool,
	},
	NullIf(Box<Expr>, Box<Expr>),
	Coalesce(Vec<Expr>),
	SimpleCase {
		value: Box<Expr>,
		branches: Vec<(Expr, Expr)>,
		default: Option<Box<Expr>>,
	},
	SearchedCase {
		branches: Vec<(Expr, Expr)>,
		default: Option<Box<Expr>>,
	},
	Path {
		root: Box<Expr>,
		steps: Vec<PathStep>,
	},
	List(Vec<Expr>),
	Sexp(Vec<Expr>),
	Bag(Vec<Expr>),
	Struct(Vec<(Expr, Expr)>),
	Call {
		name: String,
		args: Vec<Expr>,
	},
	/// `arg` is `None` for `COUNT(*)`.
	Aggregate {
		func: AggregateFunc,
		quantifier: SetQuantifier,
		arg: Option<Box<Expr>>,
	},
	BagOp {
		op: BagOp,
		quantifier: SetQuantifier,
		left: Box<Expr>,
		right: Box<Expr>,
	},
	Select(Box<Select>),
}

#[derive(Debug, Clone)]
pub enum PathStep {
	/// `.name` or `."Name"`.
	Field(BindingName),
	/// `[expr]`: an int indexes a list or sexp, text names a struct field case-sensitively.
	Index(Expr),
	/// `[*]`
	Wildcard,
	/// `.*`
	Unpivot,
}

#[derive(Debug, Clone)]
pub struct Select {
	pub quantifier: SetQuantifier,
	pub projection: Projection,
	pub from: FromSource,
	pub lets: Vec<(Expr, String)>,
	pub filter: Option<Expr>,
	pub group_by: Option<GroupBy>,
	pub having: Option<Expr>,
	pub order_by: Vec<SortSpec>,
	pub limit: Option<Expr>,
	pub offset: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum Projection {
	/// `SELECT VALUE expr`
	Value(Expr),
	List(Vec<ProjectItem>),
	/// `SELECT *`
	Star,
}

#[derive(Debug, Clone)]
pub enum ProjectItem {
	Expr {
		expr: Expr,
		alias: Option<String>,
	},
	/// `expr.*`
	All(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
	Inner,
	Left,
	Right,
	Full,
}

#[derive(Debug, Clone)]
pub enum FromSource {
	Scan {
		expr: Expr,
		alias: Option<String>,
		at: Option<String>,
		by: Option<String>,
	},
	Unpivot {
		expr: Expr,
		alias: Option<String>,
		at: Option<String>,
	},
	/// Lateral join; a cross join is an inner join without condition.
	Join {
		kind: JoinKind,
		left: Box<FromSource>,
		right: Box<FromSource>,
		condition: Option<Expr>,
	},
}

#[derive(Debug, Clone)]
pub struct GroupBy {
	pub keys: Vec<(Expr, Option<String>)>,
	pub group_as: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
	#[default]
	Asc,
	Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
	First,
	Last,
}

#[derive(Debug, Clone)]
pub struct SortSpec {
	pub expr: Expr,
	pub order: SortOrder,
	pub nulls: Option<NullsOrder>,
}

impl SortSpec {
	/// `ASC` puts unknowns last and `DESC` puts them first unless stated otherwise.
	pub fn nulls_first(&self) -> bool {
		match (self.nulls, self.order) {
			(Some(nulls), _) => nulls == NullsOrder::First,
			(None, SortOrder::Asc) => false,
			(None, SortOrder::Desc) => true,
		}
	}
}

impl Expr {
	pub fn new(kind: ExprKind) -> Self {
		Self {
			kind,
			meta: Meta::default(),
		}
	}

	pub fn at(mut self, fragment: Fragment) -> Self {
		self.meta.fragment = fragment;
		self
	}

	pub fn with_width(mut self, width: IntWidth) -> Self {
		self.meta.int_width = Some(width);
		self
	}

	pub fn lit(value: impl Into<Value>) -> Self {
		Self::new(ExprKind::Literal(value.into()))
	}

	pub fn missing() -> Self {
		Self::lit(Value::missing())
	}

	pub fn null() -> Self {
		Self::lit(Value::null())
	}

	/// Case-insensitive unqualified variable.
	pub fn var(name: impl Into<String>) -> Self {
		Self::new(ExprKind::Variable {
			name: name.into(),
			case: BindingCase::Insensitive,
			scope: VariableScope::Unqualified,
		})
	}

	pub fn local(name: impl Into<String>) -> Self {
		Self::new(ExprKind::Variable {
			name: name.into(),
			case: BindingCase::Insensitive,
			scope: VariableScope::LocalsFirst,
		})
	}

	pub fn param(ordinal: usize) -> Self {
		Self::new(ExprKind::Parameter(ordinal))
	}

	pub fn unary(op: UnaryOp, operand: Expr) -> Self {
		Self::new(ExprKind::Unary {
			op,
			operand: Box::new(operand),
		})
	}

	pub fn nary(op: NaryOp, operands: Vec<Expr>) -> Self {
		Self::new(ExprKind::Nary {
			op,
			operands,
		})
	}

	pub fn binary(op: NaryOp, left: Expr, right: Expr) -> Self {
		Self::nary(op, vec![left, right])
	}

	pub fn like(value: Expr, pattern: Expr, escape: Option<Expr>) -> Self {
		Self::new(ExprKind::Like {
			value: Box::new(value),
			pattern: Box::new(pattern),
			escape: escape.map(Box::new),
			negated: false,
		})
	}

	pub fn in_collection(value: Expr, collection: Expr) -> Self {
		Self::new(ExprKind::In {
			value: Box::new(value),
			collection: Box::new(collection),
			negated: false,
		})
	}

	pub fn path(root: Expr, steps: Vec<PathStep>) -> Self {
		Self::new(ExprKind::Path {
			root: Box::new(root),
			steps,
		})
	}

	pub fn list(items: Vec<Expr>) -> Self {
		Self::new(ExprKind::List(items))
	}

	pub fn bag(items: Vec<Expr>) -> Self {
		Self::new(ExprKind::Bag(items))
	}

	pub fn structure(fields: Vec<(&str, Expr)>) -> Self {
		Self::new(ExprKind::Struct(fields.into_iter().map(|(name, value)| (Self::lit(name), value)).collect()))
	}

	pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
		Self::new(ExprKind::Call {
			name: name.into(),
			args,
		})
	}

	pub fn aggregate(func: AggregateFunc, quantifier: SetQuantifier, arg: Option<Expr>) -> Self {
		Self::new(ExprKind::Aggregate {
			func,
			quantifier,
			arg: arg.map(Box::new),
		})
	}

	pub fn select(select: Select) -> Self {
		Self::new(ExprKind::Select(Box::new(select)))
	}

	/// The name a select item or FROM source is known by when no alias is given.
	pub fn derived_name(&self) -> Option<&str> {
		match &self.kind {
			ExprKind::Variable {
				name,
				..
			} => Some(name),
			ExprKind::Path {
				steps,
				..
			} => match steps.last() {
				Some(PathStep::Field(name)) => Some(name.text()),
				Some(PathStep::Index(Expr {
					kind: ExprKind::Literal(value),
					..
				})) => value.as_text(),
				_ => None,
			},
			_ => None,
		}
	}
}

impl PathStep {
	pub fn field(name: &str) -> Self {
		PathStep::Field(BindingName::insensitive(name))
	}

	pub fn quoted(name: &str) -> Self {
		PathStep::Field(BindingName::sensitive(name))
	}
}

impl Select {
	/// `SELECT VALUE <projection> FROM <expr> AS <alias>` with every other clause empty.
	pub fn value(projection: Expr, from: Expr, alias: &str) -> Self {
		Self {
			quantifier: SetQuantifier::All,
			projection: Projection::Value(projection),
			from: FromSource::Scan {
				expr: from,
				alias: Some(alias.to_string()),
				at: None,
				by: None,
			},
			lets: vec![],
			filter: None,
			group_by: None,
			having: None,
			order_by: vec![],
			limit: None,
			offset: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_int_width() {
		assert!(IntWidth::W8.contains(127));
		assert!(!IntWidth::W8.contains(128));
		assert!(IntWidth::W16.contains(-32768));
		assert!(!IntWidth::W32.contains(i64::from(i32::MAX) + 1));
		assert!(IntWidth::W64.contains(i64::MIN));
	}

	#[test]
	fn test_default_null_ordering() {
		let spec = |order, nulls| SortSpec {
			expr: Expr::var("x"),
			order,
			nulls,
		};
		assert!(!spec(SortOrder::Asc, None).nulls_first());
		assert!(spec(SortOrder::Desc, None).nulls_first());
		assert!(spec(SortOrder::Asc, Some(NullsOrder::First)).nulls_first());
	}

	#[test]
	fn test_derived_names() {
		assert_eq!(Expr::var("t").derived_name(), Some("t"));
		assert_eq!(Expr::path(Expr::var("t"), vec![PathStep::field("a")]).derived_name(), Some("a"));
		assert_eq!(Expr::path(Expr::var("t"), vec![PathStep::Wildcard]).derived_name(), None);
		assert_eq!(Expr::lit(1i64).derived_name(), None);
	}
}
