//! Symbolic expressions representing dimension sizes.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul};
use std::sync::Arc;

/// A named dimension size.
///
/// Two symbols are equal if they have the same name.
#[derive(Clone)]
pub struct Symbol {
    pub name: String,
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Symbol) -> bool {
        self.name == other.name
    }
}

impl Eq for Symbol {}

/// Symbolic expression for the size of a dimension.
///
/// Expressions are either known integer values, named symbols or compositions
/// of these. Use [`simplify`](DimExpr::simplify) to obtain a canonical form and
/// [`is_equal`](DimExpr::is_equal) to test whether two expressions are provably
/// equal.
#[derive(Clone)]
pub enum DimExpr {
    /// Dimension with a known size.
    Value(i64),
    /// Named size.
    Var(Arc<Symbol>),
    /// Sum of two sizes.
    Add(Arc<DimExpr>, Arc<DimExpr>),
    /// Product of two sizes.
    Mul(Arc<DimExpr>, Arc<DimExpr>),
    /// Maximum of two sizes.
    Max(Arc<DimExpr>, Arc<DimExpr>),
    /// Result of broadcasting two sizes against each other.
    ///
    /// This behaves like `Max`, except it implies both sizes are either equal
    /// or 1.
    Broadcast(Arc<DimExpr>, Arc<DimExpr>),
}

/// Associative and commutative operations which are flattened and re-ordered
/// during simplification.
#[derive(Copy, Clone)]
enum Assoc {
    Add,
    Mul,
    Max,
    Broadcast,
}

impl Assoc {
    fn operands<'a>(self, expr: &'a DimExpr) -> Option<(&'a DimExpr, &'a DimExpr)> {
        match (self, expr) {
            (Assoc::Add, DimExpr::Add(lhs, rhs))
            | (Assoc::Mul, DimExpr::Mul(lhs, rhs))
            | (Assoc::Max, DimExpr::Max(lhs, rhs))
            | (Assoc::Broadcast, DimExpr::Broadcast(lhs, rhs)) => Some((lhs, rhs)),
            _ => None,
        }
    }

    fn combine(self, lhs: DimExpr, rhs: DimExpr) -> DimExpr {
        let (lhs, rhs) = (Arc::new(lhs), Arc::new(rhs));
        match self {
            Assoc::Add => DimExpr::Add(lhs, rhs),
            Assoc::Mul => DimExpr::Mul(lhs, rhs),
            Assoc::Max => DimExpr::Max(lhs, rhs),
            Assoc::Broadcast => DimExpr::Broadcast(lhs, rhs),
        }
    }

    /// Collect the simplified terms of a nested expression of this kind.
    ///
    /// Terms which simplify to the same kind of expression are flattened too,
    /// so `(a * 1) * (b * c)` yields `[a, b, c]`.
    fn flatten(self, expr: &DimExpr, terms: &mut Vec<DimExpr>) {
        if let Some((lhs, rhs)) = self.operands(expr) {
            self.flatten(lhs, terms);
            self.flatten(rhs, terms);
            return;
        }
        let term = expr.simplify();
        if self.operands(&term).is_some() {
            self.flatten(&term, terms);
        } else {
            terms.push(term);
        }
    }
}

impl DimExpr {
    /// Create a named symbol representing a size.
    pub fn symbol(name: &str) -> DimExpr {
        DimExpr::Var(
            Symbol {
                name: name.to_string(),
            }
            .into(),
        )
    }

    /// Return the known value of this expression, if it is a literal.
    ///
    /// Call [`simplify`](Self::simplify) first to fold constant expressions.
    pub fn as_value(&self) -> Option<i64> {
        match self {
            Self::Value(x) => Some(*x),
            _ => None,
        }
    }

    /// Return the maximum of `self` and `other`.
    pub fn max(&self, other: &DimExpr) -> DimExpr {
        Self::Max(self.clone().into(), other.clone().into())
    }

    /// Return the result of broadcasting `self` and `other`.
    pub fn broadcast(&self, other: &DimExpr) -> DimExpr {
        Self::Broadcast(self.clone().into(), other.clone().into())
    }

    /// Return the canonical form of this expression.
    ///
    /// Nested sums, products, maximums and broadcasts are flattened, constant
    /// terms are folded into a single leading value, identities are removed
    /// and the remaining terms are sorted into a canonical order. Two
    /// expressions which are equal under these rules have structurally equal
    /// canonical forms.
    ///
    /// If folding the constants of a sum or product would overflow `i64`, the
    /// constants are left unfolded, in ascending order, ahead of the symbolic
    /// terms.
    ///
    /// Multiplication is not distributed over addition, so `2 * (x + 1)` and
    /// `2 * x + 2` have different canonical forms.
    pub fn simplify(&self) -> DimExpr {
        match self {
            Self::Value(_) | Self::Var(_) => self.clone(),
            Self::Add(..) => {
                let mut terms = Vec::new();
                Assoc::Add.flatten(self, &mut terms);
                let (values, terms) = split_values(terms);
                let terms = fold_values(values, terms, 0, i64::checked_add);
                rebuild(Assoc::Add, terms, 0)
            }
            Self::Mul(..) => {
                let mut terms = Vec::new();
                Assoc::Mul.flatten(self, &mut terms);
                let (values, terms) = split_values(terms);
                if values.contains(&0) {
                    return DimExpr::Value(0);
                }
                let terms = fold_values(values, terms, 1, i64::checked_mul);
                rebuild(Assoc::Mul, terms, 1)
            }
            Self::Max(..) => {
                let mut terms = Vec::new();
                Assoc::Max.flatten(self, &mut terms);
                let (values, mut terms) = split_values(terms);
                if let Some(max) = values.into_iter().max() {
                    terms.insert(0, DimExpr::Value(max));
                }
                terms.dedup();
                rebuild(Assoc::Max, terms, i64::MIN)
            }
            Self::Broadcast(..) => {
                let mut terms = Vec::new();
                Assoc::Broadcast.flatten(self, &mut terms);
                terms.retain(|t| t.as_value() != Some(1));

                // A fixed size other than 1 determines the result, since all
                // other sizes must either match it or be 1.
                if let Some(size) = terms.iter().find_map(|t| t.as_value()) {
                    return DimExpr::Value(size);
                }
                terms.sort_by(cmp_canonical);
                terms.dedup();
                rebuild(Assoc::Broadcast, terms, 1)
            }
        }
    }

    /// Return true if `self` and `other` are provably equal.
    ///
    /// Both expressions are simplified and their canonical forms compared.
    /// Symbols are never evaluated, so `false` means "not provably equal"
    /// rather than "provably different".
    pub fn is_equal(&self, other: &DimExpr) -> bool {
        self.simplify() == other.simplify()
    }

    /// Return the precedence of the operator, for adding parentheses when
    /// formatting.
    fn precedence(&self) -> u8 {
        match self {
            Self::Value(_) | Self::Var(_) | Self::Max(..) | Self::Broadcast(..) => 3,
            Self::Mul(..) => 2,
            Self::Add(..) => 1,
        }
    }

    fn variant_order(&self) -> u8 {
        match self {
            Self::Value(_) => 0,
            Self::Var(_) => 1,
            Self::Add(..) => 2,
            Self::Mul(..) => 3,
            Self::Max(..) => 4,
            Self::Broadcast(..) => 5,
        }
    }
}

/// Separate literal values from symbolic terms.
///
/// The symbolic terms are returned in canonical order.
fn split_values(terms: Vec<DimExpr>) -> (Vec<i64>, Vec<DimExpr>) {
    let mut values = Vec::new();
    let mut rest = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            DimExpr::Value(x) => values.push(x),
            other => rest.push(other),
        }
    }
    rest.sort_by(cmp_canonical);
    (values, rest)
}

/// Fold literal `values` with `f` and prepend the result to `terms`, unless
/// it equals `identity`.
///
/// If folding overflows, the non-identity values are prepended in ascending
/// order instead.
fn fold_values(
    mut values: Vec<i64>,
    mut terms: Vec<DimExpr>,
    identity: i64,
    f: impl Fn(i64, i64) -> Option<i64>,
) -> Vec<DimExpr> {
    match values.iter().try_fold(identity, |acc, &x| f(acc, x)) {
        Some(folded) if folded == identity => {}
        Some(folded) => terms.insert(0, DimExpr::Value(folded)),
        None => {
            values.retain(|&x| x != identity);
            values.sort_unstable();
            let mut unfolded: Vec<DimExpr> = values.into_iter().map(DimExpr::Value).collect();
            unfolded.append(&mut terms);
            terms = unfolded;
        }
    }
    terms
}

/// Fold canonically ordered terms back into a left-associated expression.
fn rebuild(op: Assoc, terms: Vec<DimExpr>, identity: i64) -> DimExpr {
    terms
        .into_iter()
        .reduce(|acc, term| op.combine(acc, term))
        .unwrap_or(DimExpr::Value(identity))
}

/// Total order over expressions, used to sort the terms of associative
/// operations into canonical order.
///
/// Values sort first, then symbols by name, then composite expressions.
fn cmp_canonical(a: &DimExpr, b: &DimExpr) -> Ordering {
    use DimExpr::*;
    match (a, b) {
        (Value(x), Value(y)) => x.cmp(y),
        (Var(x), Var(y)) => x.name.cmp(&y.name),
        (Add(a0, a1), Add(b0, b1))
        | (Mul(a0, a1), Mul(b0, b1))
        | (Max(a0, a1), Max(b0, b1))
        | (Broadcast(a0, a1), Broadcast(b0, b1)) => {
            cmp_canonical(a0, b0).then_with(|| cmp_canonical(a1, b1))
        }
        _ => a.variant_order().cmp(&b.variant_order()),
    }
}

impl PartialEq<DimExpr> for DimExpr {
    fn eq(&self, other: &DimExpr) -> bool {
        let commutative_eq = |a: &DimExpr, b: &DimExpr, c: &DimExpr, d: &DimExpr| {
            (a == c && b == d) || (a == d && b == c)
        };

        match (self, other) {
            (Self::Value(x), Self::Value(y)) => x == y,
            (Self::Var(x), Self::Var(y)) => x == y,
            (Self::Add(a, b), Self::Add(c, d))
            | (Self::Mul(a, b), Self::Mul(c, d))
            | (Self::Max(a, b), Self::Max(c, d))
            | (Self::Broadcast(a, b), Self::Broadcast(c, d)) => commutative_eq(a, b, c, d),
            _ => false,
        }
    }
}

impl Add<DimExpr> for DimExpr {
    type Output = DimExpr;

    fn add(self, rhs: DimExpr) -> DimExpr {
        DimExpr::Add(self.into(), rhs.into())
    }
}

impl Mul<DimExpr> for DimExpr {
    type Output = DimExpr;

    fn mul(self, rhs: DimExpr) -> DimExpr {
        DimExpr::Mul(self.into(), rhs.into())
    }
}

impl From<Symbol> for DimExpr {
    fn from(val: Symbol) -> Self {
        DimExpr::Var(val.into())
    }
}

/// Create a symbol with a given name.
impl<'a> From<&'a str> for DimExpr {
    fn from(name: &'a str) -> Self {
        DimExpr::symbol(name)
    }
}

impl From<i64> for DimExpr {
    fn from(val: i64) -> Self {
        DimExpr::Value(val)
    }
}

impl From<i32> for DimExpr {
    fn from(val: i32) -> Self {
        DimExpr::Value(val as i64)
    }
}

impl fmt::Debug for DimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(sym) => write!(f, "\"{}\"", sym.name),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for DimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_operand = |f: &mut fmt::Formatter<'_>, expr: &DimExpr| {
            if expr.precedence() < self.precedence() {
                write!(f, "({})", expr)
            } else {
                write!(f, "{}", expr)
            }
        };
        let write_binop = |f: &mut fmt::Formatter<'_>, op: char, lhs: &DimExpr, rhs: &DimExpr| {
            write_operand(f, lhs)?;
            write!(f, " {op} ")?;
            write_operand(f, rhs)
        };
        match self {
            Self::Value(val) => write!(f, "{}", val),
            Self::Var(sym) => write!(f, "{}", sym.name),
            Self::Add(lhs, rhs) => write_binop(f, '+', lhs, rhs),
            Self::Mul(lhs, rhs) => write_binop(f, '*', lhs, rhs),
            Self::Max(lhs, rhs) => write!(f, "max({}, {})", lhs, rhs),
            Self::Broadcast(lhs, rhs) => write!(f, "broadcast({}, {})", lhs, rhs),
        }
    }
}
