use crate::{ConstructorError, OverrideError, RuntimeError};
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, PartialEq)]
/// A runtime value.
///
/// Fractions are kept normalized: the denominator is positive, numerator
/// and denominator are coprime, and a denominator of one never occurs (the
/// value becomes an [Integer](Value::Integer) instead). An array does not
/// own its elements; it records its size and the id of the first of its
/// contiguously allocated variable cells.
pub enum Value {
    Integer(i64),
    Fraction(i64, i64),
    Boolean(bool),
    Character(char),
    String(String),
    Array { size: usize, base: usize },
    /// A reference to one of the built-in types, usable as a constructor.
    Type(TypeName),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Names of the built-in constructible types.
pub enum TypeName {
    Integer,
    Fraction,
    Boolean,
    Character,
    String,
    Array,
}

impl TypeName {
    pub fn name(&self) -> &'static str {
        match self {
            TypeName::Integer => "Integer",
            TypeName::Fraction => "Fraction",
            TypeName::Boolean => "Boolean",
            TypeName::Character => "Character",
            TypeName::String => "String",
            TypeName::Array => "Array",
        }
    }

    pub fn from_name(name: &str) -> Option<TypeName> {
        let type_name = match name {
            "Integer" => TypeName::Integer,
            "Fraction" => TypeName::Fraction,
            "Boolean" => TypeName::Boolean,
            "Character" => TypeName::Character,
            "String" => TypeName::String,
            "Array" => TypeName::Array,
            _ => return None,
        };
        Some(type_name)
    }

    /// The delimiter its source literals are wrapped in, if any.
    pub fn delimiter(&self) -> &'static str {
        match self {
            TypeName::Character => "'",
            TypeName::String => "\"",
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
/// The outcome of a constructor call: a finished value, or a request to
/// allocate contiguous variable cells for an array.
pub enum Constructed {
    Value(Value),
    Alloc(usize),
}

#[derive(Debug)]
pub(crate) enum OpError {
    Zero,
    Overflow,
    Hook(OverrideError),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Fraction(_, _) => "Fraction",
            Value::Boolean(_) => "Boolean",
            Value::Character(_) => "Character",
            Value::String(_) => "String",
            Value::Array { .. } => "Array",
            Value::Type(_) => "Type",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Fraction(_, _))
    }

    /// View a numeric value as a ratio with positive denominator. Callers
    /// establish numericity first; anything else here is a broken hook
    /// contract.
    fn rational(&self, hook_name: &str) -> Result<(i128, i128), OpError> {
        match self {
            Value::Integer(n) => Ok((*n as i128, 1)),
            Value::Fraction(n, d) => Ok((*n as i128, *d as i128)),
            other => Err(OpError::Hook(OverrideError::new(
                other.type_name(),
                hook_name,
            ))),
        }
    }

    /// The incremented value, provided by numbers only.
    pub(crate) fn increment(&self) -> Option<Result<Value, OpError>> {
        if !self.is_numeric() {
            return None;
        }
        Some(rational_add(self, &Value::Integer(1), "inc"))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Fraction(num, den) => write!(f, "{}/{}", num, den),
            Value::Boolean(true) => write!(f, "true"),
            Value::Boolean(false) => write!(f, "false"),
            Value::Character(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{}", s),
            Value::Array { size, .. } => write!(f, "Array({})", size),
            Value::Type(t) => write!(f, "{}", t.name()),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Character(c) => write!(f, "'{}'", c),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array { size, base } => write!(f, "Array({},v{})", size, base),
            Value::Type(t) => write!(f, "<type {}>", t.name()),
            other => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    Concat,
    SpaceConcat,
    And,
    Or,
}

impl BinaryOp {
    fn from_source(operator: &str) -> Option<BinaryOp> {
        let op = match operator {
            "+" => BinaryOp::Plus,
            "-" => BinaryOp::Minus,
            "*" => BinaryOp::Times,
            "/" => BinaryOp::Divide,
            "mod" => BinaryOp::Mod,
            "=" => BinaryOp::Equal,
            "\\=" => BinaryOp::NotEqual,
            "<" => BinaryOp::LessThan,
            ">" => BinaryOp::GreaterThan,
            "<=" => BinaryOp::LessThanEqual,
            ">=" => BinaryOp::GreaterThanEqual,
            "|" => BinaryOp::Concat,
            "||" => BinaryOp::SpaceConcat,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

/// Apply a binary operator given by its source spelling.
///
/// Dispatch is two phase: the operator hook is looked up on the left
/// operand first; if it is absent or rejects the right operand's variant,
/// the reversed operator is tried on the right operand. Only when both
/// phases decline is the combination a type error.
pub fn apply_binary(operator: &str, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let op = match BinaryOp::from_source(operator) {
        Some(op) => op,
        None => {
            return Err(RuntimeError::new(format!(
                "Trying to apply unrecognized binary operator: {}",
                operator
            )))
        }
    };
    let outcome = forward(op, lhs, rhs).or_else(|| reverse(op, lhs, rhs));
    match outcome {
        Some(Ok(value)) => Ok(value),
        Some(Err(OpError::Zero)) => Err(RuntimeError::new(format!(
            "Attempting to take {} {} 0",
            lhs, operator
        ))),
        Some(Err(OpError::Overflow)) => Err(RuntimeError::new(format!(
            "Integer overflow while evaluating {} {} {}",
            lhs, operator, rhs
        ))),
        Some(Err(OpError::Hook(err))) => Err(err.into()),
        None => Err(RuntimeError::new(format!(
            "Wrong operand types for {}: {} and {}",
            operator,
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

/// Apply a unary operator given by its source spelling: `-` negation, `/`
/// fraction inversion, `not` boolean negation.
pub fn apply_unary(operator: &str, value: &Value) -> Result<Value, RuntimeError> {
    let outcome = match operator {
        "-" => negation_hook(value),
        "/" => inverse_hook(value),
        "not" => not_hook(value),
        _ => {
            return Err(RuntimeError::new(format!(
                "Trying to apply unrecognized unary operator: {}",
                operator
            )))
        }
    };
    match outcome {
        Some(Ok(result)) => Ok(result),
        Some(Err(OpError::Zero)) => Err(RuntimeError::new(format!(
            "Attempting to apply unary {} to 0",
            operator
        ))),
        Some(Err(OpError::Overflow)) => Err(RuntimeError::new(format!(
            "Integer overflow while applying unary {} to {}",
            operator, value
        ))),
        Some(Err(OpError::Hook(err))) => Err(err.into()),
        None => Err(RuntimeError::new(format!(
            "Wrong operand type for unary {}: {}",
            operator,
            value.type_name()
        ))),
    }
}

/// First dispatch phase: the operator hook of the left operand. [None]
/// means the hook does not exist for this variant or declines the right
/// operand, and the reverse phase should be consulted.
fn forward(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Result<Value, OpError>> {
    match op {
        BinaryOp::Plus => plus_hook(lhs, rhs),
        BinaryOp::Times => times_hook(lhs, rhs),
        BinaryOp::Minus => {
            if lhs.is_numeric() && rhs.is_numeric() {
                Some(rational_sub(lhs, rhs))
            } else {
                None
            }
        }
        BinaryOp::Divide => {
            if lhs.is_numeric() && rhs.is_numeric() {
                Some(rational_div(lhs, rhs))
            } else {
                None
            }
        }
        BinaryOp::Mod => {
            if lhs.is_numeric() && rhs.is_numeric() {
                Some(rational_mod(lhs, rhs))
            } else {
                None
            }
        }
        BinaryOp::Equal => Some(Ok(Value::Boolean(values_equal(lhs, rhs)))),
        BinaryOp::NotEqual => Some(Ok(Value::Boolean(!values_equal(lhs, rhs)))),
        BinaryOp::LessThan => Some(less_than(lhs, rhs)?.map(Value::Boolean)),
        BinaryOp::GreaterThan => {
            // not(x < y or x = y), a number hook
            if !lhs.is_numeric() {
                return None;
            }
            match less_than(lhs, rhs)? {
                Ok(lt) => Some(Ok(Value::Boolean(!(lt || values_equal(lhs, rhs))))),
                Err(err) => Some(Err(err)),
            }
        }
        BinaryOp::LessThanEqual => {
            if !lhs.is_numeric() {
                return None;
            }
            match less_than(lhs, rhs)? {
                Ok(lt) => Some(Ok(Value::Boolean(lt || values_equal(lhs, rhs)))),
                Err(err) => Some(Err(err)),
            }
        }
        BinaryOp::GreaterThanEqual => {
            if !lhs.is_numeric() {
                return None;
            }
            match less_than(lhs, rhs)? {
                Ok(lt) => Some(Ok(Value::Boolean(!lt))),
                Err(err) => Some(Err(err)),
            }
        }
        // concatenation with a space in between works on every value
        BinaryOp::Concat | BinaryOp::SpaceConcat => {
            Some(Ok(Value::String(format!("{} {}", lhs, rhs))))
        }
        BinaryOp::And => match (lhs, rhs) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(Ok(Value::Boolean(*a && *b))),
            _ => None,
        },
        BinaryOp::Or => match (lhs, rhs) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(Ok(Value::Boolean(*a || *b))),
            _ => None,
        },
    }
}

/// Second dispatch phase: the reversed operator on the right operand.
/// Comparisons map onto their mirrored hooks; the asymmetric arithmetic
/// operators map onto their conventional r-variants.
fn reverse(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Result<Value, OpError>> {
    match op {
        BinaryOp::Equal => forward(BinaryOp::Equal, rhs, lhs),
        BinaryOp::NotEqual => forward(BinaryOp::NotEqual, rhs, lhs),
        BinaryOp::LessThan => forward(BinaryOp::GreaterThan, rhs, lhs),
        BinaryOp::GreaterThan => forward(BinaryOp::LessThan, rhs, lhs),
        BinaryOp::LessThanEqual => forward(BinaryOp::GreaterThanEqual, rhs, lhs),
        BinaryOp::GreaterThanEqual => forward(BinaryOp::LessThanEqual, rhs, lhs),
        BinaryOp::Plus => {
            // y + x: strings concatenate from the left, numbers commute
            if let Value::String(s) = rhs {
                return Some(Ok(Value::String(format!("{}{}", lhs, s))));
            }
            if rhs.is_numeric() {
                plus_hook(rhs, lhs)
            } else {
                None
            }
        }
        BinaryOp::Minus => {
            // y - x is (-x) + y
            if !rhs.is_numeric() {
                return None;
            }
            let negated = match negation_hook(rhs)? {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            };
            plus_hook(&negated, lhs)
        }
        BinaryOp::Times => {
            if rhs.is_numeric() {
                times_hook(rhs, lhs)
            } else {
                None
            }
        }
        BinaryOp::Divide => {
            // y / x is (/x) * y
            if !rhs.is_numeric() {
                return None;
            }
            let inverted = match inverse_hook(rhs)? {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            };
            times_hook(&inverted, lhs)
        }
        BinaryOp::Mod
        | BinaryOp::Concat
        | BinaryOp::SpaceConcat
        | BinaryOp::And
        | BinaryOp::Or => None,
    }
}

fn plus_hook(lhs: &Value, rhs: &Value) -> Option<Result<Value, OpError>> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(integer_result(a.checked_add(*b))),
        (Value::Fraction(_, _), Value::Integer(_) | Value::Fraction(_, _)) => {
            Some(rational_add(lhs, rhs, "plus"))
        }
        // a string absorbs any right operand
        (Value::String(s), _) => Some(Ok(Value::String(format!("{}{}", s, rhs)))),
        _ => None,
    }
}

fn times_hook(lhs: &Value, rhs: &Value) -> Option<Result<Value, OpError>> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(integer_result(a.checked_mul(*b))),
        (Value::Fraction(_, _), Value::Integer(_) | Value::Fraction(_, _)) => {
            let (a, b) = match lhs.rational("times") {
                Ok(ratio) => ratio,
                Err(err) => return Some(Err(err)),
            };
            let (c, d) = match rhs.rational("times") {
                Ok(ratio) => ratio,
                Err(err) => return Some(Err(err)),
            };
            Some(checked_mul(a, c).and_then(|num| {
                let den = checked_mul(b, d)?;
                make_number(num, den)
            }))
        }
        _ => None,
    }
}

fn less_than(lhs: &Value, rhs: &Value) -> Option<Result<bool, OpError>> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(Ok(a < b)),
        (Value::Fraction(_, _), Value::Integer(_) | Value::Fraction(_, _)) => {
            // the sign of the difference decides
            let (a, b) = match lhs.rational("lessThan") {
                Ok(ratio) => ratio,
                Err(err) => return Some(Err(err)),
            };
            let (c, d) = match rhs.rational("lessThan") {
                Ok(ratio) => ratio,
                Err(err) => return Some(Err(err)),
            };
            let difference = checked_mul(a, d)
                .and_then(|ad| checked_mul(c, b).and_then(|cb| checked_sub(ad, cb)));
            match difference {
                Ok(num) => Some(Ok(num < 0)),
                Err(err) => Some(Err(err)),
            }
        }
        (Value::Character(a), Value::Character(b)) => Some(Ok(a < b)),
        (Value::String(a), Value::String(b)) => Some(Ok(a < b)),
        _ => None,
    }
}

fn negation_hook(value: &Value) -> Option<Result<Value, OpError>> {
    match value {
        Value::Integer(n) => Some(make_number(-(*n as i128), 1)),
        Value::Fraction(n, d) => Some(make_number(-(*n as i128), *d as i128)),
        _ => None,
    }
}

fn inverse_hook(value: &Value) -> Option<Result<Value, OpError>> {
    match value {
        Value::Integer(n) => Some(make_number(1, *n as i128)),
        Value::Fraction(n, d) => Some(make_number(*d as i128, *n as i128)),
        _ => None,
    }
}

fn not_hook(value: &Value) -> Option<Result<Value, OpError>> {
    match value {
        Value::Boolean(b) => Some(Ok(Value::Boolean(!b))),
        _ => None,
    }
}

/// Equality across different variants is false, never an error; the result
/// is always a language boolean.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Fraction(a, b), Value::Fraction(c, d)) => a == c && b == d,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Character(a), Value::Character(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (
            Value::Array { size: a, base: b },
            Value::Array { size: c, base: d },
        ) => a == c && b == d,
        (Value::Type(a), Value::Type(b)) => a == b,
        _ => false,
    }
}

fn rational_add(lhs: &Value, rhs: &Value, hook_name: &str) -> Result<Value, OpError> {
    let (a, b) = lhs.rational(hook_name)?;
    let (c, d) = rhs.rational(hook_name)?;
    let num = checked_add(checked_mul(a, d)?, checked_mul(c, b)?)?;
    make_number(num, checked_mul(b, d)?)
}

fn rational_sub(lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
    let (a, b) = lhs.rational("minus")?;
    let (c, d) = rhs.rational("minus")?;
    let num = checked_sub(checked_mul(a, d)?, checked_mul(c, b)?)?;
    make_number(num, checked_mul(b, d)?)
}

fn rational_div(lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
    let (a, b) = lhs.rational("divide")?;
    let (c, d) = rhs.rational("divide")?;
    // x / y is x * (/y); a zero divisor surfaces as the zero denominator
    make_number(checked_mul(a, d)?, checked_mul(b, c)?)
}

/// Floored remainder over rationals: the result takes the sign of the
/// modulus and its magnitude stays below the modulus magnitude.
fn rational_mod(lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
    let (a, b) = lhs.rational("mod")?;
    let (c, d) = rhs.rational("mod")?;
    if c == 0 {
        return Err(OpError::Zero);
    }
    let mut quotient_num = checked_mul(a, d)?;
    let mut quotient_den = checked_mul(b, c)?;
    if quotient_den < 0 {
        quotient_num = checked_neg(quotient_num)?;
        quotient_den = checked_neg(quotient_den)?;
    }
    let k = quotient_num.div_euclid(quotient_den);
    let num = checked_sub(checked_mul(a, d)?, checked_mul(checked_mul(c, b)?, k)?)?;
    make_number(num, checked_mul(b, d)?)
}

fn integer_result(checked: Option<i64>) -> Result<Value, OpError> {
    match checked {
        Some(n) => Ok(Value::Integer(n)),
        None => Err(OpError::Overflow),
    }
}

fn checked_add(a: i128, b: i128) -> Result<i128, OpError> {
    a.checked_add(b).ok_or(OpError::Overflow)
}

fn checked_sub(a: i128, b: i128) -> Result<i128, OpError> {
    a.checked_sub(b).ok_or(OpError::Overflow)
}

fn checked_mul(a: i128, b: i128) -> Result<i128, OpError> {
    a.checked_mul(b).ok_or(OpError::Overflow)
}

fn checked_neg(a: i128) -> Result<i128, OpError> {
    a.checked_neg().ok_or(OpError::Overflow)
}

/// Normalize a ratio into a language number: positive denominator, reduced
/// by the greatest common divisor, and collapsed to an [Integer] when the
/// denominator reduces to one. A zero denominator reports division by zero.
pub(crate) fn make_number(num: i128, den: i128) -> Result<Value, OpError> {
    if den == 0 {
        return Err(OpError::Zero);
    }
    let (num, den) = if den < 0 {
        (checked_neg(num)?, checked_neg(den)?)
    } else {
        (num, den)
    };
    let divisor = gcd(num.checked_abs().ok_or(OpError::Overflow)?, den);
    let (num, den) = if divisor != 0 {
        (num / divisor, den / divisor)
    } else {
        (num, den)
    };
    if den == 1 {
        let n = i64::try_from(num).map_err(|_| OpError::Overflow)?;
        Ok(Value::Integer(n))
    } else {
        let n = i64::try_from(num).map_err(|_| OpError::Overflow)?;
        let d = i64::try_from(den).map_err(|_| OpError::Overflow)?;
        Ok(Value::Fraction(n, d))
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    a
}

/// Construct a value of a built-in type from evaluated arguments.
///
/// The argument rules follow the types themselves: `Integer` accepts a
/// decimal string, an integer, or a fraction (truncating toward zero);
/// `Fraction` accepts an `a/b` string, a number, or a numerator and
/// denominator pair; `Boolean` reads strings starting with `t` or `y` as
/// true; `Character` accepts a nonempty string, a character, or a code
/// point; `String` accepts any value; `Array` takes its size and yields an
/// allocation request instead of a finished value.
pub fn construct(type_name: TypeName, args: &[Value]) -> Result<Constructed, ConstructorError> {
    match type_name {
        TypeName::Integer => {
            let arg = one_argument("Integer", args)?;
            let value = match arg {
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(n) => Value::Integer(n),
                    Err(_) => {
                        return Err(ConstructorError::new(
                            "Integer",
                            "a decimal numeral",
                            &format!("\"{}\"", s),
                        ))
                    }
                },
                Value::Integer(n) => Value::Integer(*n),
                // truncate toward zero
                Value::Fraction(num, den) => Value::Integer(num / den),
                other => {
                    return Err(ConstructorError::new(
                        "Integer",
                        "String, Integer, or Fraction",
                        other.type_name(),
                    ))
                }
            };
            Ok(Constructed::Value(value))
        }
        TypeName::Fraction => match args {
            [Value::String(s)] => {
                if let Some((num, den)) = s.split_once('/') {
                    let numerals = (num.trim().parse::<i64>(), den.trim().parse::<i64>());
                    match numerals {
                        (Ok(num), Ok(den)) => finish_number("Fraction", num as i128, den as i128),
                        _ => Err(ConstructorError::new(
                            "Fraction",
                            "a numeral like a/b",
                            &format!("\"{}\"", s),
                        )),
                    }
                } else {
                    match s.trim().parse::<i64>() {
                        Ok(n) => Ok(Constructed::Value(Value::Integer(n))),
                        Err(_) => Err(ConstructorError::new(
                            "Fraction",
                            "a numeral like a/b",
                            &format!("\"{}\"", s),
                        )),
                    }
                }
            }
            [Value::Fraction(num, den)] => {
                Ok(Constructed::Value(Value::Fraction(*num, *den)))
            }
            [Value::Integer(n)] => Ok(Constructed::Value(Value::Integer(*n))),
            [other] => Err(ConstructorError::new(
                "Fraction",
                "String, Fraction, or Integer",
                other.type_name(),
            )),
            [Value::Integer(num), Value::Integer(den)] => {
                finish_number("Fraction", *num as i128, *den as i128)
            }
            [a, b] => Err(ConstructorError::new(
                "Fraction",
                "an Integer numerator and denominator",
                &format!("{}, {}", a.type_name(), b.type_name()),
            )),
            _ => Err(ConstructorError::new(
                "Fraction",
                "1 or 2 arguments",
                &args.len().to_string(),
            )),
        },
        TypeName::Boolean => {
            let arg = one_argument("Boolean", args)?;
            let value = match arg {
                Value::String(s) => {
                    let lowered = s.to_lowercase();
                    Value::Boolean(lowered.starts_with('t') || lowered.starts_with('y'))
                }
                Value::Boolean(b) => Value::Boolean(*b),
                other => {
                    return Err(ConstructorError::new(
                        "Boolean",
                        "String or Boolean",
                        other.type_name(),
                    ))
                }
            };
            Ok(Constructed::Value(value))
        }
        TypeName::Character => {
            let arg = one_argument("Character", args)?;
            let value = match arg {
                Value::String(s) => match s.chars().next() {
                    Some(c) => Value::Character(c),
                    None => {
                        return Err(ConstructorError::new(
                            "Character",
                            "a nonempty String",
                            "\"\"",
                        ))
                    }
                },
                Value::Character(c) => Value::Character(*c),
                Value::Integer(n) => {
                    let code_point = u32::try_from(*n).ok().and_then(char::from_u32);
                    match code_point {
                        Some(c) => Value::Character(c),
                        None => {
                            return Err(ConstructorError::new(
                                "Character",
                                "a valid code point",
                                &n.to_string(),
                            ))
                        }
                    }
                }
                other => {
                    return Err(ConstructorError::new(
                        "Character",
                        "String, Character, or Integer",
                        other.type_name(),
                    ))
                }
            };
            Ok(Constructed::Value(value))
        }
        TypeName::String => {
            let arg = one_argument("String", args)?;
            match arg {
                Value::Type(t) => Err(ConstructorError::new("String", "a value", t.name())),
                other => Ok(Constructed::Value(Value::String(other.to_string()))),
            }
        }
        TypeName::Array => {
            let arg = one_argument("Array", args)?;
            match arg {
                Value::Integer(n) if *n >= 0 => Ok(Constructed::Alloc(*n as usize)),
                Value::Integer(n) => Err(ConstructorError::new(
                    "Array",
                    "a nonnegative size",
                    &n.to_string(),
                )),
                other => Err(ConstructorError::new(
                    "Array",
                    "Integer",
                    other.type_name(),
                )),
            }
        }
    }
}

fn one_argument<'a>(class_name: &str, args: &'a [Value]) -> Result<&'a Value, ConstructorError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(ConstructorError::new(
            class_name,
            "1 argument",
            &args.len().to_string(),
        )),
    }
}

fn finish_number(
    class_name: &str,
    num: i128,
    den: i128,
) -> Result<Constructed, ConstructorError> {
    match make_number(num, den) {
        Ok(value) => Ok(Constructed::Value(value)),
        Err(OpError::Zero) => Err(ConstructorError::new(
            class_name,
            "a nonzero denominator",
            "0",
        )),
        Err(_) => Err(ConstructorError::new(
            class_name,
            "a representable ratio",
            &format!("{}/{}", num, den),
        )),
    }
}
