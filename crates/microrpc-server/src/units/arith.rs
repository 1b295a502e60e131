//! `arith`: integer and floating point arithmetic.

use microrpc::{BoundArgs, ClassInfo, Failure, Function, Signature, Unit};
use serde_json::{json, Value};

pub fn unit() -> Unit {
    Unit::new("arith")
        .with_doc(
            "Integer and floating point arithmetic.\n\n\
             Integers stay integers where the result fits; everything else is a float.",
        )
        .function(
            Function::new("add", Signature::positional(&["a", "b"]), add)
                .with_doc("Return a + b."),
        )
        .function(
            Function::new("sub", Signature::positional(&["a", "b"]), sub)
                .with_doc("Return a - b."),
        )
        .function(
            Function::new("mul", Signature::positional(&["a", "b"]), mul)
                .with_doc("Return a * b."),
        )
        .function(
            Function::new("div", Signature::positional(&["a", "b"]), div)
                .with_doc("Return a / b as a float.\n\nRaises ZeroDivisionError when b is zero."),
        )
        .function(
            Function::new("sum", Signature::new().varargs("values"), sum)
                .with_doc("Sum all positional arguments."),
        )
        .function(
            Function::new("plus", Signature::positional(&["a", "b"]), add)
                .with_doc("Return a + b.")
                .deprecated("arith.plus is deprecated; use arith.add"),
        )
        .class(
            ClassInfo::new("Fraction")
                .with_doc("Rational number a/b. Not remotely constructible.")
                .method(
                    Function::new("limit", Signature::positional(&["max_denominator"]), |_| {
                        Ok(Value::Null)
                    })
                    .with_doc("Closest fraction with a bounded denominator."),
                ),
        )
        .constant("PI", std::f64::consts::PI)
        .constant("E", std::f64::consts::E)
}

/// Integer result when both operands are integers and the operation does not
/// overflow, float otherwise.
fn numeric(
    args: &BoundArgs,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Failure> {
    let a = args.value("a")?;
    let b = args.value("b")?;
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(result) = int_op(x, y) {
            return Ok(json!(result));
        }
    }
    Ok(json!(float_op(args.f64("a")?, args.f64("b")?)))
}

fn add(args: &BoundArgs) -> Result<Value, Failure> {
    numeric(args, i64::checked_add, |x, y| x + y)
}

fn sub(args: &BoundArgs) -> Result<Value, Failure> {
    numeric(args, i64::checked_sub, |x, y| x - y)
}

fn mul(args: &BoundArgs) -> Result<Value, Failure> {
    numeric(args, i64::checked_mul, |x, y| x * y)
}

fn div(args: &BoundArgs) -> Result<Value, Failure> {
    let b = args.f64("b")?;
    if b == 0.0 {
        return Err(Failure::zero_division("division by zero"));
    }
    Ok(json!(args.f64("a")? / b))
}

fn sum(args: &BoundArgs) -> Result<Value, Failure> {
    let mut total_int = Some(0i64);
    let mut total_float = 0.0;

    for value in args.rest() {
        let x = value.as_f64().ok_or_else(|| {
            Failure::type_error(format!("unsupported operand type for +: {}", value))
        })?;
        total_float += x;
        total_int = match (total_int, value.as_i64()) {
            (Some(acc), Some(v)) => acc.checked_add(v),
            _ => None,
        };
    }

    Ok(match total_int {
        Some(total) => json!(total),
        None => json!(total_float),
    })
}
