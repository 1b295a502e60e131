//! `text`: string helpers.

use microrpc::{BoundArgs, Failure, Function, ServerConfig, Signature, Unit};
use serde_json::{json, Value};

pub fn unit() -> Unit {
    Unit::new("text")
        .with_doc("String helpers.")
        .function(
            Function::new("upper", Signature::positional(&["s"]), upper)
                .with_doc("Return s converted to uppercase."),
        )
        .function(
            Function::new(
                "join",
                Signature::new().param("items").param_with_default("sep", " "),
                join,
            )
            .with_doc("Concatenate a list of strings, separated by sep."),
        )
        .function(
            Function::new("repeat", Signature::positional(&["s", "times"]), repeat)
                .with_doc("Return s repeated `times` times."),
        )
        .function(Function::new("count", Signature::positional(&["s", "sub"]), count))
        .function(
            Function::new("shout", Signature::positional(&["s"]), upper)
                .deprecated("text.shout is deprecated; use text.upper"),
        )
        .constant("SEPARATOR", " ")
}

fn upper(args: &BoundArgs) -> Result<Value, Failure> {
    Ok(json!(args.str("s")?.to_uppercase()))
}

fn join(args: &BoundArgs) -> Result<Value, Failure> {
    let sep = args.str("sep")?;
    let items = args
        .array("items")?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().ok_or_else(|| {
                Failure::type_error(format!("sequence item {}: expected str instance, {} found", i, item))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!(items.join(sep)))
}

/// Largest string `repeat` will build.
const MAX_REPEAT_BYTES: usize = ServerConfig::MAX_BODY_BYTES;

fn repeat(args: &BoundArgs) -> Result<Value, Failure> {
    let s = args.str("s")?;
    let times = args.i64("times")?;
    let times = usize::try_from(times)
        .map_err(|_| Failure::value_error(format!("times must be non-negative, got {}", times)))?;
    match s.len().checked_mul(times) {
        Some(len) if len <= MAX_REPEAT_BYTES => Ok(json!(s.repeat(times))),
        _ => Err(Failure::value_error(format!(
            "repeated string would exceed {} bytes",
            MAX_REPEAT_BYTES
        ))),
    }
}

fn count(args: &BoundArgs) -> Result<Value, Failure> {
    let sub = args.str("sub")?;
    if sub.is_empty() {
        return Err(Failure::value_error("empty substring"));
    }
    Ok(json!(args.str("s")?.matches(sub).count()))
}
