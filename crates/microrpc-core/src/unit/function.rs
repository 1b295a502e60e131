//! Invocable functions, their signatures, and argument binding.

use crate::envelope::Kwargs;
use crate::error::kind;
use serde_json::Value;
use std::sync::Arc;

/// An error raised by a callable.
///
/// `kind` travels to the client verbatim as `error_type`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: String,
    pub message: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(kind::TYPE_ERROR, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(kind::VALUE_ERROR, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(kind::ZERO_DIVISION_ERROR, message)
    }
}

/// Result of invoking a callable body.
pub type CallResult = std::result::Result<Value, Failure>;

type Body = dyn Fn(&BoundArgs) -> CallResult + Send + Sync;

/// A named parameter, optionally with a default value.
#[derive(Debug, Clone, PartialEq)]
struct Param {
    name: String,
    default: Option<Value>,
}

/// Parameter list of a function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
    varargs: Option<String>,
    varkw: Option<String>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signature made of required parameters only.
    pub fn positional(names: &[&str]) -> Self {
        names.iter().fold(Self::new(), |sig, name| sig.param(*name))
    }

    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn param_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Collect surplus positional arguments under `name`.
    pub fn varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    /// Collect unknown keyword arguments under `name`.
    pub fn varkw(mut self, name: impl Into<String>) -> Self {
        self.varkw = Some(name.into());
        self
    }

    /// Bind call arguments to this signature.
    ///
    /// Failures use kind `TypeError` and name the function being called.
    pub fn bind(&self, function: &str, args: Vec<Value>, kwargs: Kwargs) -> Result<BoundArgs, Failure> {
        let arity = self.params.len();

        if args.len() > arity && self.varargs.is_none() {
            return Err(Failure::type_error(format!(
                "{}() takes {} but {} {} given",
                function,
                self.describe_arity(),
                args.len(),
                if args.len() == 1 { "was" } else { "were" }
            )));
        }

        let mut slots: Vec<Option<Value>> = vec![None; arity];
        let mut rest = Vec::new();
        for (index, value) in args.into_iter().enumerate() {
            if index < arity {
                slots[index] = Some(value);
            } else {
                rest.push(value);
            }
        }

        let mut extra = Kwargs::new();
        for (name, value) in kwargs {
            match self.params.iter().position(|p| p.name == name) {
                Some(index) if slots[index].is_some() => {
                    return Err(Failure::type_error(format!(
                        "{}() got multiple values for argument '{}'",
                        function, name
                    )));
                }
                Some(index) => slots[index] = Some(value),
                None if self.varkw.is_some() => {
                    extra.insert(name, value);
                }
                None => {
                    return Err(Failure::type_error(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        function, name
                    )));
                }
            }
        }

        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(arity);
        for (param, slot) in self.params.iter().zip(slots) {
            match slot.or_else(|| param.default.clone()) {
                Some(value) => values.push(value),
                None => missing.push(param.name.as_str()),
            }
        }

        if !missing.is_empty() {
            return Err(Failure::type_error(format!(
                "{}() missing {} required positional argument{}: {}",
                function,
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                quote_list(&missing)
            )));
        }

        Ok(BoundArgs {
            function: function.to_string(),
            names: self.params.iter().map(|p| p.name.clone()).collect(),
            values,
            rest,
            extra,
        })
    }

    fn describe_arity(&self) -> String {
        let max = self.params.len();
        let min = self.params.iter().filter(|p| p.default.is_none()).count();
        if min == max {
            format!(
                "{} positional argument{}",
                max,
                if max == 1 { "" } else { "s" }
            )
        } else {
            format!("from {} to {} positional arguments", min, max)
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{}={}", p.name, default),
                None => p.name.clone(),
            })
            .collect();
        if let Some(name) = &self.varargs {
            parts.push(format!("*{}", name));
        }
        if let Some(name) = &self.varkw {
            parts.push(format!("**{}", name));
        }
        write!(f, "({})", parts.join(", "))
    }
}

/// `'a'`, `'a' and 'b'`, `'a', 'b', and 'c'`
fn quote_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{} and {}", first, second),
        [head @ .., last] => format!("{}, and {}", head.join(", "), last),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments bound to a signature, ready for a function body.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    function: String,
    names: Vec<String>,
    values: Vec<Value>,
    rest: Vec<Value>,
    extra: Kwargs,
}

impl BoundArgs {
    /// Look up a named parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| &self.values[index])
    }

    /// Look up a named parameter, failing with `TypeError` if the signature
    /// does not declare it.
    pub fn value(&self, name: &str) -> Result<&Value, Failure> {
        self.get(name).ok_or_else(|| {
            Failure::type_error(format!("{}() has no parameter '{}'", self.function, name))
        })
    }

    pub fn i64(&self, name: &str) -> Result<i64, Failure> {
        let value = self.value(name)?;
        value.as_i64().ok_or_else(|| self.wrong_type(name, "an integer", value))
    }

    pub fn f64(&self, name: &str) -> Result<f64, Failure> {
        let value = self.value(name)?;
        value.as_f64().ok_or_else(|| self.wrong_type(name, "a number", value))
    }

    pub fn str(&self, name: &str) -> Result<&str, Failure> {
        let value = self.value(name)?;
        value.as_str().ok_or_else(|| self.wrong_type(name, "a string", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool, Failure> {
        let value = self.value(name)?;
        value.as_bool().ok_or_else(|| self.wrong_type(name, "a bool", value))
    }

    pub fn array(&self, name: &str) -> Result<&Vec<Value>, Failure> {
        let value = self.value(name)?;
        value.as_array().ok_or_else(|| self.wrong_type(name, "an array", value))
    }

    /// Surplus positional arguments collected by `*varargs`.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    /// Unknown keyword arguments collected by `**varkw`.
    pub fn extra(&self) -> &Kwargs {
        &self.extra
    }

    fn wrong_type(&self, name: &str, expected: &str, actual: &Value) -> Failure {
        Failure::type_error(format!(
            "{}() argument '{}' must be {}, not {}",
            self.function,
            name,
            expected,
            json_type_name(actual)
        ))
    }
}

/// A plain callable that can be exposed under a namespace.
#[derive(Clone)]
pub struct Function {
    name: String,
    signature: Signature,
    doc: Option<String>,
    deprecation: Option<String>,
    body: Arc<Body>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&BoundArgs) -> CallResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            doc: None,
            deprecation: None,
            body: Arc::new(body),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Mark the function deprecated. Calls still succeed but every response
    /// carries the deprecation flag and this message.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecation = Some(message.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.deprecation.as_deref()
    }

    /// Bind `args`/`kwargs` and run the body.
    pub fn invoke(&self, args: Vec<Value>, kwargs: Kwargs) -> CallResult {
        let bound = self.signature.bind(&self.name, args, kwargs)?;
        (self.body)(&bound)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("deprecated", &self.deprecation.is_some())
            .finish()
    }
}
