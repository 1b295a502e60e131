//! Units of server-side code.
//!
//! A [`Unit`] is the loadable thing a namespace names: an ordered set of
//! top-level bindings plus documentation. Only [`Binding::Function`] entries
//! are ever dispatched; classes, pre-bound methods and constants stay visible
//! to `help` but cannot be invoked remotely.

mod function;
pub mod help;

pub use function::{BoundArgs, CallResult, Failure, Function, Signature};

use serde_json::Value;
use std::sync::Arc;

/// A class-like binding. Never exposed for dispatch.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub doc: Option<String>,
    pub methods: Vec<Arc<Function>>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            methods: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn method(mut self, function: Function) -> Self {
        self.methods.push(Arc::new(function));
        self
    }
}

/// A function already bound to a receiver. Never exposed for dispatch.
#[derive(Debug, Clone)]
pub struct BoundMethod {
    pub receiver: String,
    pub function: Arc<Function>,
}

/// A top-level binding in a unit.
#[derive(Debug, Clone)]
pub enum Binding {
    Function(Arc<Function>),
    Class(ClassInfo),
    Method(BoundMethod),
    Value(Value),
}

impl Binding {
    /// Plain callables are the only bindings registration exposes.
    pub fn as_plain_callable(&self) -> Option<&Arc<Function>> {
        match self {
            Binding::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Binding::Function(_) => "function",
            Binding::Class(_) => "class",
            Binding::Method(_) => "method",
            Binding::Value(_) => "data",
        }
    }
}

/// A loadable unit of code.
#[derive(Debug, Clone)]
pub struct Unit {
    name: String,
    doc: Option<String>,
    bindings: Vec<(String, Binding)>,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            bindings: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Bind a value under `name`, replacing any earlier binding of that name.
    pub fn bind(mut self, name: impl Into<String>, binding: Binding) -> Self {
        let name = name.into();
        match self.bindings.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = binding,
            None => self.bindings.push((name, binding)),
        }
        self
    }

    /// Bind a function under its own name.
    pub fn function(self, function: Function) -> Self {
        let name = function.name().to_string();
        self.bind(name, Binding::Function(Arc::new(function)))
    }

    pub fn class(self, class: ClassInfo) -> Self {
        let name = class.name.clone();
        self.bind(name, Binding::Class(class))
    }

    pub fn method(self, name: impl Into<String>, receiver: impl Into<String>, function: Function) -> Self {
        self.bind(
            name,
            Binding::Method(BoundMethod {
                receiver: receiver.into(),
                function: Arc::new(function),
            }),
        )
    }

    pub fn constant(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(name, Binding::Value(value.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, binding)| binding)
    }

    /// Bindings in definition order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(n, b)| (n.as_str(), b))
    }

    /// Rename the unit, e.g. when it is registered under another namespace.
    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
