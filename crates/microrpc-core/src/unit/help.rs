//! Human-readable documentation for units and their bindings.
//!
//! Rendered once when a unit is registered; `help` requests return the
//! stored text.

use super::{Binding, ClassInfo, Function, Unit};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Render documentation for a whole unit.
pub fn render_unit(unit: &Unit) -> String {
    let mut out = format!("Help on module {}:\n\nNAME\n", unit.name());

    let (summary, description) = split_doc(unit.doc());
    match summary {
        Some(summary) => {
            let _ = writeln!(out, "{INDENT}{} - {}", unit.name(), summary);
        }
        None => {
            let _ = writeln!(out, "{INDENT}{}", unit.name());
        }
    }

    if !description.is_empty() {
        out.push_str("\nDESCRIPTION\n");
        push_indented(&mut out, &description, 1);
    }

    let mut classes = String::new();
    let mut functions = String::new();
    let mut data = String::new();

    for (name, binding) in unit.bindings() {
        match binding {
            Binding::Function(function) => {
                push_function(&mut functions, name, function, 1);
            }
            Binding::Method(method) => {
                let _ = writeln!(
                    functions,
                    "{INDENT}{}{} method of {}",
                    name,
                    method.function.signature(),
                    method.receiver
                );
                push_doc(&mut functions, method.function.doc(), 2);
                functions.push('\n');
            }
            Binding::Class(class) => push_class(&mut classes, class, 1),
            Binding::Value(value) => {
                let _ = writeln!(data, "{INDENT}{} = {}", name, value);
            }
        }
    }

    for (title, body) in [("CLASSES", classes), ("FUNCTIONS", functions), ("DATA", data)] {
        if !body.is_empty() {
            let _ = write!(out, "\n{}\n{}", title, body);
        }
    }

    out.trim_end().to_string() + "\n"
}

/// Render documentation for one binding of `unit`.
pub fn render_binding(unit: &str, name: &str, binding: &Binding) -> String {
    let mut out = format!("Help on {} {} in module {}:\n\n", binding.kind_label(), name, unit);

    match binding {
        Binding::Function(function) => push_function(&mut out, name, function, 0),
        Binding::Method(method) => {
            let _ = writeln!(
                out,
                "{}{} method of {}",
                name,
                method.function.signature(),
                method.receiver
            );
            push_doc(&mut out, method.function.doc(), 1);
        }
        Binding::Class(class) => push_class(&mut out, class, 0),
        Binding::Value(value) => {
            let _ = writeln!(out, "{} = {}", name, value);
        }
    }

    out.trim_end().to_string() + "\n"
}

fn push_function(out: &mut String, name: &str, function: &Function, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = writeln!(out, "{}{}{}", indent, name, function.signature());
    push_doc(out, function.doc(), depth + 1);
    if let Some(message) = function.deprecation() {
        let _ = writeln!(out, "{}{}Deprecated: {}", indent, INDENT, message);
    }
    out.push('\n');
}

fn push_class(out: &mut String, class: &ClassInfo, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = writeln!(out, "{}class {}", indent, class.name);
    push_doc(out, class.doc.as_deref(), depth + 1);
    if !class.methods.is_empty() {
        let _ = writeln!(out, "\n{}{}Methods defined here:\n", indent, INDENT);
        for method in &class.methods {
            push_function(out, method.name(), method, depth + 1);
        }
    }
    out.push('\n');
}

fn push_doc(out: &mut String, doc: Option<&str>, depth: usize) {
    if let Some(doc) = doc {
        push_indented(out, doc.trim(), depth);
    }
}

fn push_indented(out: &mut String, text: &str, depth: usize) {
    let indent = INDENT.repeat(depth);
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{}{}", indent, line.trim_end());
        }
    }
}

/// First line of a doc string, and everything after it.
fn split_doc(doc: Option<&str>) -> (Option<&str>, String) {
    let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
        return (None, String::new());
    };
    let mut lines = doc.lines();
    let summary = lines.next().map(str::trim);
    let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    (summary, description)
}
