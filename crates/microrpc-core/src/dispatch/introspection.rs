//! The `dir` and `help` magic operations.

use crate::envelope::Magic;
use crate::error::{RpcError, Result};
use crate::registry::DispatchRegistry;
use serde_json::Value;

/// Answer a magic request.
///
/// The namespace is checked before the magic code, so an unknown namespace
/// is always reported as such.
pub fn introspect(
    registry: &DispatchRegistry,
    namespace: &str,
    attr: Option<&str>,
    code: &str,
) -> Result<Value> {
    let entry = registry.namespace(namespace)?;

    match code.parse::<Magic>()? {
        Magic::Dir => Ok(Value::from(entry.attributes())),
        Magic::Help => {
            let text = match attr {
                None => entry.help(),
                Some(attr) => entry.help_on(attr).ok_or_else(|| RpcError::AttributeNotFound {
                    namespace: namespace.to_string(),
                    attr: attr.to_string(),
                })?,
            };
            Ok(Value::String(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::UnitCatalog;
    use crate::unit::{Function, Signature, Unit};
    use serde_json::json;

    fn registry() -> DispatchRegistry {
        let registry = DispatchRegistry::new(UnitCatalog::new());
        registry.register_unit(
            Unit::new("geo")
                .with_doc("Plane geometry helpers.")
                .function(
                    Function::new("area", Signature::positional(&["w", "h"]), |args| {
                        Ok(json!(args.f64("w")? * args.f64("h")?))
                    })
                    .with_doc("Area of a rectangle."),
                )
                .function(Function::new("origin", Signature::new(), |_| Ok(json!([0, 0]))))
                .constant("UNIT", 1),
        );
        registry
    }

    #[test]
    fn test_dir_lists_sorted_attributes() {
        let registry = registry();
        let data = introspect(&registry, "geo", None, "dir").unwrap();
        assert_eq!(data, json!(["area", "origin"]));

        // Idempotent absent re-registration.
        assert_eq!(introspect(&registry, "geo", None, "dir").unwrap(), data);
    }

    #[test]
    fn test_help_on_namespace_and_attribute() {
        let registry = registry();

        let text = introspect(&registry, "geo", None, "help").unwrap();
        let text = text.as_str().unwrap();
        assert!(text.contains("geo - Plane geometry helpers."));
        assert!(text.contains("area(w, h)"));

        let text = introspect(&registry, "geo", Some("area"), "help").unwrap();
        assert!(text.as_str().unwrap().contains("Area of a rectangle."));

        // Non-callable bindings can still be documented.
        let text = introspect(&registry, "geo", Some("UNIT"), "help").unwrap();
        assert!(text.as_str().unwrap().contains("UNIT = 1"));
    }

    #[test]
    fn test_help_on_missing_attribute() {
        let err = introspect(&registry(), "geo", Some("volume"), "help").unwrap_err();
        assert_eq!(err.kind_name(), "AttributeNotFound");
        assert_eq!(err.to_string(), "Module geo has no attribute 'volume'");
    }

    #[test]
    fn test_unknown_namespace_wins_over_unknown_code() {
        let registry = registry();
        for code in ["dir", "help", "bogus"] {
            let err = introspect(&registry, "nowhere", None, code).unwrap_err();
            assert_eq!(err.kind_name(), "NamespaceNotFound");
        }
    }

    #[test]
    fn test_unsupported_code() {
        let err = introspect(&registry(), "geo", None, "source").unwrap_err();
        assert_eq!(err.kind_name(), "UnsupportedOperation");
        assert_eq!(err.to_string(), "Undefined magic code 'source'");
    }
}
