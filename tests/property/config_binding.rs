//! Property-based tests for the config path binder

use cmdext::error::BindError;
use cmdext::extension::{ConfigNode, Scalar, TypedValue, ValueKind};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,7}"
}

fn path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

proptest! {
    /// Binding at a path creates every intermediate mapping and stores the value.
    #[test]
    fn prop_bind_then_get(segments in path(), text in ".*") {
        let dotted = segments.join(".");
        let mut config = ConfigNode::mapping();
        config.set_path(&dotted, Scalar::String(text.clone())).unwrap();
        prop_assert_eq!(
            config.get_path(&dotted).cloned(),
            Some(ConfigNode::Scalar(Scalar::String(text)))
        );
    }

    /// Binding a sibling leaf never disturbs values already bound.
    #[test]
    fn prop_sibling_binding_preserves_values(
        parent in path(),
        first in segment(),
        second in segment(),
        a in any::<i64>(),
        b in any::<i64>(),
    ) {
        prop_assume!(first != second);
        let base = parent.join(".");
        let first_path = format!("{}.{}", base, first);
        let second_path = format!("{}.{}", base, second);

        let mut config = ConfigNode::mapping();
        config.set_path(&first_path, Scalar::Int(a)).unwrap();
        config.set_path(&second_path, Scalar::Int(b)).unwrap();

        prop_assert_eq!(config.get_path(&first_path).cloned(), Some(ConfigNode::Scalar(Scalar::Int(a))));
        prop_assert_eq!(config.get_path(&second_path).cloned(), Some(ConfigNode::Scalar(Scalar::Int(b))));
    }

    /// Descending through a scalar is a structural conflict and changes nothing.
    #[test]
    fn prop_descending_through_scalar_conflicts(
        segments in path(),
        extra in segment(),
        value in any::<bool>(),
    ) {
        let dotted = segments.join(".");
        let mut config = ConfigNode::mapping();
        config.set_path(&dotted, Scalar::Bool(value)).unwrap();
        let before = config.clone();

        let result = config.set_path(&format!("{}.{}", dotted, extra), Scalar::Null);
        let is_conflict = matches!(result, Err(BindError::Conflict { .. }));
        prop_assert!(is_conflict);
        prop_assert_eq!(config, before);
    }

    /// Unset values leave the tree unchanged when bound.
    #[test]
    fn prop_unset_value_binds_nothing(segments in path()) {
        let mut config = ConfigNode::mapping();
        config.set_path("keep", Scalar::Int(1)).unwrap();
        let before = config.clone();
        for kind in ValueKind::ALL {
            config.bind(&TypedValue::new(kind, segments.join("."))).unwrap();
        }
        prop_assert_eq!(config, before);
    }

    /// Any i64 text round-trips through an int value.
    #[test]
    fn prop_int_text_round_trip(n in any::<i64>()) {
        let mut value = TypedValue::new(ValueKind::Int, "count");
        value.set_from_text(&n.to_string()).unwrap();
        prop_assert_eq!(value.value(), Some(Scalar::Int(n)));
    }
}
