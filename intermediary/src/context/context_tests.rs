//! Tests for the shared context.

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_context_starts_empty() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.len(), 0);
        assert!(ctx.get("missing").is_none());
    }

    #[test]
    fn test_context_last_writer_wins() {
        let ctx = Context::new();

        assert_eq!(ctx.set("one", 1), None);
        assert_eq!(ctx.set("one", 2), Some(json!(1)));
        assert_eq!(ctx.get("one"), Some(json!(2)));
    }

    #[test]
    fn test_context_set_if_absent() {
        let ctx = Context::new();

        assert!(ctx.set_if_absent("key", "first"));
        assert!(!ctx.set_if_absent("key", "second"));
        assert_eq!(ctx.get("key"), Some(json!("first")));
    }

    #[test]
    fn test_context_clones_share_storage() {
        let ctx = Context::new();
        let handle = ctx.clone();

        handle.set("shared", true);

        assert!(ctx.contains_key("shared"));
        assert!(ctx.shares_storage_with(&handle));
        assert!(!ctx.shares_storage_with(&Context::new()));
    }

    #[test]
    fn test_context_snapshot_is_detached() {
        let ctx = Context::new();
        ctx.set("a", 1);

        let snapshot = ctx.snapshot();
        ctx.set("b", 2);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_context_keys_sorted() {
        let ctx = Context::new();
        ctx.set("zeta", 1);
        ctx.set("alpha", 2);

        assert_eq!(ctx.keys(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_context_remove_and_clear() {
        let ctx = Context::from_data(HashMap::from([
            ("a".to_string(), json!(1)),
            ("b".to_string(), json!(2)),
        ]));

        assert_eq!(ctx.remove("a"), Some(json!(1)));
        assert_eq!(ctx.len(), 1);

        ctx.clear();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_context_get_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Timing {
            started_ms: u64,
        }

        let ctx = Context::new();
        ctx.set("timing", json!({ "started_ms": 42 }));
        ctx.set("count", "not a number");

        assert_eq!(ctx.get_as::<Timing>("timing"), Some(Timing { started_ms: 42 }));
        assert_eq!(ctx.get_as::<u32>("count"), None);
        assert_eq!(ctx.get_as::<u32>("missing"), None);
    }
}
