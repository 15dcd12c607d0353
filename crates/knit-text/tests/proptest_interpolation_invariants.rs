//! Property-based invariant tests for interpolation.
//!
//! 1. Markers never overlap and are reported in ascending order.
//! 2. Resolution with the `Literal` policy and an empty lookup is the
//!    identity.
//! 3. Keys extracted by `interpolation_keys` are exactly the keys `resolve`
//!    consults, in the same order.
//! 4. Text without `{{` is returned unchanged.
//! 5. Substituted values are never rescanned.

use std::cell::RefCell;
use std::collections::HashMap;

use knit_text::{FnLookup, MissingKey, interpolation_keys, resolve, scan};
use proptest::prelude::*;

fn template() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-z ]{0,6}",
            "[a-z]{1,4}".prop_map(|k| format!("{{{{{k}}}}}")),
            "[a-z]{1,4}".prop_map(|k| format!("{{{{ {k} }}}}")),
            Just("{".to_string()),
            Just("}".to_string()),
            Just("{{".to_string()),
            Just("}}".to_string()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn markers_are_ordered_and_disjoint(text in template()) {
        let mut last_end = 0;
        for marker in scan(&text) {
            prop_assert!(marker.start >= last_end);
            prop_assert!(marker.end > marker.start);
            prop_assert!(text[marker.start..marker.end].starts_with("{{"));
            prop_assert!(text[marker.start..marker.end].ends_with("}}"));
            let braces = ['{', '}'];
            prop_assert!(!marker.inner.contains(braces));
            last_end = marker.end;
        }
    }

    #[test]
    fn literal_policy_with_empty_lookup_is_identity(text in template()) {
        let empty: HashMap<String, String> = HashMap::new();
        prop_assert_eq!(resolve(&text, &empty, MissingKey::Literal).text, text);
    }

    #[test]
    fn resolve_consults_extracted_keys_in_order(text in template()) {
        let seen = RefCell::new(Vec::new());
        let lookup = FnLookup(|key: &str| {
            seen.borrow_mut().push(key.to_string());
            Some(String::new())
        });
        let _ = resolve(&text, &lookup, MissingKey::Empty);
        prop_assert_eq!(seen.into_inner(), interpolation_keys(&text).to_vec());
    }

    #[test]
    fn text_without_open_marker_is_unchanged(text in "[a-z {}]{0,24}") {
        prop_assume!(!text.contains("{{"));
        let lookup = FnLookup(|_: &str| Some("X".to_string()));
        prop_assert_eq!(resolve(&text, &lookup, MissingKey::Empty).text, text);
    }

    #[test]
    fn substituted_values_are_verbatim(key in "[a-z]{1,4}", value in template()) {
        let values = [(key.as_str(), value.as_str())];
        let text = format!("<{{{{{key}}}}}>");
        prop_assert_eq!(
            resolve(&text, &values[..], MissingKey::Empty).text,
            format!("<{value}>")
        );
    }
}
