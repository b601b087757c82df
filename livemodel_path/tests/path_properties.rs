// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for `livemodel_path`.
//!
//! These check the laws that hold for every well-formed path: the decomposed
//! form survives a trip through `build`, index-base translation is reversible,
//! and lookups through arbitrary paths never panic.

use livemodel_path::{IndexShift, ObjectPath, get, set, to_alternate_index_base};
use proptest::prelude::*;
use serde_json::{Value, json};

fn segment() -> impl Strategy<Value = String> {
    ("[A-Za-z_][A-Za-z0-9_]{0,7}", proptest::option::of(0_usize..1000)).prop_map(
        |(name, index)| match index {
            Some(index) => format!("{name}[{index}]"),
            None => name,
        },
    )
}

fn path_text() -> impl Strategy<Value = String> {
    (any::<bool>(), proptest::collection::vec(segment(), 0..6)).prop_map(|(rooted, segments)| {
        let body = segments.join(".");
        match (rooted, body.is_empty()) {
            (true, true) => "RootModel".to_owned(),
            (true, false) => format!("RootModel.{body}"),
            (false, _) => body,
        }
    })
}

proptest! {
    #[test]
    fn decomposed_form_survives_build(text in path_text()) {
        let parsed = ObjectPath::parse(&text).unwrap();
        let rebuilt = ObjectPath::build(&parsed.segments(), &parsed.indices());
        let reparsed = ObjectPath::parse(&rebuilt.to_string()).unwrap();
        prop_assert_eq!(reparsed.segments(), parsed.segments());
        prop_assert_eq!(reparsed.indices(), parsed.indices());
    }

    #[test]
    fn display_is_lossless(text in path_text()) {
        let parsed = ObjectPath::parse(&text).unwrap();
        prop_assert_eq!(ObjectPath::parse(&parsed.to_string()).unwrap(), parsed);
    }

    #[test]
    fn index_base_round_trip(text in path_text()) {
        let up = to_alternate_index_base(&text, IndexShift::ToOneBased).unwrap();
        let down = to_alternate_index_base(&up, IndexShift::ToZeroBased).unwrap();
        prop_assert_eq!(down, text);
    }

    #[test]
    fn index_base_agrees_with_shifted(text in path_text()) {
        let parsed = ObjectPath::parse(&text).unwrap();
        let by_text = ObjectPath::parse(
            &to_alternate_index_base(&text, IndexShift::ToOneBased).unwrap(),
        )
        .unwrap();
        prop_assert_eq!(by_text, parsed.shifted(IndexShift::ToOneBased).unwrap());
    }

    #[test]
    fn lookups_never_panic(text in path_text()) {
        let mut model = json!({ "A": [{ "B": 1 }], "C": { "D": [true] } });
        let path = ObjectPath::parse(&text).unwrap();
        let found = get(&model, &path).cloned();
        let assigned = set(&mut model, &path, Value::Null);
        if !path.is_root() && assigned {
            prop_assert_eq!(get(&model, &path), Some(&Value::Null));
        }
        if found.is_none() && path.last().and_then(|last| last.index()).is_some() {
            prop_assert!(!assigned);
        }
    }
}
