use crate::engine::value::{FieldPath, FieldValue, StateMap};

/// Fold `patch` into `target` in place.
///
/// Objects merge key by key, recursively. Any other patch value (scalars, booleans,
/// lists) replaces whatever the target held. Keys the patch does not mention are kept.
pub fn merge_into(target: &mut StateMap, patch: StateMap) {
    for (key, incoming) in patch {
        match incoming {
            FieldValue::Object(sub) => {
                let slot = target
                    .entry(key)
                    .or_insert_with(|| FieldValue::Object(StateMap::new()));
                if !matches!(slot, FieldValue::Object(_)) {
                    *slot = FieldValue::Object(StateMap::new());
                }
                if let FieldValue::Object(inner) = slot {
                    merge_into(inner, sub);
                }
            }
            leaf => {
                target.insert(key, leaf);
            }
        }
    }
}

/// Non-mutating form of [`merge_into`].
pub fn merge(base: &StateMap, patch: &StateMap) -> StateMap {
    let mut out = base.clone();
    merge_into(&mut out, patch.clone());
    out
}

/// Wrap `value` in one object per path segment: `a.b.c = v` becomes `{a: {b: {c: v}}}`.
pub fn patch_for(path: &FieldPath, value: FieldValue) -> Option<StateMap> {
    let (leaf, parents) = path.segments().split_last()?;
    let mut patch = StateMap::new();
    patch.insert(leaf.clone(), value);
    for seg in parents.iter().rev() {
        let mut outer = StateMap::new();
        outer.insert(seg.clone(), FieldValue::Object(patch));
        patch = outer;
    }
    Some(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::value::FormState;
    use serde_json::json;

    fn map(v: serde_json::Value) -> StateMap {
        FormState::from_json(&v).into_map()
    }

    fn json_of(m: &StateMap) -> serde_json::Value {
        FormState::from_map(m.clone()).to_json()
    }

    #[test]
    fn sibling_keys_survive_single_field_patches() {
        let mut st = StateMap::new();
        for (path, v) in [
            ("address.area", FieldValue::text("Springfield")),
            ("address.zipcode", FieldValue::Number(23513.0)),
            ("address.locationDetails.city", FieldValue::text("Gotham")),
            ("address.locationDetails.countryDetails.state", FieldValue::text("NY")),
            ("name", FieldValue::text("John Doe")),
        ] {
            merge_into(&mut st, patch_for(&FieldPath::parse(path), v).unwrap());
        }
        assert_eq!(
            json_of(&st),
            json!({
                "name": "John Doe",
                "address": {
                    "area": "Springfield",
                    "zipcode": 23513,
                    "locationDetails": {"city": "Gotham", "countryDetails": {"state": "NY"}}
                }
            })
        );
    }

    #[test]
    fn object_patch_replaces_scalar_and_scalar_patch_replaces_object() {
        let base = map(json!({"a": 1, "b": {"x": 1}}));
        let out = merge(&base, &map(json!({"a": {"y": 2}})));
        assert_eq!(json_of(&out), json!({"a": {"y": 2}, "b": {"x": 1}}));
        let out = merge(&base, &map(json!({"b": "flat"})));
        assert_eq!(json_of(&out), json!({"a": 1, "b": "flat"}));
    }

    #[test]
    fn lists_are_replaced_not_merged() {
        let base = map(json!({"tags": ["a", "b", "c"], "opts": [{"value": "us"}]}));
        let out = merge(&base, &map(json!({"tags": ["z"], "opts": [{"label": "X"}]})));
        assert_eq!(
            json_of(&out),
            json!({"tags": ["z"], "opts": [{"label": "X"}]})
        );
    }

    #[test]
    fn disjoint_patches_commute_and_repeats_are_noops() {
        let p1 = patch_for(&"address.area".into(), FieldValue::text("Downtown")).unwrap();
        let p2 = patch_for(&"address.postal".into(), FieldValue::Number(90001.0)).unwrap();
        let p3 = patch_for(&"newsletter".into(), FieldValue::Bool(true)).unwrap();
        let mut a = StateMap::new();
        for p in [&p1, &p2, &p3] {
            merge_into(&mut a, p.clone());
        }
        let mut b = StateMap::new();
        for p in [&p3, &p2, &p1] {
            merge_into(&mut b, p.clone());
        }
        assert_eq!(a, b);
        let again = merge(&a, &p2);
        assert_eq!(again, a);
    }

    #[test]
    fn deep_paths_have_no_depth_limit() {
        let segs: Vec<String> = (0..300).map(|i| format!("n{i}")).collect();
        let path: FieldPath = segs.iter().cloned().collect();
        let mut st = StateMap::new();
        merge_into(&mut st, patch_for(&path, FieldValue::Bool(true)).unwrap());
        let sibling = path.segments()[..299]
            .iter()
            .cloned()
            .chain(std::iter::once("other".to_string()))
            .collect::<FieldPath>();
        merge_into(&mut st, patch_for(&sibling, FieldValue::Bool(false)).unwrap());
        let fs = FormState::from_map(st);
        assert_eq!(fs.get_path(&path), Some(&FieldValue::Bool(true)));
        assert_eq!(fs.get_path(&sibling), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn patch_for_root_is_none() {
        assert!(patch_for(&FieldPath::root(), FieldValue::Bool(true)).is_none());
    }
}
