use crate::sections;
use serde_json::{Map, Value};

/// Key whose string values hold HTML to be split into sections
pub const CONTENT_KEY: &str = "content";

/// Tally of what a rewrite touched
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    pub fields: usize,
    pub sections: usize,
}

/// Replace every string under a "content" key with its section list.
///
/// Values that are not strings are left alone, so running the rewrite on
/// already converted output changes nothing.
pub fn rewrite(value: Value, stats: &mut RewriteStats) -> Value {
    match value {
        Value::Object(map) => Value::Object(rewrite_object(map, stats)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rewrite(item, stats))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn rewrite_object(map: Map<String, Value>, stats: &mut RewriteStats) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(html) if key == CONTENT_KEY => sectionize(&html, stats),
                other => rewrite(other, stats),
            };
            (key, value)
        })
        .collect()
}

fn sectionize(html: &str, stats: &mut RewriteStats) -> Value {
    let sections = sections::parse_sections(html);
    stats.fields += 1;
    stats.sections += sections.len();
    Value::Array(sections.iter().map(|s| s.to_value()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rewrite_fresh(value: Value) -> (Value, RewriteStats) {
        let mut stats = RewriteStats::default();
        let out = rewrite(value, &mut stats);
        (out, stats)
    }

    #[test]
    fn only_content_fields_are_transformed() {
        let (out, stats) = rewrite_fresh(json!({
            "title": "<h1>X</h1>",
            "content": "<h1>Y</h1>"
        }));
        assert_eq!(
            out,
            json!({
                "title": "<h1>X</h1>",
                "content": [
                    {"headingType": "h1", "section": "Y", "description": ""}
                ]
            })
        );
        assert_eq!(stats, RewriteStats { fields: 1, sections: 1 });
    }

    #[test]
    fn recurses_through_objects_and_arrays() {
        let (out, stats) = rewrite_fresh(json!({
            "pages": [
                {"id": 1, "content": "<h2>Causes</h2><p>Genetics</p>"},
                {"id": 2, "meta": {"content": "<p>Intro</p>"}},
                [{"content": "<h3>Deep</h3>down"}]
            ]
        }));
        assert_eq!(
            out["pages"][0]["content"],
            json!([{"headingType": "h2", "section": "Causes", "description": "Genetics"}])
        );
        assert_eq!(
            out["pages"][1]["meta"]["content"],
            json!([{"headingType": "p", "section": "", "description": "Intro"}])
        );
        assert_eq!(
            out["pages"][2][0]["content"],
            json!([{"headingType": "h3", "section": "Deep", "description": "down"}])
        );
        assert_eq!(out["pages"][0]["id"], 1);
        assert_eq!(stats, RewriteStats { fields: 3, sections: 3 });
    }

    #[test]
    fn empty_content_becomes_empty_array() {
        let (out, stats) = rewrite_fresh(json!({"content": "   "}));
        assert_eq!(out, json!({"content": []}));
        assert_eq!(stats.fields, 1);
        assert_eq!(stats.sections, 0);
    }

    #[test]
    fn non_string_content_is_untouched() {
        let input = json!({
            "a": {"content": null},
            "b": {"content": 42},
            "c": {"content": ["<h1>not html</h1>"]},
            "d": {"content": {"nested": "<p>x</p>"}}
        });
        let (out, stats) = rewrite_fresh(input.clone());
        assert_eq!(out, input);
        assert_eq!(stats, RewriteStats::default());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (once, _) = rewrite_fresh(json!({
            "items": [{"content": "<h1>A</h1>first<h2>B</h2>second"}]
        }));
        let (twice, stats) = rewrite_fresh(once.clone());
        assert_eq!(twice, once);
        assert_eq!(stats.fields, 0);
    }

    #[test]
    fn scalars_pass_through() {
        for value in [json!(null), json!(true), json!(1.5), json!("<h1>x</h1>")] {
            let (out, _) = rewrite_fresh(value.clone());
            assert_eq!(out, value);
        }
    }

    #[test]
    fn preserves_key_order() {
        let input: Value =
            serde_json::from_str(r#"{"zeta": 1, "content": "<p>x</p>", "alpha": 2}"#).unwrap();
        let (out, _) = rewrite_fresh(input);
        let keys: Vec<&str> = out.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "content", "alpha"]);
    }

    #[test]
    fn key_match_is_exact() {
        let input = json!({"Content": "<p>x</p>", "contents": "<p>y</p>"});
        let (out, stats) = rewrite_fresh(input.clone());
        assert_eq!(out, input);
        assert_eq!(stats.fields, 0);
    }
}
