//! Right-to-left layout support.

use unic_langid::{CharacterDirection, LanguageIdentifier};
use weathersvg_markup::{h, PropValue, Props, Tag};

/// Whether `language` is written right to left. Unparseable tags are not.
pub fn is_rtl_language(language: &str) -> bool {
    language
        .parse::<LanguageIdentifier>()
        .map(|id| matches!(id.character_direction(), CharacterDirection::RTL))
        .unwrap_or(false)
}

fn number(value: Option<&PropValue>) -> f64 {
    value
        .and_then(PropValue::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// A component rendering `tag_name` with `x` mirrored inside a box of
/// `box_width` when `flip` is set.
///
/// Mirroring sets `x` to `box_width - x - width` and, for `text`, swaps a
/// `start`/`end` anchor. Without `flip` the element is rendered as given.
pub fn create_logical_component(tag_name: &str, box_width: f64, flip: bool) -> Tag {
    let tag_name = tag_name.to_string();

    if !flip {
        return Tag::component(move |props: Props| {
            h(tag_name.as_str(), props.attrs, props.children.into_vec())
        });
    }

    Tag::component(move |props: Props| {
        let Props {
            mut attrs,
            children,
        } = props;

        let x = box_width - number(attrs.get("x")) - number(attrs.get("width"));
        attrs.set("x", x);

        if tag_name == "text" {
            let anchor = attrs
                .get("text-anchor")
                .and_then(PropValue::as_str)
                .unwrap_or("start");
            let flipped = match anchor {
                "start" => "end".to_string(),
                "end" => "start".to_string(),
                other => other.to_string(),
            };
            attrs.set("text-anchor", flipped);
        } else {
            attrs.remove("text-anchor");
        }

        h(tag_name.as_str(), attrs, children.into_vec())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weathersvg_markup::{attrs, children, render};

    #[test]
    fn test_rtl_languages() {
        assert!(is_rtl_language("ar"));
        assert!(is_rtl_language("he-IL"));
        assert!(is_rtl_language("fa"));
        assert!(!is_rtl_language("en-US"));
        assert!(!is_rtl_language("ja"));
        assert!(!is_rtl_language("not a tag"));
    }

    #[test]
    fn test_flip_mirrors_x_and_anchor() {
        let text = create_logical_component("text", 400.0, true);
        let node = h(
            text,
            attrs! { "x" => "50", "width" => "100", "text-anchor" => "start" },
            children!["hi"],
        );
        assert_eq!(
            render(&node),
            r#"<text x="250" width="100" text-anchor="end">hi</text>"#
        );
    }

    #[test]
    fn test_flip_defaults_text_anchor_to_start() {
        let text = create_logical_component("text", 400.0, true);
        let node = h(text, attrs! { "x" => "392", "y" => "8" }, children!["Tokyo"]);
        assert_eq!(
            render(&node),
            r#"<text x="8" y="8" text-anchor="end">Tokyo</text>"#
        );
    }

    #[test]
    fn test_flip_keeps_middle_anchor() {
        let text = create_logical_component("text", 400.0, true);
        let node = h(text, attrs! { "x" => "200", "text-anchor" => "middle" }, vec![]);
        assert_eq!(render(&node), r#"<text x="200" text-anchor="middle" />"#);
    }

    #[test]
    fn test_flip_rect_without_anchor() {
        let rect = create_logical_component("rect", 400.0, true);
        let node = h(rect, attrs! { "y" => "94", "width" => "400" }, vec![]);
        assert_eq!(render(&node), r#"<rect y="94" width="400" x="0" />"#);
    }

    #[test]
    fn test_no_flip_passes_through() {
        let text = create_logical_component("text", 400.0, false);
        let node = h(
            text,
            attrs! { "x" => "50", "width" => "100", "text-anchor" => "start" },
            children!["hi"],
        );
        assert_eq!(
            render(&node),
            r#"<text x="50" width="100" text-anchor="start">hi</text>"#
        );
    }
}
