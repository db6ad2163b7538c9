//! Reusable pieces of the widget markup.

use weathersvg_markup::{attrs, children, fragment, h, Node, COMMENT_TAG};

use crate::theme::Theme;

const BACKGROUND_GRADIENT_ID: &str = "widget-background-gradient";

/// Slowly drifting diagonal gradient in the theme colors.
pub fn background_gradient(theme: &Theme, id: &str) -> Node {
    let stop_color = format!("{}33", theme.background_gradient2);
    let stop_values = format!(
        "{}33;{}55;{}33",
        theme.background_gradient2, theme.background_gradient2b, theme.background_gradient2
    );

    h(
        "linearGradient",
        attrs! { "x1" => "0", "x2" => "2", "y1" => "0", "y2" => "3", "id" => id },
        children![
            h(
                "animate",
                attrs! {
                    "attributeName" => "x2",
                    "values" => "2;2.5;2",
                    "dur" => "11s",
                    "repeatCount" => "indefinite",
                },
                vec![],
            ),
            h(
                "animate",
                attrs! {
                    "attributeName" => "y2",
                    "values" => "3;3.5;3",
                    "dur" => "13s",
                    "repeatCount" => "indefinite",
                },
                vec![],
            ),
            h(
                "stop",
                attrs! { "offset" => "0", "stop-color" => theme.background_gradient1.as_str() },
                vec![],
            ),
            h(
                "stop",
                attrs! { "offset" => "1", "stop-color" => stop_color },
                children![h(
                    "animate",
                    attrs! {
                        "attributeName" => "stop-color",
                        "values" => stop_values,
                        "dur" => "10s",
                        "repeatCount" => "indefinite",
                    },
                    vec![],
                )],
            ),
        ],
    )
}

/// Gradient definition plus a rect filled with it.
pub fn background(theme: &Theme, width: f64, height: f64) -> Node {
    fragment(children![
        h(
            "defs",
            attrs! {},
            children![background_gradient(theme, BACKGROUND_GRADIENT_ID)],
        ),
        h(
            "rect",
            attrs! {
                "width" => width,
                "height" => height,
                "fill" => format!("url(#{})", BACKGROUND_GRADIENT_ID),
            },
            vec![],
        ),
    ])
}

/// Opacity animation showing part `index` of `total` in turn.
///
/// Each part is visible for `part_duration` seconds, fading over
/// `switch_duration`. A single part needs no animation.
pub fn opacity_animation(index: usize, total: usize, part_duration: f64, switch_duration: f64) -> Node {
    if total <= 1 {
        return fragment(vec![]);
    }

    let total_duration = total as f64 * part_duration;
    let show_start = index as f64 * part_duration;
    let show_finish = show_start + switch_duration;
    let hide_start = show_start + part_duration - switch_duration;
    let hide_finish = show_start + part_duration;

    let mut key_times = vec![
        0.0,
        show_start / total_duration,
        show_finish / total_duration,
        hide_start / total_duration,
        hide_finish / total_duration,
        1.0,
    ];
    let mut values = vec![0, 0, 1, 1, 0, 0];
    if index == 0 {
        values.remove(0);
        key_times.remove(0);
    } else if index == total - 1 {
        values.pop();
        key_times.pop();
    }

    let join = |items: Vec<String>| items.join(";");
    h(
        "animate",
        attrs! {
            "attributeName" => "opacity",
            "values" => join(values.iter().map(ToString::to_string).collect()),
            "keyTimes" => join(key_times.iter().map(ToString::to_string).collect()),
            "dur" => format!("{}s", total_duration),
            "repeatCount" => "indefinite",
        },
        vec![],
    )
}

/// A literal `<!-- … -->` comment.
pub fn html_comment(content: &str) -> Node {
    h(COMMENT_TAG, attrs! { "content" => content }, vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use weathersvg_markup::render;

    fn theme() -> Theme {
        Theme {
            background_gradient1: "#a6dcef".to_string(),
            background_gradient2: "#f3f0f8".to_string(),
            background_gradient2b: "#e0f2f1".to_string(),
            text: "#05080a".to_string(),
        }
    }

    #[test]
    fn test_background_gradient_stops() {
        let svg = render(&background_gradient(&theme(), "bg"));
        assert!(svg.starts_with(r#"<linearGradient x1="0" x2="2" y1="0" y2="3" id="bg">"#));
        assert!(svg.contains(r##"<stop offset="0" stop-color="#a6dcef" />"##));
        assert!(svg.contains(r##"<stop offset="1" stop-color="#f3f0f833">"##));
        assert!(svg.contains(r##"values="#f3f0f833;#e0f2f155;#f3f0f833""##));
    }

    #[test]
    fn test_background_references_gradient() {
        let svg = render(&background(&theme(), 400.0, 120.0));
        assert!(svg.starts_with("<defs>"));
        assert!(svg.ends_with(r##"<rect width="400" height="120" fill="url(#widget-background-gradient)" />"##));
    }

    #[test]
    fn test_single_part_has_no_animation() {
        assert_eq!(render(&opacity_animation(0, 1, 8.0, 0.4)), "");
    }

    #[test]
    fn test_first_part_timing() {
        assert_eq!(
            render(&opacity_animation(0, 2, 8.0, 0.4)),
            r#"<animate attributeName="opacity" values="0;1;1;0;0" keyTimes="0;0.025;0.475;0.5;1" dur="16s" repeatCount="indefinite" />"#
        );
    }

    #[test]
    fn test_last_part_timing() {
        assert_eq!(
            render(&opacity_animation(1, 2, 8.0, 0.4)),
            r#"<animate attributeName="opacity" values="0;0;1;1;0" keyTimes="0;0.5;0.525;0.975;1" dur="16s" repeatCount="indefinite" />"#
        );
    }

    #[test]
    fn test_html_comment_escapes_content() {
        assert_eq!(render(&html_comment("a--b")), "<!--a&#45;&#45;b-->");
    }
}
