//! The weather widget layout.
//!
//! A fixed 400x120 canvas rendered at twice that size. Positioned elements
//! go through logical components so right-to-left languages get a mirrored
//! layout.

use weathersvg_markup::{
    attrs, children, h, Child, Node, RenderError, RenderMode, Renderer, Tag,
};
use weathersvg_weather::Weather;

use crate::components::{background, html_comment, opacity_animation};
use crate::conversion::{to_fixed, PERCENTAGE_FRACTION_DIGITS};
use crate::credits::CREDIT_HEADER;
use crate::format::format_date_time;
use crate::icons::{get_weather_icon, icon_symbols_defs, IconSet};
use crate::preferences::Preferences;
use crate::rtl::{create_logical_component, is_rtl_language};
use crate::theme::get_theme;
use crate::translations::{get_translation_language, translate, TranslationLanguage};

const WIDTH: f64 = 400.0;
const HEIGHT: f64 = 120.0;

const ANIMATION_PART_DURATION: f64 = 8.0;
const ANIMATION_SWITCH_DURATION: f64 = 0.4;

/// Below this the amount would show as `0 mm` or `0.0 in`.
const PRECIPITATION_DISPLAY_THRESHOLD: f64 = 5.0;

const FONT_FAMILY: &str = "system-ui, sans-serif, 'Helvetica Neue', Arial";
const FONT_STYLE: &str = "font-synthesis:none;text-rendering:optimizeLegibility;-webkit-font-smoothing:antialiased;-moz-osx-font-smoothing:grayscale;";

const WIDGET_CSS: &str = include_str!("../assets/widget.css");

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Weather data has no usable {0}")]
    MissingData(&'static str),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Everything the widget shows.
#[derive(Debug, Clone, Copy)]
pub struct WidgetInput<'a> {
    pub weather: &'a Weather,
    pub preferences: &'a Preferences,
    pub location_label: &'a str,
    pub location_language: &'a str,
    /// Credits for the services used, appended to the header comment
    pub comment_credits: &'a str,
}

/// Positioned tags, mirrored for right-to-left languages.
struct Logical {
    rect: Tag,
    text: Tag,
    use_: Tag,
}

impl Logical {
    fn new(flip: bool) -> Self {
        Self {
            rect: create_logical_component("rect", WIDTH, flip),
            text: create_logical_component("text", WIDTH, flip),
            use_: create_logical_component("use", WIDTH, flip),
        }
    }
}

fn minified_css() -> String {
    WIDGET_CSS.lines().map(str::trim).collect()
}

fn tspan(content: impl Into<Child>) -> Node {
    h("tspan", attrs! {}, vec![content.into()])
}

/// Icon and value of one reading, e.g. humidity.
struct Reading<'a> {
    icon: &'a str,
    label: &'a str,
    value: String,
    unit: &'a str,
    row_y: f64,
}

impl Reading<'_> {
    fn nodes(&self, tags: &Logical, fill: &str) -> Vec<Child> {
        children![
            h(
                tags.use_.clone(),
                attrs! {
                    "href" => format!("#{}", self.icon),
                    "x" => "176",
                    "y" => self.row_y,
                    "width" => "28",
                    "height" => "28",
                    "role" => "img",
                    "aria-label" => self.label,
                },
                vec![],
            ),
            h(
                tags.text.clone(),
                attrs! {
                    "x" => "204",
                    "y" => self.row_y + 14.0,
                    "font-size" => "12",
                    "dominant-baseline" => "middle",
                    "fill" => fill,
                },
                children![h("tspan", attrs! {}, children![self.value.as_str(), self.unit])],
            ),
        ]
    }
}

fn alternating(index: usize, total: usize) -> Node {
    opacity_animation(index, total, ANIMATION_PART_DURATION, ANIMATION_SWITCH_DURATION)
}

/// Build the widget tree.
///
/// # Errors
///
/// Fails when the forecast lacks the current time or today's sun times.
pub fn weather_widget(input: &WidgetInput<'_>) -> Result<Node, WidgetError> {
    let weather = input.weather;
    let current = &weather.current;

    let current_time = weather
        .current_time()
        .ok_or(WidgetError::MissingData("current time"))?;
    let (sunrise, sunset) = weather
        .sun_times()
        .ok_or(WidgetError::MissingData("sunrise and sunset for today"))?;

    let theme = get_theme(current_time, sunrise, sunset);
    let fill = theme.text.as_str();

    let language = input.preferences.lang.as_str();
    let formats = input.preferences.resolve();
    let translation = get_translation_language(language);
    let t = |key: &str| translate(translation, key).unwrap_or_default();

    let (weekday, date_time) = format_date_time(current_time, translation, formats.time_format);
    let description = describe_weather(translation, current.weather_code);

    let show_precipitation = current.precipitation >= PRECIPITATION_DISPLAY_THRESHOLD;

    let temperature = to_fixed(
        formats.temperature.convert(current.temperature_2m),
        formats.temperature.fraction_digits(),
    );
    let humidity = to_fixed(current.relative_humidity_2m, PERCENTAGE_FRACTION_DIGITS);
    let precipitation_probability = weather
        .precipitation_probability()
        .map(|p| to_fixed(p, PERCENTAGE_FRACTION_DIGITS))
        .unwrap_or_else(|| "-".to_string());
    let precipitation = to_fixed(
        formats.precipitation.convert(current.precipitation),
        formats.precipitation.fraction_digits(),
    );
    let wind_speed = to_fixed(
        formats.wind_speed.convert(current.wind_speed_10m),
        formats.wind_speed.fraction_digits(),
    );
    let pressure = to_fixed(
        formats.air_pressure.convert(current.pressure_msl),
        formats.air_pressure.fraction_digits(),
    );

    let unit_temperature = format!("unit_{}", formats.temperature);
    let unit_precipitation = format!("unit_{}", formats.precipitation);
    let unit_wind_speed = format!("unit_{}", formats.wind_speed);
    let unit_pressure = format!("unit_{}", formats.air_pressure);

    let tags = Logical::new(is_rtl_language(language));

    let humidity_reading = Reading {
        icon: "i-meteocons-humidity-fill",
        label: t("label_humidity"),
        value: humidity,
        unit: t("unit_percent"),
        row_y: 10.0,
    };
    let probability_reading = Reading {
        icon: "i-meteocons-raindrops-fill",
        label: t("label_precipitation_probability"),
        value: precipitation_probability,
        unit: t("unit_percent"),
        row_y: 34.0,
    };
    let precipitation_reading = Reading {
        icon: "i-meteocons-raindrop-measure-fill",
        label: t("label_precipitation"),
        value: precipitation,
        unit: t(&unit_precipitation),
        row_y: 34.0,
    };
    let wind_reading = Reading {
        icon: "i-meteocons-windsock-fill",
        label: t("label_wind_speed"),
        value: wind_speed,
        unit: t(&unit_wind_speed),
        row_y: 58.0,
    };
    let pressure_reading = Reading {
        icon: "i-meteocons-barometer-fill",
        label: t("label_sea_level_pressure"),
        value: pressure,
        unit: t(&unit_pressure),
        row_y: 58.0,
    };

    let credits = format!("{}{}", CREDIT_HEADER, input.comment_credits);
    let total_precipitation_parts = if show_precipitation { 2 } else { 1 };

    // Weather icon, description and temperature
    let summary = h(
        "g",
        attrs! { "class" => "an-fade-in" },
        children![
            h(
                tags.use_.clone(),
                attrs! {
                    "href" => format!("#{}", get_weather_icon(current.weather_code, weather.is_day())),
                    "y" => "-2",
                    "width" => "80",
                    "height" => "80",
                },
                vec![],
            ),
            h(
                "g",
                attrs! {},
                children![h(
                    tags.text.clone(),
                    attrs! {
                        "x" => "88",
                        "y" => "64",
                        "font-size" => "12",
                        "fill-opacity" => ".8",
                        "fill" => fill,
                    },
                    children![tspan(description)],
                )],
            ),
            h(
                tags.text.clone(),
                attrs! { "x" => "88" },
                children![
                    h(
                        "tspan",
                        attrs! {
                            "y" => "12",
                            "font-size" => "36",
                            "dominant-baseline" => "hanging",
                            "fill" => fill,
                        },
                        children![temperature],
                    ),
                    h(
                        "tspan",
                        attrs! {
                            "dx" => "2",
                            "y" => "14",
                            "font-size" => "20",
                            "dominant-baseline" => "hanging",
                            "fill" => fill,
                            "fill-opacity" => ".8",
                        },
                        children![t(&unit_temperature)],
                    ),
                ],
            ),
        ],
    );

    let mut probability_group = probability_reading.nodes(&tags, fill);
    probability_group.push(alternating(0, total_precipitation_parts).into());

    let precipitation_group = show_precipitation.then(|| {
        let mut nodes = precipitation_reading.nodes(&tags, fill);
        nodes.push(alternating(1, 2).into());
        h("g", attrs! { "opacity" => "0" }, nodes)
    });

    let mut wind_group = wind_reading.nodes(&tags, fill);
    wind_group.push(alternating(0, 2).into());
    let mut pressure_group = pressure_reading.nodes(&tags, fill);
    pressure_group.push(alternating(1, 2).into());

    // Humidity, precipitation, wind and air pressure
    let readings = h(
        "g",
        attrs! {},
        children![
            h("g", attrs! { "class" => "an-fade-in-d2" }, humidity_reading.nodes(&tags, fill)),
            h(
                "g",
                attrs! { "class" => "an-fade-in-d3" },
                children![h("g", attrs! {}, probability_group), precipitation_group],
            ),
            h(
                "g",
                attrs! { "class" => "an-fade-in-d3" },
                children![
                    h("g", attrs! {}, wind_group),
                    h("g", attrs! { "opacity" => "0" }, pressure_group),
                ],
            ),
        ],
    );

    let location = h(
        "g",
        attrs! { "class" => "an-slide-in-left" },
        children![
            h(
                tags.text.clone(),
                attrs! {
                    "x" => "392",
                    "y" => "8",
                    "font-size" => "16",
                    "text-anchor" => "end",
                    "dominant-baseline" => "hanging",
                    "fill" => fill,
                    "lang" => input.location_language,
                },
                children![tspan(input.location_label)],
            ),
            h(
                tags.text.clone(),
                attrs! {
                    "x" => "392",
                    "y" => "28",
                    "font-size" => "12",
                    "text-anchor" => "end",
                    "dominant-baseline" => "hanging",
                    "fill-opacity" => ".8",
                    "fill" => fill,
                    "lang" => "en-US",
                },
                children![tspan(weather.timezone.as_str())],
            ),
        ],
    );

    let time = h(
        "g",
        attrs! {},
        children![
            h(
                tags.rect.clone(),
                attrs! {
                    "class" => "an-reveal-to-right",
                    "y" => "94",
                    "width" => "400",
                    "height" => "100",
                    "fill" => "#ffffff",
                    "fill-opacity" => ".2",
                },
                vec![],
            ),
            h(
                "g",
                attrs! { "class" => "an-slide-in-up-d1" },
                children![
                    h(
                        tags.text.clone(),
                        attrs! { "x" => "12", "y" => "112", "font-size" => "16", "fill" => fill },
                        children![tspan(weekday)],
                    ),
                    h(
                        tags.text.clone(),
                        attrs! {
                            "x" => "392",
                            "y" => "112",
                            "font-size" => "12",
                            "text-anchor" => "end",
                            "fill" => fill,
                        },
                        children![tspan(date_time)],
                    ),
                ],
            ),
        ],
    );

    let svg = h(
        "svg",
        attrs! {
            "width" => "800",
            "height" => "240",
            "viewBox" => "0 0 400 120",
            "xmlns" => "http://www.w3.org/2000/svg",
        },
        children![
            html_comment(&credits),
            icon_symbols_defs(),
            h(
                "defs",
                attrs! {},
                children![
                    h(
                        "clipPath",
                        attrs! { "id" => "widget-clip" },
                        children![h("rect", attrs! { "width" => WIDTH, "height" => HEIGHT }, vec![])],
                    ),
                    h("style", attrs! {}, children![minified_css()]),
                ],
            ),
            h(
                "g",
                attrs! {
                    "clip-path" => "url(#widget-clip)",
                    "lang" => language,
                    "font-family" => FONT_FAMILY,
                    "style" => FONT_STYLE,
                },
                children![
                    background(&theme, WIDTH, HEIGHT),
                    summary,
                    readings,
                    location,
                    time,
                    credit_links(&tags, fill),
                ],
            ),
        ],
    );

    Ok(svg)
}

fn describe_weather(translation: TranslationLanguage, code: i32) -> &'static str {
    translate(translation, &format!("wmo_{}", code))
        .or_else(|| translate(translation, "wmo_unknown"))
        .unwrap_or_default()
}

// Not localized
fn credit_links(tags: &Logical, fill: &str) -> Node {
    let link = |href: &str, y: &str, label: &str| {
        h(
            "a",
            attrs! {
                "href" => href,
                "hrefLang" => "en-US",
                "rel" => "noreferrer",
                "referrerpolicy" => "no-referrer",
                "target" => "_blank",
            },
            children![h(
                tags.text.clone(),
                attrs! {
                    "x" => "392",
                    "y" => y,
                    "text-anchor" => "end",
                    "font-size" => "7",
                    "fill-opacity" => ".4",
                    "fill" => fill,
                },
                children![tspan(label)],
            )],
        )
    };

    h(
        "g",
        attrs! { "class" => "an-fade-in-d10", "lang" => "en-US" },
        children![
            link("https://github.com/SegaraRai/weather.svg", "76", "Weather.svg"),
            link("https://open-meteo.com/", "86", "data by Open-Meteo"),
        ],
    )
}

/// Render the widget to SVG text with the referenced icon symbols inlined.
///
/// # Errors
///
/// Fails on missing forecast data, or on malformed markup in
/// [`RenderMode::Strict`].
pub fn render_weather_widget(
    input: &WidgetInput<'_>,
    icons: &IconSet,
    mode: RenderMode,
) -> Result<String, WidgetError> {
    let node = weather_widget(input)?;
    let svg = Renderer::new(mode).render(&node)?;
    Ok(icons.inject(&svg))
}
