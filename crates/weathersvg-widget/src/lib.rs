//! The weather.svg widget
//!
//! Turns a forecast and the viewer's preferences into the widget's SVG:
//! theme colors by time of day, units and translations by language, and a
//! mirrored layout for right-to-left scripts.

pub mod components;
pub mod conversion;
pub mod credits;
pub mod format;
pub mod icons;
pub mod preferences;
pub mod rtl;
pub mod theme;
pub mod translations;
pub mod widget;

pub use conversion::{LengthUnit, PressureUnit, SpeedUnit, TemperatureUnit};
pub use credits::{CREDIT_BIG_DATA_CLOUD, CREDIT_METEOCONS, CREDIT_OPEN_METEO};
pub use icons::{get_weather_icon, IconSet, ICON_SYMBOLS_PLACEHOLDER};
pub use preferences::{
    detect_language, infer_preferred_formats, Preference, PreferredFormats, Preferences,
    QueryIssue, TimeFormat, FALLBACK_LANGUAGE,
};
pub use rtl::{create_logical_component, is_rtl_language};
pub use theme::{get_theme, Theme};
pub use translations::{get_closest_language, get_translation_language, TranslationLanguage};
pub use widget::{render_weather_widget, weather_widget, WidgetError, WidgetInput};
