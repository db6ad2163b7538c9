//! Built-in translation tables.

use unic_langid::LanguageIdentifier;

/// Languages with a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationLanguage {
    EnUs,
    JaJp,
}

pub const FALLBACK_TRANSLATION: TranslationLanguage = TranslationLanguage::EnUs;

impl TranslationLanguage {
    pub const ALL: &[TranslationLanguage] = &[Self::EnUs, Self::JaJp];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::JaJp => "ja-JP",
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::EnUs => EN_US,
            Self::JaJp => JA_JP,
        }
    }

    /// Full weekday name; `index` counts from Monday.
    pub fn weekday(&self, index: usize) -> &'static str {
        let names = match self {
            Self::EnUs => &EN_US_WEEKDAYS,
            Self::JaJp => &JA_JP_WEEKDAYS,
        };
        names.get(index).copied().unwrap_or_default()
    }

    /// Abbreviated month name; `index` counts from January.
    pub fn month_short(&self, index: usize) -> &'static str {
        match self {
            Self::EnUs => EN_US_MONTHS.get(index).copied().unwrap_or_default(),
            Self::JaJp => JA_JP_MONTHS.get(index).copied().unwrap_or_default(),
        }
    }
}

const EN_US_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const JA_JP_WEEKDAYS: [&str; 7] = [
    "月曜日",
    "火曜日",
    "水曜日",
    "木曜日",
    "金曜日",
    "土曜日",
    "日曜日",
];

const EN_US_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const JA_JP_MONTHS: [&str; 12] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

const EN_US: &[(&str, &str)] = &[
    ("wmo_0", "Clear sky"),
    ("wmo_1", "Mainly clear"),
    ("wmo_2", "Partly cloudy"),
    ("wmo_3", "Overcast"),
    ("wmo_45", "Fog"),
    ("wmo_48", "Depositing rime fog"),
    ("wmo_51", "Light drizzle"),
    ("wmo_53", "Moderate drizzle"),
    ("wmo_55", "Dense drizzle"),
    ("wmo_56", "Light freezing drizzle"),
    ("wmo_57", "Dense freezing drizzle"),
    ("wmo_61", "Slight rain"),
    ("wmo_63", "Moderate rain"),
    ("wmo_65", "Heavy rain"),
    ("wmo_66", "Light freezing rain"),
    ("wmo_67", "Heavy freezing rain"),
    ("wmo_71", "Slight snow fall"),
    ("wmo_73", "Moderate snow fall"),
    ("wmo_75", "Heavy snow fall"),
    ("wmo_77", "Snow grains"),
    ("wmo_80", "Slight rain showers"),
    ("wmo_81", "Moderate rain showers"),
    ("wmo_82", "Violent rain showers"),
    ("wmo_85", "Slight snow showers"),
    ("wmo_86", "Heavy snow showers"),
    ("wmo_95", "Thunderstorm"),
    ("wmo_96", "Thunderstorm with slight hail"),
    ("wmo_99", "Thunderstorm with heavy hail"),
    ("wmo_unknown", "Unknown"),
    ("unit_celsius", "°C"),
    ("unit_fahrenheit", "°F"),
    ("unit_mm", "mm"),
    ("unit_inch", "in"),
    ("unit_mps", "m/s"),
    ("unit_kmph", "km/h"),
    ("unit_mph", "mph"),
    ("unit_knot", "kt"),
    ("unit_hpa", "hPa"),
    ("unit_inhg", "inHg"),
    ("unit_percent", "%"),
    ("label_humidity", "Humidity"),
    ("label_precipitation_probability", "Chance of precipitation"),
    ("label_precipitation", "Precipitation"),
    ("label_wind_speed", "Wind speed"),
    ("label_sea_level_pressure", "Sea level pressure"),
];

// Units fall back to en-US
const JA_JP: &[(&str, &str)] = &[
    ("wmo_0", "快晴"),
    ("wmo_1", "晴れ"),
    ("wmo_2", "一部曇り"),
    ("wmo_3", "曇り"),
    ("wmo_45", "霧"),
    ("wmo_48", "霧氷"),
    ("wmo_51", "弱い霧雨"),
    ("wmo_53", "霧雨"),
    ("wmo_55", "強い霧雨"),
    ("wmo_56", "弱い着氷性の霧雨"),
    ("wmo_57", "強い着氷性の霧雨"),
    ("wmo_61", "小雨"),
    ("wmo_63", "雨"),
    ("wmo_65", "大雨"),
    ("wmo_66", "弱い着氷性の雨"),
    ("wmo_67", "強い着氷性の雨"),
    ("wmo_71", "小雪"),
    ("wmo_73", "雪"),
    ("wmo_75", "大雪"),
    ("wmo_77", "霧雪"),
    ("wmo_80", "弱いにわか雨"),
    ("wmo_81", "にわか雨"),
    ("wmo_82", "激しいにわか雨"),
    ("wmo_85", "弱いにわか雪"),
    ("wmo_86", "強いにわか雪"),
    ("wmo_95", "雷雨"),
    ("wmo_96", "雹を伴う雷雨"),
    ("wmo_99", "激しい雹を伴う雷雨"),
    ("wmo_unknown", "不明"),
    ("label_humidity", "湿度"),
    ("label_precipitation_probability", "降水確率"),
    ("label_precipitation", "降水量"),
    ("label_wind_speed", "風速"),
    ("label_sea_level_pressure", "海面気圧"),
];

/// Entry for `key` in `language`'s table only.
pub fn get_translation(language: TranslationLanguage, key: &str) -> Option<&'static str> {
    language
        .table()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Entry for `key`, falling back to the en-US table.
pub fn translate(language: TranslationLanguage, key: &str) -> Option<&'static str> {
    get_translation(language, key).or_else(|| get_translation(FALLBACK_TRANSLATION, key))
}

/// 2 when equal (both absent included), 1 when one side is absent, else 0.
fn match_score(a: Option<&str>, b: Option<&str>) -> u32 {
    match (a, b) {
        (a, b) if a == b => 2,
        (None, _) | (_, None) => 1,
        _ => 0,
    }
}

fn primary_language(id: &LanguageIdentifier) -> Option<&str> {
    (!id.language.is_empty()).then(|| id.language.as_str())
}

fn language_score(a: &LanguageIdentifier, b: &LanguageIdentifier) -> u32 {
    let language = match_score(primary_language(a), primary_language(b));
    if language == 0 {
        return 0;
    }

    let region = match_score(
        a.region.as_ref().map(|r| r.as_str()),
        b.region.as_ref().map(|r| r.as_str()),
    );
    let script = match_score(
        a.script.as_ref().map(|s| s.as_str()),
        b.script.as_ref().map(|s| s.as_str()),
    );
    language * 16 + region * 4 + script
}

/// The entry of `available` closest to `desired`.
///
/// Language weighs 16, region 4 and script 1; a different language never
/// matches. Ties go to the earlier entry.
pub fn get_closest_language<'a>(desired: &str, available: &[&'a str]) -> Option<&'a str> {
    let desired: LanguageIdentifier = desired.parse().ok()?;
    if desired.language.is_empty() {
        return None;
    }

    let mut best: Option<(&'a str, u32)> = None;
    for &candidate in available {
        let Ok(parsed) = candidate.parse::<LanguageIdentifier>() else {
            continue;
        };
        let score = language_score(&desired, &parsed);
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map(|(language, _)| language)
}

/// The translation table to use for `desired`.
pub fn get_translation_language(desired: &str) -> TranslationLanguage {
    let tags: Vec<&str> = TranslationLanguage::ALL.iter().map(|l| l.tag()).collect();
    get_closest_language(desired, &tags)
        .and_then(|tag| TranslationLanguage::ALL.iter().copied().find(|l| l.tag() == tag))
        .unwrap_or(FALLBACK_TRANSLATION)
}
