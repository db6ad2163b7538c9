//! Attribution for the data and artwork in a rendered widget.
//!
//! The texts end up in a leading comment of the SVG. A response only credits
//! the services that were actually used for it.

pub const CREDIT_HEADER: &str = "\nweather.svg - https://github.com/SegaraRai/weather.svg\n";

pub const CREDIT_OPEN_METEO: &str =
    "\nWeather data by Open-Meteo.com (https://open-meteo.com/)\nLicensed under CC BY 4.0\n";

pub const CREDIT_BIG_DATA_CLOUD: &str =
    "\nReverse geocoding by BigDataCloud (https://www.bigdatacloud.com/)\n";

pub const CREDIT_METEOCONS: &str =
    "\nWeather icons by Meteocons (https://github.com/basmilius/weather-icons)\nLicensed under MIT\n";
