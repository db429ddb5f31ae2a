//! `%`-directive templates for history records.
//!
//! A template is parsed once and then rendered per record. `%x` inserts a
//! value, `\n \t \r \\` are escapes, and any other character is copied.

use std::fmt::Write;

use thiserror::Error;

use wsp_core::RainTotals;
use wsp_core::weather::{dew_point, relative_pressure, wind_chill};
use wsp_types::HistoryItem;

use crate::format::format_timestamp;

/// A template that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    #[error("Incorrect format string at character {position}, %{directive} is not a valid variable.")]
    InvalidDirective { position: usize, directive: char },

    #[error("Incorrect format string at character {position}, % must be followed by a variable.")]
    MissingDirective { position: usize },
}

/// One `%x` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Index,
    IndoorHumidity,
    OutdoorHumidity,
    IndoorTemperature,
    OutdoorTemperature,
    DewPoint,
    WindChill,
    AverageWind,
    GustWind,
    DirectionName,
    DirectionDegrees,
    AbsolutePressure,
    RelativePressure,
    TotalRain,
    RainHour,
    RainDayHourly,
    RainDay,
    Timestamp,
    ContactWord,
    ContactFlag,
    Address,
    RawBytes,
    Percent,
}

impl Directive {
    /// Every directive in listing order.
    pub const ALL: [Directive; 23] = [
        Directive::Index,
        Directive::IndoorHumidity,
        Directive::OutdoorHumidity,
        Directive::IndoorTemperature,
        Directive::OutdoorTemperature,
        Directive::DewPoint,
        Directive::WindChill,
        Directive::AverageWind,
        Directive::GustWind,
        Directive::DirectionName,
        Directive::DirectionDegrees,
        Directive::AbsolutePressure,
        Directive::RelativePressure,
        Directive::TotalRain,
        Directive::RainHour,
        Directive::RainDayHourly,
        Directive::RainDay,
        Directive::Timestamp,
        Directive::ContactWord,
        Directive::ContactFlag,
        Directive::Address,
        Directive::RawBytes,
        Directive::Percent,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.symbol() == c)
    }

    pub fn symbol(self) -> char {
        match self {
            Directive::Index => 'i',
            Directive::IndoorHumidity => 'h',
            Directive::OutdoorHumidity => 'H',
            Directive::IndoorTemperature => 't',
            Directive::OutdoorTemperature => 'T',
            Directive::DewPoint => 'C',
            Directive::WindChill => 'c',
            Directive::AverageWind => 'W',
            Directive::GustWind => 'G',
            Directive::DirectionName => 'D',
            Directive::DirectionDegrees => 'd',
            Directive::AbsolutePressure => 'P',
            Directive::RelativePressure => 'p',
            Directive::TotalRain => 'R',
            Directive::RainHour => 'r',
            Directive::RainDayHourly => 'F',
            Directive::RainDay => 'f',
            Directive::Timestamp => 'N',
            Directive::ContactWord => 'e',
            Directive::ContactFlag => 'E',
            Directive::Address => 'a',
            Directive::RawBytes => 'b',
            Directive::Percent => '%',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Directive::Index => "History index",
            Directive::IndoorHumidity => "Indoor humidity (%)",
            Directive::OutdoorHumidity => "Outdoor humidity (%)",
            Directive::IndoorTemperature => "Indoor temperature (C)",
            Directive::OutdoorTemperature => "Outdoor temperature (C)",
            Directive::DewPoint => "Dew point (C)",
            Directive::WindChill => "Wind chill (C)",
            Directive::AverageWind => "Average wind speed (m/s)",
            Directive::GustWind => "Gust wind speed (m/s)",
            Directive::DirectionName => "Wind direction, compass name",
            Directive::DirectionDegrees => "Wind direction, degrees",
            Directive::AbsolutePressure => "Absolute pressure (hPa)",
            Directive::RelativePressure => "Relative pressure (hPa)",
            Directive::TotalRain => "Total rain (mm)",
            Directive::RainHour => "Rain in the last hour (mm)",
            Directive::RainDayHourly => "Rain in the last 24 hours, per hour (mm/h)",
            Directive::RainDay => "Rain in the last 24 hours (mm)",
            Directive::Timestamp => "Date and time of the record",
            Directive::ContactWord => "Sensor contact, True or False",
            Directive::ContactFlag => "Sensor contact, 1 or 0",
            Directive::Address => "Memory address (hex)",
            Directive::RawBytes => "Raw record bytes (hex)",
            Directive::Percent => "A literal %",
        }
    }

    fn needs_rain(self) -> bool {
        matches!(
            self,
            Directive::RainHour | Directive::RainDayHourly | Directive::RainDay
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Value(Directive),
}

/// Values a template needs besides the record itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    /// Station altitude in meters.
    pub altitude: f32,
    /// Rain windows for this record.
    pub rain: RainTotals,
}

/// A parsed `%`-directive template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] naming the offset of the first bad
    /// directive.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices();

        while let Some((_, c)) = chars.next() {
            match c {
                '%' => {
                    let Some((position, symbol)) = chars.next() else {
                        return Err(TemplateError::MissingDirective {
                            position: source.len(),
                        });
                    };
                    let directive =
                        Directive::from_char(symbol).ok_or(TemplateError::InvalidDirective {
                            position,
                            directive: symbol,
                        })?;
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Value(directive));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, 'r')) => text.push('\r'),
                    Some((_, other)) => text.push(other),
                    None => text.push('\\'),
                },
                other => text.push(other),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Ok(Self { segments })
    }

    /// Whether rendering needs rain windows.
    pub fn needs_rain(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Value(d) if d.needs_rain()))
    }

    /// Render one record.
    pub fn render(&self, item: &HistoryItem, ctx: &RenderContext) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Value(directive) => render_directive(&mut out, *directive, item, ctx),
            }
        }
        out
    }
}

fn render_directive(out: &mut String, directive: Directive, item: &HistoryItem, ctx: &RenderContext) {
    let r = &item.record;
    // Writing to a String cannot fail.
    let _ = match directive {
        Directive::Index => write!(out, "{}", item.index),
        Directive::IndoorHumidity => write!(out, "{}", r.indoor_humidity),
        Directive::OutdoorHumidity => write!(out, "{}", r.outdoor_humidity),
        Directive::IndoorTemperature => write!(out, "{:.1}", r.indoor_temperature()),
        Directive::OutdoorTemperature => write!(out, "{:.1}", r.outdoor_temperature()),
        Directive::DewPoint => write!(out, "{:.1}", dew_point(r)),
        Directive::WindChill => write!(out, "{:.1}", wind_chill(r)),
        Directive::AverageWind => write!(out, "{:.1}", r.avg_wind_speed()),
        Directive::GustWind => write!(out, "{:.1}", r.gust_speed()),
        Directive::DirectionName => write!(out, "{}", r.direction_label()),
        Directive::DirectionDegrees => write!(out, "{:.0}", r.direction_degrees()),
        Directive::AbsolutePressure => write!(out, "{:.1}", r.abs_pressure_hpa()),
        Directive::RelativePressure => write!(out, "{:.1}", relative_pressure(r, ctx.altitude)),
        Directive::TotalRain => write!(out, "{:.1}", r.total_rain_mm()),
        Directive::RainHour => write!(out, "{:.1}", ctx.rain.last_hour),
        Directive::RainDayHourly => write!(out, "{:.1}", ctx.rain.day_hourly_rate()),
        Directive::RainDay => write!(out, "{:.1}", ctx.rain.last_day),
        Directive::Timestamp => write!(out, "{}", format_timestamp(item.timestamp)),
        Directive::ContactWord => {
            write!(out, "{}", if r.sensor_contact() { "True" } else { "False" })
        }
        Directive::ContactFlag => write!(out, "{}", u8::from(r.sensor_contact())),
        Directive::Address => write!(out, "{:04x}", item.address),
        Directive::RawBytes => write!(out, "{}", r.raw_hex()),
        Directive::Percent => write!(out, "%"),
    };
}

/// Directive listing for `format-list`.
pub fn directive_list() -> String {
    let mut out = String::from("Template directives:\n");
    for directive in Directive::ALL {
        let _ = writeln!(out, "  %{}\t{}", directive.symbol(), directive.description());
    }
    out.push_str("\nEscapes: \\n newline, \\t tab, \\r carriage return, \\\\ backslash\n");
    out
}
