//! Output formatting for reports and history records.

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use wsp_core::RainTotals;
use wsp_core::weather::{beaufort, dew_point, relative_pressure, wind_chill};
use wsp_types::layout::HISTORY_MAX;
use wsp_types::units::{rain_mm, tenths};
use wsp_types::{
    Alarm, DateLine, Extreme, HistoryItem, OutdoorLine, PressureUnit, RainPeriod,
    RainUnit, StationSettings, TemperatureUnit, WindDirection, WindSpeedUnit,
};

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Station altitude in meters, for relative pressure.
    pub altitude: f32,
    /// Visual styling mode.
    pub style: StyleMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            no_header: false,
            compact: false,
            altitude: 0.0,
            style: StyleMode::Rich,
        }
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        Self {
            no_color: no_color || style == StyleMode::Plain,
            style,
            ..Self::default()
        }
    }

    /// Check if rich styling is enabled.
    pub fn is_rich(&self) -> bool {
        self.style == StyleMode::Rich
    }

    /// Create with no_header option for CSV output.
    #[must_use]
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    #[must_use]
    pub fn with_altitude(mut self, altitude: f32) -> Self {
        self.altitude = altitude;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    fn section(&self, title: &str) -> String {
        style::format_section(title, self.no_color)
    }
}

/// Record timestamp as printed everywhere: seconds are always `00`.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:00"
    ))
    .unwrap_or_else(|_| "Unknown".to_string())
}

fn direction_name(code: u8) -> &'static str {
    WindDirection::from_code(code).map_or("--", WindDirection::label)
}

// ============================================================================
// Summary
// ============================================================================

/// Indoor and outdoor values of the newest record.
///
/// The outdoor block is replaced by a notice when the sensor had no
/// contact.
#[must_use]
pub fn format_summary_text(item: &HistoryItem, opts: &FormatOptions) -> String {
    let r = &item.record;
    let mut out = String::new();

    let _ = writeln!(out, "{}", opts.section("Indoor"));
    let _ = writeln!(
        out,
        "  Temperature:\t\t{}",
        style::format_temp_colored(r.indoor_temperature(), opts.no_color)
    );
    let _ = writeln!(
        out,
        "  Humidity:\t\t{}",
        style::format_humidity_colored(r.indoor_humidity, opts.no_color)
    );
    out.push('\n');

    if !r.sensor_contact() {
        let _ = writeln!(
            out,
            "{} {}",
            opts.section("Outdoor"),
            style::format_warning("NO CONTACT WITH SENSOR", opts.no_color)
        );
        return out;
    }

    let _ = writeln!(out, "{}", opts.section("Outdoor"));
    let _ = writeln!(
        out,
        "  Temperature:\t\t{}",
        style::format_temp_colored(r.outdoor_temperature(), opts.no_color)
    );
    let _ = writeln!(out, "  Wind chill:\t\t{:.1} C", wind_chill(r));
    let _ = writeln!(out, "  Dewpoint:\t\t{:.1} C", dew_point(r));
    let _ = writeln!(
        out,
        "  Humidity:\t\t{}",
        style::format_humidity_colored(r.outdoor_humidity, opts.no_color)
    );
    let _ = writeln!(out, "  Absolute pressure:\t{:.1} hPa", r.abs_pressure_hpa());
    let _ = writeln!(
        out,
        "  Relative pressure:\t{:.1} hPa",
        relative_pressure(r, opts.altitude)
    );
    let _ = writeln!(out, "  Average windspeed:\t{:.1} m/s", r.avg_wind_speed());
    let _ = writeln!(out, "  Gust wind speed:\t{:.1} m/s", r.gust_speed());
    let _ = writeln!(
        out,
        "  Wind direction:\t{:.0} {}",
        r.direction_degrees(),
        r.direction_label()
    );
    let _ = writeln!(out, "  Total rain:\t\t{:.1} mm", r.total_rain_mm());
    out
}

// ============================================================================
// Settings block reports
// ============================================================================

/// Timezone as the station shows it, relative to CET.
pub fn format_timezone(hours: i8) -> String {
    let sign = if hours >= 0 { '+' } else { '-' };
    format!("CET{}{}", sign, hours.unsigned_abs())
}

/// Read period, fill level, position and clock of the settings block.
#[must_use]
pub fn format_status_text(settings: &StationSettings, opts: &FormatOptions) -> String {
    let mut out = String::new();

    let magic = format!(
        "0x{:x}{:x}",
        settings.magic_number[0], settings.magic_number[1]
    );
    if settings.has_valid_magic() {
        let _ = writeln!(out, "Magic number:\t\t\t{}", magic);
    } else {
        let _ = writeln!(
            out,
            "Magic number:\t\t\t{}",
            style::format_warning(&magic, opts.no_color)
        );
    }
    let _ = writeln!(out, "Read period:\t\t\t{} minutes", settings.read_period);
    let _ = writeln!(out, "Timezone:\t\t\t{}", format_timezone(settings.timezone));
    let _ = writeln!(
        out,
        "Data count:\t\t\t{}/{} ({:.1}%)",
        settings.data_count,
        HISTORY_MAX,
        settings.fill_percent()
    );
    let _ = writeln!(
        out,
        "Current memory position:\t{} (0x{:x})",
        settings.current_pos, settings.current_pos
    );
    let _ = writeln!(
        out,
        "Current relative pressure:\t{:.1} hPa",
        tenths(i32::from(settings.relative_pressure))
    );
    let _ = writeln!(
        out,
        "Current absolute pressure:\t{:.1} hPa",
        tenths(i32::from(settings.absolute_pressure))
    );
    let unknown: String = settings.unknown.iter().map(|b| format!("{:x}", b)).collect();
    let _ = writeln!(out, "Unknown bytes:\t\t\t0x{}", unknown);
    let _ = writeln!(out, "Station date/time:\t\t{}", settings.datetime);
    out
}

fn temperature_unit(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "Celsius",
        TemperatureUnit::Fahrenheit => "Fahrenheit",
    }
}

fn or_unset(label: Option<&'static str>) -> &'static str {
    label.unwrap_or("(not set)")
}

/// Unit and display settings.
#[must_use]
pub fn format_settings_text(settings: &StationSettings, opts: &FormatOptions) -> String {
    let units = settings.units;
    let display = settings.display;
    let mut out = String::new();

    let _ = writeln!(out, "{}", opts.section("Unit settings"));
    let _ = writeln!(
        out,
        "  Indoor temperature unit:\t{}",
        temperature_unit(units.indoor_temperature())
    );
    let _ = writeln!(
        out,
        "  Outdoor temperature unit:\t{}",
        temperature_unit(units.outdoor_temperature())
    );
    let rain = match units.rain() {
        RainUnit::Millimetre => "mm",
        RainUnit::Inch => "inch",
    };
    let _ = writeln!(out, "  Rain unit:\t\t\t{}", rain);
    let pressure = units.pressure().map(|p| match p {
        PressureUnit::Hpa => "hPa",
        PressureUnit::InHg => "inHg",
        PressureUnit::MmHg => "mmHg",
    });
    let _ = writeln!(out, "  Pressure unit:\t\t{}", or_unset(pressure));
    let wind = units.wind_speed().map(|w| match w {
        WindSpeedUnit::MetresPerSecond => "m/s",
        WindSpeedUnit::KilometresPerHour => "km/h",
        WindSpeedUnit::Knot => "knot",
        WindSpeedUnit::MilesPerHour => "mph",
        WindSpeedUnit::Beaufort => "bft",
    });
    let _ = writeln!(out, "  Wind speed unit:\t\t{}", or_unset(wind));

    let _ = writeln!(out, "{}", opts.section("Display settings"));
    let pick = |on: bool, yes: &'static str, no: &'static str| if on { yes } else { no };
    let _ = writeln!(
        out,
        "  Pressure:\t\t\t{}",
        pick(display.relative_pressure(), "Relative", "Absolute")
    );
    let _ = writeln!(
        out,
        "  Wind speed:\t\t\t{}",
        pick(display.wind_gust(), "Gust", "Average")
    );
    let _ = writeln!(
        out,
        "  Time:\t\t\t\t{}",
        pick(display.time_12h(), "12 hour", "24 hour")
    );
    let _ = writeln!(
        out,
        "  Date:\t\t\t\t{}",
        pick(display.month_first(), "Month-day-year", "Day-month-year")
    );
    let _ = writeln!(
        out,
        "  Time scale:\t\t\t{}",
        pick(display.time_scale_24h(), "24 hour", "12 hour")
    );
    let date_line = display.date_line().map(|d| match d {
        DateLine::Year => "Show year",
        DateLine::DayName => "Show day name",
        DateLine::AlarmTime => "Alarm time",
    });
    let _ = writeln!(out, "  Date line:\t\t\t{}", or_unset(date_line));
    let outdoor = display.outdoor_line().map(|o| match o {
        OutdoorLine::Temperature => "Temperature",
        OutdoorLine::WindChill => "Wind chill",
        OutdoorLine::DewPoint => "Dew point",
    });
    let _ = writeln!(out, "  Outdoor temperature:\t\t{}", or_unset(outdoor));
    let rain_period = display.rain_period().map(|p| match p {
        RainPeriod::Hour => "Hour",
        RainPeriod::Day => "Day",
        RainPeriod::Week => "Week",
        RainPeriod::Month => "Month",
        RainPeriod::Total => "Total",
    });
    let _ = writeln!(out, "  Rain:\t\t\t\t{}", or_unset(rain_period));
    out
}

/// Human-readable alarm name.
pub fn alarm_label(alarm: Alarm) -> &'static str {
    match alarm {
        Alarm::Time => "Time",
        Alarm::WindDirection => "Wind direction",
        Alarm::IndoorHumidityLow => "Indoor humidity low",
        Alarm::IndoorHumidityHigh => "Indoor humidity high",
        Alarm::OutdoorHumidityLow => "Outdoor humidity low",
        Alarm::OutdoorHumidityHigh => "Outdoor humidity high",
        Alarm::WindAverage => "Wind average",
        Alarm::WindGust => "Wind gust",
        Alarm::RainHourly => "Rain hourly",
        Alarm::RainDaily => "Rain daily",
        Alarm::AbsPressureLow => "Abs pressure low",
        Alarm::AbsPressureHigh => "Abs pressure high",
        Alarm::RelPressureLow => "Relative pressure low",
        Alarm::RelPressureHigh => "Relative pressure high",
        Alarm::IndoorTempLow => "Indoor temperature low",
        Alarm::IndoorTempHigh => "Indoor temperature high",
        Alarm::OutdoorTempLow => "Outdoor temperature low",
        Alarm::OutdoorTempHigh => "Outdoor temperature high",
        Alarm::WindChillLow => "Wind chill low",
        Alarm::WindChillHigh => "Wind chill high",
        Alarm::DewPointLow => "Dew point low",
        Alarm::DewPointHigh => "Dew point high",
    }
}

/// Threshold of one alarm, with its unit.
pub fn alarm_threshold(settings: &StationSettings, alarm: Alarm) -> String {
    let a = &settings.alarms;
    let temp = |raw: i32| format!("{:.1} C", tenths(raw));
    let hpa = |raw: u16| format!("{:.1} hPa", tenths(i32::from(raw)));
    match alarm {
        Alarm::Time => {
            let (hour, minute) = a.time_hm();
            format!("{:02}:{:02}", hour, minute)
        }
        Alarm::WindDirection => format!(
            "{:.0} {}",
            f32::from(a.wind_direction) * 22.5,
            direction_name(a.wind_direction)
        ),
        Alarm::IndoorHumidityLow => format!("{}%", a.indoor_humidity_low),
        Alarm::IndoorHumidityHigh => format!("{}%", a.indoor_humidity_high),
        Alarm::OutdoorHumidityLow => format!("{}%", a.outdoor_humidity_low),
        Alarm::OutdoorHumidityHigh => format!("{}%", a.outdoor_humidity_high),
        Alarm::WindAverage => format!(
            "{:.1} m/s ({} bft)",
            f32::from(a.avg_wind_speed) * 0.1,
            a.avg_wind_beaufort
        ),
        Alarm::WindGust => format!(
            "{:.1} m/s ({} bft)",
            f32::from(a.gust_speed) * 0.1,
            a.gust_beaufort
        ),
        Alarm::RainHourly => format!("{:.1} mm", rain_mm(a.rain_hourly)),
        Alarm::RainDaily => format!("{:.1} mm", rain_mm(a.rain_daily)),
        Alarm::AbsPressureLow => hpa(a.abs_pressure_low),
        Alarm::AbsPressureHigh => hpa(a.abs_pressure_high),
        Alarm::RelPressureLow => hpa(a.rel_pressure_low),
        Alarm::RelPressureHigh => hpa(a.rel_pressure_high),
        Alarm::IndoorTempLow => temp(a.indoor_temp_low),
        Alarm::IndoorTempHigh => temp(a.indoor_temp_high),
        Alarm::OutdoorTempLow => temp(a.outdoor_temp_low),
        Alarm::OutdoorTempHigh => temp(a.outdoor_temp_high),
        Alarm::WindChillLow => temp(a.wind_chill_low),
        Alarm::WindChillHigh => temp(a.wind_chill_high),
        Alarm::DewPointLow => temp(a.dew_point_low),
        Alarm::DewPointHigh => temp(a.dew_point_high),
    }
}

/// Every alarm threshold with its enabled state.
#[must_use]
pub fn format_alarms_text(settings: &StationSettings, opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    let mut builder = Builder::default();
    builder.push_record(["Alarm", "Threshold", "State"]);
    for alarm in Alarm::ALL {
        builder.push_record([
            alarm_label(alarm).to_string(),
            alarm_threshold(settings, alarm),
            style::format_enabled(settings.alarm_enable.is_enabled(alarm), opts.no_color),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);

    let mut out = format!("{}\n", opts.section("Alarms"));
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

fn extreme_row<T: Copy>(
    label: &str,
    extreme: Extreme<T>,
    show: impl Fn(T) -> String,
) -> [String; 3] {
    [label.to_string(), show(extreme.value), extreme.at.to_string()]
}

/// Recorded extremes with their dates.
#[must_use]
pub fn format_maxmin_text(settings: &StationSettings, opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    let e = &settings.extremes;
    let temp = |raw: i32| format!("{:.1} C", tenths(raw));
    let humidity = |raw: u8| format!("{}%", raw);
    let hpa = |raw: u16| format!("{:.1} hPa", tenths(i32::from(raw)));
    let wind = |raw: u16| format!("{:.1} m/s", f32::from(raw) * 0.1);
    let rain = |raw: u16| format!("{:.1} mm", rain_mm(raw));

    let rows = [
        extreme_row("Max indoor temperature", e.max_indoor_temp, temp),
        extreme_row("Min indoor temperature", e.min_indoor_temp, temp),
        extreme_row("Max indoor humidity", e.max_indoor_humidity, humidity),
        extreme_row("Min indoor humidity", e.min_indoor_humidity, humidity),
        extreme_row("Max outdoor temperature", e.max_outdoor_temp, temp),
        extreme_row("Min outdoor temperature", e.min_outdoor_temp, temp),
        extreme_row("Max wind chill", e.max_wind_chill, temp),
        extreme_row("Min wind chill", e.min_wind_chill, temp),
        extreme_row("Max dew point", e.max_dew_point, temp),
        extreme_row("Min dew point", e.min_dew_point, temp),
        extreme_row("Max outdoor humidity", e.max_outdoor_humidity, humidity),
        extreme_row("Min outdoor humidity", e.min_outdoor_humidity, humidity),
        extreme_row("Max abs pressure", e.max_abs_pressure, hpa),
        extreme_row("Min abs pressure", e.min_abs_pressure, hpa),
        extreme_row("Max relative pressure", e.max_rel_pressure, hpa),
        extreme_row("Min relative pressure", e.min_rel_pressure, hpa),
        extreme_row("Max average wind speed", e.max_avg_wind, wind),
        extreme_row("Max gust wind speed", e.max_gust, wind),
        extreme_row("Max rain hourly", e.max_rain_hourly, rain),
        extreme_row("Max rain daily", e.max_rain_daily, rain),
        extreme_row("Max rain weekly", e.max_rain_weekly, rain),
        extreme_row("Max rain monthly", e.max_rain_monthly, rain),
        extreme_row("Max rain total", e.max_rain_total, rain),
    ];

    let mut builder = Builder::default();
    builder.push_record(["Max/min values", "Value", "Date/Time"]);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);

    let mut out = table.to_string();
    out.push('\n');
    out
}

// ============================================================================
// History formatting
// ============================================================================

/// A history record ready for output, with its rain windows when they
/// were computed.
#[derive(Debug, Clone, Copy)]
pub struct HistoryRow {
    pub item: HistoryItem,
    pub rain: Option<RainTotals>,
}

fn rain_cell(rain: Option<f32>) -> String {
    rain.map(|mm| format!("{:.1}", mm)).unwrap_or_default()
}

#[must_use]
pub fn format_history_text(rows: &[HistoryRow], opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    if rows.is_empty() {
        return "No history records found.\n".to_string();
    }

    // Narrow terminals get fewer records to avoid wrapping issues
    let term_width = style::terminal_width();
    let max_records = if term_width < 100 { 10 } else { 20 };
    let skipped = rows.len().saturating_sub(max_records);

    let mut output = format!("History ({} records):\n\n", rows.len());

    let mut builder = Builder::default();
    builder.push_record([
        "#", "Time", "In", "In RH", "Out", "Out RH", "Wind", "Gust", "Dir", "Pressure",
        "Rain", "Rain 1h", "Rain 24h",
    ]);
    for row in &rows[skipped..] {
        let r = &row.item.record;
        let (outdoor, outdoor_rh) = if r.sensor_contact() {
            (
                style::format_temp_colored(r.outdoor_temperature(), opts.no_color),
                style::format_humidity_colored(r.outdoor_humidity, opts.no_color),
            )
        } else {
            ("--".to_string(), "--".to_string())
        };
        builder.push_record([
            row.item.index.to_string(),
            format_timestamp(row.item.timestamp),
            style::format_temp_colored(r.indoor_temperature(), opts.no_color),
            style::format_humidity_colored(r.indoor_humidity, opts.no_color),
            outdoor,
            outdoor_rh,
            format!("{:.1}", r.avg_wind_speed()),
            format!("{:.1}", r.gust_speed()),
            r.direction_label().to_string(),
            format!("{:.1}", relative_pressure(r, opts.altitude)),
            format!("{:.1}", r.total_rain_mm()),
            rain_cell(row.rain.map(|t| t.last_hour)),
            rain_cell(row.rain.map(|t| t.last_day)),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    output.push_str(&table.to_string());
    output.push('\n');

    if skipped > 0 {
        let _ = writeln!(output, "... and {} older records", skipped);
        output.push_str("(Use --format csv or --format json for full data)\n");
    }

    output
}

#[must_use]
pub fn format_history_csv(rows: &[HistoryRow], opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "index,address,timestamp,delay,indoor_humidity,indoor_temperature_c,\
         outdoor_humidity,outdoor_temperature_c,dew_point_c,wind_chill_c,\
         abs_pressure_hpa,rel_pressure_hpa,avg_wind_ms,gust_wind_ms,wind_direction,\
         total_rain_mm,rain_1h_mm,rain_24h_mm,sensor_contact\n"
            .to_string()
    };
    for row in rows {
        let item = &row.item;
        let r = &item.record;
        let _ = writeln!(
            output,
            "{},0x{:04x},{},{},{},{:.1},{},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{},{:.1},{},{},{}",
            item.index,
            item.address,
            format_timestamp(item.timestamp),
            r.delay,
            r.indoor_humidity,
            r.indoor_temperature(),
            r.outdoor_humidity,
            r.outdoor_temperature(),
            dew_point(r),
            wind_chill(r),
            r.abs_pressure_hpa(),
            relative_pressure(r, opts.altitude),
            r.avg_wind_speed(),
            r.gust_speed(),
            r.direction_label(),
            r.total_rain_mm(),
            rain_cell(row.rain.map(|t| t.last_hour)),
            rain_cell(row.rain.map(|t| t.last_day)),
            r.sensor_contact(),
        );
    }
    output
}

/// Format history as JSON with derived metrics included.
pub fn format_history_json(rows: &[HistoryRow], opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct HistoryRecordJson {
        index: u16,
        address: u16,
        timestamp: String,
        delay: u8,
        indoor_humidity: u8,
        indoor_temperature: f32,
        outdoor_humidity: u8,
        outdoor_temperature: f32,
        dew_point: f32,
        wind_chill: f32,
        abs_pressure: f32,
        rel_pressure: f32,
        avg_wind_speed: f32,
        gust_speed: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        wind_direction: Option<&'static str>,
        total_rain: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        rain_1h: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rain_24h: Option<f32>,
        sensor_contact: bool,
        rain_overflow: bool,
    }

    let records: Vec<HistoryRecordJson> = rows
        .iter()
        .map(|row| {
            let r = &row.item.record;
            HistoryRecordJson {
                index: row.item.index,
                address: row.item.address,
                timestamp: row
                    .item
                    .timestamp
                    .format(&time::format_description::well_known::Rfc3339)
                    .unwrap_or_default(),
                delay: r.delay,
                indoor_humidity: r.indoor_humidity,
                indoor_temperature: r.indoor_temperature(),
                outdoor_humidity: r.outdoor_humidity,
                outdoor_temperature: r.outdoor_temperature(),
                dew_point: dew_point(r),
                wind_chill: wind_chill(r),
                abs_pressure: r.abs_pressure_hpa(),
                rel_pressure: relative_pressure(r, opts.altitude),
                avg_wind_speed: r.avg_wind_speed(),
                gust_speed: r.gust_speed(),
                wind_direction: r.direction().map(WindDirection::label),
                total_rain: r.total_rain_mm(),
                rain_1h: row.rain.map(|t| t.last_hour),
                rain_24h: row.rain.map(|t| t.last_day),
                sensor_contact: r.sensor_contact(),
                rain_overflow: r.rain_overflow(),
            }
        })
        .collect();

    opts.as_json(&records)
}

/// One EasyWeather-compatible line.
///
/// `now` is the time the memory was read. The relative pressure column
/// repeats the absolute pressure and the windowed rain columns are zero,
/// matching what EasyWeather importers expect from this station.
#[must_use]
pub fn format_easyweather_line(item: &HistoryItem, now: OffsetDateTime) -> String {
    let r = &item.record;
    let avg = r.avg_wind_speed();
    let gust = r.gust_speed();
    let mut out = String::new();

    let _ = write!(
        out,
        "{}, {}, {}, {}, {}, {:2.1}, {}, {:2.1}, {:2.1}, {:2.1}, {:4.1}, {:4.1}, \
         {:2.1}, {}, {:2.1}, {}, {:2.1}, {}, {}, {:2.1}, ",
        item.index,
        format_timestamp(now),
        format_timestamp(item.timestamp),
        r.delay,
        r.indoor_humidity,
        r.indoor_temperature(),
        r.outdoor_humidity,
        r.outdoor_temperature(),
        dew_point(r),
        wind_chill(r),
        r.abs_pressure_hpa(),
        r.abs_pressure_hpa(),
        avg,
        beaufort(avg),
        gust,
        beaufort(gust),
        r.direction_degrees(),
        r.direction_label(),
        r.total_rain,
        r.total_rain_mm(),
    );
    for _ in 0..6 {
        out.push_str("0.0, ");
    }
    for bit in 0..8 {
        let _ = write!(out, "{}, ", u8::from(r.status_bit(bit)));
    }
    let _ = write!(out, "{:06x}, ", item.address);
    for byte in r.raw {
        let _ = write!(out, "{:X} ", byte);
    }
    out.push_str(",\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use wsp_core::MockRecord;
    use wsp_types::WeatherRecord;
    use wsp_types::layout::SETTINGS_BLOCK_SIZE;

    fn plain() -> FormatOptions {
        FormatOptions::new(true, StyleMode::Plain)
    }

    fn item_with(record: MockRecord) -> HistoryItem {
        HistoryItem {
            index: 1,
            address: 0x0100,
            timestamp: datetime!(2010-09-13 13:41 UTC),
            record: WeatherRecord::from_bytes(&record.to_bytes()).unwrap(),
        }
    }

    fn sample_item() -> HistoryItem {
        item_with(MockRecord {
            total_rain: 34,
            ..MockRecord::default()
        })
    }

    fn settings_with(bytes: &[(usize, u8)]) -> StationSettings {
        let mut block = vec![0u8; SETTINGS_BLOCK_SIZE];
        block[0] = 0x55;
        block[1] = 0xAA;
        for &(offset, value) in bytes {
            block[offset] = value;
        }
        StationSettings::from_bytes(&block).unwrap()
    }

    // ========================================================================
    // FormatOptions tests
    // ========================================================================

    #[test]
    fn test_plain_style_disables_color() {
        let opts = FormatOptions::new(false, StyleMode::Plain);
        assert!(opts.no_color);
        assert!(!opts.is_rich());
    }

    #[test]
    fn test_as_json_compact() {
        let opts = FormatOptions::default().with_compact(true);
        assert_eq!(opts.as_json(&[1, 2]).unwrap(), "[1,2]\n");
    }

    #[test]
    fn test_format_timestamp_zero_seconds() {
        assert_eq!(
            format_timestamp(datetime!(2010-09-13 13:41:34 UTC)),
            "2010-09-13 13:41:00"
        );
    }

    // ========================================================================
    // Summary tests
    // ========================================================================

    #[test]
    fn test_summary_with_contact() {
        let text = format_summary_text(&sample_item(), &plain());
        assert!(text.starts_with("Indoor:\n  Temperature:\t\t21.5 C\n  Humidity:\t\t45%\n"));
        assert!(text.contains("Outdoor:\n  Temperature:\t\t12.3 C\n"));
        assert!(text.contains("  Absolute pressure:\t1013.2 hPa\n"));
        assert!(text.contains("  Wind direction:\t90 E\n"));
        assert!(text.contains("  Total rain:\t\t10.2 mm\n"));
    }

    #[test]
    fn test_summary_without_contact() {
        let item = item_with(MockRecord::default().status(0x40));
        let text = format_summary_text(&item, &plain());
        assert!(text.contains("Outdoor: [!!] NO CONTACT WITH SENSOR"));
        assert!(!text.contains("Wind chill"));
    }

    // ========================================================================
    // Settings report tests
    // ========================================================================

    #[test]
    fn test_timezone() {
        assert_eq!(format_timezone(0), "CET+0");
        assert_eq!(format_timezone(2), "CET+2");
        assert_eq!(format_timezone(-5), "CET-5");
    }

    #[test]
    fn test_status_text() {
        // read period 30, data count 2040, current pos 0x0110
        let settings = settings_with(&[(16, 30), (27, 0xF8), (28, 0x07), (30, 0x10), (31, 0x01)]);
        let text = format_status_text(&settings, &plain());
        assert!(text.contains("Magic number:\t\t\t0x55aa\n"));
        assert!(text.contains("Read period:\t\t\t30 minutes\n"));
        assert!(text.contains("Data count:\t\t\t2040/4080 (50.0%)\n"));
        assert!(text.contains("Current memory position:\t272 (0x110)\n"));
    }

    #[test]
    fn test_status_flags_bad_magic() {
        let mut settings = settings_with(&[]);
        settings.magic_number = [0x12, 0x34];
        let text = format_status_text(&settings, &plain());
        assert!(text.contains("[!!] 0x1234"));
    }

    #[test]
    fn test_settings_text_units() {
        // fahrenheit outdoor, hPa; km/h
        let settings = settings_with(&[(17, 0b0010_0010), (18, 0b0000_0010)]);
        let text = format_settings_text(&settings, &plain());
        assert!(text.contains("Indoor temperature unit:\tCelsius\n"));
        assert!(text.contains("Outdoor temperature unit:\tFahrenheit\n"));
        assert!(text.contains("Pressure unit:\t\thPa\n"));
        assert!(text.contains("Wind speed unit:\t\tkm/h\n"));
        assert!(text.contains("Rain:\t\t\t\t(not set)\n"));
    }

    #[test]
    fn test_alarm_labels_unique() {
        let mut labels: Vec<_> = Alarm::ALL.iter().map(|a| alarm_label(*a)).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Alarm::ALL.len());
    }

    #[test]
    fn test_alarms_text_lists_every_alarm() {
        let settings = settings_with(&[]);
        let text = format_alarms_text(&settings, &plain());
        for alarm in Alarm::ALL {
            assert!(text.contains(alarm_label(alarm)));
        }
        assert!(text.contains("Disabled"));
    }

    #[test]
    fn test_maxmin_text_has_dates() {
        let settings = settings_with(&[]);
        let text = format_maxmin_text(&settings, &plain());
        assert!(text.contains("Max rain total"));
        assert!(text.contains("Date/Time"));
    }

    // ========================================================================
    // History tests
    // ========================================================================

    #[test]
    fn test_history_text_empty() {
        assert_eq!(
            format_history_text(&[], &plain()),
            "No history records found.\n"
        );
    }

    #[test]
    fn test_history_csv_header_and_row() {
        let rows = [HistoryRow {
            item: sample_item(),
            rain: Some(RainTotals {
                last_hour: 0.6,
                last_day: 3.0,
            }),
        }];
        let csv = format_history_csv(&rows, &plain());
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("index,address,timestamp"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,0x0100,2010-09-13 13:41:00,30,45,21.5,70,12.3,"));
        assert!(row.ends_with(",E,10.2,0.6,3.0,true"));
    }

    #[test]
    fn test_history_csv_no_header() {
        let rows = [HistoryRow {
            item: sample_item(),
            rain: None,
        }];
        let csv = format_history_csv(&rows, &plain().with_no_header(true));
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.trim_end().ends_with(",E,10.2,,,true"));
    }

    #[test]
    fn test_history_json_fields() {
        let rows = [HistoryRow {
            item: sample_item(),
            rain: None,
        }];
        let json = format_history_json(&rows, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["index"], 1);
        assert_eq!(value[0]["address"], 256);
        assert_eq!(value[0]["timestamp"], "2010-09-13T13:41:00Z");
        assert_eq!(value[0]["wind_direction"], "E");
        assert!(value[0].get("rain_1h").is_none());
    }

    #[test]
    fn test_easyweather_line() {
        let line = format_easyweather_line(&sample_item(), datetime!(2010-09-13 14:02:07 UTC));
        assert!(line.starts_with(
            "1, 2010-09-13 14:02:00, 2010-09-13 13:41:00, 30, 45, 21.5, 70, 12.3, "
        ));
        assert!(line.contains(", 1013.2, 1013.2, 2.5, 2, 4.0, 3, 90.0, E, 34, 10.2, "));
        assert!(line.contains("0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0, 0, 0, 0, 0, 0, 0, 0, 000100, "));
        assert!(line.ends_with("0 ,\n"));
    }
}
