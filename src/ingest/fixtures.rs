/// Test fixtures: representative JSON payloads from the Weather Underground
/// PWS hourly history API.
///
/// Response shape (`units=m`):
///   observations[]
///     .obsTimeLocal        — "YYYY-MM-DD HH:MM:SS", station local time
///     .solarRadiationHigh, .uvHigh, .winddirAvg
///     .humidityHigh, .humidityLow, .humidityAvg
///     .metric.tempHigh / tempLow / tempAvg
///     .metric.windspeed*, windgust*, dewpt*, windchill*, heatindex*
///     .metric.pressureMax / pressureMin / pressureTrend
///     .metric.precipRate / precipTotal
///
/// Any metric may be `null` when the station lacks the sensor.

/// Two hourly summaries; the second has no solar/UV sensor readings.
pub(crate) fn fixture_two_hours_json() -> &'static str {
    r#"{
      "observations": [
        {
          "stationID": "IEXAMPLE1",
          "tz": "Europe/London",
          "obsTimeUtc": "2024-01-02T00:59:54Z",
          "obsTimeLocal": "2024-01-02 00:59:54",
          "epoch": 1704157194,
          "lat": 51.5,
          "lon": -0.12,
          "solarRadiationHigh": 0.0,
          "uvHigh": 0.0,
          "winddirAvg": 225,
          "humidityHigh": 93,
          "humidityLow": 90,
          "humidityAvg": 91.4,
          "qcStatus": 1,
          "metric": {
            "tempHigh": 4.2, "tempLow": 3.6, "tempAvg": 3.9,
            "windspeedHigh": 11.2, "windspeedLow": 0.0, "windspeedAvg": 4.3,
            "windgustHigh": 17.7, "windgustLow": 0.0, "windgustAvg": 6.1,
            "dewptHigh": 3.1, "dewptLow": 2.4, "dewptAvg": 2.7,
            "windchillHigh": 4.2, "windchillLow": 1.8, "windchillAvg": 3.0,
            "heatindexHigh": 4.2, "heatindexLow": 3.6, "heatindexAvg": 3.9,
            "pressureMax": 1012.53, "pressureMin": 1011.85, "pressureTrend": -0.34,
            "precipRate": 0.0, "precipTotal": 0.25
          }
        },
        {
          "stationID": "IEXAMPLE1",
          "obsTimeLocal": "2024-01-02 01:59:54",
          "solarRadiationHigh": null,
          "uvHigh": null,
          "winddirAvg": 230,
          "humidityHigh": 94,
          "humidityLow": 91,
          "humidityAvg": 92.6,
          "metric": {
            "tempHigh": 3.8, "tempLow": 3.1, "tempAvg": 3.4,
            "windspeedHigh": 9.7, "windspeedLow": 0.0, "windspeedAvg": 3.2,
            "windgustHigh": 14.5, "windgustLow": 0.0, "windgustAvg": 5.0,
            "dewptHigh": 2.8, "dewptLow": 2.2, "dewptAvg": 2.5,
            "windchillHigh": 3.8, "windchillLow": null, "windchillAvg": 2.6,
            "heatindexHigh": 3.8, "heatindexLow": 3.1, "heatindexAvg": 3.4,
            "pressureMax": 1011.85, "pressureMin": 1011.51, "pressureTrend": -0.34,
            "precipRate": 0.0, "precipTotal": 0.25
          }
        }
      ]
    }"#
}

/// A reading from a station with only a hygrometer reporting.
pub(crate) fn fixture_no_metric_json() -> &'static str {
    r#"{
      "observations": [
        { "obsTimeLocal": "2024-01-02 05:59:58", "humidityHigh": 97, "humidityLow": 95, "humidityAvg": 96.0 }
      ]
    }"#
}

/// The station was online but logged nothing for the day.
pub(crate) fn fixture_empty_json() -> &'static str {
    r#"{ "observations": [] }"#
}

/// `obsTimeLocal` in an unexpected format.
pub(crate) fn fixture_bad_timestamp_json() -> &'static str {
    r#"{
      "observations": [
        { "obsTimeLocal": "02/01/2024 00:59", "metric": { "tempAvg": 1.0 } }
      ]
    }"#
}
