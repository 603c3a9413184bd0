use crate::error::ReportError;
use crate::model::SensorReading;
use serde::{Serialize, Serializer};
use std::fmt;

/// One plotted sample. Serializes as a `[label, primary, secondary]` chart row.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub(crate) label: String,
    pub(crate) primary: f64,
    pub(crate) secondary: f64,
}

impl Serialize for SeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.label, self.primary, self.secondary).serialize(serializer)
    }
}

/// The most recent reading in the window, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub(crate) timestamp: String,
    pub(crate) sensor_id: String,
    pub(crate) temp_f: f64,
    pub(crate) rh: f64,
}

/// Page settings that don't come from the readings.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub(crate) host_name: String,
    pub(crate) chart_title: String,
    pub(crate) primary_label: String,
    pub(crate) secondary_label: String,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) title: String,
    pub(crate) summary: Summary,
    pub(crate) series: Vec<SeriesPoint>,
    pub(crate) chart_title: String,
    pub(crate) primary_label: String,
    pub(crate) secondary_label: String,
    series_json: String,
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    1.8 * celsius + 32.0
}

/// Plots the readings as stored: one point per reading, same order, raw units.
pub fn build_series(readings: &[SensorReading]) -> Vec<SeriesPoint> {
    readings
        .iter()
        .map(|reading| SeriesPoint {
            label: reading.date_time.clone(),
            primary: reading.temp1,
            secondary: reading.rh,
        })
        .collect()
}

/// Summarizes the last reading of the window.
pub fn summarize(readings: &[SensorReading]) -> Option<Summary> {
    readings.last().map(|latest| Summary {
        timestamp: latest.date_time.clone(),
        sensor_id: latest.sensor_id.clone(),
        temp_f: celsius_to_fahrenheit(latest.temp1),
        rh: latest.rh,
    })
}

/// Builds the page for a non-empty, timestamp-ordered window.
pub fn assemble(readings: &[SensorReading], page: &PageContext) -> Result<Document, ReportError> {
    let summary = summarize(readings).ok_or(ReportError::EmptyWindow)?;
    let series = build_series(readings);
    let series_json = script_safe(&serde_json::to_string(&series)?);

    Ok(Document {
        title: format!("{} Meteorological Data Web Site", page.host_name),
        summary,
        series,
        chart_title: page.chart_title.clone(),
        primary_label: page.primary_label.clone(),
        secondary_label: page.secondary_label.clone(),
        series_json,
    })
}

impl Summary {
    /// Display rounding only; `temp_f` and `rh` keep full precision.
    fn temp_text(&self) -> String {
        format!("{:.1}°F", self.temp_f)
    }

    fn rh_text(&self) -> String {
        format!("{:.0}%", self.rh)
    }

    fn heading_html(&self) -> String {
        format!(
            "Current conditions at {} for sensor '{}'<br>\n    \
             <font color=\"red\">Temp: {}</font> and <font color=\"blue\">RH = {}</font>",
            html_escape(&self.timestamp),
            html_escape(&self.sensor_id),
            self.temp_text(),
            self.rh_text()
        )
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Current conditions at {} for sensor '{}': {}, {}",
            self.timestamp,
            self.sensor_id,
            self.temp_text(),
            self.rh_text()
        )
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <!--Load the AJAX API-->
  <script type="text/javascript" src="https://www.gstatic.com/charts/loader.js"></script>
  <script type="text/javascript">
    google.charts.load("current", {{packages: ["corechart"]}});
    google.charts.setOnLoadCallback(drawChart);
    function drawChart() {{
      var data = new google.visualization.DataTable();
      data.addColumn("string", "DateTime");
      data.addColumn("number", {primary_js});
      data.addColumn("number", {secondary_js});
      data.addRows({rows});
      var options = {{
        title: {chart_title_js},
        series: {{
          0: {{targetAxisIndex: 0, color: 'red'}},
          1: {{targetAxisIndex: 1, color: 'blue'}}
        }},
        vAxes: {{
          0: {{title: {primary_js}}},
          1: {{title: {secondary_js}}}
        }}
      }};
      var chart = new google.visualization.LineChart(document.getElementById('chart_div'));
      chart.draw(data, options);
    }}
  </script>
</head>
<body>
<center style="font-family:Arial">
  <h1>{title}</h1>
  <h2>{heading}</h2>
  <!--Div that will hold the line graph-->
  <div id="chart_div" style="width: 900px; height: 500px;"></div>
</center>
</body>
</html>
"#,
            title = html_escape(&self.title),
            primary_js = js_string(&self.primary_label),
            secondary_js = js_string(&self.secondary_label),
            chart_title_js = js_string(&self.chart_title),
            rows = self.series_json,
            heading = self.summary.heading_html(),
        )
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keeps embedded JSON from closing or re-opening a `<script>` element.
/// `<` only occurs inside JSON strings, where `\u003c` means the same.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}

fn js_string(s: &str) -> String {
    // A JSON string is a valid JS string literal.
    script_safe(&serde_json::Value::String(s.to_string()).to_string())
}
