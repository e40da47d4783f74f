//! Looker Studio report configuration exporter

use std::path::Path;

use serde_json::{json, Value};

use super::fs::write_atomic;
use super::metadata::ArtifactMetadata;
use super::schema::{BindingRole, Bindings, FieldRole, Schema, ValueKind};
use super::{ExportError, ExportReport, Exporter, Platform};
use crate::chart::{ChartKind, Specification};

const CONFIG_VERSION: &str = "1.0";

/// Looker Studio chart component for a chart family
fn chart_code(kind: ChartKind) -> &'static str {
    use ChartKind::*;
    match kind {
        VerticalBar | Column | GroupedBar | Histogram | Deviation | Ranking | Distribution
        | Groups => "COLUMN",
        HorizontalBar | RangeBar | Bullet | Dumbbell | Lollipop => "BAR",
        StackedBar => "STACKED_COLUMN",
        Combo => "COMBO",
        Line | Loop | Spiral | Bump | GeomSmooth | Change | Radar => "LINE",
        Timeline | Gantt => "TIME_SERIES",
        Area | FlowLoop | Density | Violin | GeomPolygon => "AREA",
        StackedArea => "STACKED_AREA",
        Pie | CircularLoop | Composition | Sunburst => "PIE",
        Donut => "DONUT",
        Treemap | Icicle | Marimekko | Waffle => "TREEMAP",
        Scatter | GeomPoint | Correlation | ProcessLoop | Hexbin => "SCATTER",
        Bubble => "BUBBLE",
        Choropleth | GeoHeatmap | PointMap | MapLines | Spatial => "GEO_MAP",
        Sankey => "SANKEY",
        Funnel => "FUNNEL",
        Waterfall => "WATERFALL",
        Candlestick => "CANDLESTICK",
        BoxPlot => "BOXPLOT",
        Kpi => "SCORECARD",
        Gauge => "GAUGE",
        Heatmap | CorrelationMatrix | Matrix => "PIVOT_TABLE",
        _ => "TABLE",
    }
}

fn data_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Boolean => "BOOLEAN",
        ValueKind::Integer | ValueKind::Float => "NUMBER",
        ValueKind::Date => "YEAR_MONTH_DAY",
        ValueKind::DateTime => "YEAR_MONTH_DAY_SECOND",
        ValueKind::String => "TEXT",
    }
}

fn semantics(role: FieldRole) -> &'static str {
    match role {
        FieldRole::Dimension => "DIMENSION",
        FieldRole::Measure => "METRIC",
    }
}

/// Exports a Looker Studio report configuration
#[derive(Debug, Clone, Default)]
pub struct LookerStudioExporter;

impl LookerStudioExporter {
    pub fn new() -> Self {
        Self
    }

    /// Build the report configuration document
    pub fn report_config(&self, spec: &Specification) -> Value {
        let meta = ArtifactMetadata::new(spec, Platform::LookerStudio.text_limits());
        let schema = Schema::sample(spec);
        let bindings = Bindings::from_spec(spec);
        let code = chart_code(spec.kind());

        tracing::debug!(chart_type = %spec.chart_type(), code, "building Looker Studio config");

        let fields: Vec<Value> = schema
            .columns()
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "dataType": data_type(c.kind),
                    "semantics": semantics(c.role()),
                })
            })
            .collect();

        let dimensions: Vec<&str> = [BindingRole::Category]
            .into_iter()
            .filter_map(|r| bindings.field(r))
            .collect();
        let metrics: Vec<&str> = [BindingRole::Value, BindingRole::SecondaryValue]
            .into_iter()
            .filter_map(|r| bindings.field(r))
            .collect();

        let mut data_source = json!({
            "name": format!("{} data", meta.name),
            "fields": fields,
        });
        match spec.data().url() {
            Some(url) => data_source["url"] = json!(url),
            None => data_source["rows"] = json!(spec.records()),
        }

        let options = spec.options();
        json!({
            "version": CONFIG_VERSION,
            "metadata": {
                "id": meta.id.to_string(),
                "name": meta.name,
                "description": meta.description,
                "version": meta.version,
                "generatedAt": meta.timestamp(),
                "generator": format!("chartmaker {}", crate::VERSION),
            },
            "chart": {
                "type": code,
                "sourceType": spec.chart_type().id(),
            },
            "dataSource": data_source,
            "bindings": {
                "dimensions": dimensions,
                "metrics": metrics,
                "breakdown": bindings.field(BindingRole::Breakdown),
            },
            "style": {
                "theme": options.theme().unwrap_or("light"),
                "colorScheme": options.color_scheme(),
                "width": spec.width(),
                "height": spec.height(),
            },
            "spec": spec.to_json(),
        })
    }
}

impl Exporter for LookerStudioExporter {
    fn platform(&self) -> Platform {
        Platform::LookerStudio
    }

    fn try_export(
        &self,
        spec: &Specification,
        destination: &Path,
    ) -> Result<ExportReport, ExportError> {
        let config = self.report_config(spec);
        let text = serde_json::to_string_pretty(&config).map_err(|e| ExportError::Serialize {
            platform: Platform::LookerStudio,
            message: e.to_string(),
        })?;
        write_atomic(Platform::LookerStudio, destination, text.as_bytes())?;
        Ok(ExportReport {
            platform: Platform::LookerStudio,
            destination: destination.to_path_buf(),
            files: vec![destination.to_path_buf()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::validate;

    fn spec() -> Specification {
        validate(&json!({
            "type": "dona",
            "title": "Share by channel",
            "data": [
                {"channel": "web", "share": 0.6, "since": "2021-04-01T00:00:00Z", "paid": false},
                {"channel": "store", "share": 0.4, "since": "2019-01-01T00:00:00Z", "paid": true}
            ],
            "encoding": {
                "theta": {"field": "share", "type": "quantitative"},
                "color": {"field": "channel", "type": "nominal"}
            },
            "options": {"theme": "dark", "colorScheme": "tableau10"}
        }))
        .unwrap()
    }

    #[test]
    fn test_report_config_shape() {
        let config = LookerStudioExporter::new().report_config(&spec());

        assert_eq!(config["chart"]["type"], "DONUT");
        assert_eq!(config["chart"]["sourceType"], "dona");
        assert_eq!(config["metadata"]["name"], "Share by channel");
        assert_eq!(config["metadata"]["description"], "Chart generated by chartmaker");

        let fields = config["dataSource"]["fields"].as_array().unwrap();
        let by_name = |name: &str| fields.iter().find(|f| f["name"] == name).unwrap();
        assert_eq!(by_name("channel")["dataType"], "TEXT");
        assert_eq!(by_name("share")["dataType"], "NUMBER");
        assert_eq!(by_name("share")["semantics"], "METRIC");
        assert_eq!(by_name("since")["dataType"], "YEAR_MONTH_DAY_SECOND");
        assert_eq!(by_name("paid")["dataType"], "BOOLEAN");
        assert_eq!(by_name("paid")["semantics"], "DIMENSION");

        assert_eq!(config["dataSource"]["rows"].as_array().unwrap().len(), 2);
        assert_eq!(config["bindings"]["breakdown"], "channel");
        assert!(config["bindings"]["dimensions"].as_array().unwrap().is_empty());
        assert_eq!(config["style"]["theme"], "dark");
        assert_eq!(config["style"]["colorScheme"], "tableau10");
        assert_eq!(config["spec"]["type"], "dona");
    }

    #[test]
    fn test_url_data_source() {
        let spec = validate(&json!({
            "type": "kpi",
            "data": {"url": "https://example.com/kpi.json"},
            "encoding": {}
        }))
        .unwrap();
        let config = LookerStudioExporter::new().report_config(&spec);
        assert_eq!(config["chart"]["type"], "SCORECARD");
        assert_eq!(config["dataSource"]["url"], "https://example.com/kpi.json");
        assert!(config["dataSource"].get("rows").is_none());
        assert!(config["dataSource"]["fields"].as_array().unwrap().is_empty());
        assert!(config["bindings"]["breakdown"].is_null());
    }

    #[test]
    fn test_export_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.json");
        assert!(LookerStudioExporter::new().export(&spec(), &dest));
        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(parsed["version"], CONFIG_VERSION);
    }
}
