//! LookML exporter
//!
//! Emits one `.lkml` file holding a model header, an explore with a saved
//! query for the chart, and a view declaring every sampled column.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::fs::write_atomic;
use super::metadata::ArtifactMetadata;
use super::schema::{BindingRole, Bindings, Column, Schema, ValueKind};
use super::{ExportError, ExportReport, Exporter, Platform};
use crate::chart::{ChartKind, Specification};

const CONNECTION: &str = "chartmaker";

/// Looker visualization type for a chart family
fn vis_type(kind: ChartKind) -> &'static str {
    use ChartKind::*;
    match kind {
        VerticalBar | Column | StackedBar | Histogram | Deviation | Ranking | Distribution
        | Groups => "looker_column",
        HorizontalBar | GroupedBar | RangeBar | Bullet => "looker_bar",
        Line | Loop | Spiral | Bump | GeomSmooth | Change | Radar => "looker_line",
        Area | StackedArea | FlowLoop | Density | Violin | GeomPolygon => "looker_area",
        Pie | CircularLoop | Composition | Sunburst => "looker_pie",
        Donut => "looker_donut_multiples",
        Scatter | Bubble | GeomPoint | Correlation | ProcessLoop | Hexbin => "looker_scatter",
        BoxPlot => "looker_boxplot",
        Choropleth | GeoHeatmap => "looker_geo_choropleth",
        PointMap | MapLines | Spatial => "looker_map",
        Funnel => "looker_funnel",
        Waterfall => "looker_waterfall",
        Gantt | Timeline => "looker_timeline",
        WordCloud => "looker_wordcloud",
        Kpi | Gauge => "single_value",
        Table | Matrix | Heatmap | CorrelationMatrix => "looker_grid",
        _ => "looker_column",
    }
}

fn identifier_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").ok()).as_ref()
}

/// Turn an arbitrary label into a LookML identifier
pub fn sanitize_identifier(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = match identifier_re() {
        Some(re) => re.replace_all(&lowered, "_").into_owned(),
        None => lowered,
    };
    let ident = replaced.trim_matches('_');
    if ident.is_empty() {
        "field".to_string()
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("f_{}", ident)
    } else {
        ident.to_string()
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// One sampled column with its LookML identifier
struct Field<'a> {
    column: &'a Column,
    ident: String,
}

impl Field<'_> {
    fn sql(&self) -> String {
        if self.ident == self.column.name {
            format!("${{TABLE}}.{}", self.ident)
        } else {
            format!("${{TABLE}}.{}", quote(&self.column.name))
        }
    }

    /// Name to reference from a query: dimension groups expose timeframes
    fn query_ref(&self, view: &str) -> String {
        match self.column.kind {
            ValueKind::Date | ValueKind::DateTime => format!("{}.{}_date", view, self.ident),
            _ => format!("{}.{}", view, self.ident),
        }
    }
}

/// Exports a LookML model and view
#[derive(Debug, Clone, Default)]
pub struct LookerExporter;

impl LookerExporter {
    pub fn new() -> Self {
        Self
    }

    /// Render the `.lkml` document
    pub fn render(&self, spec: &Specification) -> String {
        let meta = ArtifactMetadata::new(spec, Platform::Looker.text_limits());
        let schema = Schema::sample(spec);
        let bindings = Bindings::from_spec(spec);
        let vis = vis_type(spec.kind());
        let view = sanitize_identifier(spec.title().unwrap_or(spec.chart_type().id()));

        tracing::debug!(chart_type = %spec.chart_type(), vis, view = %view, "building LookML");

        let names = view_fields(&schema);
        let mut out = String::new();
        write_header(&mut out, spec, &meta, vis);
        write_explore(&mut out, &view, &meta, &names, &bindings, vis);
        out.push('\n');
        write_view(&mut out, &view, spec, &names);
        out
    }
}

impl Exporter for LookerExporter {
    fn platform(&self) -> Platform {
        Platform::Looker
    }

    fn try_export(
        &self,
        spec: &Specification,
        destination: &Path,
    ) -> Result<ExportReport, ExportError> {
        let lookml = self.render(spec);
        write_atomic(Platform::Looker, destination, lookml.as_bytes())?;
        Ok(ExportReport {
            platform: Platform::Looker,
            destination: destination.to_path_buf(),
            files: vec![destination.to_path_buf()],
        })
    }
}

/// Measure generated for a numeric field
struct Measure {
    name: String,
    agg: &'static str,
    field: usize,
}

/// Every name declared in the view, unique across dimensions and measures
struct ViewFields<'a> {
    fields: Vec<Field<'a>>,
    measures: Vec<Measure>,
    count: String,
}

impl ViewFields<'_> {
    fn measure(&self, field: usize, agg: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.field == field && m.agg == agg)
    }
}

/// Reserve `base`, or `base_N` for the first free N from 2
fn claim(seen: &mut HashSet<String>, base: String) -> String {
    let mut ident = base.clone();
    let mut n = 2;
    while !seen.insert(ident.clone()) {
        ident = format!("{}_{}", base, n);
        n += 1;
    }
    ident
}

/// Sanitised identifiers, then measure names, de-duplicated with a numeric suffix
fn view_fields(schema: &Schema) -> ViewFields<'_> {
    let mut seen = HashSet::new();
    let fields: Vec<Field<'_>> = schema
        .columns()
        .iter()
        .map(|column| Field {
            column,
            ident: claim(&mut seen, sanitize_identifier(&column.name)),
        })
        .collect();

    let mut measures = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if !field.column.kind.is_numeric() {
            continue;
        }
        for (prefix, agg) in [("total", "sum"), ("average", "average")] {
            measures.push(Measure {
                name: claim(&mut seen, format!("{}_{}", prefix, field.ident)),
                agg,
                field: index,
            });
        }
    }
    let count = claim(&mut seen, "count".to_string());

    ViewFields {
        fields,
        measures,
        count,
    }
}

fn write_header(out: &mut String, spec: &Specification, meta: &ArtifactMetadata, vis: &str) {
    let _ = writeln!(out, "# Generated by chartmaker {} at {}", crate::VERSION, meta.timestamp());
    let _ = writeln!(out, "# Chart: {} ({})", meta.name, spec.chart_type());
    let _ = writeln!(out, "# Visualization: {}", vis);
    let _ = writeln!(out, "# Artifact: {} v{}", meta.id, meta.version);
    let _ = writeln!(out);
    let _ = writeln!(out, "connection: {}", quote(CONNECTION));
    let _ = writeln!(out, "include: \"/views/*.view.lkml\"");
    let _ = writeln!(out);
}

fn write_explore(
    out: &mut String,
    view: &str,
    meta: &ArtifactMetadata,
    names: &ViewFields<'_>,
    bindings: &Bindings,
    vis: &str,
) {
    let find = |role: BindingRole| {
        bindings
            .field(role)
            .and_then(|name| names.fields.iter().position(|f| f.column.name == name))
    };

    let mut dimensions = Vec::new();
    let mut measures = Vec::new();
    for role in [BindingRole::Category, BindingRole::Breakdown] {
        if let Some(index) = find(role) {
            dimensions.push(names.fields[index].query_ref(view));
        }
    }
    for role in [BindingRole::Value, BindingRole::SecondaryValue] {
        if let Some(total) = find(role).and_then(|index| names.measure(index, "sum")) {
            measures.push(format!("{}.{}", view, total.name));
        }
    }
    if measures.is_empty() {
        measures.push(format!("{}.{}", view, names.count));
    }
    dimensions.dedup();

    let _ = writeln!(out, "explore: {} {{", view);
    let _ = writeln!(out, "  label: {}", quote(&meta.name));
    let _ = writeln!(out, "  description: {}", quote(&meta.description));
    let _ = writeln!(out);
    let _ = writeln!(out, "  query: chart {{");
    let _ = writeln!(out, "    label: {}", quote(&meta.name));
    let _ = writeln!(out, "    # vis type: {}", vis);
    let _ = writeln!(out, "    dimensions: [{}]", dimensions.join(", "));
    let _ = writeln!(out, "    measures: [{}]", measures.join(", "));
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out, "}}");
}

fn write_view(out: &mut String, view: &str, spec: &Specification, names: &ViewFields<'_>) {
    let _ = writeln!(out, "view: {} {{", view);
    match spec.data().url() {
        Some(url) => {
            let _ = writeln!(out, "  # source: {}", url);
        }
        None => {
            let _ = writeln!(out, "  # source: {} inline records", spec.records().len());
        }
    }
    let _ = writeln!(out, "  sql_table_name: {} ;;", view);

    for field in &names.fields {
        let _ = writeln!(out);
        match field.column.kind {
            ValueKind::Date | ValueKind::DateTime => {
                let timeframes = if field.column.kind == ValueKind::DateTime {
                    "raw, time, date, week, month, quarter, year"
                } else {
                    "raw, date, week, month, quarter, year"
                };
                let _ = writeln!(out, "  dimension_group: {} {{", field.ident);
                let _ = writeln!(out, "    type: time");
                let _ = writeln!(out, "    timeframes: [{}]", timeframes);
                if field.column.kind == ValueKind::Date {
                    let _ = writeln!(out, "    datatype: date");
                    let _ = writeln!(out, "    convert_tz: no");
                }
                let _ = writeln!(out, "    sql: {} ;;", field.sql());
                let _ = writeln!(out, "  }}");
            }
            kind => {
                let lookml_type = match kind {
                    ValueKind::Integer | ValueKind::Float => "number",
                    ValueKind::Boolean => "yesno",
                    _ => "string",
                };
                let _ = writeln!(out, "  dimension: {} {{", field.ident);
                let _ = writeln!(out, "    type: {}", lookml_type);
                if field.ident != field.column.name {
                    let _ = writeln!(out, "    label: {}", quote(&field.column.name));
                }
                let _ = writeln!(out, "    sql: {} ;;", field.sql());
                let _ = writeln!(out, "  }}");
            }
        }
    }

    for measure in &names.measures {
        let _ = writeln!(out);
        let _ = writeln!(out, "  measure: {} {{", measure.name);
        let _ = writeln!(out, "    type: {}", measure.agg);
        let _ = writeln!(out, "    sql: ${{{}}} ;;", names.fields[measure.field].ident);
        let _ = writeln!(out, "  }}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  measure: {} {{", names.count);
    let _ = writeln!(out, "    type: count");
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out, "}}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::validate;
    use serde_json::json;

    fn spec() -> Specification {
        validate(&json!({
            "type": "line_chart",
            "title": "Monthly Revenue (EUR)",
            "description": "Revenue with \"quotes\"",
            "data": [
                {"Month": "2024-01-01", "Revenue €": 1200.5, "Region": "EU", "Orders": 12, "Active": true},
                {"Month": "2024-02-01", "Revenue €": 1340.0, "Region": "EU", "Orders": 15, "Active": false}
            ],
            "encoding": {
                "x": {"field": "Month", "type": "temporal"},
                "y": {"field": "Revenue €", "type": "quantitative"},
                "color": {"field": "Region", "type": "nominal"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Monthly Revenue (EUR)"), "monthly_revenue_eur");
        assert_eq!(sanitize_identifier("Revenue €"), "revenue");
        assert_eq!(sanitize_identifier("2024 sales"), "f_2024_sales");
        assert_eq!(sanitize_identifier("***"), "field");
        assert_eq!(sanitize_identifier("already_ok"), "already_ok");
    }

    #[test]
    fn test_vis_type_table() {
        assert_eq!(vis_type(ChartKind::Line), "looker_line");
        assert_eq!(vis_type(ChartKind::Kpi), "single_value");
        assert_eq!(vis_type(ChartKind::Sankey), "looker_column");
    }

    #[test]
    fn test_render_model_explore_and_view() {
        let lkml = LookerExporter::new().render(&spec());

        assert!(lkml.contains("connection: \"chartmaker\""));
        assert!(lkml.contains("explore: monthly_revenue_eur {"));
        assert!(lkml.contains("# vis type: looker_line"));
        assert!(lkml.contains(
            "dimensions: [monthly_revenue_eur.month_date, monthly_revenue_eur.region]"
        ));
        assert!(lkml.contains("measures: [monthly_revenue_eur.total_revenue]"));
        assert!(lkml.contains("description: \"Revenue with \\\"quotes\\\"\""));

        assert!(lkml.contains("view: monthly_revenue_eur {"));
        assert!(lkml.contains("dimension_group: month {"));
        assert!(lkml.contains("sql: ${TABLE}.\"Revenue €\" ;;"));
        assert!(lkml.contains("dimension: active {\n    type: yesno"));
        assert!(lkml.contains("measure: total_orders {\n    type: sum\n    sql: ${orders} ;;"));
        assert!(lkml.contains("measure: average_revenue {"));
        assert!(lkml.contains("measure: count {"));
        assert_eq!(lkml.matches('{').count(), lkml.matches('}').count());
    }

    #[test]
    fn test_duplicate_identifiers_get_suffix() {
        let spec = validate(&json!({
            "type": "table",
            "data": [{"Sales": 1, "sales": 2, "SALES!": 3}],
            "encoding": {}
        }))
        .unwrap();
        let lkml = LookerExporter::new().render(&spec);
        assert!(lkml.contains("dimension: sales {"));
        assert!(lkml.contains("dimension: sales_2 {"));
        assert!(lkml.contains("dimension: sales_3 {"));
        assert!(lkml.contains("measures: [table.count]"));
    }

    #[test]
    fn test_measure_names_never_collide_with_columns() {
        let spec = validate(&json!({
            "type": "bar",
            "title": "orders",
            "data": [{"region": "EU", "count": 4, "orders": 12, "total_orders": "n/a"}],
            "encoding": {
                "x": {"field": "region", "type": "nominal"},
                "y": {"field": "orders", "type": "quantitative"}
            }
        }))
        .unwrap();
        let lkml = LookerExporter::new().render(&spec);

        assert!(lkml.contains("dimension: count {"));
        assert!(lkml.contains("dimension: total_orders {"));
        assert!(lkml.contains("measure: total_orders_2 {\n    type: sum\n    sql: ${orders} ;;"));
        assert!(lkml.contains("measure: total_count {\n    type: sum\n    sql: ${count} ;;"));
        assert!(lkml.contains("measure: count_2 {\n    type: count"));
        assert!(lkml.contains("measures: [orders.total_orders_2]"));

        let mut declared = HashSet::new();
        for line in lkml.lines().map(str::trim) {
            for prefix in ["dimension: ", "dimension_group: ", "measure: "] {
                if let Some(name) = line.strip_prefix(prefix) {
                    assert!(declared.insert(name.to_string()), "duplicate {}", name);
                }
            }
        }
    }

    #[test]
    fn test_count_fallback_uses_deduplicated_name() {
        let spec = validate(&json!({
            "type": "table",
            "data": [{"count": "many"}],
            "encoding": {}
        }))
        .unwrap();
        let lkml = LookerExporter::new().render(&spec);
        assert!(lkml.contains("dimension: count {\n    type: string"));
        assert!(lkml.contains("measure: count_2 {"));
        assert!(lkml.contains("measures: [table.count_2]"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.lkml");
        assert!(LookerExporter::new().export(&spec(), &dest));
        let text = std::fs::read_to_string(&dest).unwrap();
        assert!(text.starts_with("# Generated by chartmaker"));
    }
}
