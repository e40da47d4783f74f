//! Tableau workbook exporter
//!
//! Writes a `.twb` XML workbook describing one worksheet and a dashboard
//! sized to the chart. A destination ending in `.twbx`, or
//! [`ExportMode::Packaged`], produces a packaged workbook instead: a zip
//! holding `workbook.twb` and `Data/data.csv` with the inline records.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use super::fs::{write_atomic, Bundle};
use super::metadata::ArtifactMetadata;
use super::schema::{BindingRole, Bindings, Column, FieldRole, Schema, ValueKind};
use super::{ExportError, ExportMode, ExportReport, Exporter, Platform};
use crate::chart::{ChartKind, Record, Specification};

const WORKBOOK_VERSION: &str = "18.1";
const DATASOURCE_NAME: &str = "chartmaker.inline";
const PACKAGED_WORKBOOK: &str = "workbook.twb";
const PACKAGED_DATA: &str = "Data/data.csv";

/// Tableau mark class for a chart family
fn mark_class(kind: ChartKind) -> &'static str {
    use ChartKind::*;
    match kind {
        VerticalBar | Column | GroupedBar | StackedBar | Histogram | Funnel | Waterfall => "bar",
        HorizontalBar | RangeBar => "horizontal-bar",
        Line | Loop | Radar | Spiral | Bump | GeomSmooth | Change | Parallel => "line",
        Area | StackedArea | FlowLoop | Violin => "area",
        Pie | Donut | CircularLoop | Composition => "pie",
        Scatter | Bubble | GeomPoint | Correlation | ProcessLoop => "scatter",
        Heatmap | CorrelationMatrix | Hexbin | GeoHeatmap => "heatmap",
        Density => "density",
        Treemap | Waffle => "square",
        Choropleth | PointMap | MapLines | Spatial => "map",
        GeomPolygon => "polygon",
        Gantt | Timeline => "gantt",
        Kpi | Table | Matrix | WordCloud | Narrative => "text",
        _ => "bar",
    }
}

fn datatype(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Boolean => "boolean",
        ValueKind::Integer => "integer",
        ValueKind::Float => "real",
        ValueKind::Date => "date",
        ValueKind::DateTime => "datetime",
        ValueKind::String => "string",
    }
}

fn column_ref(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Exports a Tableau workbook
#[derive(Debug, Clone, Default)]
pub struct TableauExporter {
    mode: ExportMode,
}

impl TableauExporter {
    pub fn new(mode: ExportMode) -> Self {
        Self { mode }
    }

    fn is_packaged(&self, destination: &Path) -> bool {
        self.mode == ExportMode::Packaged
            || destination
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("twbx"))
    }

    /// Render the `.twb` document
    pub fn workbook_xml(&self, spec: &Specification, repository_path: &str) -> Result<String, ExportError> {
        let meta = ArtifactMetadata::new(spec, Platform::Tableau.text_limits());
        let schema = Schema::sample(spec);
        let bindings = Bindings::from_spec(spec);
        let marks = mark_class(spec.kind());

        tracing::debug!(chart_type = %spec.chart_type(), marks, "building Tableau workbook");

        let comment = spec_comment(spec, &meta)?;
        build_workbook(&WorkbookParts {
            spec,
            meta: &meta,
            schema: &schema,
            bindings: &bindings,
            marks,
            repository_path,
            comment: &comment,
        })
        .map_err(|message| ExportError::Serialize {
            platform: Platform::Tableau,
            message,
        })
    }
}

impl Exporter for TableauExporter {
    fn platform(&self) -> Platform {
        Platform::Tableau
    }

    fn try_export(
        &self,
        spec: &Specification,
        destination: &Path,
    ) -> Result<ExportReport, ExportError> {
        let repository_path = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let xml = self.workbook_xml(spec, &repository_path)?;

        if self.is_packaged(destination) {
            let mut bundle = Bundle::new();
            bundle.add(PACKAGED_WORKBOOK, xml);
            bundle.add(PACKAGED_DATA, records_csv(&Schema::sample(spec), spec.records())?);
            bundle.write_archive(Platform::Tableau, destination)?;
        } else {
            write_atomic(Platform::Tableau, destination, xml.as_bytes())?;
        }

        Ok(ExportReport {
            platform: Platform::Tableau,
            destination: destination.to_path_buf(),
            files: vec![destination.to_path_buf()],
        })
    }
}

struct WorkbookParts<'a> {
    spec: &'a Specification,
    meta: &'a ArtifactMetadata,
    schema: &'a Schema,
    bindings: &'a Bindings,
    marks: &'a str,
    repository_path: &'a str,
    comment: &'a str,
}

/// Thin element writer over quick-xml; errors are flattened to strings
struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    fn new() -> Result<Self, String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| e.to_string())?;
        Ok(Self { writer })
    }

    fn element<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        start
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), String> {
        self.writer
            .write_event(Event::Start(Self::element(name, attrs)))
            .map_err(|e| e.to_string())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), String> {
        self.writer
            .write_event(Event::Empty(Self::element(name, attrs)))
            .map_err(|e| e.to_string())
    }

    fn close(&mut self, name: &str) -> Result<(), String> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| e.to_string())
    }

    fn comment(&mut self, text: &str) -> Result<(), String> {
        self.writer
            .write_event(Event::Comment(BytesText::from_escaped(comment_text(text))))
            .map_err(|e| e.to_string())
    }

    fn finish(self) -> Result<String, String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| e.to_string())
    }
}

/// Comment body with no `--` run and no trailing `-`
fn comment_text(text: &str) -> String {
    let mut safe = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        safe.push(c);
        if c == '-' && matches!(chars.peek(), Some('-') | None) {
            safe.push(' ');
        }
    }
    safe
}

fn build_workbook(parts: &WorkbookParts<'_>) -> Result<String, String> {
    let mut doc = XmlDoc::new()?;
    let sheet = parts.meta.name.as_str();
    let sheet_ref = column_ref(sheet);
    let width = parts.spec.width().to_string();
    let height = parts.spec.height().to_string();

    doc.open(
        "workbook",
        &[
            ("source-build", "2023.1.0 (20231.23.0310.1045)"),
            ("source-platform", "win"),
            ("version", WORKBOOK_VERSION),
            ("xmlns:user", "http://www.tableausoftware.com/xml/user"),
        ],
    )?;

    doc.open("document-format-change-manifest", &[])?;
    doc.empty("SheetIdentifierTracking", &[("enabled", "true")])?;
    doc.empty("WindowsPersistSimpleIdentifiers", &[])?;
    doc.close("document-format-change-manifest")?;

    doc.empty(
        "repository-location",
        &[
            ("id", "localRepositoryLocation"),
            ("path", parts.repository_path),
            ("revision", "1.0"),
        ],
    )?;

    write_datasource(&mut doc, parts)?;

    doc.open("worksheets", &[])?;
    doc.open("worksheet", &[("name", sheet)])?;
    doc.open("table", &[])?;
    doc.empty("view", &[("name", &sheet_ref)])?;
    doc.open("panes", &[])?;
    doc.open("pane", &[("selection-relaxation-option", "selection-relaxation-allow")])?;
    doc.empty("mark", &[("class", parts.marks)])?;
    write_encodings(&mut doc, parts.bindings)?;
    doc.close("pane")?;
    doc.close("panes")?;
    write_shelf(&mut doc, "rows", parts.bindings.field(BindingRole::Value))?;
    write_shelf(&mut doc, "cols", parts.bindings.field(BindingRole::Category))?;
    doc.close("table")?;
    doc.close("worksheet")?;
    doc.close("worksheets")?;

    let dashboard = format!("Dashboard - {}", sheet);
    doc.open("dashboards", &[])?;
    doc.open("dashboard", &[("name", &dashboard)])?;
    doc.empty(
        "size",
        &[
            ("maxheight", &height),
            ("maxwidth", &width),
            ("minheight", &height),
            ("minwidth", &width),
        ],
    )?;
    doc.open("zones", &[])?;
    doc.empty(
        "zone",
        &[
            ("h", &height),
            ("id", "3"),
            ("name", sheet),
            ("type", "layout-flow"),
            ("w", &width),
            ("x", "0"),
            ("y", "0"),
        ],
    )?;
    doc.close("zones")?;
    doc.close("dashboard")?;
    doc.close("dashboards")?;

    doc.open("windows", &[])?;
    doc.open("window", &[("class", "worksheet"), ("name", sheet)])?;
    doc.open("cards", &[])?;
    doc.open("edge", &[("name", "left")])?;
    doc.empty("strip", &[("size", "160")])?;
    doc.close("edge")?;
    doc.close("cards")?;
    doc.close("window")?;
    doc.close("windows")?;

    doc.comment(parts.comment)?;
    doc.close("workbook")?;
    doc.finish()
}

fn write_datasource(doc: &mut XmlDoc, parts: &WorkbookParts<'_>) -> Result<(), String> {
    doc.open("datasources", &[])?;
    doc.open(
        "datasource",
        &[
            ("caption", &parts.meta.name),
            ("inline", "true"),
            ("name", DATASOURCE_NAME),
            ("version", WORKBOOK_VERSION),
        ],
    )?;

    match parts.spec.data().url() {
        Some(url) => doc.empty("connection", &[("class", "webdata-direct"), ("url", url)])?,
        None => doc.empty(
            "connection",
            &[("class", "textscan"), ("directory", "Data"), ("filename", "data.csv")],
        )?,
    }

    for column in parts.schema.columns() {
        write_column(doc, column)?;
    }

    doc.close("datasource")?;
    doc.close("datasources")
}

fn write_column(doc: &mut XmlDoc, column: &Column) -> Result<(), String> {
    let name = column_ref(&column.name);
    let (role, kind) = match column.role() {
        FieldRole::Measure => ("measure", "quantitative"),
        FieldRole::Dimension if column.kind.is_temporal() => ("dimension", "ordinal"),
        FieldRole::Dimension => ("dimension", "nominal"),
    };
    doc.empty(
        "column",
        &[
            ("caption", &column.name),
            ("datatype", datatype(column.kind)),
            ("name", &name),
            ("role", role),
            ("type", kind),
        ],
    )
}

fn write_encodings(doc: &mut XmlDoc, bindings: &Bindings) -> Result<(), String> {
    let color = bindings.field(BindingRole::Breakdown);
    let size = bindings.field(BindingRole::SecondaryValue);
    if color.is_none() && size.is_none() {
        return Ok(());
    }

    doc.open("encodings", &[])?;
    if let Some(field) = color {
        doc.empty("color", &[("column", &qualified(field))])?;
    }
    if let Some(field) = size {
        doc.empty("size", &[("column", &qualified(field))])?;
    }
    doc.close("encodings")
}

fn write_shelf(doc: &mut XmlDoc, shelf: &str, field: Option<&str>) -> Result<(), String> {
    match field {
        Some(field) => {
            doc.open(shelf, &[])?;
            doc.writer
                .write_event(Event::Text(BytesText::new(&qualified(field))))
                .map_err(|e| e.to_string())?;
            doc.close(shelf)
        }
        None => doc.empty(shelf, &[]),
    }
}

fn qualified(field: &str) -> String {
    format!("[{}].{}", DATASOURCE_NAME, column_ref(field))
}

fn spec_comment(spec: &Specification, meta: &ArtifactMetadata) -> Result<String, ExportError> {
    let spec_json = serde_json::to_string_pretty(&spec.to_json()).map_err(|e| ExportError::Serialize {
        platform: Platform::Tableau,
        message: e.to_string(),
    })?;
    Ok(format!(
        "\nGenerated by chartmaker {}\nChart type: {}\nTitle: {}\nDescription: {}\nGenerated at: {}\nSpecification:\n{}\n",
        crate::VERSION,
        spec.chart_type(),
        meta.name,
        meta.description,
        meta.timestamp(),
        spec_json
    ))
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Inline records as CSV, columns in schema order
fn records_csv(schema: &Schema, records: &[Record]) -> Result<Vec<u8>, ExportError> {
    let csv_err = |message: String| ExportError::Serialize {
        platform: Platform::Tableau,
        message,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(schema.names())
        .map_err(|e| csv_err(e.to_string()))?;
    for record in records {
        let row: Vec<String> = schema.names().map(|name| csv_cell(record.get(name))).collect();
        writer.write_record(&row).map_err(|e| csv_err(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| csv_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::validate;
    use serde_json::json;
    use std::io::Read;

    fn spec() -> Specification {
        validate(&json!({
            "type": "scatter_plot",
            "title": "Price <vs> demand -- Q1",
            "width": 640,
            "height": 480,
            "data": [
                {"product": "A", "price": 9.5, "units": 120, "launched": "2023-05-01"},
                {"product": "B, C", "price": 12.0, "units": 80, "launched": "2023-06-15"}
            ],
            "encoding": {
                "x": {"field": "price", "type": "quantitative"},
                "y": {"field": "units", "type": "quantitative"},
                "color": {"field": "product", "type": "nominal"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_mark_class_table() {
        assert_eq!(mark_class(ChartKind::VerticalBar), "bar");
        assert_eq!(mark_class(ChartKind::HorizontalBar), "horizontal-bar");
        assert_eq!(mark_class(ChartKind::Pie), "pie");
        assert_eq!(mark_class(ChartKind::Scatter), "scatter");
        assert_eq!(mark_class(ChartKind::Sankey), "bar");
    }

    #[test]
    fn test_workbook_structure() {
        let xml = TableauExporter::default().workbook_xml(&spec(), "out.twb").unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<mark class=\"scatter\"/>"));
        assert!(xml.contains("name=\"[price]\""));
        assert!(xml.contains("datatype=\"real\""));
        assert!(xml.contains("datatype=\"date\""));
        assert!(xml.contains("<rows>[chartmaker.inline].[units]</rows>"));
        assert!(xml.contains("<cols>[chartmaker.inline].[price]</cols>"));
        assert!(xml.contains("<color column=\"[chartmaker.inline].[product]\"/>"));
        assert!(xml.contains("maxwidth=\"640\""));
        assert!(xml.contains("maxheight=\"480\""));
        assert!(xml.contains("path=\"out.twb\""));
        // Title is attribute-escaped, and `--` is defused inside the comment
        assert!(xml.contains("Price &lt;vs&gt; demand -- Q1"));
        assert!(xml.contains("Title: Price <vs> demand - - Q1"));
        assert!(xml.trim_end().ends_with("</workbook>"));
    }

    #[test]
    fn test_comment_text_breaks_dash_runs() {
        assert_eq!(comment_text("a -- b"), "a - - b");
        assert_eq!(comment_text("Q1 --- Q2"), "Q1 - - - Q2");
        assert_eq!(comment_text("ends-"), "ends- ");
        assert_eq!(comment_text("one-dash"), "one-dash");
    }

    #[test]
    fn test_workbook_comment_is_well_formed_with_dash_runs() {
        let mut raw = json!({
            "type": "bar",
            "title": "Q1 --- Q2",
            "description": "----",
            "data": [{"x": "A", "y": 1}],
            "encoding": {"x": {"field": "x"}}
        });
        let xml = TableauExporter::default()
            .workbook_xml(&validate(&raw).unwrap(), "out.twb")
            .unwrap();
        let start = xml.find("<!--").unwrap() + 4;
        let end = xml.rfind("-->").unwrap();
        let body = &xml[start..end];
        assert!(!body.contains("--"), "{}", body);
        assert!(!body.ends_with('-'));
        assert!(body.contains("Title: Q1 - - - Q2"));

        raw["title"] = json!("ends with dash -");
        let xml = TableauExporter::default()
            .workbook_xml(&validate(&raw).unwrap(), "out.twb")
            .unwrap();
        let start = xml.find("<!--").unwrap() + 4;
        let end = xml.rfind("-->").unwrap();
        assert!(!xml[start..end].contains("--"));
    }

    #[test]
    fn test_plain_workbook_export() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("chart.twb");
        let report = TableauExporter::default().try_export(&spec(), &dest).unwrap();
        assert_eq!(report.files, vec![dest.clone()]);

        let xml = std::fs::read_to_string(&dest).unwrap();
        assert!(xml.contains("<workbook"));
        assert!(zip::ZipArchive::new(std::fs::File::open(&dest).unwrap()).is_err());
    }

    #[test]
    fn test_twbx_extension_forces_packaging() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("chart.twbx");
        TableauExporter::new(ExportMode::Project)
            .try_export(&spec(), &dest)
            .unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&dest).unwrap()).unwrap();
        let mut csv_text = String::new();
        archive
            .by_name(PACKAGED_DATA)
            .unwrap()
            .read_to_string(&mut csv_text)
            .unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines[0], "launched,price,product,units");
        assert_eq!(lines[2], "2023-06-15,12.0,\"B, C\",80");

        assert!(archive.by_name(PACKAGED_WORKBOOK).is_ok());
    }

    #[test]
    fn test_url_data_connection() {
        let spec = validate(&json!({
            "type": "line",
            "data": {"url": "https://example.com/series.csv"},
            "encoding": {"x": {"field": "t", "type": "temporal"}}
        }))
        .unwrap();
        let xml = TableauExporter::default().workbook_xml(&spec, "s.twb").unwrap();
        assert!(xml.contains("url=\"https://example.com/series.csv\""));
        assert!(xml.contains("<rows/>"));
        assert!(xml.contains("Untitled Chart"));
    }
}
