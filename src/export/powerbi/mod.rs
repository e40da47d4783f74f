//! Power BI custom visual project exporter
//!
//! Produces the standard `pbiviz` project layout, ready for an external
//! `pbiviz package` step. In [`ExportMode::Packaged`] the same tree is written
//! as a single zip archive instead of a directory.

mod templates;

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Map, Value};

use super::fs::Bundle;
use super::metadata::ArtifactMetadata;
use super::schema::{BindingRole, Bindings, Schema};
use super::{ExportError, ExportMode, ExportReport, Exporter, Platform};
use crate::chart::{ChartKind, Specification};

const API_VERSION: &str = "5.8.0";

/// Built-in Power BI visual closest to a chart family
fn visual_kind(kind: ChartKind) -> &'static str {
    use ChartKind::*;
    match kind {
        VerticalBar | Column | Histogram | Deviation | Ranking | Distribution | Groups => {
            "clusteredColumnChart"
        }
        HorizontalBar | GroupedBar | RangeBar | Dumbbell | Lollipop => "clusteredBarChart",
        StackedBar => "stackedColumnChart",
        Combo => "lineClusteredColumnComboChart",
        Line | Loop | Bump | Spiral | GeomSmooth | Change | Timeline => "lineChart",
        Area | FlowLoop | Density | Violin | GeomPolygon => "areaChart",
        StackedArea => "stackedAreaChart",
        Pie | CircularLoop | Composition | Sunburst => "pieChart",
        Donut => "donutChart",
        Treemap | Icicle | Marimekko | Waffle => "treemap",
        Scatter | Bubble | GeomPoint | Correlation | ProcessLoop | Hexbin => "scatterChart",
        Choropleth | GeoHeatmap => "filledMap",
        PointMap | MapLines | Spatial => "map",
        Funnel => "funnel",
        Waterfall => "waterfallChart",
        Gauge | Bullet => "gauge",
        Kpi => "card",
        Table | WordCloud => "tableEx",
        Matrix | Heatmap | CorrelationMatrix => "pivotTable",
        DecompositionTree => "decompositionTreeVisual",
        KeyInfluencers => "keyDriversVisual",
        Narrative => "scriptVisual",
        _ => "clusteredColumnChart",
    }
}

/// Exports a Power BI custom visual project
#[derive(Debug, Clone, Default)]
pub struct PowerBiExporter {
    mode: ExportMode,
}

impl PowerBiExporter {
    pub fn new(mode: ExportMode) -> Self {
        Self { mode }
    }

    /// Assemble every project file in memory
    fn build_project(&self, spec: &Specification) -> Result<Bundle, ExportError> {
        let meta = ArtifactMetadata::new(spec, Platform::PowerBi.text_limits());
        let bindings = Bindings::from_spec(spec);
        let schema = Schema::sample(spec);
        let visual_kind = visual_kind(spec.kind());
        let guid = format!("chartmaker{}", meta.compact_id());

        tracing::debug!(
            chart_type = %spec.chart_type(),
            visual_kind,
            columns = schema.columns().len(),
            "building Power BI project"
        );

        let roles = data_roles(&bindings, &schema);
        let role_names: Vec<String> = roles
            .iter()
            .filter_map(|r| r["displayName"].as_str().map(str::to_string))
            .collect();

        let icon = STANDARD.decode(templates::ICON_PNG_BASE64).map_err(|e| ExportError::Serialize {
            platform: Platform::PowerBi,
            message: format!("invalid icon asset: {}", e),
        })?;

        let mut bundle = Bundle::new();
        bundle.add("pbiviz.json", to_pretty(&pbiviz_json(spec, &meta, &guid))?);
        bundle.add("capabilities.json", to_pretty(&capabilities_json(roles))?);
        bundle.add("package.json", to_pretty(&package_json(spec, &meta))?);
        bundle.add("tsconfig.json", to_pretty(&tsconfig_json())?);
        bundle.add("src/visual.ts", visual_ts(spec, &meta, visual_kind)?);
        bundle.add("style/visual.less", templates::VISUAL_LESS);
        bundle.add("assets/icon.png", icon);
        bundle.add(
            "README.md",
            templates::render(
                templates::README_MD,
                &[
                    ("DISPLAY_NAME", &meta.name),
                    ("GENERATOR_VERSION", crate::VERSION),
                    ("CHART_TYPE", spec.chart_type().id()),
                    ("VISUAL_KIND", visual_kind),
                    ("DESCRIPTION", &meta.description),
                    ("GUID", &guid),
                    ("GENERATED_AT", &meta.timestamp()),
                    ("ROLES", &role_names.join(", ")),
                ],
            ),
        );
        bundle.add(".gitignore", templates::GITIGNORE);
        Ok(bundle)
    }
}

impl Exporter for PowerBiExporter {
    fn platform(&self) -> Platform {
        Platform::PowerBi
    }

    fn try_export(
        &self,
        spec: &Specification,
        destination: &Path,
    ) -> Result<ExportReport, ExportError> {
        let bundle = self.build_project(spec)?;
        let files = match self.mode {
            ExportMode::Project => bundle.write_dir(Platform::PowerBi, destination)?,
            ExportMode::Packaged => vec![bundle.write_archive(Platform::PowerBi, destination)?],
        };
        Ok(ExportReport {
            platform: Platform::PowerBi,
            destination: destination.to_path_buf(),
            files,
        })
    }
}

fn to_pretty(value: &Value) -> Result<String, ExportError> {
    serde_json::to_string_pretty(value).map_err(|e| ExportError::Serialize {
        platform: Platform::PowerBi,
        message: e.to_string(),
    })
}

/// Identifier-safe version of the chart type, e.g. `barras_vertical` -> `barrasvertical`
fn compact_type_id(spec: &Specification) -> String {
    spec.chart_type()
        .id()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn pbiviz_json(spec: &Specification, meta: &ArtifactMetadata, guid: &str) -> Value {
    json!({
        "visual": {
            "name": format!("chartmaker{}", compact_type_id(spec)),
            "displayName": meta.name,
            "guid": guid,
            "visualClassName": "Visual",
            "version": meta.version,
            "description": meta.description,
            "supportUrl": "",
            "gitHubUrl": ""
        },
        "apiVersion": API_VERSION,
        "author": {"name": "chartmaker", "email": ""},
        "assets": {"icon": "assets/icon.png"},
        "style": "style/visual.less",
        "capabilities": "capabilities.json",
        "dependencies": null,
        "stringResources": []
    })
}

fn role(name: &str, display_name: String, kind: &str) -> Value {
    json!({"name": name, "displayName": display_name, "kind": kind})
}

/// Data roles from the chart bindings; a category and a measure when unbound
fn data_roles(bindings: &Bindings, schema: &Schema) -> Vec<Value> {
    let label = |base: &str, field: Option<&str>| match field {
        Some(field) => format!("{} ({})", base, field),
        None => base.to_string(),
    };

    let mut roles: Vec<Value> = bindings
        .iter()
        .map(|b| match b.role {
            BindingRole::Category => role("category", label("Category", Some(b.field.as_str())), "Grouping"),
            BindingRole::Value => role("measure", label("Values", Some(b.field.as_str())), "Measure"),
            BindingRole::Breakdown => role("series", label("Legend", Some(b.field.as_str())), "Grouping"),
            BindingRole::SecondaryValue => role("size", label("Size", Some(b.field.as_str())), "Measure"),
        })
        .collect();

    if bindings.get(BindingRole::Category).is_none() {
        let field = schema.dimensions().next().map(|c| c.name.as_str());
        roles.insert(0, role("category", label("Category", field), "Grouping"));
    }
    if bindings.get(BindingRole::Value).is_none() {
        let field = schema.measures().next().map(|c| c.name.as_str());
        let at = roles.len().min(1);
        roles.insert(at, role("measure", label("Values", field), "Measure"));
    }
    roles
}

fn capabilities_json(roles: Vec<Value>) -> Value {
    let has = |name: &str| roles.iter().any(|r| r["name"] == name);

    let mut condition = Map::new();
    for r in &roles {
        if let Some(name) = r["name"].as_str() {
            condition.insert(name.to_string(), json!({"max": 1}));
        }
    }

    let mut measure_select = vec![json!({"for": {"in": "measure"}})];
    if has("size") {
        measure_select.push(json!({"for": {"in": "size"}}));
    }
    let values = if has("series") {
        json!({"group": {"by": "series", "select": measure_select}})
    } else {
        json!({"select": measure_select})
    };

    json!({
        "privileges": [],
        "dataRoles": roles,
        "dataViewMappings": [{
            "conditions": [condition],
            "categorical": {
                "categories": {"for": {"in": "category"}, "dataReductionAlgorithm": {"top": {}}},
                "values": values
            }
        }],
        "objects": {
            "general": {
                "displayName": "General",
                "properties": {
                    "formatString": {"type": {"formatting": {"formatString": true}}}
                }
            },
            "dataPoint": {
                "displayName": "Data colors",
                "properties": {
                    "fill": {"displayName": "Fill", "type": {"fill": {"solid": {"color": true}}}}
                }
            }
        },
        "sorting": {"default": {}},
        "supportsHighlight": true
    })
}

fn package_json(spec: &Specification, meta: &ArtifactMetadata) -> Value {
    let name = format!("chartmaker-{}", spec.chart_type().id().replace('_', "-"));
    json!({
        "name": name,
        "version": "1.0.0",
        "description": meta.description,
        "private": true,
        "scripts": {
            "package": "pbiviz package",
            "start": "pbiviz start",
            "lint": "eslint ."
        },
        "dependencies": {
            "powerbi-visuals-api": "~5.8.0"
        },
        "devDependencies": {
            "powerbi-visuals-tools": "^5.4.0",
            "typescript": "^5.3.0"
        }
    })
}

fn tsconfig_json() -> Value {
    json!({
        "compilerOptions": {
            "allowJs": false,
            "emitDecoratorMetadata": true,
            "experimentalDecorators": true,
            "target": "es2022",
            "sourceMap": true,
            "outDir": "./.tmp/build/",
            "moduleResolution": "node",
            "declaration": true,
            "lib": ["es2022", "dom"]
        },
        "files": ["./src/visual.ts"]
    })
}

fn json_text(value: &impl serde::Serialize) -> Result<String, ExportError> {
    serde_json::to_string(value).map_err(|e| ExportError::Serialize {
        platform: Platform::PowerBi,
        message: e.to_string(),
    })
}

fn visual_ts(spec: &Specification, meta: &ArtifactMetadata, visual_kind: &str) -> Result<String, ExportError> {
    let title = json_text(&meta.name)?;
    let description = json_text(&meta.description)?;
    let spec_json = to_pretty(&spec.to_json())?;
    // Display name lands inside a block comment
    let display_name = meta.name.replace("*/", "* /");

    Ok(templates::render(
        templates::VISUAL_TS,
        &[
            ("DISPLAY_NAME", &display_name),
            ("GENERATOR_VERSION", crate::VERSION),
            ("CHART_TYPE", spec.chart_type().id()),
            ("VISUAL_KIND", visual_kind),
            ("TITLE_LITERAL", &title),
            ("DESCRIPTION_LITERAL", &description),
            ("SPEC_JSON", &spec_json),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::validate;
    use serde_json::json;
    use std::io::Read;

    fn spec() -> Specification {
        validate(&json!({
            "type": "barras_vertical",
            "title": "Quarterly revenue */ by region",
            "data": [{"region": "EMEA", "revenue": 12.5}, {"region": "APAC", "revenue": 9.1}],
            "encoding": {
                "x": {"field": "region", "type": "nominal"},
                "y": {"field": "revenue", "type": "quantitative"},
                "color": {"field": "region", "type": "nominal"}
            }
        }))
        .unwrap()
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_visual_kind_table() {
        assert_eq!(visual_kind(ChartKind::VerticalBar), "clusteredColumnChart");
        assert_eq!(visual_kind(ChartKind::Donut), "donutChart");
        assert_eq!(visual_kind(ChartKind::Kpi), "card");
        assert_eq!(visual_kind(ChartKind::Chord), "clusteredColumnChart");
    }

    #[test]
    fn test_project_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("revenue_visual");
        let report = PowerBiExporter::new(ExportMode::Project)
            .try_export(&spec(), &root)
            .unwrap();

        assert_eq!(report.files.len(), 9);
        for file in [
            "pbiviz.json",
            "capabilities.json",
            "package.json",
            "tsconfig.json",
            "src/visual.ts",
            "style/visual.less",
            "assets/icon.png",
            "README.md",
            ".gitignore",
        ] {
            assert!(root.join(file).is_file(), "missing {}", file);
        }

        let pbiviz = read_json(&root.join("pbiviz.json"));
        assert_eq!(pbiviz["apiVersion"], API_VERSION);
        assert_eq!(pbiviz["visual"]["name"], "chartmakerbarrasvertical");
        assert_eq!(pbiviz["visual"]["version"], "1.0.0.0");
        assert!(pbiviz["visual"]["guid"].as_str().unwrap().starts_with("chartmaker"));

        let ts = std::fs::read_to_string(root.join("src/visual.ts")).unwrap();
        assert!(ts.contains("clusteredColumnChart"));
        assert!(ts.contains("\"type\": \"barras_vertical\""));
        assert!(!ts.contains("__TITLE_LITERAL__"));
        assert!(ts.contains(" * Quarterly revenue * / by region"));
    }

    #[test]
    fn test_placeholder_shaped_text_written_verbatim() {
        let raw = json!({
            "type": "bar",
            "title": "__SPEC_JSON__",
            "description": "__GUID__",
            "data": [{"x": "A", "y": 1}],
            "encoding": {"x": {"field": "x"}}
        });
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("p");
        PowerBiExporter::new(ExportMode::Project)
            .try_export(&validate(&raw).unwrap(), &root)
            .unwrap();

        let ts = std::fs::read_to_string(root.join("src/visual.ts")).unwrap();
        assert!(ts.contains("const CHART_TITLE: string = \"__SPEC_JSON__\";"));
        assert!(ts.contains("const CHART_DESCRIPTION: string = \"__GUID__\";"));
        assert!(ts.contains(" * __SPEC_JSON__\n"));

        let readme = std::fs::read_to_string(root.join("README.md")).unwrap();
        assert!(readme.starts_with("# __SPEC_JSON__\n"));
        assert!(readme.contains("| Description | __GUID__ |"));
    }

    #[test]
    fn test_display_name_truncated() {
        let raw = json!({
            "type": "line",
            "title": "x".repeat(120),
            "data": [{"t": 1, "v": 2}],
            "encoding": {"x": {"field": "t"}}
        });
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("p");
        PowerBiExporter::new(ExportMode::Project)
            .try_export(&validate(&raw).unwrap(), &root)
            .unwrap();
        let pbiviz = read_json(&root.join("pbiviz.json"));
        assert_eq!(pbiviz["visual"]["displayName"].as_str().unwrap().len(), 50);
    }

    #[test]
    fn test_capabilities_follow_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("p");
        PowerBiExporter::new(ExportMode::Project)
            .try_export(&spec(), &root)
            .unwrap();
        let caps = read_json(&root.join("capabilities.json"));

        let roles: Vec<&str> = caps["dataRoles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["category", "measure", "series"]);
        assert_eq!(caps["dataRoles"][0]["displayName"], "Category (region)");
        assert_eq!(
            caps["dataViewMappings"][0]["categorical"]["values"]["group"]["by"],
            "series"
        );
    }

    #[test]
    fn test_unbound_roles_fall_back_to_schema() {
        let spec = validate(&json!({
            "type": "table",
            "data": [{"name": "a", "score": 3}],
            "encoding": {}
        }))
        .unwrap();
        let roles = data_roles(&Bindings::from_spec(&spec), &Schema::sample(&spec));
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0]["displayName"], "Category (name)");
        assert_eq!(roles[1]["displayName"], "Values (score)");
    }

    #[test]
    fn test_packaged_archive() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("visual.pbiviz");
        let report = PowerBiExporter::new(ExportMode::Packaged)
            .try_export(&spec(), &dest)
            .unwrap();
        assert_eq!(report.files, vec![dest.clone()]);

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 9);
        let mut icon = Vec::new();
        archive.by_name("assets/icon.png").unwrap().read_to_end(&mut icon).unwrap();
        assert_eq!(&icon[1..4], b"PNG");
    }
}
