//! Chart kind to Vega-Lite mark resolution

use crate::chart::{ChartKind, Options, Stacking};
use serde_json::{json, Value};

/// Inner radius used by donut-style arcs when `options.innerRadius` is absent
pub(super) const DEFAULT_INNER_RADIUS: f64 = 50.0;

/// Fallback mark for kinds without a dedicated primitive
pub(super) const FALLBACK_MARK: &str = "point";

/// Map a chart family to its Vega-Lite mark primitive
pub(super) fn kind_to_mark(kind: ChartKind) -> &'static str {
    use ChartKind::*;
    match kind {
        VerticalBar | HorizontalBar | Column | GroupedBar | StackedBar | Combo => "bar",
        Line | Loop | Radar | Spiral | Bump | GeomSmooth | MapLines | Parallel | Change => "line",
        Area | StackedArea | Violin | Density | FlowLoop | GeomPolygon => "area",
        Pie | Donut | CircularLoop | Sunburst | Gauge | Composition => "arc",
        Treemap | Icicle | Marimekko | Hexbin | CorrelationMatrix | GeoHeatmap | Sankey
        | Heatmap | Matrix => "rect",
        Histogram | Funnel | Waterfall | Gantt | Timeline | Bullet | Candlestick | RangeBar
        | DecompositionTree | KeyInfluencers | Deviation | Ranking | Distribution | Groups => {
            "bar"
        }
        BoxPlot => "boxplot",
        Choropleth => "geoshape",
        Kpi | Table | WordCloud | Narrative => "text",
        Scatter | Bubble | PointMap | ProcessLoop | GeomPoint | Correlation | Spatial => "point",
        _ => FALLBACK_MARK,
    }
}

/// Resolve the mark for a chart, parameterised where the family needs it
pub(super) fn build_mark(kind: ChartKind, options: &Options) -> Value {
    match kind {
        ChartKind::Donut => json!({
            "type": "arc",
            "innerRadius": options.inner_radius().unwrap_or(DEFAULT_INNER_RADIUS),
        }),
        ChartKind::Bubble => json!({"type": "point"}),
        _ => json!(kind_to_mark(kind)),
    }
}

/// Mark primitive name, whether the mark is a bare string or an object
pub(super) fn mark_type(mark: &Value) -> Option<&str> {
    match mark {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("type").and_then(Value::as_str),
        _ => None,
    }
}

/// Apply a stacking mode to bar and area marks; other marks are left alone
pub(super) fn apply_stacking(mark: &mut Value, stacking: Stacking) {
    let Some(primitive) = mark_type(mark).map(str::to_string) else {
        return;
    };
    if primitive != "bar" && primitive != "area" {
        return;
    }

    if mark.is_string() {
        *mark = json!({"type": primitive});
    }
    if let Some(obj) = mark.as_object_mut() {
        let stack = match stacking {
            Stacking::Stack => json!(true),
            Stacking::Normalize => json!("normalize"),
            Stacking::Off => Value::Null,
        };
        obj.insert("stack".to_string(), stack);
    }
}
