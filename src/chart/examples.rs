//! Example chart requests
//!
//! One ready-to-validate request per registered identifier. Families share a
//! handful of data shapes; the request carries the identifier it was asked
//! for, so Spanish and English aliases of a family differ only in `type`.

use serde_json::{json, Value};

use super::types::{all_types, ChartKind, ChartType};

/// Data layout used to illustrate a family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Categories,
    Horizontal,
    Series,
    TimeSeries,
    Radial,
    Hierarchy,
    Bins,
    Spread,
    Scatter,
    Bubble,
    Grid,
    Regions,
    Points,
    Flow,
    Intervals,
    Schedule,
    Prices,
    Words,
    Card,
    Rows,
}

fn shape(kind: ChartKind) -> Shape {
    use ChartKind::*;
    match kind {
        VerticalBar | Column | Funnel | Waterfall | Lollipop | Ranking | Deviation
        | KeyInfluencers | Narrative => Shape::Categories,
        HorizontalBar | Bullet => Shape::Horizontal,
        GroupedBar | StackedBar | Combo | StackedArea | Marimekko | Bump | Radar | Groups
        | Parallel => Shape::Series,
        Line | Area | Loop | Spiral | GeomSmooth | Change | Timeline | FlowLoop => {
            Shape::TimeSeries
        }
        Pie | Donut | CircularLoop | Composition => Shape::Radial,
        Treemap | Waffle | Sunburst | Icicle | DecompositionTree => Shape::Hierarchy,
        Histogram | Density => Shape::Bins,
        BoxPlot | Violin | Distribution => Shape::Spread,
        Scatter | GeomPoint | Correlation | ProcessLoop | GeomPolygon => Shape::Scatter,
        Bubble => Shape::Bubble,
        Heatmap | CorrelationMatrix | Matrix | Hexbin | GeoHeatmap => Shape::Grid,
        Choropleth => Shape::Regions,
        PointMap | MapLines | Spatial => Shape::Points,
        Sankey | Chord | Network => Shape::Flow,
        RangeBar | Dumbbell => Shape::Intervals,
        Gantt => Shape::Schedule,
        Candlestick => Shape::Prices,
        WordCloud => Shape::Words,
        Kpi | Gauge => Shape::Card,
        Table => Shape::Rows,
    }
}

fn data_and_encoding(shape: Shape) -> (Value, Value) {
    match shape {
        Shape::Categories => (
            json!([
                {"category": "Sales", "value": 150},
                {"category": "Marketing", "value": 80},
                {"category": "IT", "value": 120}
            ]),
            json!({
                "x": {"field": "category", "type": "nominal"},
                "y": {"field": "value", "type": "quantitative"}
            }),
        ),
        Shape::Horizontal => (
            json!([
                {"category": "Product A", "value": 95},
                {"category": "Product B", "value": 130},
                {"category": "Product C", "value": 75}
            ]),
            json!({
                "x": {"field": "value", "type": "quantitative"},
                "y": {"field": "category", "type": "nominal"}
            }),
        ),
        Shape::Series => (
            json!([
                {"category": "Jan", "series": "2022", "value": 20},
                {"category": "Jan", "series": "2023", "value": 25},
                {"category": "Feb", "series": "2022", "value": 18},
                {"category": "Feb", "series": "2023", "value": 30}
            ]),
            json!({
                "x": {"field": "category", "type": "nominal"},
                "y": {"field": "value", "type": "quantitative"},
                "color": {"field": "series", "type": "nominal"}
            }),
        ),
        Shape::TimeSeries => (
            json!([
                {"date": "2023-01-01", "value": 45},
                {"date": "2023-02-01", "value": 52},
                {"date": "2023-03-01", "value": 48},
                {"date": "2023-04-01", "value": 61}
            ]),
            json!({
                "x": {"field": "date", "type": "temporal"},
                "y": {"field": "value", "type": "quantitative"}
            }),
        ),
        Shape::Radial => (
            json!([
                {"category": "Desktop", "value": 60},
                {"category": "Mobile", "value": 35},
                {"category": "Tablet", "value": 5}
            ]),
            json!({
                "theta": {"field": "value", "type": "quantitative"},
                "color": {"field": "category", "type": "nominal"}
            }),
        ),
        Shape::Hierarchy => (
            json!([
                {"group": "Electronics", "item": "Phones", "value": 40},
                {"group": "Electronics", "item": "Laptops", "value": 30},
                {"group": "Home", "item": "Furniture", "value": 20},
                {"group": "Home", "item": "Garden", "value": 10}
            ]),
            json!({
                "x": {"field": "item", "type": "nominal"},
                "y": {"field": "value", "type": "quantitative"},
                "color": {"field": "group", "type": "nominal"}
            }),
        ),
        Shape::Bins => (
            json!([
                {"value": 12}, {"value": 15}, {"value": 18}, {"value": 22},
                {"value": 25}, {"value": 28}, {"value": 31}, {"value": 35}
            ]),
            json!({
                "x": {"field": "value", "type": "quantitative", "bin": true},
                "y": {"field": "value", "type": "quantitative", "aggregate": "count"}
            }),
        ),
        Shape::Spread => (
            json!([
                {"group": "A", "value": 12}, {"group": "A", "value": 15}, {"group": "A", "value": 18},
                {"group": "B", "value": 22}, {"group": "B", "value": 25}, {"group": "B", "value": 29}
            ]),
            json!({
                "x": {"field": "group", "type": "nominal"},
                "y": {"field": "value", "type": "quantitative"}
            }),
        ),
        Shape::Scatter => (
            json!([
                {"x": 10, "y": 20}, {"x": 15, "y": 25}, {"x": 20, "y": 18}, {"x": 25, "y": 35}
            ]),
            json!({
                "x": {"field": "x", "type": "quantitative"},
                "y": {"field": "y", "type": "quantitative"}
            }),
        ),
        Shape::Bubble => (
            json!([
                {"x": 10, "y": 20, "size": 100},
                {"x": 15, "y": 25, "size": 200},
                {"x": 20, "y": 18, "size": 150}
            ]),
            json!({
                "x": {"field": "x", "type": "quantitative"},
                "y": {"field": "y", "type": "quantitative"},
                "size": {"field": "size", "type": "quantitative"}
            }),
        ),
        Shape::Grid => (
            json!([
                {"row": "A", "column": "X", "value": 10},
                {"row": "A", "column": "Y", "value": 20},
                {"row": "B", "column": "X", "value": 15},
                {"row": "B", "column": "Y", "value": 25}
            ]),
            json!({
                "x": {"field": "column", "type": "nominal"},
                "y": {"field": "row", "type": "nominal"},
                "color": {"field": "value", "type": "quantitative"}
            }),
        ),
        Shape::Regions => (
            json!([
                {"region": "North", "value": 120},
                {"region": "South", "value": 95},
                {"region": "East", "value": 80}
            ]),
            json!({
                "color": {"field": "value", "type": "quantitative"},
                "tooltip": {"field": "region", "type": "nominal"}
            }),
        ),
        Shape::Points => (
            json!([
                {"city": "Madrid", "lat": 40.4168, "lon": -3.7038, "value": 100},
                {"city": "Barcelona", "lat": 41.3851, "lon": 2.1734, "value": 80},
                {"city": "Valencia", "lat": 39.4699, "lon": -0.3763, "value": 60}
            ]),
            json!({
                "longitude": {"field": "lon", "type": "quantitative"},
                "latitude": {"field": "lat", "type": "quantitative"},
                "size": {"field": "value", "type": "quantitative"}
            }),
        ),
        Shape::Flow => (
            json!([
                {"source": "A", "target": "X", "value": 10},
                {"source": "A", "target": "Y", "value": 5},
                {"source": "B", "target": "X", "value": 8}
            ]),
            json!({
                "x": {"field": "source", "type": "nominal"},
                "y": {"field": "target", "type": "nominal"},
                "size": {"field": "value", "type": "quantitative"}
            }),
        ),
        Shape::Intervals => (
            json!([
                {"category": "A", "start": 10, "end": 25},
                {"category": "B", "start": 15, "end": 30},
                {"category": "C", "start": 5, "end": 20}
            ]),
            json!({
                "y": {"field": "category", "type": "nominal"},
                "x": {"field": "start", "type": "quantitative"},
                "x2": {"field": "end", "type": "quantitative"}
            }),
        ),
        Shape::Schedule => (
            json!([
                {"task": "Design", "start": "2023-01-01", "end": "2023-01-15"},
                {"task": "Build", "start": "2023-01-10", "end": "2023-02-10"},
                {"task": "Launch", "start": "2023-02-05", "end": "2023-02-20"}
            ]),
            json!({
                "y": {"field": "task", "type": "nominal"},
                "x": {"field": "start", "type": "temporal"},
                "x2": {"field": "end", "type": "temporal"}
            }),
        ),
        Shape::Prices => (
            json!([
                {"date": "2023-01-01", "open": 100, "high": 110, "low": 95, "close": 105},
                {"date": "2023-01-02", "open": 105, "high": 115, "low": 100, "close": 112},
                {"date": "2023-01-03", "open": 112, "high": 118, "low": 108, "close": 110}
            ]),
            json!({
                "x": {"field": "date", "type": "temporal"},
                "y": {"field": "low", "type": "quantitative"},
                "y2": {"field": "high", "type": "quantitative"}
            }),
        ),
        Shape::Words => (
            json!([
                {"word": "data", "count": 50},
                {"word": "chart", "count": 35},
                {"word": "report", "count": 20}
            ]),
            json!({
                "text": {"field": "word", "type": "nominal"},
                "size": {"field": "count", "type": "quantitative"}
            }),
        ),
        Shape::Card => (json!([{"metric": "Revenue", "value": 1250000}]), json!({})),
        Shape::Rows => (
            json!([
                {"name": "Ana", "department": "Sales", "salary": 45000},
                {"name": "Luis", "department": "IT", "salary": 52000}
            ]),
            json!({}),
        ),
    }
}

fn title(kind: ChartKind) -> String {
    let name = kind.name().replace('_', " ");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{} example", first.to_uppercase(), chars.as_str()),
        None => "Example".to_string(),
    }
}

fn build(chart_type: ChartType) -> Value {
    let kind = chart_type.kind();
    let (data, encoding) = data_and_encoding(shape(kind));
    let mut request = json!({
        "type": chart_type.id(),
        "title": title(kind),
        "description": format!("Sample {} request", chart_type.id()),
        "data": data,
        "encoding": encoding,
    });
    if kind == ChartKind::Donut {
        request["options"] = json!({"innerRadius": 50});
    }
    request
}

/// Example request for a registered identifier
pub fn example(id: &str) -> Option<Value> {
    ChartType::parse(id).map(build)
}

/// Every registered identifier paired with its example request
pub fn examples() -> impl Iterator<Item = (&'static str, Value)> {
    all_types().map(|chart_type| (chart_type.id(), build(chart_type)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::validate;
    use crate::writer::VegaLiteWriter;

    #[test]
    fn test_every_example_validates_and_maps() {
        let writer = VegaLiteWriter::new();
        let mut count = 0;
        for (id, request) in examples() {
            let spec = validate(&request)
                .unwrap_or_else(|e| panic!("example for {} is invalid: {}", id, e));
            assert_eq!(spec.chart_type().id(), id);
            let vl = writer.to_grammar(&spec);
            assert!(vl.get("$schema").is_some(), "no schema for {}", id);
            assert!(vl.get("mark").is_some() || vl.get("layer").is_some(), "no mark for {}", id);
            count += 1;
        }
        assert_eq!(count, all_types().count());
    }

    #[test]
    fn test_example_lookup() {
        let donut = example("dona").unwrap();
        assert_eq!(donut["type"], "dona");
        assert_eq!(donut["title"], "Donut example");
        assert_eq!(donut["options"]["innerRadius"], 50);
        assert_eq!(example("donut_chart").unwrap()["data"], donut["data"]);

        let kpi = example("kpi").unwrap();
        assert!(kpi["encoding"].as_object().unwrap().is_empty());

        assert!(example("not_a_chart").is_none());
        assert!(example("BAR").is_none());
    }

    #[test]
    fn test_aliases_of_a_family_share_a_shape() {
        for kind in all_types().map(|t| t.kind()) {
            let mut requests = kind.aliases().filter_map(example);
            if let Some(first) = requests.next() {
                for other in requests {
                    assert_eq!(other["encoding"], first["encoding"]);
                }
            }
        }
    }
}
