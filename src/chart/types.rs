//! Chart type registry
//!
//! A closed, bilingual catalog of chart type identifiers. Every identifier is
//! an alias of exactly one [`ChartKind`] family; the [`CHART_TYPES`] table is
//! the single source of truth used by validation and by every mapper.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Chart families recognised by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    // Basic
    VerticalBar,
    HorizontalBar,
    Column,
    GroupedBar,
    StackedBar,
    Combo,
    // Trends
    Line,
    Area,
    StackedArea,
    // Composition
    Pie,
    Donut,
    Treemap,
    Waffle,
    Sunburst,
    Icicle,
    Marimekko,
    // Distribution
    Histogram,
    BoxPlot,
    Violin,
    Density,
    Hexbin,
    // Correlation
    Scatter,
    Bubble,
    CorrelationMatrix,
    // Maps
    Choropleth,
    PointMap,
    GeoHeatmap,
    MapLines,
    // Flow and process
    Funnel,
    Sankey,
    Waterfall,
    Loop,
    CircularLoop,
    ProcessLoop,
    FlowLoop,
    Chord,
    Network,
    Parallel,
    // Advanced
    Heatmap,
    Radar,
    Gantt,
    Timeline,
    Kpi,
    Gauge,
    Bullet,
    Candlestick,
    RangeBar,
    Spiral,
    Dumbbell,
    Lollipop,
    Bump,
    WordCloud,
    // Tabular
    Table,
    Matrix,
    // Analytical visuals
    DecompositionTree,
    KeyInfluencers,
    Narrative,
    // ggplot2 geoms
    GeomPoint,
    GeomSmooth,
    GeomPolygon,
    // Visualization categories
    Correlation,
    Deviation,
    Ranking,
    Distribution,
    Composition,
    Change,
    Groups,
    Spatial,
}

/// Every accepted chart type identifier, in catalog order.
///
/// Spanish alias first, then the long English alias, then the short English
/// alias where one exists.
pub static CHART_TYPES: &[(&str, ChartKind)] = &[
    // Basic
    ("barras_vertical", ChartKind::VerticalBar),
    ("bar_chart_vertical", ChartKind::VerticalBar),
    ("bar", ChartKind::VerticalBar),
    ("barras_horizontal", ChartKind::HorizontalBar),
    ("bar_chart_horizontal", ChartKind::HorizontalBar),
    ("columnas", ChartKind::Column),
    ("column_chart", ChartKind::Column),
    ("barras_agrupadas", ChartKind::GroupedBar),
    ("grouped_bar_chart", ChartKind::GroupedBar),
    ("barras_apiladas", ChartKind::StackedBar),
    ("stacked_bar_chart", ChartKind::StackedBar),
    ("stacked_bar", ChartKind::StackedBar),
    ("combinado", ChartKind::Combo),
    ("combo", ChartKind::Combo),
    // Trends
    ("lineas", ChartKind::Line),
    ("line_chart", ChartKind::Line),
    ("line", ChartKind::Line),
    ("area", ChartKind::Area),
    ("area_chart", ChartKind::Area),
    ("area_apilada", ChartKind::StackedArea),
    ("stacked_area_chart", ChartKind::StackedArea),
    ("stacked_area", ChartKind::StackedArea),
    // Composition
    ("circular", ChartKind::Pie),
    ("pie_chart", ChartKind::Pie),
    ("pie", ChartKind::Pie),
    ("dona", ChartKind::Donut),
    ("donut_chart", ChartKind::Donut),
    ("donut", ChartKind::Donut),
    ("treemap", ChartKind::Treemap),
    ("treemap_chart", ChartKind::Treemap),
    ("waffle", ChartKind::Waffle),
    ("waffle_chart", ChartKind::Waffle),
    ("rayos_solares", ChartKind::Sunburst),
    ("sunburst", ChartKind::Sunburst),
    ("carambano", ChartKind::Icicle),
    ("icicle", ChartKind::Icicle),
    ("mosaico", ChartKind::Marimekko),
    ("marimekko", ChartKind::Marimekko),
    // Distribution
    ("histograma", ChartKind::Histogram),
    ("histogram", ChartKind::Histogram),
    ("caja", ChartKind::BoxPlot),
    ("box_plot", ChartKind::BoxPlot),
    ("boxplot", ChartKind::BoxPlot),
    ("violin", ChartKind::Violin),
    ("violin_plot", ChartKind::Violin),
    ("densidad", ChartKind::Density),
    ("density_plot", ChartKind::Density),
    ("hexagonos", ChartKind::Hexbin),
    ("hexbin", ChartKind::Hexbin),
    // Correlation
    ("dispersion", ChartKind::Scatter),
    ("scatter_plot", ChartKind::Scatter),
    ("scatter", ChartKind::Scatter),
    ("burbujas", ChartKind::Bubble),
    ("bubble_chart", ChartKind::Bubble),
    ("bubble", ChartKind::Bubble),
    ("matriz_correlacion", ChartKind::CorrelationMatrix),
    ("correlation_matrix", ChartKind::CorrelationMatrix),
    // Maps
    ("mapa_coropletico", ChartKind::Choropleth),
    ("choropleth_map", ChartKind::Choropleth),
    ("choropleth", ChartKind::Choropleth),
    ("mapa_puntos", ChartKind::PointMap),
    ("point_map", ChartKind::PointMap),
    ("map_points", ChartKind::PointMap),
    ("mapa_calor_geografico", ChartKind::GeoHeatmap),
    ("geographic_heatmap", ChartKind::GeoHeatmap),
    ("mapa_lineas", ChartKind::MapLines),
    ("map_lines", ChartKind::MapLines),
    // Flow and process
    ("embudo", ChartKind::Funnel),
    ("funnel_chart", ChartKind::Funnel),
    ("funnel", ChartKind::Funnel),
    ("sankey", ChartKind::Sankey),
    ("sankey_diagram", ChartKind::Sankey),
    ("cascada", ChartKind::Waterfall),
    ("waterfall_chart", ChartKind::Waterfall),
    ("waterfall", ChartKind::Waterfall),
    ("lazo", ChartKind::Loop),
    ("loop_chart", ChartKind::Loop),
    ("lazo_circular", ChartKind::CircularLoop),
    ("circular_loop_chart", ChartKind::CircularLoop),
    ("lazo_proceso", ChartKind::ProcessLoop),
    ("process_loop_chart", ChartKind::ProcessLoop),
    ("lazo_flujo", ChartKind::FlowLoop),
    ("flow_loop_chart", ChartKind::FlowLoop),
    ("cuerdas", ChartKind::Chord),
    ("chord", ChartKind::Chord),
    ("red", ChartKind::Network),
    ("network", ChartKind::Network),
    ("coordenadas_paralelas", ChartKind::Parallel),
    ("parallel", ChartKind::Parallel),
    // Advanced
    ("mapa_calor", ChartKind::Heatmap),
    ("heatmap", ChartKind::Heatmap),
    ("radar", ChartKind::Radar),
    ("radar_chart", ChartKind::Radar),
    ("gantt", ChartKind::Gantt),
    ("gantt_chart", ChartKind::Gantt),
    ("linea_tiempo", ChartKind::Timeline),
    ("timeline", ChartKind::Timeline),
    ("kpi", ChartKind::Kpi),
    ("kpi_card", ChartKind::Kpi),
    ("medidor", ChartKind::Gauge),
    ("gauge", ChartKind::Gauge),
    ("bala", ChartKind::Bullet),
    ("bullet", ChartKind::Bullet),
    ("velas", ChartKind::Candlestick),
    ("candlestick", ChartKind::Candlestick),
    ("barras_rango", ChartKind::RangeBar),
    ("range_bar", ChartKind::RangeBar),
    ("espiral", ChartKind::Spiral),
    ("spiral_chart", ChartKind::Spiral),
    ("pesas", ChartKind::Dumbbell),
    ("dumbbell", ChartKind::Dumbbell),
    ("piruleta", ChartKind::Lollipop),
    ("lollipop", ChartKind::Lollipop),
    ("posiciones", ChartKind::Bump),
    ("bump", ChartKind::Bump),
    ("nube_palabras", ChartKind::WordCloud),
    ("wordcloud", ChartKind::WordCloud),
    // Tabular
    ("tabla", ChartKind::Table),
    ("table", ChartKind::Table),
    ("matriz", ChartKind::Matrix),
    ("matrix", ChartKind::Matrix),
    // Analytical visuals
    ("arbol_descomposicion", ChartKind::DecompositionTree),
    ("decomposition_tree", ChartKind::DecompositionTree),
    ("influenciadores_clave", ChartKind::KeyInfluencers),
    ("key_influencers", ChartKind::KeyInfluencers),
    ("narrativa", ChartKind::Narrative),
    ("narrative", ChartKind::Narrative),
    // ggplot2 geoms
    ("puntos", ChartKind::GeomPoint),
    ("geom_point", ChartKind::GeomPoint),
    ("linea_tendencia", ChartKind::GeomSmooth),
    ("geom_smooth", ChartKind::GeomSmooth),
    ("poligono", ChartKind::GeomPolygon),
    ("geom_polygon", ChartKind::GeomPolygon),
    // Visualization categories
    ("correlacion", ChartKind::Correlation),
    ("correlation", ChartKind::Correlation),
    ("desviacion", ChartKind::Deviation),
    ("deviation", ChartKind::Deviation),
    ("ranking", ChartKind::Ranking),
    ("distribucion", ChartKind::Distribution),
    ("distribution", ChartKind::Distribution),
    ("composicion", ChartKind::Composition),
    ("composition", ChartKind::Composition),
    ("cambio", ChartKind::Change),
    ("change", ChartKind::Change),
    ("grupos", ChartKind::Groups),
    ("groups", ChartKind::Groups),
    ("espacial", ChartKind::Spatial),
    ("spatial", ChartKind::Spatial),
];

impl ChartKind {
    /// All identifiers belonging to this family, in catalog order
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        CHART_TYPES
            .iter()
            .filter(move |(_, kind)| *kind == self)
            .map(|(id, _)| *id)
    }

    /// Chart families that render without any encoding (cards and tables)
    pub fn is_encoding_optional(self) -> bool {
        matches!(self, ChartKind::Table | ChartKind::Kpi | ChartKind::Gauge)
    }

    /// Radial families drawn with an arc mark and a theta channel
    pub fn is_pie_family(self) -> bool {
        matches!(
            self,
            ChartKind::Pie | ChartKind::Donut | ChartKind::Composition | ChartKind::CircularLoop
        )
    }

    /// Grid families where color carries the measured value
    pub fn is_heatmap_family(self) -> bool {
        matches!(
            self,
            ChartKind::Heatmap
                | ChartKind::CorrelationMatrix
                | ChartKind::GeoHeatmap
                | ChartKind::Hexbin
        )
    }

    /// Canonical snake_case family name
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::VerticalBar => "vertical_bar",
            ChartKind::HorizontalBar => "horizontal_bar",
            ChartKind::Column => "column",
            ChartKind::GroupedBar => "grouped_bar",
            ChartKind::StackedBar => "stacked_bar",
            ChartKind::Combo => "combo",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::StackedArea => "stacked_area",
            ChartKind::Pie => "pie",
            ChartKind::Donut => "donut",
            ChartKind::Treemap => "treemap",
            ChartKind::Waffle => "waffle",
            ChartKind::Sunburst => "sunburst",
            ChartKind::Icicle => "icicle",
            ChartKind::Marimekko => "marimekko",
            ChartKind::Histogram => "histogram",
            ChartKind::BoxPlot => "box_plot",
            ChartKind::Violin => "violin",
            ChartKind::Density => "density",
            ChartKind::Hexbin => "hexbin",
            ChartKind::Scatter => "scatter",
            ChartKind::Bubble => "bubble",
            ChartKind::CorrelationMatrix => "correlation_matrix",
            ChartKind::Choropleth => "choropleth",
            ChartKind::PointMap => "point_map",
            ChartKind::GeoHeatmap => "geographic_heatmap",
            ChartKind::MapLines => "map_lines",
            ChartKind::Funnel => "funnel",
            ChartKind::Sankey => "sankey",
            ChartKind::Waterfall => "waterfall",
            ChartKind::Loop => "loop",
            ChartKind::CircularLoop => "circular_loop",
            ChartKind::ProcessLoop => "process_loop",
            ChartKind::FlowLoop => "flow_loop",
            ChartKind::Chord => "chord",
            ChartKind::Network => "network",
            ChartKind::Parallel => "parallel",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Radar => "radar",
            ChartKind::Gantt => "gantt",
            ChartKind::Timeline => "timeline",
            ChartKind::Kpi => "kpi",
            ChartKind::Gauge => "gauge",
            ChartKind::Bullet => "bullet",
            ChartKind::Candlestick => "candlestick",
            ChartKind::RangeBar => "range_bar",
            ChartKind::Spiral => "spiral",
            ChartKind::Dumbbell => "dumbbell",
            ChartKind::Lollipop => "lollipop",
            ChartKind::Bump => "bump",
            ChartKind::WordCloud => "wordcloud",
            ChartKind::Table => "table",
            ChartKind::Matrix => "matrix",
            ChartKind::DecompositionTree => "decomposition_tree",
            ChartKind::KeyInfluencers => "key_influencers",
            ChartKind::Narrative => "narrative",
            ChartKind::GeomPoint => "geom_point",
            ChartKind::GeomSmooth => "geom_smooth",
            ChartKind::GeomPolygon => "geom_polygon",
            ChartKind::Correlation => "correlation",
            ChartKind::Deviation => "deviation",
            ChartKind::Ranking => "ranking",
            ChartKind::Distribution => "distribution",
            ChartKind::Composition => "composition",
            ChartKind::Change => "change",
            ChartKind::Groups => "groups",
            ChartKind::Spatial => "spatial",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A registered chart type identifier together with its family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartType {
    id: &'static str,
    kind: ChartKind,
}

impl ChartType {
    /// Look up an identifier in the registry (exact, case-sensitive match)
    pub fn parse(id: &str) -> Option<Self> {
        CHART_TYPES
            .iter()
            .find(|(alias, _)| *alias == id)
            .map(|&(id, kind)| ChartType { id, kind })
    }

    /// The identifier exactly as registered
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Serialize for ChartType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id)
    }
}

impl<'de> Deserialize<'de> for ChartType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        ChartType::parse(&id)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported chart type '{}'", id)))
    }
}

/// Check whether an identifier belongs to the registry
pub fn is_valid_type(id: &str) -> bool {
    ChartType::parse(id).is_some()
}

/// All registered chart types, in catalog order
pub fn all_types() -> impl Iterator<Item = ChartType> {
    CHART_TYPES
        .iter()
        .map(|&(id, kind)| ChartType { id, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bilingual_aliases_resolve_to_same_kind() {
        assert_eq!(ChartType::parse("bar").unwrap().kind(), ChartKind::VerticalBar);
        assert_eq!(
            ChartType::parse("barras_vertical").unwrap().kind(),
            ChartKind::VerticalBar
        );
        assert_eq!(ChartType::parse("dona").unwrap().kind(), ChartKind::Donut);
        assert_eq!(ChartType::parse("donut_chart").unwrap().kind(), ChartKind::Donut);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(!is_valid_type("not_a_chart"));
        assert!(!is_valid_type(""));
        // Matching is case-sensitive
        assert!(!is_valid_type("BAR"));
        assert!(is_valid_type("bar"));
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut seen = HashSet::new();
        for (id, _) in CHART_TYPES {
            assert!(seen.insert(*id), "duplicate alias '{}'", id);
        }
    }

    #[test]
    fn test_all_types_preserves_catalog_order() {
        let ids: Vec<&str> = all_types().map(|t| t.id()).collect();
        assert_eq!(ids.len(), CHART_TYPES.len());
        assert_eq!(ids[0], "barras_vertical");
        assert_eq!(ids[1], "bar_chart_vertical");
        assert_eq!(ids[2], "bar");
    }

    #[test]
    fn test_every_family_has_an_alias() {
        let kinds: HashSet<ChartKind> = CHART_TYPES.iter().map(|(_, k)| *k).collect();
        for kind in kinds {
            assert!(kind.aliases().count() >= 1);
            assert!(!kind.name().is_empty());
        }
    }

    #[test]
    fn test_encoding_optional_allow_list() {
        for id in ["table", "tabla", "kpi", "kpi_card", "gauge", "medidor"] {
            assert!(
                ChartType::parse(id).unwrap().kind().is_encoding_optional(),
                "{} should allow an empty encoding",
                id
            );
        }
        assert!(!ChartKind::VerticalBar.is_encoding_optional());
        assert!(!ChartKind::Donut.is_encoding_optional());
    }

    #[test]
    fn test_chart_type_serde_uses_alias() {
        let ty = ChartType::parse("barras_apiladas").unwrap();
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"barras_apiladas\"");

        let back: ChartType = serde_json::from_str("\"scatter_plot\"").unwrap();
        assert_eq!(back.kind(), ChartKind::Scatter);

        assert!(serde_json::from_str::<ChartType>("\"nope\"").is_err());
    }
}
