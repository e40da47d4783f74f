//! Fixed file bodies for the Power BI visual project
//!
//! Templates use `__NAME__` placeholders filled by [`render`].

/// 20x20 PNG shown in the Power BI visualizations pane
pub(super) const ICON_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAABQAAAAUCAYAAACNiR0NAAAACXBIWXMAABCFAAAQHQHI4BAkAAAAGXRFWHRTb2Z0d2FyZQB3d3cuaW5rc2NhcGUub3Jnm+48GgAAALxJREFUOI2tlE0KwjAQRl8oiKCgIoK/C1f+gJ5Ad15Al+7EpXv3LryCJ3DjSdzpCpoOPYJfoTNNvnlvJhMjhOAXax4jIgqRrfdeVlWl8zzXruuqoig0TdPPP4BSSkVRFMqyTNd1rdM01WEY6qZpNAxD3fe97vte931f971e13Utx3Gsm6ZRSilVVaX7vk9r1DRNo7Zt67qu67quK8uy1HVd67quw+8bx7EKgkBVVaXruqr3XiVJooqiUMaYrxGfw/4CWD0vDrGJXwMAAABJRU5ErkJggg==";

pub(super) const GITIGNORE: &str = "\
# Build outputs
dist/
lib/
node_modules/
*.pbiviz
.tmp/

# Editors
.vscode/
.vs/

# Logs
npm-debug.log*
yarn-debug.log*
yarn-error.log*

# OS
.DS_Store
Thumbs.db
";

pub(super) const VISUAL_LESS: &str = r#".visual-container {
    width: 100%;
    height: 100%;
    display: flex;
    flex-direction: column;
    padding: 10px;
    box-sizing: border-box;
    font-family: "Segoe UI", wf_segoe-ui_normal, helvetica, arial, sans-serif;
}

.chart-header {
    margin-bottom: 12px;
    text-align: center;

    .chart-title {
        margin: 0 0 4px 0;
        font-size: 16px;
        font-weight: 600;
        color: #252423;
    }

    .chart-description {
        margin: 0;
        font-size: 12px;
        color: #605e5c;
    }
}

.chart-body {
    flex: 1;
    overflow-y: auto;
    border: 1px solid #e1dfdd;
    border-radius: 4px;
    background-color: #ffffff;
}

.placeholder {
    padding: 32px 16px;
    text-align: center;
    color: #605e5c;
    font-size: 13px;
}

.data-row {
    display: flex;
    align-items: center;
    padding: 6px 12px;
    border-bottom: 1px solid #f3f2f1;

    &:last-child {
        border-bottom: none;
    }

    .category {
        min-width: 110px;
        margin-right: 12px;
        font-weight: 500;
    }

    .value {
        min-width: 60px;
        margin-right: 12px;
        text-align: right;
        font-family: Consolas, monospace;
    }

    .bar {
        height: 6px;
        min-width: 2px;
        border-radius: 3px;
        background-color: #118dff;
    }
}

.more-rows {
    padding: 8px;
    text-align: center;
    font-size: 12px;
    color: #605e5c;
}
"#;

pub(super) const VISUAL_TS: &str = r#"/*
 * __DISPLAY_NAME__
 * Power BI custom visual generated by chartmaker __GENERATOR_VERSION__.
 * Chart type: __CHART_TYPE__ (__VISUAL_KIND__)
 */
"use strict";

import "./../style/visual.less";
import powerbi from "powerbi-visuals-api";

import VisualConstructorOptions = powerbi.extensibility.visual.VisualConstructorOptions;
import VisualUpdateOptions = powerbi.extensibility.visual.VisualUpdateOptions;
import IVisual = powerbi.extensibility.visual.IVisual;
import DataView = powerbi.DataView;

const CHART_TITLE: string = __TITLE_LITERAL__;
const CHART_DESCRIPTION: string = __DESCRIPTION_LITERAL__;
const VISUAL_KIND: string = "__VISUAL_KIND__";
const MAX_ROWS = 10;

// Chart request this visual was generated from
const CHART_SPEC = __SPEC_JSON__;

interface DataPoint {
    category: string;
    value: number;
}

export class Visual implements IVisual {
    private body: HTMLElement;

    constructor(options: VisualConstructorOptions) {
        const container = document.createElement("div");
        container.className = "visual-container";

        const header = document.createElement("div");
        header.className = "chart-header";
        const title = document.createElement("h3");
        title.className = "chart-title";
        title.textContent = CHART_TITLE;
        const description = document.createElement("p");
        description.className = "chart-description";
        description.textContent = CHART_DESCRIPTION;
        header.appendChild(title);
        header.appendChild(description);

        this.body = document.createElement("div");
        this.body.className = "chart-body";

        container.appendChild(header);
        container.appendChild(this.body);
        options.element.appendChild(container);

        this.showPlaceholder(`Add fields to render this ${VISUAL_KIND} visual.`);
    }

    public update(options: VisualUpdateOptions) {
        const dataView: DataView | undefined = options.dataViews && options.dataViews[0];
        const categorical = dataView && dataView.categorical;
        if (!categorical || !categorical.categories || !categorical.values) {
            this.showPlaceholder("No data bound yet.");
            return;
        }

        const categories = categorical.categories[0];
        const values = categorical.values[0];
        const points: DataPoint[] = categories.values.map((c, i) => ({
            category: String(c),
            value: Number(values.values[i]) || 0,
        }));
        this.render(points);
    }

    private render(points: DataPoint[]) {
        this.body.replaceChildren();
        const max = Math.max(0, ...points.map(p => p.value));

        for (const point of points.slice(0, MAX_ROWS)) {
            const row = document.createElement("div");
            row.className = "data-row";

            const category = document.createElement("span");
            category.className = "category";
            category.textContent = point.category;

            const value = document.createElement("span");
            value.className = "value";
            value.textContent = String(point.value);

            const bar = document.createElement("div");
            bar.className = "bar";
            bar.style.width = max > 0 ? `${Math.min(100, (point.value / max) * 100)}%` : "0%";

            row.appendChild(category);
            row.appendChild(value);
            row.appendChild(bar);
            this.body.appendChild(row);
        }

        if (points.length > MAX_ROWS) {
            const more = document.createElement("p");
            more.className = "more-rows";
            more.textContent = `and ${points.length - MAX_ROWS} more`;
            this.body.appendChild(more);
        }
    }

    private showPlaceholder(message: string) {
        this.body.replaceChildren();
        const placeholder = document.createElement("div");
        placeholder.className = "placeholder";
        placeholder.textContent = message;
        this.body.appendChild(placeholder);
    }
}
"#;

pub(super) const README_MD: &str = r#"# __DISPLAY_NAME__

Power BI custom visual project generated by chartmaker __GENERATOR_VERSION__.

| | |
|---|---|
| Chart type | `__CHART_TYPE__` |
| Power BI visual | `__VISUAL_KIND__` |
| Description | __DESCRIPTION__ |
| Visual GUID | `__GUID__` |
| Generated | __GENERATED_AT__ |

## Building

Requires Node.js and the Power BI visual tools:

```bash
npm install -g powerbi-visuals-tools
npm install
pbiviz package
```

The packaged `.pbiviz` file is written to `dist/` and can be imported into
Power BI Desktop. Use `pbiviz start` to develop against the Power BI service.

## Layout

```
.
├── assets/icon.png       visual icon (20x20)
├── capabilities.json     data roles and formatting objects
├── package.json          npm package descriptor
├── pbiviz.json           visual metadata
├── src/visual.ts         visual implementation
├── style/visual.less     styles
└── tsconfig.json         TypeScript settings
```

Data roles are derived from the chart encoding: __ROLES__.
"#;

/// Substitute `__KEY__` placeholders in one pass over the template.
///
/// Substituted values are never rescanned, so user text that looks like a
/// placeholder is written verbatim.
pub(super) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let hit = vars.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)
                .and_then(|tail| tail.strip_prefix("__"))
                .map(|tail| (*value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('_');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn test_render_replaces_every_occurrence() {
        let out = render("__A__ and __A__, __B__", &[("A", "x"), ("B", "y")]);
        assert_eq!(out, "x and x, y");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("__MISSING__", &[("A", "x")]), "__MISSING__");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let out = render("__A__|__B__", &[("A", "__B__"), ("B", "y")]);
        assert_eq!(out, "__B__|y");
    }

    #[test]
    fn test_render_handles_extra_underscores() {
        assert_eq!(render("___A__", &[("A", "x")]), "_x");
        assert_eq!(render("a__b", &[("A", "x")]), "a__b");
    }

    #[test]
    fn test_icon_is_png() {
        let bytes = STANDARD.decode(ICON_PNG_BASE64).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
