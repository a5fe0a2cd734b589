//! Plotly volcano plot: mean log fold change against `-log10 p-value`.

use serde::Serialize;

use crate::report::{DisplayRow, round_to};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
/// `-log10(0.01)`.
pub const THRESHOLD_Y: f64 = 2.0;
pub const THRESHOLD_X_SPAN: f64 = 6.0;

const HOVER_TEMPLATE: &str =
    "%{customdata} <br>-log10 p-value: %{y}<br>Mean log fold change: %{x}<extra>%{text}</extra>";

#[derive(Debug, Clone)]
pub struct VolcanoLabels {
    pub group1: String,
    pub group2: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<ScatterTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterTrace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub marker: Marker,
    pub hoverinfo: &'static str,
    pub text: Vec<String>,
    pub customdata: Vec<String>,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: Vec<&'static str>,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub height: u32,
    pub hovermode: &'static str,
    /// `"none"` turns off Plotly's default grey-grid theme.
    pub template: &'static str,
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisTitle {
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: f64,
    pub dash: &'static str,
}

pub fn build_figure(rows: &[DisplayRow], labels: &VolcanoLabels) -> Figure {
    let trace = ScatterTrace {
        kind: "scatter",
        mode: "markers",
        x: rows.iter().map(|r| round_to(r.lfc_mean, 3)).collect(),
        y: rows.iter().map(|r| round_to(r.minuslog10pval, 3)).collect(),
        marker: Marker {
            color: rows.iter().map(|r| r.color).collect(),
            opacity: 0.5,
        },
        hoverinfo: "text",
        text: rows.iter().map(|r| r.description_html.clone()).collect(),
        customdata: rows
            .iter()
            .map(|r| format!("{}<br>{}", r.gene_name, r.gene_id))
            .collect(),
        hovertemplate: HOVER_TEMPLATE,
    };

    let layout = Layout {
        title: Title {
            text: format!(
                "{} cells versus  <br>{} <br> dashes mark p = 0.01",
                labels.group1, labels.group2
            ),
            x: 0.5,
        },
        xaxis: Axis {
            title: AxisTitle {
                text: "Mean log fold change",
            },
        },
        yaxis: Axis {
            title: AxisTitle {
                text: "-log10 p-value",
            },
        },
        height: 700,
        hovermode: "closest",
        template: "none",
        shapes: vec![Shape {
            kind: "line",
            x0: -THRESHOLD_X_SPAN,
            y0: THRESHOLD_Y,
            x1: THRESHOLD_X_SPAN,
            y1: THRESHOLD_Y,
            line: Line {
                color: "lightsalmon",
                width: 2.0,
                dash: "dash",
            },
        }],
    };

    Figure {
        data: vec![trace],
        layout,
    }
}

/// HTML fragment that draws `figure` into a div called `div_id`. plotly.js
/// must already be loaded by the host page (`PLOTLY_CDN`). The figure JSON is
/// inlined in a script tag, so `</` is escaped.
pub fn render_html(figure: &Figure, div_id: &str) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(figure)?.replace("</", "<\\/");
    let id = serde_json::to_string(div_id)?;
    Ok(format!(
        "<div id={id}></div>\n\
         <script>\n\
         (function () {{\n\
         var fig = {json};\n\
         Plotly.newPlot({id}, fig.data, fig.layout, {{responsive: true}});\n\
         }})();\n\
         </script>\n"
    ))
}
