use crate::error::VizResult;
use crate::views::{CategoryProportions, TopEntities};
use serde::{Deserialize, Serialize};

/// Chart specification rendered client-side by Chart.js.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Doughnut,
}

impl ChartKind {
    /// Chart.js type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Doughnut => "doughnut",
        }
    }
}

/// Chart data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Percent per point, appended to the tooltip when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Vec<String>>,
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Tooltip caption for the point label.
    pub label_caption: String,
    /// Tooltip caption for the value.
    pub value_caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    /// Doughnut hole size, as a Chart.js `cutout` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout: Option<String>,
    pub show_legend: bool,
}

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn palette(n: usize) -> Vec<String> {
    PALETTE.iter().cycle().take(n).map(|c| (*c).to_string()).collect()
}

/// Escape HTML special characters to prevent XSS.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: ChartData::default(),
            options: ChartOptions::default(),
        }
    }

    /// Doughnut of disposition shares.
    #[must_use]
    pub fn proportions(title: impl Into<String>, view: &CategoryProportions) -> Self {
        let mut spec = Self::new(ChartKind::Doughnut, title);
        spec.data.labels = view.shares.iter().map(|s| s.category.clone()).collect();
        spec.data.datasets.push(Dataset {
            label: "건수".to_string(),
            data: view.shares.iter().map(|s| s.quantity).collect(),
            shares: Some(view.shares.iter().map(|s| s.percent).collect()),
            background_color: Some(palette(view.shares.len())),
        });
        spec.options = ChartOptions {
            label_caption: "처리방식".to_string(),
            value_caption: "건수".to_string(),
            cutout: Some("30%".to_string()),
            show_legend: true,
            ..ChartOptions::default()
        };
        spec
    }

    /// Bar chart of the top models.
    #[must_use]
    pub fn top_entities(title: impl Into<String>, view: &TopEntities) -> Self {
        let mut spec = Self::new(ChartKind::Bar, title);
        spec.data.labels = view.entities.iter().map(|e| e.model.clone()).collect();
        spec.data.datasets.push(Dataset {
            label: "건수".to_string(),
            data: view.entities.iter().map(|e| e.quantity).collect(),
            shares: None,
            background_color: Some(vec![PALETTE[0].to_string()]),
        });
        spec.options = ChartOptions {
            label_caption: "모델명".to_string(),
            value_caption: "건수".to_string(),
            x_axis_label: Some("모델명".to_string()),
            y_axis_label: Some("건수".to_string()),
            ..ChartOptions::default()
        };
        spec
    }

    /// Convert to JSON string for the frontend.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> VizResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Script that draws this chart into the canvas with id `canvas_id`.
    pub fn to_script(&self, canvas_id: &str) -> VizResult<String> {
        // JSON goes into a script context
        let json = self.to_json()?.replace("</", "<\\/");
        let canvas_id = serde_json::to_string(canvas_id)?.replace("</", "<\\/");
        let kind = self.chart_type.as_str();

        Ok(format!(
            r"(function () {{
    const spec = {json};
    const ds = spec.data.datasets;
    new Chart(document.getElementById({canvas_id}), {{
        type: '{kind}',
        data: {{ labels: spec.data.labels, datasets: ds.map((d) => ({{ label: d.label, data: d.data, backgroundColor: d.background_color }})) }},
        options: {{
            responsive: true,
            cutout: spec.options.cutout,
            plugins: {{
                title: {{ display: true, text: spec.title }},
                legend: {{ display: spec.options.show_legend }},
                tooltip: {{
                    callbacks: {{
                        label: (ctx) => {{
                            const lines = [
                                spec.options.label_caption + ': ' + ctx.label,
                                spec.options.value_caption + ': ' + ctx.formattedValue,
                            ];
                            const shares = ds[ctx.datasetIndex].shares;
                            if (shares) lines.push('비율: ' + shares[ctx.dataIndex] + '%');
                            return lines;
                        }},
                    }},
                }},
            }},
            scales: spec.chart_type === 'bar' ? {{
                x: {{ title: {{ display: true, text: spec.options.x_axis_label }} }},
                y: {{ title: {{ display: true, text: spec.options.y_axis_label }}, beginAtZero: true }},
            }} : undefined,
        }},
    }});
}})();"
        ))
    }
}
