//! HTML fragments for the dashboard.
//!
//! Fragments are plain strings; every piece of sheet data passes through
//! [`escape_html`] before it is written out.

use crate::chart::{escape_html, ChartSpec};
use crate::error::VizResult;
use crate::views::{CrossTab, RawTableView, SheetViews};
use returnboard_core::{CleanedTable, LoadError, LoadReport, SkipReason, REQUIRED_COLUMNS};
use std::fmt::Write as _;

/// Dashboard heading and page title.
pub const PAGE_TITLE: &str = "제품 교환/환불 분석 대시보드";

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Notice shown in place of a sheet with no records.
#[must_use]
pub fn empty_notice(title: &str) -> String {
    format!("{title}: 처리할 수 있는 데이터가 없습니다.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

impl NoticeLevel {
    fn class(self) -> &'static str {
        match self {
            Self::Error => "notice-error",
            Self::Warning => "notice-warning",
            Self::Info => "notice-info",
        }
    }
}

/// An inline notice box.
#[must_use]
pub fn notice(level: NoticeLevel, message: &str) -> String {
    format!(
        "<div class=\"notice {}\" role=\"alert\">{}</div>\n",
        level.class(),
        escape_html(message)
    )
}

/// The single notice shown when a whole load fails.
#[must_use]
pub fn fatal_notice(err: &LoadError) -> String {
    match err {
        LoadError::Workbook(_) => {
            let columns = REQUIRED_COLUMNS.join(", ");
            let mut html = notice(
                NoticeLevel::Error,
                &format!("데이터를 처리하는 중 오류가 발생했습니다: {err}"),
            );
            html.push_str(&notice(
                NoticeLevel::Info,
                &format!("파일 형식을 확인해주세요. {columns} 컬럼이 필요합니다."),
            ));
            html
        }
        _ => notice(
            NoticeLevel::Error,
            &format!("스프레드시트 로드 중 오류가 발생했습니다: {err}"),
        ),
    }
}

fn skip_reason_text(reason: &SkipReason) -> String {
    match reason {
        SkipReason::Empty => "빈 시트".to_string(),
        SkipReason::MissingColumns(columns) => format!("필수 컬럼 누락: {}", columns.join(", ")),
        SkipReason::NoValidRows => "유효한 행 없음".to_string(),
    }
}

/// Color-intensity grid of a cross-tab. Each cell's tooltip names the model,
/// the disposition and the count.
#[must_use]
pub fn render_heat_map(cross: &CrossTab) -> String {
    let mut html = String::from("<table class=\"heatmap\">\n<thead><tr><th>모델명</th>");
    for category in &cross.categories {
        let _ = write!(html, "<th>{}</th>", escape_html(category));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &cross.rows {
        let model = escape_html(&row.model);
        let _ = write!(html, "<tr><th>{model}</th>");
        for (category, count) in cross.categories.iter().zip(&row.counts) {
            let intensity = if cross.max > 0.0 { count / cross.max } else { 0.0 };
            let (background, color) = if *count > 0.0 {
                let alpha = 0.1 + 0.9 * intensity;
                let text = if intensity > 0.55 { "#fff" } else { "#08306b" };
                (format!("rgba(8, 81, 156, {alpha:.3})"), text)
            } else {
                ("#f7fbff".to_string(), "#9ecae1")
            };
            let _ = write!(
                html,
                "<td style=\"background:{background};color:{color}\" title=\"모델명: {model}&#10;처리방식: {}&#10;건수: {count}\">{count}</td>",
                escape_html(category),
            );
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

/// The raw records as a typed table inside a collapsible panel.
#[must_use]
pub fn render_raw_table(raw: &RawTableView) -> String {
    let mut html = String::from(
        "<details class=\"raw\">\n<summary>원본 데이터 보기</summary>\n<table class=\"raw-table\">\n\
         <thead><tr><th>모델명</th><th>처리방식</th><th class=\"num\">수량</th></tr></thead>\n<tbody>\n",
    );
    for row in &raw.rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>",
            escape_html(&row.model),
            escape_html(&row.disposition),
            row.quantity
        );
    }
    html.push_str("</tbody>\n</table>\n</details>\n");
    html
}

/// All views of one sheet, or the empty notice if the table has no records.
///
/// `index` keeps canvas ids unique when several sheets share a page.
pub fn render_sheet(index: usize, title: &str, table: &CleanedTable) -> VizResult<String> {
    let Some(views) = SheetViews::build(title, table) else {
        return Ok(notice(NoticeLevel::Error, &empty_notice(title)));
    };
    render_views(index, &views)
}

fn render_views(index: usize, views: &SheetViews) -> VizResult<String> {
    let share_id = format!("chart-{index}-share");
    let top_id = format!("chart-{index}-top");
    let share_script = ChartSpec::proportions("처리방식별 비율", &views.proportions).to_script(&share_id)?;
    let top_script = ChartSpec::top_entities("상위 10개 모델의 현황", &views.top_entities).to_script(&top_id)?;

    let mut html = String::new();
    let _ = writeln!(html, "<h2>📊 {}</h2>", escape_html(&views.title));
    let _ = writeln!(
        html,
        "<div class=\"charts\">\n<div class=\"chart\"><canvas id=\"{share_id}\"></canvas></div>\n\
         <div class=\"chart\"><canvas id=\"{top_id}\"></canvas></div>\n</div>"
    );
    let _ = writeln!(html, "<script>\n{share_script}\n{top_script}\n</script>");
    html.push_str("<h3>처리방식별 상세 분석</h3>\n");
    html.push_str(&render_heat_map(&views.cross_tab));
    html.push_str(&render_raw_table(&views.raw));
    Ok(html)
}

/// Notices plus one tab per sheet for a finished load.
pub fn render_report(report: &LoadReport) -> VizResult<String> {
    let mut html = String::new();

    for err in &report.tab_errors {
        html.push_str(&notice(
            NoticeLevel::Warning,
            &format!("{} 시트 처리 중 오류 발생: {}", err.sheet, err.message),
        ));
    }

    if report.has_data() {
        html.push_str("<div class=\"tabs\">\n<nav class=\"tab-list\">\n");
        for (index, (name, _)) in report.sheets.iter().enumerate() {
            let active = if index == 0 { " active" } else { "" };
            let _ = writeln!(
                html,
                "<button type=\"button\" class=\"tab{active}\" data-tab=\"tab-{index}\">{}</button>",
                escape_html(name)
            );
        }
        html.push_str("</nav>\n");
        for (index, (name, table)) in report.sheets.iter().enumerate() {
            let hidden = if index == 0 { "" } else { " hidden" };
            let _ = writeln!(html, "<section class=\"tab-panel\" id=\"tab-{index}\"{hidden}>");
            html.push_str(&render_sheet(index, name, table)?);
            html.push_str("</section>\n");
        }
        html.push_str("</div>\n");
    } else {
        html.push_str(&notice(
            NoticeLevel::Error,
            "처리할 수 있는 데이터가 없습니다. 시트 형식을 확인해주세요.",
        ));
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(
            html,
            "<details class=\"skipped\">\n<summary>건너뛴 시트 ({})</summary>\n<ul>",
            report.skipped.len()
        );
        for skipped in &report.skipped {
            let _ = writeln!(
                html,
                "<li>{}: {}</li>",
                escape_html(&skipped.sheet),
                escape_html(&skip_reason_text(&skipped.reason))
            );
        }
        html.push_str("</ul>\n</details>\n");
    }

    Ok(html)
}

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1200px; padding: 1rem 2rem; color: #222; }
.notice { padding: .75rem 1rem; border-radius: 6px; margin: .5rem 0; }
.notice-error { background: #fdecea; color: #8a1c12; }
.notice-warning { background: #fff4e5; color: #7a4b00; }
.notice-info { background: #e8f1fb; color: #0b3d6e; }
.tab-list { display: flex; gap: .25rem; border-bottom: 1px solid #ccc; margin-top: 1rem; }
.tab { border: 1px solid #ccc; border-bottom: none; background: #f5f5f5; padding: .5rem 1rem; cursor: pointer; }
.tab.active { background: #fff; font-weight: 600; }
.charts { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.heatmap, .raw-table { border-collapse: collapse; font-size: .9rem; }
.heatmap th, .heatmap td, .raw-table th, .raw-table td { border: 1px solid #e0e0e0; padding: .3rem .6rem; }
.heatmap td, .num { text-align: right; }
details { margin: 1rem 0; }
form { display: flex; gap: .5rem; align-items: center; margin: 1rem 0; }
";

const TAB_SCRIPT: &str = r"
document.addEventListener('click', (event) => {
    const button = event.target.closest('[data-tab]');
    if (!button) return;
    const tabs = button.closest('.tabs');
    tabs.querySelectorAll('.tab').forEach((t) => t.classList.toggle('active', t === button));
    tabs.querySelectorAll('.tab-panel').forEach((p) => { p.hidden = p.id !== button.dataset.tab; });
});
";

/// A complete standalone page around `body`.
#[must_use]
pub fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="utf-8">
    <title>{PAGE_TITLE}</title>
    <script src="{CHART_JS_CDN}"></script>
    <style>{STYLE}</style>
</head>
<body>
<h1>{PAGE_TITLE}</h1>
{body}
<script>{TAB_SCRIPT}</script>
</body>
</html>
"#
    )
}
