//! Views derived from one cleaned table.
//!
//! Every view is recomputed from the records it is given; nothing is cached.

use indexmap::IndexMap;
use returnboard_core::CleanedTable;
use serde::Serialize;

/// Entities shown in the top-entities bar chart.
pub const TOP_ENTITIES: usize = 10;
/// Entities included in the cross-tab heat map.
pub const CROSS_TAB_ENTITIES: usize = 20;

/// Round to one decimal place, halves to even.
fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Summed quantity per model, in first-encountered order.
fn model_totals(table: &CleanedTable) -> Vec<EntityTotal> {
    let mut totals: IndexMap<&str, f64> = IndexMap::new();
    for record in table {
        *totals.entry(record.model.as_str()).or_insert(0.0) += record.quantity;
    }
    totals
        .into_iter()
        .map(|(model, quantity)| EntityTotal {
            model: model.to_string(),
            quantity,
        })
        .collect()
}

/// Models sorted by descending total. `sort_by` is stable, so ties keep the
/// order in which the models first appeared.
fn ranked_models(table: &CleanedTable) -> Vec<EntityTotal> {
    let mut totals = model_totals(table);
    totals.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub quantity: f64,
    /// Share of the grand total in percent, rounded to one decimal.
    pub percent: f64,
}

/// Quantity and share per disposition, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryProportions {
    pub total: f64,
    pub shares: Vec<CategoryShare>,
}

impl CategoryProportions {
    #[must_use]
    pub fn from_table(table: &CleanedTable) -> Self {
        let mut sums: IndexMap<&str, f64> = IndexMap::new();
        for record in table {
            *sums.entry(record.disposition.as_str()).or_insert(0.0) += record.quantity;
        }

        let total: f64 = sums.values().sum();
        let mut shares: Vec<CategoryShare> = sums
            .into_iter()
            .map(|(category, quantity)| CategoryShare {
                category: category.to_string(),
                quantity,
                percent: if total > 0.0 {
                    round1(quantity / total * 100.0)
                } else {
                    0.0
                },
            })
            .collect();
        shares.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));

        Self { total, shares }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTotal {
    pub model: String,
    pub quantity: f64,
}

/// The models with the largest summed quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopEntities {
    pub entities: Vec<EntityTotal>,
}

impl TopEntities {
    #[must_use]
    pub fn from_table(table: &CleanedTable, limit: usize) -> Self {
        let mut entities = ranked_models(table);
        entities.truncate(limit);
        Self { entities }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabRow {
    pub model: String,
    /// One count per entry of [`CrossTab::categories`]; absent pairs are 0.
    pub counts: Vec<f64>,
}

/// Model × disposition matrix for the top models.
///
/// Rows are ordered by row total, descending. Columns are the dispositions
/// present among those models, in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossTab {
    pub categories: Vec<String>,
    pub rows: Vec<CrossTabRow>,
    /// Largest cell value, for shading.
    pub max: f64,
}

impl CrossTab {
    #[must_use]
    pub fn from_table(table: &CleanedTable, limit: usize) -> Self {
        let mut ranked = ranked_models(table);
        ranked.truncate(limit);

        let mut categories: Vec<String> = table
            .iter()
            .filter(|r| ranked.iter().any(|e| e.model == r.model))
            .map(|r| r.disposition.clone())
            .collect();
        categories.sort();
        categories.dedup();

        let rows: Vec<CrossTabRow> = ranked
            .into_iter()
            .map(|entity| CrossTabRow {
                counts: categories
                    .iter()
                    .map(|category| table.quantity_of(&entity.model, category).unwrap_or(0.0))
                    .collect(),
                model: entity.model,
            })
            .collect();

        let max = rows
            .iter()
            .flat_map(|row| row.counts.iter().copied())
            .fold(0.0, f64::max);

        Self {
            categories,
            rows,
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRow {
    pub model: String,
    pub disposition: String,
    pub quantity: i64,
}

/// Every record, sorted by model then disposition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawTableView {
    pub rows: Vec<RawRow>,
}

impl RawTableView {
    #[must_use]
    pub fn from_table(table: &CleanedTable) -> Self {
        let mut rows: Vec<RawRow> = table
            .iter()
            .map(|r| RawRow {
                model: r.model.clone(),
                disposition: r.disposition.clone(),
                quantity: r.quantity.round() as i64,
            })
            .collect();
        rows.sort_by(|a, b| (&a.model, &a.disposition).cmp(&(&b.model, &b.disposition)));
        Self { rows }
    }
}

/// All four views of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetViews {
    pub title: String,
    pub total: f64,
    pub proportions: CategoryProportions,
    pub top_entities: TopEntities,
    pub cross_tab: CrossTab,
    pub raw: RawTableView,
}

impl SheetViews {
    /// Derive the views, or `None` if the table has no records.
    #[must_use]
    pub fn build(title: impl Into<String>, table: &CleanedTable) -> Option<Self> {
        if table.is_empty() {
            return None;
        }
        Some(Self {
            title: title.into(),
            total: table.total_quantity(),
            proportions: CategoryProportions::from_table(table),
            top_entities: TopEntities::from_table(table, TOP_ENTITIES),
            cross_tab: CrossTab::from_table(table, CROSS_TAB_ENTITIES),
            raw: RawTableView::from_table(table),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use returnboard_core::CleanedRecord;

    fn table(rows: &[(&str, &str, f64)]) -> CleanedTable {
        CleanedTable::from_records(
            rows.iter()
                .map(|(m, d, q)| CleanedRecord::new(*m, *d, *q))
                .collect(),
        )
    }

    #[test]
    fn test_proportions_sorted_and_rounded() {
        let t = table(&[
            ("A", "물량교환", 1.0),
            ("A", "단순변심", 1.0),
            ("B", "단순변심", 1.0),
        ]);
        let p = CategoryProportions::from_table(&t);

        assert!((p.total - 3.0).abs() < f64::EPSILON);
        assert_eq!(p.shares[0].category, "단순변심");
        assert!((p.shares[0].percent - 66.7).abs() < 1e-9);
        assert_eq!(p.shares[1].category, "물량교환");
        assert!((p.shares[1].percent - 33.3).abs() < 1e-9);
    }

    #[test]
    fn test_half_percentages_round_to_even() {
        let t = table(&[("A", "단순변심", 15.0), ("B", "물량교환", 1.0)]);
        let p = CategoryProportions::from_table(&t);

        let shares: Vec<(&str, f64)> = p
            .shares
            .iter()
            .map(|s| (s.category.as_str(), s.percent))
            .collect();
        assert_eq!(shares, vec![("단순변심", 93.8), ("물량교환", 6.2)]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let categories = [
            "단순변심",
            "수거하면할",
            "물량교환",
            "물량환불",
            "수거하면 할",
            "오배송환불",
            "오배송교환",
        ];
        let rows: Vec<(String, &str, f64)> = (0..40)
            .map(|i| (format!("M{i}"), categories[i % categories.len()], f64::from((i as u32 * 7) % 13 + 1)))
            .collect();
        let t = CleanedTable::from_records(
            rows.iter()
                .map(|(m, d, q)| CleanedRecord::new(m.as_str(), *d, *q))
                .collect(),
        );

        let p = CategoryProportions::from_table(&t);
        let sum: f64 = p.shares.iter().map(|s| s.percent).sum();
        let tolerance = 0.1 * p.shares.len() as f64;
        assert!((sum - 100.0).abs() <= tolerance, "sum was {sum}");
    }

    #[test]
    fn test_top_entities_limit_and_ties() {
        // 25 models; M5..M9 all tie on 50 and must keep input order
        let rows: Vec<(String, f64)> = (0..25)
            .map(|i| {
                let q = match i {
                    0..=4 => 100.0 - f64::from(i),
                    5..=9 => 50.0,
                    _ => 10.0,
                };
                (format!("M{i}"), q)
            })
            .rev()
            .collect();
        let t = CleanedTable::from_records(
            rows.iter()
                .map(|(m, q)| CleanedRecord::new(m.as_str(), "단순변심", *q))
                .collect(),
        );

        let top = TopEntities::from_table(&t, TOP_ENTITIES);
        let names: Vec<&str> = top.entities.iter().map(|e| e.model.as_str()).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(&names[..5], ["M0", "M1", "M2", "M3", "M4"]);
        // Input was reversed, so the tie group appears as M9..M5
        assert_eq!(&names[5..], ["M9", "M8", "M7", "M6", "M5"]);
        assert!(top
            .entities
            .windows(2)
            .all(|w| w[0].quantity >= w[1].quantity));
    }

    #[test]
    fn test_top_entities_sums_across_categories() {
        let t = table(&[("A", "단순변심", 1.0), ("B", "단순변심", 2.0), ("A", "물량교환", 2.0)]);
        let top = TopEntities::from_table(&t, 10);
        assert_eq!(
            top.entities,
            vec![
                EntityTotal { model: "A".into(), quantity: 3.0 },
                EntityTotal { model: "B".into(), quantity: 2.0 },
            ]
        );
    }

    #[test]
    fn test_cross_tab_pivot() {
        let t = table(&[
            ("A", "물량교환", 1.0),
            ("B", "단순변심", 5.0),
            ("A", "단순변심", 1.0),
            ("C", "오배송환불", 1.0),
        ]);
        let cross = CrossTab::from_table(&t, 2);

        assert_eq!(cross.categories, vec!["단순변심", "물량교환"]);
        assert_eq!(cross.rows.len(), 2);
        assert_eq!(cross.rows[0].model, "B");
        assert_eq!(cross.rows[0].counts, vec![5.0, 0.0]);
        assert_eq!(cross.rows[1].model, "A");
        assert_eq!(cross.rows[1].counts, vec![1.0, 1.0]);
        assert!((cross.max - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_raw_table_sorted() {
        let t = table(&[("B", "단순변심", 2.0), ("A", "물량교환", 1.0), ("A", "단순변심", 3.0)]);
        let raw = RawTableView::from_table(&t);
        let keys: Vec<(&str, &str, i64)> = raw
            .rows
            .iter()
            .map(|r| (r.model.as_str(), r.disposition.as_str(), r.quantity))
            .collect();
        assert_eq!(
            keys,
            vec![("A", "단순변심", 3), ("A", "물량교환", 1), ("B", "단순변심", 2)]
        );
    }

    #[test]
    fn test_empty_table_has_no_views() {
        assert!(SheetViews::build("1월", &CleanedTable::default()).is_none());
        let views = SheetViews::build("1월", &table(&[("A", "단순변심", 2.0)])).unwrap();
        assert_eq!(views.title, "1월");
        assert_eq!(views.raw.rows.len(), 1);
    }
}
