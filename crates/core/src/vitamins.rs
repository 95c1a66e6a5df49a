//! Vitamin risk tables.
//!
//! The vitamin sheet lists conditions with a risk level (1 to 3) and the gene
//! variants behind them. Each level has three text boxes on the vitamin slide: two
//! bullet boxes of conditions (the second takes whatever does not fit the first)
//! and one box of genes wrapped a fixed number per line.

use crate::constants::{
    BULLET_GLYPH, VITAMIN_CONDITION_COLUMN, VITAMIN_GENE_COLUMNS, VITAMIN_RISK_COLUMN,
};
use crate::styling::lines_with_font;
use crate::table::Table;
use crate::{ReportError, ReportResult};
use lifestyle_deck::SlideDocument;
use lifestyle_types::{Font, Frame, Length};
use std::collections::{BTreeMap, BTreeSet};

/// A fixed text box position.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoxLayout {
    pub left: Length,
    pub top: Length,
    pub width: Length,
    pub height: Length,
}

impl BoxLayout {
    fn frame(&self) -> Frame {
        Frame::new(self.left, self.top, self.width, self.height)
    }
}

/// The three boxes of one risk level.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskLevelLayout {
    pub risk: u8,
    pub conditions: BoxLayout,
    pub overflow: BoxLayout,
    pub genes: BoxLayout,
    pub genes_per_line: usize,
}

/// Geometry of the vitamin slide.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VitaminLayout {
    pub slide: usize,
    pub levels: Vec<RiskLevelLayout>,
    /// Height budgeted per condition line.
    pub line_height: Length,
    /// Height available in the first condition box.
    pub first_box_capacity: Length,
    pub condition_font_size_pt: f32,
    pub gene_font_size_pt: f32,
}

impl Default for VitaminLayout {
    fn default() -> Self {
        // (height, width, top, left), as the template's boxes are measured.
        let b = |height: f64, width: f64, top: f64, left: f64| BoxLayout {
            left: Length::from_cm(left),
            top: Length::from_cm(top),
            width: Length::from_cm(width),
            height: Length::from_cm(height),
        };

        Self {
            slide: 41,
            levels: vec![
                RiskLevelLayout {
                    risk: 3,
                    conditions: b(5.0, 2.3, 5.1, 7.1),
                    overflow: b(5.0, 2.3, 5.1, 9.2),
                    genes: b(5.0, 6.0, 5.1, 12.55),
                    genes_per_line: 3,
                },
                RiskLevelLayout {
                    risk: 2,
                    conditions: b(5.0, 2.5, 12.8, 8.67),
                    overflow: b(5.0, 2.5, 12.8, 12.8),
                    genes: b(5.0, 3.4, 12.8, 15.5),
                    genes_per_line: 2,
                },
                RiskLevelLayout {
                    risk: 1,
                    conditions: b(5.0, 2.5, 20.5, 7.01),
                    overflow: b(5.0, 2.5, 20.5, 10.8),
                    genes: b(5.0, 3.8, 20.5, 14.8),
                    genes_per_line: 2,
                },
            ],
            line_height: Length::from_cm(0.5),
            first_box_capacity: Length::from_cm(5.0),
            condition_font_size_pt: 11.0,
            gene_font_size_pt: 9.0,
        }
    }
}

/// Conditions and genes of one risk level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskGroup {
    pub conditions: Vec<String>,
    pub genes: BTreeSet<String>,
}

/// Vitamin sheet contents grouped by risk level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitaminRisks {
    groups: BTreeMap<u8, RiskGroup>,
}

impl VitaminRisks {
    /// Groups the rows of a vitamin sheet by risk level.
    ///
    /// Rows whose risk is not an integer from 1 to 3 are ignored. Conditions keep
    /// row order; genes are split on `,`, trimmed and de-duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if the risk or condition column is
    /// missing.
    pub fn from_table(table: &Table) -> ReportResult<Self> {
        for column in [VITAMIN_RISK_COLUMN, VITAMIN_CONDITION_COLUMN] {
            if table.column(column).is_none() {
                return Err(ReportError::InvalidInput(format!(
                    "vitamin sheet has no {column:?} column"
                )));
            }
        }

        let mut groups: BTreeMap<u8, RiskGroup> = BTreeMap::new();
        for row in table.rows() {
            let Some(risk) = row.get(VITAMIN_RISK_COLUMN).and_then(parse_risk) else {
                continue;
            };
            let group = groups.entry(risk).or_default();

            if let Some(condition) = row
                .get(VITAMIN_CONDITION_COLUMN)
                .map(str::trim)
                .filter(|c| !c.is_empty())
            {
                group.conditions.push(condition.to_string());
            }

            for column in VITAMIN_GENE_COLUMNS {
                let genes = row.get(column).unwrap_or_default();
                group.genes.extend(
                    genes
                        .split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string),
                );
            }
        }

        Ok(Self { groups })
    }

    pub fn group(&self, risk: u8) -> Option<&RiskGroup> {
        self.groups.get(&risk)
    }
}

fn parse_risk(cell: &str) -> Option<u8> {
    let value: f64 = cell.trim().parse().ok()?;
    if value.fract() != 0.0 || !(1.0..=3.0).contains(&value) {
        return None;
    }
    Some(value as u8)
}

/// Splits `items` between the first box (as many lines as fit `capacity`) and
/// the overflow box.
pub fn split_by_capacity<T: Clone>(
    items: &[T],
    line_height: Length,
    capacity: Length,
) -> (Vec<T>, Vec<T>) {
    let fits = if line_height.emu() <= 0 {
        items.len()
    } else {
        usize::try_from(capacity.emu() / line_height.emu()).unwrap_or(0)
    };
    let at = fits.min(items.len());
    (items[..at].to_vec(), items[at..].to_vec())
}

/// Joins `items` with `", "`, `per_line` to a line.
pub fn wrap_items<S: AsRef<str>>(items: &[S], per_line: usize) -> Vec<String> {
    items
        .chunks(per_line.max(1))
        .map(|chunk| {
            chunk
                .iter()
                .map(|item| item.as_ref())
                .collect::<Vec<&str>>()
                .join(", ")
        })
        .collect()
}

/// Adds the three text boxes of every configured risk level.
///
/// Levels without rows still get their (empty) boxes, so the slide layout stays
/// uniform.
///
/// # Returns
///
/// The number of text boxes added.
///
/// # Errors
///
/// Returns a deck error if the configured slide does not exist.
pub fn place_vitamin_tables<D: SlideDocument + ?Sized>(
    doc: &mut D,
    layout: &VitaminLayout,
    risks: &VitaminRisks,
) -> ReportResult<usize> {
    let empty = RiskGroup::default();
    let condition_font = Font::arial(layout.condition_font_size_pt).bold(true);
    let gene_font = Font::arial(layout.gene_font_size_pt).bold(true).italic(true);
    let mut added = 0;

    for level in &layout.levels {
        let group = risks.group(level.risk).unwrap_or(&empty);
        let (first, rest) =
            split_by_capacity(&group.conditions, layout.line_height, layout.first_box_capacity);
        let genes: Vec<&String> = group.genes.iter().collect();

        let boxes = [
            (level.conditions, lines_with_font(bullets(&first), &condition_font)),
            (level.overflow, lines_with_font(bullets(&rest), &condition_font)),
            (
                level.genes,
                lines_with_font(wrap_items(&genes, level.genes_per_line), &gene_font),
            ),
        ];
        for (layout_box, text) in boxes {
            doc.add_textbox(layout.slide, layout_box.frame(), text)?;
            added += 1;
        }

        tracing::debug!(
            "risk {}: {} condition(s), {} gene(s)",
            level.risk,
            group.conditions.len(),
            group.genes.len()
        );
    }

    Ok(added)
}

fn bullets(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{BULLET_GLYPH} {item}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifestyle_deck::{Deck, ShapeContent};

    fn sheet() -> Table {
        Table::from_rows(
            ["Risk", "Condition", "HOM_DAM", "HOM_TOL", "HET_DAM"],
            vec![
                vec!["3", "Vitamin D deficiency", "VDR, GC", "", "CYP2R1"],
                vec!["3", "Vitamin B12 deficiency", "FUT2", "GC", ""],
                vec!["2", "Folate deficiency", "MTHFR", "", ""],
                vec!["1.0", "Vitamin A deficiency", "", "BCMO1 ,", ""],
                vec!["4", "Out of range", "XYZ", "", ""],
                vec!["", "No risk", "", "", ""],
            ],
        )
    }

    #[test]
    fn groups_rows_by_risk_level() {
        let risks = VitaminRisks::from_table(&sheet()).unwrap();

        let high = risks.group(3).unwrap();
        assert_eq!(
            high.conditions,
            vec!["Vitamin D deficiency", "Vitamin B12 deficiency"]
        );
        assert_eq!(
            high.genes.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["CYP2R1", "FUT2", "GC", "VDR"]
        );
        assert_eq!(
            risks.group(1).unwrap().genes.iter().collect::<Vec<_>>(),
            vec!["BCMO1"]
        );
        assert!(risks.group(4).is_none());
    }

    #[test]
    fn missing_risk_column_is_invalid() {
        let table = Table::from_rows(["Condition"], vec![vec!["Anything"]]);
        assert!(matches!(
            VitaminRisks::from_table(&table),
            Err(ReportError::InvalidInput(_))
        ));
    }

    #[test]
    fn first_box_holds_ten_half_centimetre_lines() {
        let items: Vec<u32> = (0..13).collect();
        let (first, rest) =
            split_by_capacity(&items, Length::from_cm(0.5), Length::from_cm(5.0));
        assert_eq!(first.len(), 10);
        assert_eq!(rest, vec![10, 11, 12]);

        let (first, rest) = split_by_capacity(&items[..4], Length::from_cm(0.5), Length::from_cm(5.0));
        assert_eq!(first.len(), 4);
        assert!(rest.is_empty());
    }

    #[test]
    fn genes_wrap_per_line() {
        let genes = ["A", "B", "C", "D", "E"];
        assert_eq!(wrap_items(&genes, 3), vec!["A, B, C", "D, E"]);
        assert_eq!(wrap_items(&genes, 2), vec!["A, B", "C, D", "E"]);
        assert!(wrap_items::<&str>(&[], 2).is_empty());
    }

    #[test]
    fn places_three_boxes_per_level() {
        let mut deck = Deck::with_blank_slides(42);
        let risks = VitaminRisks::from_table(&sheet()).unwrap();

        let added = place_vitamin_tables(&mut deck, &VitaminLayout::default(), &risks).unwrap();
        assert_eq!(added, 9);

        let shapes = &deck.slide(41).unwrap().shapes;
        assert_eq!(shapes.len(), 9);
        assert_eq!(shapes[0].frame, Frame::from_cm(7.1, 5.1, 2.3, 5.0));

        let ShapeContent::TextBox { text } = &shapes[0].content else {
            panic!("expected text box");
        };
        assert_eq!(
            text.plain_text(),
            "\u{2022} Vitamin D deficiency\n\u{2022} Vitamin B12 deficiency"
        );
        assert!(text.paragraphs[0].runs[0].font.bold);

        let ShapeContent::TextBox { text } = &shapes[2].content else {
            panic!("expected text box");
        };
        assert_eq!(text.plain_text(), "CYP2R1, FUT2, GC\nVDR");
        assert!(text.paragraphs[0].runs[0].font.italic);
        assert_eq!(text.paragraphs[0].runs[0].font.size_pt, 9.0);
    }
}
