//! Canvas packing.
//!
//! The packer stacks cards vertically on the slides of one [`Section`]. It keeps a
//! [`Cursor`] `(slide, y)` that starts at `(section.start, section.top)` and only
//! moves forward:
//!
//! 1. look up the card footprint in the [`Catalog`] (specific overrides first)
//! 2. resolve the card image; a card without an image is skipped in place
//! 3. if the card would cross `max_y`, move to the top of the next slide; past
//!    `section.end` the section is exhausted and every remaining card is dropped
//! 4. place the image at `(start_x, y)` and its text boxes at their offsets
//! 5. advance `y` by the card height plus the section gap
//!
//! This is greedy first-fit in input order: cards are never reordered, and a slide
//! is never revisited once the cursor has left it. Every card gets a
//! [`CardOutcome`], so callers and tests can see exactly what happened to it.

use crate::catalog::Catalog;
use crate::condition::{ClassifiedCondition, ConditionName};
use crate::resolver::AssetSource;
use crate::section::{Cursor, Section};
use crate::styling::style_text;
use crate::ReportResult;
use lifestyle_deck::SlideDocument;
use lifestyle_types::{Frame, Severity};

/// What happened to one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    /// Image (and text boxes) placed on `slide` at `frame`.
    Placed { slide: usize, frame: Frame },
    /// The catalog has no footprint for this severity.
    SkippedNoLayout,
    /// No image matched the condition.
    SkippedMissingAsset,
    /// The section ran out of slides before this card.
    SkippedOverflow,
}

/// Outcome for one input card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReport {
    pub condition: ConditionName,
    pub severity: Severity,
    pub outcome: CardOutcome,
}

/// Result of packing one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub section: String,
    pub cards: Vec<CardReport>,
    /// Cursor after the last placed card; feed it to [`Packer::pack_from`] to
    /// continue in a following section.
    pub cursor: Cursor,
    /// Whether the section ran out of slides.
    pub exhausted: bool,
}

impl PackReport {
    pub fn placed(&self) -> usize {
        self.count(|o| matches!(o, CardOutcome::Placed { .. }))
    }

    pub fn missing_assets(&self) -> usize {
        self.count(|o| matches!(o, CardOutcome::SkippedMissingAsset))
    }

    pub fn missing_layouts(&self) -> usize {
        self.count(|o| matches!(o, CardOutcome::SkippedNoLayout))
    }

    pub fn overflowed(&self) -> usize {
        self.count(|o| matches!(o, CardOutcome::SkippedOverflow))
    }

    /// Distinct slides that received at least one card, in order.
    pub fn slides_used(&self) -> Vec<usize> {
        let mut slides: Vec<usize> = self
            .cards
            .iter()
            .filter_map(|c| match c.outcome {
                CardOutcome::Placed { slide, .. } => Some(slide),
                _ => None,
            })
            .collect();
        slides.dedup();
        slides
    }

    fn count(&self, pred: impl Fn(&CardOutcome) -> bool) -> usize {
        self.cards.iter().filter(|c| pred(&c.outcome)).count()
    }
}

/// Packs cards into one section.
pub struct Packer<'a, A: AssetSource + ?Sized> {
    section: &'a Section,
    catalog: &'a Catalog,
    assets: &'a A,
}

impl<'a, A: AssetSource + ?Sized> Packer<'a, A> {
    pub fn new(section: &'a Section, catalog: &'a Catalog, assets: &'a A) -> Self {
        Self {
            section,
            catalog,
            assets,
        }
    }

    /// Packs `cards` starting at the top of the section's first slide.
    ///
    /// # Errors
    ///
    /// See [`Packer::pack_from`].
    pub fn pack<D: SlideDocument + ?Sized>(
        &self,
        doc: &mut D,
        cards: &[ClassifiedCondition],
    ) -> ReportResult<PackReport> {
        self.pack_from(doc, cards, self.section.initial_cursor())
    }

    /// Packs `cards` starting at `cursor`.
    ///
    /// A cursor before the section (or above its top offset) is moved to the
    /// section's initial position; a cursor past the section's last slide drops
    /// every card as overflow.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if:
    /// - the section does not fit the document ([`Section::validate`])
    /// - a catalog footprint is taller than the section span
    ///   ([`ReportError::CardExceedsCanvas`](crate::ReportError::CardExceedsCanvas))
    /// - the document rejects a placement
    pub fn pack_from<D: SlideDocument + ?Sized>(
        &self,
        doc: &mut D,
        cards: &[ClassifiedCondition],
        cursor: Cursor,
    ) -> ReportResult<PackReport> {
        let section = self.section;
        section.validate(doc.slide_count())?;
        self.catalog.validate_for(section)?;

        let mut cursor = if cursor.slide < section.start {
            section.initial_cursor()
        } else {
            Cursor {
                slide: cursor.slide,
                y: cursor.y.max(section.top),
            }
        };
        let mut exhausted = cursor.slide > section.end;
        let mut reports = Vec::with_capacity(cards.len());

        for card in cards {
            let outcome = if exhausted {
                CardOutcome::SkippedOverflow
            } else {
                self.place(doc, card, &mut cursor, &mut exhausted)?
            };
            reports.push(CardReport {
                condition: card.condition.clone(),
                severity: card.severity,
                outcome,
            });
        }

        let report = PackReport {
            section: section.name.clone(),
            cards: reports,
            cursor,
            exhausted,
        };

        if report.overflowed() > 0 {
            tracing::warn!(
                "section {:?} ran out of slides ({}..={}); {} card(s) not placed",
                section.name,
                section.start,
                section.end,
                report.overflowed()
            );
        }
        tracing::info!(
            "section {:?}: placed {} of {} card(s) on slides {:?}",
            section.name,
            report.placed(),
            cards.len(),
            report.slides_used()
        );

        Ok(report)
    }

    fn place<D: SlideDocument + ?Sized>(
        &self,
        doc: &mut D,
        card: &ClassifiedCondition,
        cursor: &mut Cursor,
        exhausted: &mut bool,
    ) -> ReportResult<CardOutcome> {
        let section = self.section;
        let (condition, severity) = (&card.condition, card.severity);

        let Some(layout) = self.catalog.card(severity, condition) else {
            tracing::warn!("no card layout for {condition} ({severity})");
            return Ok(CardOutcome::SkippedNoLayout);
        };

        let Some(image) = self.assets.image(condition, severity) else {
            tracing::warn!("image not found for {condition} ({severity})");
            return Ok(CardOutcome::SkippedMissingAsset);
        };

        if cursor.y + layout.height > section.max_y {
            cursor.slide += 1;
            cursor.y = section.top;
            if cursor.slide > section.end {
                *exhausted = true;
                return Ok(CardOutcome::SkippedOverflow);
            }
        }

        let frame = Frame::new(section.start_x, cursor.y, layout.width, layout.height);
        doc.add_image(cursor.slide, frame, &image)?;

        for block in &layout.text_blocks {
            let text = self.assets.text(condition, severity, block.kind);
            if text.is_empty() {
                tracing::debug!("no {:?} text for {condition} ({severity})", block.kind);
            }
            let block_frame = Frame::new(
                frame.x + block.offset_x,
                frame.y + block.offset_y,
                block.width,
                block.height,
            );
            doc.add_textbox(
                cursor.slide,
                block_frame,
                style_text(&text, block.style, block.font_size_pt),
            )?;
        }

        tracing::debug!("placed {condition} ({severity}) on slide {} at {}", cursor.slide, cursor.y);
        cursor.y += layout.height + section.gap;

        Ok(CardOutcome::Placed {
            slide: cursor.slide,
            frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CardLayout, TextBlockLayout, TextKind, TextStyle, TierLayout};
    use lifestyle_deck::{Deck, ShapeContent, ShapeType};
    use lifestyle_types::Length;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn cm(value: f64) -> Length {
        Length::from_cm(value)
    }

    /// Fixture assets: every condition has an image unless listed as missing, and
    /// recommendations exist only for the listed conditions.
    #[derive(Default)]
    struct FixtureAssets {
        missing_images: HashSet<String>,
        recommendations: HashSet<String>,
    }

    impl AssetSource for FixtureAssets {
        fn image(&self, condition: &ConditionName, severity: Severity) -> Option<PathBuf> {
            if self.missing_images.contains(condition.as_str()) {
                None
            } else {
                Some(PathBuf::from(format!("{}/{}.png", severity.slug(), condition)))
            }
        }

        fn text(&self, condition: &ConditionName, _severity: Severity, kind: TextKind) -> String {
            match kind {
                TextKind::Recommendations if self.recommendations.contains(condition.as_str()) => {
                    format!("\u{2022} Advice for {condition}")
                }
                _ => String::new(),
            }
        }
    }

    fn section(start: usize, end: usize, top: f64, max_y: f64, gap: f64) -> Section {
        Section {
            name: "test".into(),
            start,
            end,
            start_x: cm(0.7),
            top: cm(top),
            max_y: cm(max_y),
            gap: cm(gap),
        }
    }

    fn image_only(height: f64) -> TierLayout {
        TierLayout {
            default: CardLayout {
                width: cm(19.43),
                height: cm(height),
                text_blocks: Vec::new(),
            },
            specific: None,
        }
    }

    fn card(name: &str, severity: Severity) -> ClassifiedCondition {
        ClassifiedCondition {
            severity,
            condition: ConditionName::normalise(name).unwrap(),
            is_concern: false,
        }
    }

    fn mild_cards(count: usize) -> Vec<ClassifiedCondition> {
        (0..count)
            .map(|i| card(&format!("Condition {i}"), Severity::Mild))
            .collect()
    }

    fn placements(report: &PackReport) -> Vec<(usize, Length)> {
        report
            .cards
            .iter()
            .filter_map(|c| match c.outcome {
                CardOutcome::Placed { slide, frame } => Some((slide, frame.y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn three_cards_fit_on_one_slide() {
        let mut deck = Deck::with_blank_slides(3);
        let section = section(0, 2, 4.5, 27.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets::default();

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &mild_cards(3))
            .unwrap();

        assert_eq!(
            placements(&report),
            vec![(0, cm(4.5)), (0, cm(10.0)), (0, cm(15.5))]
        );
        assert_eq!(report.cursor, Cursor { slide: 0, y: cm(21.0) });
        assert!(!report.exhausted);
        assert_eq!(deck.shapes(0).unwrap().len(), 3);
    }

    #[test]
    fn third_card_overflows_to_next_slide_top() {
        let mut deck = Deck::with_blank_slides(3);
        let section = section(0, 2, 4.5, 15.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets::default();

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &mild_cards(3))
            .unwrap();

        assert_eq!(
            placements(&report),
            vec![(0, cm(4.5)), (0, cm(10.0)), (1, cm(4.5))]
        );
        assert_eq!(report.slides_used(), vec![0, 1]);
    }

    #[test]
    fn slide_count_matches_greedy_first_fit() {
        let heights = [7.0, 9.35, 5.0, 7.0, 9.35, 9.35, 5.0, 7.0, 5.0, 5.0];
        let tiers = [
            Severity::Moderate,
            Severity::ModerateToHigh,
            Severity::Low,
            Severity::Moderate,
            Severity::ModerateToHigh,
            Severity::ModerateToHigh,
            Severity::Low,
            Severity::Moderate,
            Severity::Low,
            Severity::Low,
        ];
        let (top, max_y, gap) = (4.5, 27.0, 0.5);

        let mut deck = Deck::with_blank_slides(10);
        let section = section(0, 9, top, max_y, gap);
        let catalog = Catalog::new([
            (Severity::ModerateToHigh, image_only(9.35)),
            (Severity::Moderate, image_only(7.0)),
            (Severity::Low, image_only(5.0)),
        ]);
        let cards: Vec<_> = tiers
            .iter()
            .enumerate()
            .map(|(i, t)| card(&format!("C{i}"), *t))
            .collect();
        let assets = FixtureAssets::default();

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &cards)
            .unwrap();

        // Reference greedy count in EMU.
        let (top, max_y, gap) = (cm(top), cm(max_y), cm(gap));
        let mut slides = 1;
        let mut y = top;
        for h in heights.iter().map(|h| cm(*h)) {
            if y + h > max_y {
                slides += 1;
                y = top;
            }
            y += h + gap;
        }

        assert_eq!(report.placed(), heights.len());
        assert_eq!(report.slides_used().len(), slides);
        assert_eq!(report.slides_used(), (0..slides).collect::<Vec<_>>());
    }

    #[test]
    fn no_card_crosses_the_bottom_bound() {
        let mut deck = Deck::with_blank_slides(6);
        let section = section(1, 5, 4.5, 27.0, 0.5);
        let catalog = Catalog::new([
            (Severity::ModerateToHigh, image_only(9.35)),
            (Severity::Mild, image_only(7.0)),
        ]);
        let mut cards = mild_cards(5);
        cards.insert(1, card("Stroke", Severity::ModerateToHigh));
        cards.insert(3, card("Obesity", Severity::ModerateToHigh));
        let assets = FixtureAssets::default();

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &cards)
            .unwrap();

        for c in &report.cards {
            let CardOutcome::Placed { slide, frame } = c.outcome else {
                panic!("every card should fit");
            };
            assert!((1..=5).contains(&slide));
            assert!(frame.y >= cm(4.5));
            assert!(frame.bottom() <= cm(27.0));
        }
    }

    #[test]
    fn exhausted_section_drops_remaining_cards() {
        let mut deck = Deck::with_blank_slides(4);
        let section = section(2, 3, 4.5, 15.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets::default();

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &mild_cards(6))
            .unwrap();

        assert_eq!(report.placed(), 4);
        assert_eq!(report.overflowed(), 2);
        assert!(report.exhausted);
        assert!(matches!(report.cards[4].outcome, CardOutcome::SkippedOverflow));
        assert!(matches!(report.cards[5].outcome, CardOutcome::SkippedOverflow));
        assert!(deck.shapes(0).unwrap().is_empty());
        assert!(deck.shapes(1).unwrap().is_empty());
    }

    #[test]
    fn missing_image_skips_card_without_consuming_space() {
        let mut deck = Deck::with_blank_slides(1);
        let section = section(0, 0, 4.5, 27.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets {
            missing_images: ["Condition_1".to_string()].into_iter().collect(),
            ..FixtureAssets::default()
        };

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &mild_cards(3))
            .unwrap();

        assert_eq!(report.missing_assets(), 1);
        assert_eq!(placements(&report), vec![(0, cm(4.5)), (0, cm(10.0))]);
    }

    #[test]
    fn tier_without_layout_is_skipped() {
        let mut deck = Deck::with_blank_slides(1);
        let section = section(0, 0, 4.5, 27.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets::default();

        let report = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &[card("Thyroid", Severity::Low), card("Gout", Severity::Mild)])
            .unwrap();

        assert_eq!(report.cards[0].outcome, CardOutcome::SkippedNoLayout);
        assert_eq!(report.missing_layouts(), 1);
        assert_eq!(placements(&report), vec![(0, cm(4.5))]);
    }

    #[test]
    fn text_blocks_follow_card_origin_and_absent_text_stays_empty() {
        let mut deck = Deck::with_blank_slides(1);
        let section = section(0, 0, 9.0, 27.0, 1.0);
        let catalog = Catalog::new([(
            Severity::Mild,
            TierLayout {
                default: CardLayout {
                    width: cm(19.16),
                    height: cm(5.25),
                    text_blocks: vec![TextBlockLayout {
                        kind: TextKind::Recommendations,
                        offset_x: cm(2.6),
                        offset_y: cm(1.0),
                        width: cm(16.09),
                        height: cm(3.8),
                        font_size_pt: 11.0,
                        style: TextStyle::Plain,
                    }],
                },
                specific: None,
            },
        )]);
        let assets = FixtureAssets {
            recommendations: ["Diabetes".to_string()].into_iter().collect(),
            ..FixtureAssets::default()
        };

        let report = Packer::new(&section, &catalog, &assets)
            .pack(
                &mut deck,
                &[card("Diabetes", Severity::Mild), card("Thyroid", Severity::Mild)],
            )
            .unwrap();
        assert_eq!(report.placed(), 2);

        let shapes = &deck.slide(0).unwrap().shapes;
        assert_eq!(shapes.len(), 4);

        assert_eq!(shapes[1].frame, Frame::from_cm(3.3, 10.0, 16.09, 3.8));
        let ShapeContent::TextBox { text } = &shapes[1].content else {
            panic!("expected text box");
        };
        assert_eq!(text.plain_text(), "\u{2022} Advice for Diabetes");

        // Second card: image still placed, recommendation block empty.
        assert!(matches!(shapes[2].content, ShapeContent::Picture { .. }));
        assert_eq!(shapes[2].frame.y, cm(15.25));
        let ShapeContent::TextBox { text } = &shapes[3].content else {
            panic!("expected text box");
        };
        assert!(text.is_empty());
        assert_eq!(
            deck.shapes(0)
                .unwrap()
                .iter()
                .filter(|s| s.kind == ShapeType::TextBox)
                .count(),
            2
        );
    }

    #[test]
    fn cursor_can_continue_into_next_section() {
        let mut deck = Deck::with_blank_slides(4);
        let first = section(0, 1, 4.5, 15.0, 0.5);
        let second = section(0, 3, 4.5, 15.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets::default();

        let report = Packer::new(&first, &catalog, &assets)
            .pack(&mut deck, &mild_cards(3))
            .unwrap();
        assert_eq!(report.cursor, Cursor { slide: 1, y: cm(10.0) });

        let next = Packer::new(&second, &catalog, &assets)
            .pack_from(&mut deck, &mild_cards(2), report.cursor)
            .unwrap();
        assert_eq!(placements(&next), vec![(1, cm(10.0)), (2, cm(4.5))]);
    }

    #[test]
    fn oversized_footprint_fails_before_placing_anything() {
        let mut deck = Deck::with_blank_slides(2);
        let section = section(0, 1, 4.5, 10.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(6.0))]);
        let assets = FixtureAssets::default();

        let err = Packer::new(&section, &catalog, &assets)
            .pack(&mut deck, &mild_cards(1))
            .unwrap_err();
        assert!(matches!(err, crate::ReportError::CardExceedsCanvas { .. }));
        assert!(deck.shapes(0).unwrap().is_empty());
    }

    #[test]
    fn section_past_deck_end_is_rejected() {
        let mut deck = Deck::with_blank_slides(2);
        let section = section(0, 5, 4.5, 27.0, 0.5);
        let catalog = Catalog::new([(Severity::Mild, image_only(5.0))]);
        let assets = FixtureAssets::default();

        assert!(matches!(
            Packer::new(&section, &catalog, &assets).pack(&mut deck, &mild_cards(1)),
            Err(crate::ReportError::SectionOutOfRange { .. })
        ));
    }
}
