//! The line-item refiner: a single forward pass with one-item
//! lookahead over the extractor's candidate items.
//!
//! The pass never fails. Unparseable numerics degrade to defaults
//! (quantity 1, price 0), illegible names degrade to a placeholder or
//! cause the item to be dropped. A text-only line with no price that
//! sits directly above a price-only line is the common OCR
//! fragmentation pattern (one logical record split across two printed
//! lines); the fusion rule repairs it by pairing the name with the
//! next line's numbers.

use crate::ingest::{numeric_opt, text_of, RawExtraction, RawLineItem};
use crate::models::{Additional, AdditionalKind, LineItem, ReceiptAnalysis, ReceiptMetadata};
use tracing::debug;

/// Sentinel description for a priced item whose name was illegible.
/// Downstream UIs show it as an editable "write the name" field.
pub const PLACEHOLDER_NAME: &str = "Escribir nombre...";

/// What a refinement pass did to the candidate items, counted as the
/// pass runs. Each fusion consumes one successor, so
/// `input_items == kept + fused_items + dropped_items` where `kept`
/// is the length of the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineStats {
    /// Candidate items in the raw payload.
    pub input_items: usize,
    /// Fusion merges performed (successor lines consumed).
    pub fused_items: usize,
    /// Candidates dropped as garbage.
    pub dropped_items: usize,
}

/// Refine candidate items using the default placeholder name.
pub fn refine(items: &[RawLineItem]) -> Vec<LineItem> {
    refine_with_placeholder(items, PLACEHOLDER_NAME)
}

/// Refine candidate items into clean purchasable line items.
pub fn refine_with_placeholder(items: &[RawLineItem], placeholder: &str) -> Vec<LineItem> {
    refine_with_stats(items, placeholder).0
}

/// Refine candidate items, also reporting what happened to them.
///
/// Processes items in order and may consume two items per step
/// (current + lookahead). Surviving items are never reordered. The
/// lookahead window is exactly one item: a merged successor is
/// consumed unconditionally and never re-evaluated on its own, and a
/// merged item never becomes the source of another merge.
pub fn refine_with_stats(
    items: &[RawLineItem],
    placeholder: &str,
) -> (Vec<LineItem>, RefineStats) {
    let mut refined = Vec::with_capacity(items.len());
    let mut stats = RefineStats {
        input_items: items.len(),
        ..RefineStats::default()
    };
    let mut i = 0;

    while i < items.len() {
        let current = &items[i];
        let quantity = current.quantity();
        let price = current.unit_price();
        let mut clean_name = strip_numerics(&current.description());

        // A priced item with no legible name is kept for manual entry.
        if clean_name.is_empty() && price > 0.0 {
            clean_name = placeholder.to_string();
        }

        // Fusion: name-only line directly above a price-only line.
        if let Some(next) = items.get(i + 1) {
            let next_price = next.unit_price();
            let current_is_text = clean_name.chars().nth(1).is_some() && clean_name != placeholder;
            let current_no_price = price == 0.0;
            let next_is_numeric_only = strip_numerics(&next.description()).is_empty();

            if current_is_text && current_no_price && (next_price > 0.0 || next_is_numeric_only) {
                debug!(name = %clean_name, price = next_price, "fused split line item");
                refined.push(LineItem {
                    descripcion: clean_name,
                    cantidad: next.quantity(),
                    valor_unitario: next_price,
                });
                stats.fused_items += 1;
                i += 2;
                continue;
            }
        }

        // Garbage: neither a usable name nor a usable price.
        if (clean_name.is_empty() || clean_name == placeholder) && price == 0.0 {
            debug!(index = i, "dropped candidate with no name and no price");
            stats.dropped_items += 1;
            i += 1;
            continue;
        }

        refined.push(LineItem {
            descripcion: clean_name,
            cantidad: quantity,
            valor_unitario: price,
        });
        i += 1;
    }

    (refined, stats)
}

/// Refine a whole extraction payload.
pub fn refine_extraction(raw: &RawExtraction, placeholder: &str) -> ReceiptAnalysis {
    refine_extraction_with_stats(raw, placeholder).0
}

/// Refine a whole extraction payload, also reporting the pass counts.
///
/// Section A goes through the refiner; section B additionals and the
/// receipt metadata only get their loose fields coerced and pass
/// through otherwise untouched.
pub fn refine_extraction_with_stats(
    raw: &RawExtraction,
    placeholder: &str,
) -> (ReceiptAnalysis, RefineStats) {
    let (items, stats) = refine_with_stats(&raw.section_a_items, placeholder);

    let additionals = raw
        .section_b_additionals
        .iter()
        .map(|a| Additional {
            kind: AdditionalKind::from_label(&text_of(a.kind.as_ref())),
            descripcion: text_of(a.descripcion.as_ref()),
            valor: numeric_opt(a.valor.as_ref()).unwrap_or(0.0),
        })
        .collect();

    let comercio = {
        let name = text_of(raw.metadata.comercio.as_ref());
        if name.trim().is_empty() {
            None
        } else {
            Some(name)
        }
    };

    let analysis = ReceiptAnalysis {
        section_a_items: items,
        section_b_additionals: additionals,
        metadata: ReceiptMetadata {
            comercio,
            total_pagado: numeric_opt(raw.metadata.total_pagado.as_ref()),
        },
    };
    (analysis, stats)
}

/// Strip every digit and `$` from a description, then trim the stray
/// leading/trailing punctuation a removed number leaves behind
/// (whitespace, periods, hyphens, commas).
///
/// The removal is blunt and locale-unaware on purpose: no attempt is
/// made to tell a digit inside a word from a stray price fragment,
/// and other currency glyphs survive untouched.
fn strip_numerics(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !c.is_ascii_digit() && *c != '$')
        .collect();

    stripped
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '-' | ','))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw(descripcion: Value, cantidad: Value, valor_unitario: Value) -> RawLineItem {
        serde_json::from_value(json!({
            "descripcion": descripcion,
            "cantidad": cantidad,
            "valor_unitario": valor_unitario,
        }))
        .unwrap()
    }

    #[test]
    fn test_strip_numerics_removes_digits_and_dollar() {
        assert_eq!(strip_numerics("Leche 3500"), "Leche");
        assert_eq!(strip_numerics("$12.000"), "");
        assert_eq!(strip_numerics("2x Pan $500"), "x Pan");
    }

    #[test]
    fn test_strip_numerics_trims_stray_punctuation() {
        assert_eq!(strip_numerics("Cafe 12.50"), "Cafe");
        assert_eq!(strip_numerics("- Gaseosa -"), "Gaseosa");
        assert_eq!(strip_numerics("...Arroz 2..."), "Arroz");
    }

    #[test]
    fn test_strip_numerics_keeps_other_currency_glyphs() {
        // Only `$` is stripped; other symbols survive.
        assert_eq!(strip_numerics("Te €3"), "Te €");
    }

    #[test]
    fn test_strip_numerics_erases_decimal_noise() {
        assert_eq!(strip_numerics("9,00 9,00"), "");
        assert_eq!(strip_numerics("1.500,00"), "");
    }

    // Scenario: name with trailing price fragment, no fusion partner.
    #[test]
    fn test_keeps_named_item_with_zero_price() {
        let items = vec![raw(json!("Leche 3500"), json!(1), json!(0))];
        let refined = refine(&items);
        assert_eq!(
            refined,
            vec![LineItem {
                descripcion: "Leche".to_string(),
                cantidad: 1.0,
                valor_unitario: 0.0,
            }]
        );
    }

    // Scenario: name-only line fused with the price line below it.
    #[test]
    fn test_fuses_name_line_with_price_line() {
        let items = vec![
            raw(json!("Pan"), json!(1), json!(0)),
            raw(json!("2500"), json!(2), json!(2500)),
        ];
        let refined = refine(&items);
        assert_eq!(
            refined,
            vec![LineItem {
                descripcion: "Pan".to_string(),
                cantidad: 2.0,
                valor_unitario: 2500.0,
            }]
        );
    }

    // Scenario: numeric noise line with no price is dropped.
    #[test]
    fn test_drops_numeric_noise_line() {
        let items = vec![raw(json!("9,00 9,00"), json!(1), json!(0))];
        assert!(refine(&items).is_empty());
    }

    #[test]
    fn test_drops_pure_digit_line() {
        let items = vec![raw(json!("12.000"), json!(1), json!(0))];
        assert!(refine(&items).is_empty());
    }

    // Scenario: priced item with illegible name gets the placeholder.
    #[test]
    fn test_placeholder_for_priced_item_without_name() {
        let items = vec![raw(json!(""), json!(1), json!(1500))];
        let refined = refine(&items);
        assert_eq!(
            refined,
            vec![LineItem {
                descripcion: PLACEHOLDER_NAME.to_string(),
                cantidad: 1.0,
                valor_unitario: 1500.0,
            }]
        );
    }

    // Scenario: trailing name-only item has no lookahead, still kept.
    #[test]
    fn test_trailing_text_only_item_is_kept() {
        let items = vec![
            raw(json!("Pan"), json!(1), json!(2500)),
            raw(json!("Gaseosa"), json!(1), json!(0)),
        ];
        let refined = refine(&items);
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[1].descripcion, "Gaseosa");
        assert_eq!(refined[1].valor_unitario, 0.0);
    }

    #[test]
    fn test_fusion_consumes_lookahead_unconditionally() {
        // The middle item would survive on its own (placeholder path),
        // but the merge consumes it and it is never re-evaluated.
        let items = vec![
            raw(json!("Pan"), json!(1), json!(0)),
            raw(json!(""), json!(3), json!(2500)),
            raw(json!("Leche"), json!(1), json!(3500)),
        ];
        let refined = refine(&items);
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[0].descripcion, "Pan");
        assert_eq!(refined[0].cantidad, 3.0);
        assert_eq!(refined[0].valor_unitario, 2500.0);
        assert_eq!(refined[1].descripcion, "Leche");
    }

    #[test]
    fn test_no_chained_fusion() {
        // "Pan" merges with the first number line; the second number
        // line is then evaluated on its own and dropped (no price, no
        // name) rather than merged into anything.
        let items = vec![
            raw(json!("Pan"), json!(1), json!(0)),
            raw(json!("2500"), json!(1), json!(2500)),
            raw(json!("1800"), json!(1), json!(0)),
        ];
        let refined = refine(&items);
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].descripcion, "Pan");
    }

    #[test]
    fn test_placeholder_is_not_a_fusion_source() {
        // First item has a price so it takes the placeholder, which
        // counts as "no name": it must not merge with the next line.
        let items = vec![
            raw(json!("$"), json!(1), json!(100)),
            raw(json!("2500"), json!(1), json!(2500)),
        ];
        let refined = refine(&items);
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[0].descripcion, PLACEHOLDER_NAME);
        assert_eq!(refined[0].valor_unitario, 100.0);
        assert_eq!(refined[1].descripcion, PLACEHOLDER_NAME);
        assert_eq!(refined[1].valor_unitario, 2500.0);
    }

    #[test]
    fn test_single_char_name_does_not_fuse() {
        // currentIsText requires a stripped name longer than one char.
        let items = vec![
            raw(json!("X"), json!(1), json!(0)),
            raw(json!("2500"), json!(1), json!(2500)),
        ];
        let refined = refine(&items);
        // "X" is kept as its own zero-priced item; the number line
        // keeps its price under the placeholder.
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[0].descripcion, "X");
        assert_eq!(refined[0].valor_unitario, 0.0);
        assert_eq!(refined[1].descripcion, PLACEHOLDER_NAME);
    }

    #[test]
    fn test_fusion_with_unpriced_numeric_successor() {
        // nextIsNumericOnly alone is enough to trigger the merge, even
        // when the successor's price parses to 0.
        let items = vec![
            raw(json!("Queso"), json!(1), json!(0)),
            raw(json!("4500"), json!(2), json!(0)),
        ];
        let refined = refine(&items);
        assert_eq!(
            refined,
            vec![LineItem {
                descripcion: "Queso".to_string(),
                cantidad: 2.0,
                valor_unitario: 0.0,
            }]
        );
    }

    #[test]
    fn test_priced_current_never_fuses() {
        let items = vec![
            raw(json!("Pan"), json!(1), json!(1200)),
            raw(json!("2500"), json!(1), json!(2500)),
        ];
        let refined = refine(&items);
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[0].valor_unitario, 1200.0);
    }

    #[test]
    fn test_malformed_numerics_degrade_to_defaults() {
        let items = vec![raw(json!("Arroz"), json!("dos"), json!({"oops": 1}))];
        let refined = refine(&items);
        assert_eq!(
            refined,
            vec![LineItem {
                descripcion: "Arroz".to_string(),
                cantidad: 1.0,
                valor_unitario: 0.0,
            }]
        );
    }

    #[test]
    fn test_output_names_have_no_digits_or_dollar() {
        let items = vec![
            raw(json!("Leche 3500"), json!(1), json!(3500)),
            raw(json!("$ Cafe 2x1"), json!(1), json!(800)),
            raw(json!(""), json!(1), json!(100)),
            raw(json!("450"), json!(1), json!(450)),
        ];
        for item in refine(&items) {
            assert!(!item.descripcion.is_empty());
            assert!(!item.descripcion.contains(|c: char| c.is_ascii_digit()));
            assert!(!item.descripcion.contains('$'));
        }
    }

    #[test]
    fn test_output_length_never_exceeds_input() {
        let items = vec![
            raw(json!("Pan"), json!(1), json!(0)),
            raw(json!("2500"), json!(1), json!(2500)),
            raw(json!("..."), json!(1), json!(0)),
            raw(json!("Leche"), json!(1), json!(3500)),
        ];
        assert!(refine(&items).len() <= items.len());
    }

    #[test]
    fn test_fusion_absorbs_priced_text_successor() {
        // nextHasPrice alone triggers the merge, even when the next
        // line has its own legible name. The successor's name is lost.
        let items = vec![
            raw(json!("Leche"), json!(1), json!(0)),
            raw(json!("Pan"), json!(3), json!(2500)),
        ];
        let refined = refine(&items);
        assert_eq!(
            refined,
            vec![LineItem {
                descripcion: "Leche".to_string(),
                cantidad: 3.0,
                valor_unitario: 2500.0,
            }]
        );
    }

    #[test]
    fn test_refine_is_idempotent_on_its_own_output() {
        // The zero-priced named item sits last so the output contains
        // no zero-price/priced adjacency that could fuse again.
        let items = vec![
            raw(json!("Pan"), json!(1), json!(0)),
            raw(json!("2500"), json!(2), json!(2500)),
            raw(json!("12.000"), json!(1), json!(0)),
            raw(json!("Leche 3500"), json!(1), json!(0)),
        ];
        let first = refine(&items);
        assert_eq!(first.len(), 2);

        // Feed the refined items back through as raw candidates.
        let round_trip: Vec<RawLineItem> = first
            .iter()
            .map(|item| {
                raw(
                    json!(item.descripcion),
                    json!(item.cantidad),
                    json!(item.valor_unitario),
                )
            })
            .collect();

        assert_eq!(refine(&round_trip), first);
    }

    #[test]
    fn test_stats_distinguish_fusions_from_drops() {
        // One merge (Pan + 2500), one garbage drop (12.000), two
        // items kept as-is. input = kept + fused + dropped.
        let items = vec![
            raw(json!("Pan"), json!(1), json!(0)),
            raw(json!("2500"), json!(2), json!(2500)),
            raw(json!("12.000"), json!(1), json!(0)),
            raw(json!("Leche"), json!(1), json!(3500)),
            raw(json!(""), json!(1), json!(800)),
        ];
        let (refined, stats) = refine_with_stats(&items, PLACEHOLDER_NAME);
        assert_eq!(refined.len(), 3);
        assert_eq!(stats.input_items, 5);
        assert_eq!(stats.fused_items, 1);
        assert_eq!(stats.dropped_items, 1);
        assert_eq!(
            stats.input_items,
            refined.len() + stats.fused_items + stats.dropped_items
        );
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let (refined, stats) = refine_with_stats(&[], PLACEHOLDER_NAME);
        assert!(refined.is_empty());
        assert_eq!(stats, RefineStats::default());
    }

    #[test]
    fn test_custom_placeholder() {
        let items = vec![serde_json::from_value::<RawLineItem>(
            json!({"descripcion": "", "valor_unitario": 990}),
        )
        .unwrap()];
        let refined = refine_with_placeholder(&items, "Sin nombre");
        assert_eq!(refined[0].descripcion, "Sin nombre");
    }

    #[test]
    fn test_refine_extraction_passes_through_sections() {
        let payload: RawExtraction = serde_json::from_value(json!({
            "section_A_items": [
                {"descripcion": "Pan", "cantidad": 1, "valor_unitario": 0},
                {"descripcion": "2500", "cantidad": 1, "valor_unitario": 2500}
            ],
            "section_B_additionals": [
                {"type": "Tip", "descripcion": "Propina", "valor": "500"},
                {"type": "Descuento", "descripcion": "Promo", "valor": -300}
            ],
            "metadata": {"comercio": "Delipizza", "total_pagado": "2700"}
        }))
        .unwrap();

        let analysis = refine_extraction(&payload, PLACEHOLDER_NAME);

        assert_eq!(analysis.section_a_items.len(), 1);
        assert_eq!(analysis.section_a_items[0].descripcion, "Pan");

        assert_eq!(analysis.section_b_additionals.len(), 2);
        assert_eq!(analysis.section_b_additionals[0].kind, AdditionalKind::Tip);
        assert_eq!(analysis.section_b_additionals[0].valor, 500.0);
        // Unknown label degrades to Other; negative value survives.
        assert_eq!(
            analysis.section_b_additionals[1].kind,
            AdditionalKind::Other
        );
        assert_eq!(analysis.section_b_additionals[1].valor, -300.0);

        assert_eq!(analysis.metadata.comercio.as_deref(), Some("Delipizza"));
        assert_eq!(analysis.metadata.total_pagado, Some(2700.0));
    }

    #[test]
    fn test_refine_extraction_empty_metadata() {
        let payload = RawExtraction::default();
        let analysis = refine_extraction(&payload, PLACEHOLDER_NAME);
        assert!(analysis.section_a_items.is_empty());
        assert!(analysis.metadata.comercio.is_none());
        assert!(analysis.metadata.total_pagado.is_none());
    }
}
