//! Page event handlers.
//!
//! Each handler looks at the current state (when it needs to) and returns the
//! patches describing what should change. Nothing here mutates the page;
//! [`PageController`](crate::core::controller::PageController) applies the
//! result.

use crate::domain::identity::{sanitize_identity_input, validate, IDENTITY_NUMBER_LEN};
use crate::domain::model::{Button, ButtonState, DomPatch, Field, FieldState, PageState, StatCard};
use crate::domain::phone::format_phone;

pub const SUBMIT_BUSY_LABEL: &str = "İşleniyor...";
pub const EXPORT_BUSY_LABEL: &str = "Hazırlanıyor...";

/// Masks the identity field to digits and marks it once it holds 11.
/// Pages without a `tc_no` input ignore the event.
pub fn identity_input(state: &PageState, raw: &str) -> Vec<DomPatch> {
    if !state.has_identity_field {
        return Vec::new();
    }
    let value = sanitize_identity_input(raw);

    let field_state = if value.len() == IDENTITY_NUMBER_LEN {
        if validate(&value) {
            FieldState::Valid
        } else {
            FieldState::Invalid
        }
    } else {
        FieldState::Neutral
    };

    vec![
        DomPatch::SetFieldValue {
            field: Field::IdentityNumber,
            value,
        },
        DomPatch::SetFieldState {
            field: Field::IdentityNumber,
            state: field_state,
        },
    ]
}

/// Enter submits the enclosing form once the field holds 11 characters.
/// The checksum is not consulted; the server decides.
pub fn identity_keypress(state: &PageState, key: &str) -> Vec<DomPatch> {
    if !state.has_form || !state.has_identity_field {
        return Vec::new();
    }
    if key == "Enter" && state.identity_value.chars().count() == IDENTITY_NUMBER_LEN {
        vec![DomPatch::SubmitForm]
    } else {
        Vec::new()
    }
}

pub fn phone_input(state: &PageState, raw: &str) -> Vec<DomPatch> {
    if !state.has_phone_field {
        return Vec::new();
    }
    vec![DomPatch::SetFieldValue {
        field: Field::Phone,
        value: format_phone(raw),
    }]
}

pub fn submit_click(state: &PageState, form_valid: bool) -> Vec<DomPatch> {
    if !state.has_form || !form_valid {
        return Vec::new();
    }
    vec![DomPatch::SetButtonBusy {
        button: Button::Submit,
        label: SUBMIT_BUSY_LABEL.to_string(),
    }]
}

pub fn is_export_link(href: &str) -> bool {
    href.contains("export")
}

/// Marks an export link busy. A link that is already busy ignores clicks.
pub fn export_click(state: &PageState, href: &str) -> Vec<DomPatch> {
    if !is_export_link(href) {
        return Vec::new();
    }
    if let Some(ButtonState::Busy { .. }) = state.export_buttons.get(href) {
        return Vec::new();
    }
    vec![DomPatch::SetButtonBusy {
        button: Button::Export {
            href: href.to_string(),
        },
        label: EXPORT_BUSY_LABEL.to_string(),
    }]
}

/// Called once the export request has finished, whatever the outcome.
pub fn export_settled(href: &str) -> Vec<DomPatch> {
    vec![DomPatch::ResetButton {
        button: Button::Export {
            href: href.to_string(),
        },
    }]
}

/// Compares the displayed stats with freshly fetched values.
///
/// Only positions present on both sides are compared; a changed value is
/// rewritten and pulsed, an unchanged one is left alone.
pub fn diff_stats(current: &[StatCard], fresh: &[String]) -> Vec<DomPatch> {
    let mut patches = Vec::new();
    for (index, (card, text)) in current.iter().zip(fresh).enumerate() {
        if card.value != *text {
            patches.push(DomPatch::SetStatText {
                index,
                text: text.clone(),
            });
            patches.push(DomPatch::StartPulse { index });
        }
    }
    patches
}

/// `EndPulse` for every pulse started by `patches`.
pub fn pulse_endings(patches: &[DomPatch]) -> Vec<DomPatch> {
    patches
        .iter()
        .filter_map(|patch| match patch {
            DomPatch::StartPulse { index } => Some(DomPatch::EndPulse { index: *index }),
            _ => None,
        })
        .collect()
}

/// Splices a fresh results table in, provided both sides have one.
pub fn replace_results(state: &PageState, fresh: Option<String>) -> Vec<DomPatch> {
    match (&state.results_html, fresh) {
        (Some(_), Some(html)) => vec![DomPatch::ReplaceResults { html }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_state(patches: &[DomPatch]) -> Option<FieldState> {
        patches.iter().find_map(|p| match p {
            DomPatch::SetFieldState { state, .. } => Some(*state),
            _ => None,
        })
    }

    fn cards(values: &[&str]) -> Vec<StatCard> {
        values
            .iter()
            .map(|v| StatCard {
                value: v.to_string(),
                pulsing: false,
            })
            .collect()
    }

    fn form_page() -> PageState {
        PageState {
            has_form: true,
            has_identity_field: true,
            has_phone_field: true,
            ..PageState::default()
        }
    }

    #[test]
    fn test_identity_input_masks_and_marks() {
        let page = form_page();
        let patches = identity_input(&page, "1000 0000 1466");
        assert_eq!(
            patches[0],
            DomPatch::SetFieldValue {
                field: Field::IdentityNumber,
                value: "10000000146".to_string()
            }
        );
        assert_eq!(field_state(&patches), Some(FieldState::Valid));

        assert_eq!(field_state(&identity_input(&page, "10000000147")), Some(FieldState::Invalid));
        assert_eq!(field_state(&identity_input(&page, "1000")), Some(FieldState::Neutral));
        assert_eq!(field_state(&identity_input(&page, "")), Some(FieldState::Neutral));
    }

    #[test]
    fn test_identity_keypress() {
        let mut page = form_page();
        page.identity_value = "10000000146".to_string();
        assert_eq!(identity_keypress(&page, "Enter"), vec![DomPatch::SubmitForm]);
        assert!(identity_keypress(&page, "a").is_empty());

        // length is all that matters for submission
        page.identity_value = "10000000147".to_string();
        assert_eq!(identity_keypress(&page, "Enter"), vec![DomPatch::SubmitForm]);

        page.identity_value = "1000000014".to_string();
        assert!(identity_keypress(&page, "Enter").is_empty());
    }

    #[test]
    fn test_handlers_need_their_elements() {
        let mut page = PageState {
            identity_value: "10000000146".to_string(),
            ..PageState::default()
        };
        assert!(identity_input(&page, "10000000146").is_empty());
        assert!(identity_keypress(&page, "Enter").is_empty());
        assert!(phone_input(&page, "5551234567").is_empty());
        assert!(submit_click(&page, true).is_empty());

        // a tc_no input outside any form can be masked but never submits
        page.has_identity_field = true;
        assert_eq!(identity_input(&page, "10000000146").len(), 2);
        assert!(identity_keypress(&page, "Enter").is_empty());
    }

    #[test]
    fn test_phone_input() {
        assert_eq!(
            phone_input(&form_page(), "5551234567"),
            vec![DomPatch::SetFieldValue {
                field: Field::Phone,
                value: "(555) 123 45 67".to_string()
            }]
        );
    }

    #[test]
    fn test_submit_click_only_for_valid_form() {
        let page = form_page();
        assert!(submit_click(&page, false).is_empty());
        assert_eq!(
            submit_click(&page, true),
            vec![DomPatch::SetButtonBusy {
                button: Button::Submit,
                label: SUBMIT_BUSY_LABEL.to_string()
            }]
        );
    }

    #[test]
    fn test_export_click_ignores_busy_and_foreign_links() {
        let mut state = PageState::default();
        assert!(export_click(&state, "/logs/").is_empty());
        assert_eq!(export_click(&state, "/export/csv/").len(), 1);

        state.export_buttons.insert(
            "/export/csv/".to_string(),
            ButtonState::Busy {
                label: EXPORT_BUSY_LABEL.to_string(),
            },
        );
        assert!(export_click(&state, "/export/csv/").is_empty());
    }

    #[test]
    fn test_diff_stats_unchanged_produces_nothing() {
        let current = cards(&["42", "7"]);
        assert!(diff_stats(&current, &["42".to_string(), "7".to_string()]).is_empty());
    }

    #[test]
    fn test_diff_stats_changed_value_pulses() {
        let current = cards(&["42", "7"]);
        let patches = diff_stats(&current, &["42".to_string(), "8".to_string(), "99".to_string()]);
        assert_eq!(
            patches,
            vec![
                DomPatch::SetStatText {
                    index: 1,
                    text: "8".to_string()
                },
                DomPatch::StartPulse { index: 1 },
            ]
        );
        assert_eq!(pulse_endings(&patches), vec![DomPatch::EndPulse { index: 1 }]);
    }

    #[test]
    fn test_replace_results_needs_both_tables() {
        let mut state = PageState::default();
        assert!(replace_results(&state, Some("<table></table>".to_string())).is_empty());

        state.results_html = Some("<table>old</table>".to_string());
        assert!(replace_results(&state, None).is_empty());
        assert_eq!(
            replace_results(&state, Some("<table>new</table>".to_string())),
            vec![DomPatch::ReplaceResults {
                html: "<table>new</table>".to_string()
            }]
        );
    }
}
