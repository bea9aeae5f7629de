use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual validation marker of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

impl FieldState {
    /// CSS class carried by the field in this state.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            FieldState::Neutral => None,
            FieldState::Valid => Some("is-valid"),
            FieldState::Invalid => Some("is-invalid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    IdentityNumber,
    Phone,
}

impl Field {
    /// `name` attribute of the input element.
    pub fn input_name(&self) -> &'static str {
        match self {
            Field::IdentityNumber => "tc_no",
            Field::Phone => "telefon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Submit,
    Export { href: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ButtonState {
    #[default]
    Idle,
    Busy { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatCard {
    pub value: String,
    pub pulsing: bool,
}

/// Everything the client knows about the page it is attached to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageState {
    pub url: String,
    pub has_dashboard: bool,
    /// A `<form>` is present; submit handling needs one.
    pub has_form: bool,
    pub has_identity_field: bool,
    pub has_phone_field: bool,
    /// `input[name="ad_soyad"]` is present, so the page is searchable.
    pub has_search_field: bool,
    pub identity_value: String,
    pub identity_state: FieldState,
    pub phone_value: String,
    pub stats: Vec<StatCard>,
    pub results_html: Option<String>,
    pub submit_button: ButtonState,
    pub export_buttons: BTreeMap<String, ButtonState>,
    pub form_submitted: bool,
}

impl PageState {
    pub fn stat_values(&self) -> Vec<String> {
        self.stats.iter().map(|card| card.value.clone()).collect()
    }

    pub fn button(&self, button: &Button) -> Option<&ButtonState> {
        match button {
            Button::Submit => Some(&self.submit_button),
            Button::Export { href } => self.export_buttons.get(href),
        }
    }
}

/// A single change to apply to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomPatch {
    SetFieldValue { field: Field, value: String },
    SetFieldState { field: Field, state: FieldState },
    SetStatText { index: usize, text: String },
    StartPulse { index: usize },
    EndPulse { index: usize },
    ReplaceResults { html: String },
    SubmitForm,
    SetButtonBusy { button: Button, label: String },
    ResetButton { button: Button },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_state_css_class() {
        assert_eq!(FieldState::Neutral.css_class(), None);
        assert_eq!(FieldState::Valid.css_class(), Some("is-valid"));
        assert_eq!(FieldState::Invalid.css_class(), Some("is-invalid"));
    }
}
