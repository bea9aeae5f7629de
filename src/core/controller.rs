use crate::core::html::{self, PageSnapshot};
use crate::domain::model::{Button, ButtonState, DomPatch, Field, PageState, StatCard};
use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Owner of the page state. Every mutation goes through [`apply`] or
/// [`update`]; background tasks share clones of the same controller.
///
/// [`apply`]: PageController::apply
/// [`update`]: PageController::update
#[derive(Debug, Clone, Default)]
pub struct PageController {
    state: Arc<Mutex<PageState>>,
}

impl PageController {
    pub fn new(state: PageState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn from_snapshot(url: &Url, snapshot: PageSnapshot) -> Self {
        let state = PageState {
            url: url.to_string(),
            has_dashboard: snapshot.has_dashboard,
            has_form: snapshot.has_form,
            has_identity_field: snapshot.identity_value.is_some(),
            has_phone_field: snapshot.phone_value.is_some(),
            has_search_field: snapshot.has_search_field,
            identity_value: snapshot.identity_value.unwrap_or_default(),
            phone_value: snapshot.phone_value.unwrap_or_default(),
            stats: snapshot
                .stats
                .into_iter()
                .map(|value| StatCard {
                    value,
                    pulsing: false,
                })
                .collect(),
            results_html: snapshot.results_html,
            export_buttons: snapshot
                .export_links
                .into_iter()
                .map(|href| (href, ButtonState::Idle))
                .collect(),
            ..PageState::default()
        };
        Self::new(state)
    }

    pub fn from_html(url: &Url, body: &str) -> Result<Self> {
        Ok(Self::from_snapshot(url, html::snapshot(body)?))
    }

    /// Fetches `url` and attaches a controller to what came back.
    pub async fn load<F: PageFetcher + ?Sized>(fetcher: &F, url: &Url) -> Result<Self> {
        tracing::debug!("Loading page {}", url);
        let body = fetcher.fetch_page(url).await?;
        let controller = Self::from_html(url, &body)?;
        {
            let state = controller.state.lock().await;
            tracing::info!(
                "📄 Page loaded: dashboard={}, form={}, search={}, stats={}, results_table={}, export_links={}",
                state.has_dashboard,
                state.has_form,
                state.has_search_field,
                state.stats.len(),
                state.results_html.is_some(),
                state.export_buttons.len()
            );
        }
        Ok(controller)
    }

    pub async fn state(&self) -> PageState {
        self.state.lock().await.clone()
    }

    pub async fn url(&self) -> Result<Url> {
        let state = self.state.lock().await;
        Ok(Url::parse(&state.url)?)
    }

    pub async fn apply(&self, patches: Vec<DomPatch>) {
        let mut state = self.state.lock().await;
        for patch in patches {
            apply_patch(&mut state, patch);
        }
    }

    /// Computes patches from the current state and applies them under the
    /// same lock, returning what was applied.
    pub async fn update<H>(&self, handler: H) -> Vec<DomPatch>
    where
        H: FnOnce(&PageState) -> Vec<DomPatch>,
    {
        let mut state = self.state.lock().await;
        let patches = handler(&*state);
        for patch in patches.iter().cloned() {
            apply_patch(&mut state, patch);
        }
        patches
    }
}

fn apply_patch(state: &mut PageState, patch: DomPatch) {
    match patch {
        DomPatch::SetFieldValue { field, value } => match field {
            Field::IdentityNumber => state.identity_value = value,
            Field::Phone => state.phone_value = value,
        },
        DomPatch::SetFieldState { field, state: field_state } => match field {
            Field::IdentityNumber => {
                tracing::debug!(
                    "Identity field marked {}",
                    field_state.css_class().unwrap_or("neutral")
                );
                state.identity_state = field_state;
            }
            Field::Phone => tracing::debug!("Phone field carries no validation state"),
        },
        DomPatch::SetStatText { index, text } => match state.stats.get_mut(index) {
            Some(card) => card.value = text,
            None => tracing::warn!("No stat card at index {}", index),
        },
        DomPatch::StartPulse { index } => {
            if let Some(card) = state.stats.get_mut(index) {
                card.pulsing = true;
            }
        }
        DomPatch::EndPulse { index } => {
            if let Some(card) = state.stats.get_mut(index) {
                card.pulsing = false;
            }
        }
        DomPatch::ReplaceResults { html } => state.results_html = Some(html),
        DomPatch::SubmitForm => state.form_submitted = true,
        DomPatch::SetButtonBusy { button, label } => match button {
            Button::Submit => {
                state.submit_button = ButtonState::Busy { label }
            }
            Button::Export { href } => {
                state.export_buttons.insert(href, ButtonState::Busy { label });
            }
        },
        DomPatch::ResetButton { button } => match button {
            Button::Submit => state.submit_button = ButtonState::Idle,
            Button::Export { href } => {
                state.export_buttons.insert(href, ButtonState::Idle);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page;
    use crate::domain::model::FieldState;

    fn page_url() -> Url {
        Url::parse("http://localhost:8000/panel/").unwrap()
    }

    #[tokio::test]
    async fn test_from_html_builds_state() {
        let body = r#"<div class="dashboard-box"><div class="stat-card"><p class="fs-2">3</p></div></div>
<a href="/export/csv/">CSV</a>"#;
        let controller = PageController::from_html(&page_url(), body).unwrap();
        let state = controller.state().await;

        assert_eq!(state.url, "http://localhost:8000/panel/");
        assert!(state.has_dashboard);
        assert_eq!(state.stat_values(), vec!["3".to_string()]);
        assert_eq!(state.export_buttons.get("/export/csv/"), Some(&ButtonState::Idle));
    }

    #[tokio::test]
    async fn test_identity_flow() {
        let body = r#"<form method="post"><input name="tc_no"><input name="telefon"></form>"#;
        let controller = PageController::from_html(&page_url(), body).unwrap();
        controller
            .update(|s| page::identity_input(s, "10000000146x"))
            .await;

        let state = controller.state().await;
        assert_eq!(state.identity_value, "10000000146");
        assert_eq!(state.identity_state, FieldState::Valid);

        controller
            .update(|s| page::identity_keypress(s, "Enter"))
            .await;
        assert!(controller.state().await.form_submitted);
    }

    #[tokio::test]
    async fn test_page_without_form_ignores_identity_events() {
        let body = r#"<div class="table-responsive"><table></table></div>"#;
        let controller = PageController::from_html(&page_url(), body).unwrap();

        let applied = controller
            .update(|s| page::identity_input(s, "10000000146"))
            .await;
        assert!(applied.is_empty());
        assert!(controller.update(|s| page::identity_keypress(s, "Enter")).await.is_empty());

        let state = controller.state().await;
        assert!(!state.has_identity_field);
        assert!(!state.form_submitted);
        assert_eq!(state.identity_value, "");
    }

    #[tokio::test]
    async fn test_update_applies_stat_diff() {
        let controller = PageController::new(PageState {
            stats: vec![StatCard {
                value: "1".to_string(),
                pulsing: false,
            }],
            ..PageState::default()
        });

        let applied = controller
            .update(|s| page::diff_stats(&s.stats, &["2".to_string()]))
            .await;
        assert_eq!(applied.len(), 2);

        let state = controller.state().await;
        assert_eq!(state.stats[0].value, "2");
        assert!(state.stats[0].pulsing);

        controller.apply(page::pulse_endings(&applied)).await;
        assert!(!controller.state().await.stats[0].pulsing);
    }

    #[tokio::test]
    async fn test_out_of_range_stat_is_ignored() {
        let controller = PageController::default();
        controller
            .apply(vec![DomPatch::SetStatText {
                index: 3,
                text: "9".to_string(),
            }])
            .await;
        assert!(controller.state().await.stats.is_empty());
    }

    #[tokio::test]
    async fn test_button_states() {
        let controller = PageController::new(PageState {
            has_form: true,
            ..PageState::default()
        });
        controller.update(|s| page::submit_click(s, true)).await;
        assert_eq!(
            controller.state().await.button(&Button::Submit),
            Some(&ButtonState::Busy {
                label: page::SUBMIT_BUSY_LABEL.to_string()
            })
        );

        let export = Button::Export {
            href: "/export/csv/".to_string(),
        };
        controller.update(|s| page::export_click(s, "/export/csv/")).await;
        assert!(matches!(
            controller.state().await.button(&export),
            Some(ButtonState::Busy { .. })
        ));
        controller.apply(page::export_settled("/export/csv/")).await;
        assert_eq!(controller.state().await.button(&export), Some(&ButtonState::Idle));
    }
}
