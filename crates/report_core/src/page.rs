//! Page-display seam: step visibility, reference/contact elements, alerts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait PageDisplay: Send {
    /// Shows exactly `index` and hides every other step.
    fn show_step(&mut self, index: usize);
    fn set_contact_form_visible(&mut self, visible: bool);
    fn set_reference_visible(&mut self, visible: bool);
    fn set_reference_code(&mut self, code: &str);
    fn set_address_input(&mut self, text: &str);
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub visible: Vec<bool>,
    pub contact_form_visible: bool,
    pub reference_visible: bool,
    pub reference_code: Option<String>,
    pub address_input: String,
    pub alerts: Vec<String>,
}

impl PageState {
    pub fn visible_steps(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, shown)| shown.then_some(i))
            .collect()
    }
}

/// In-memory page whose state can be observed through a cloned handle.
#[derive(Clone)]
pub struct HeadlessPage {
    state: Arc<Mutex<PageState>>,
}

impl HeadlessPage {
    pub fn new(step_count: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                visible: vec![false; step_count],
                ..PageState::default()
            })),
        }
    }

    pub fn snapshot(&self) -> PageState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageDisplay for HeadlessPage {
    fn show_step(&mut self, index: usize) {
        for (i, shown) in self.lock().visible.iter_mut().enumerate() {
            *shown = i == index;
        }
    }

    fn set_contact_form_visible(&mut self, visible: bool) {
        self.lock().contact_form_visible = visible;
    }

    fn set_reference_visible(&mut self, visible: bool) {
        self.lock().reference_visible = visible;
    }

    fn set_reference_code(&mut self, code: &str) {
        self.lock().reference_code = Some(code.to_string());
    }

    fn set_address_input(&mut self, text: &str) {
        self.lock().address_input = text.to_string();
    }

    fn alert(&mut self, message: &str) {
        self.lock().alerts.push(message.to_string());
    }
}
