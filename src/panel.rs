use crate::params::{Domain, ParamChange, ParamStore, ParamValue};

/// Debug control panel generated from the parameter store.
///
/// Each widget enforces its field's declared domain (sliders clamp to the
/// range, combo boxes only offer the registered choices); edits are still
/// applied through [`ParamStore::set`] so rejected values never land.
/// Returned changes take effect on the next animation frame.
pub struct ControlPanel {
    pub visible: bool,
}

impl ControlPanel {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    /// Lay out one frame of the panel and apply any edits to the store.
    pub fn show(&mut self, ctx: &egui::Context, store: &mut ParamStore) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        if !self.visible {
            return changes;
        }

        egui::SidePanel::right("controls")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                for group in store.groups().into_iter().map(str::to_owned).collect::<Vec<_>>() {
                    egui::CollapsingHeader::new(&group)
                        .default_open(true)
                        .show(ui, |ui| {
                            changes.extend(group_widgets(ui, store, &group));
                        });
                }
            });

        changes
    }
}

/// Widgets for every field of one group. Edits are buffered locally, then
/// written back through the validating store.
fn group_widgets(ui: &mut egui::Ui, store: &mut ParamStore, group: &str) -> Vec<ParamChange> {
    let mut edits: Vec<(String, ParamValue)> = Vec::new();

    for entry in store.entries_mut() {
        let Some(field) = entry
            .path
            .strip_prefix(group)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            continue;
        };
        let label = field.replace('_', " ");

        match (&entry.domain, &mut entry.value) {
            (Domain::Range { min, max, step }, ParamValue::Number(n)) => {
                let mut v = *n;
                let slider = egui::Slider::new(&mut v, *min..=*max).step_by(*step).text(label);
                if ui.add(slider).changed() && v != *n {
                    edits.push((entry.path.clone(), ParamValue::Number(v)));
                }
            }
            (Domain::Flag, ParamValue::Flag(b)) => {
                let mut v = *b;
                if ui.checkbox(&mut v, label).changed() {
                    edits.push((entry.path.clone(), ParamValue::Flag(v)));
                }
            }
            (Domain::Color, ParamValue::Color(c)) => {
                let mut v = *c;
                ui.horizontal(|ui| {
                    if ui.color_edit_button_rgb(&mut v).changed() && v != *c {
                        edits.push((entry.path.clone(), ParamValue::Color(v)));
                    }
                    ui.label(label);
                });
            }
            (Domain::Choices(choices), ParamValue::Choice(current)) => {
                let mut selected = current.clone();
                egui::ComboBox::from_label(label)
                    .selected_text(selected.clone())
                    .show_ui(ui, |ui| {
                        for choice in choices {
                            ui.selectable_value(&mut selected, choice.clone(), choice);
                        }
                    });
                if selected != *current {
                    edits.push((entry.path.clone(), ParamValue::Choice(selected)));
                }
            }
            // A mismatched domain/value pair cannot be registered.
            _ => {}
        }
    }

    let mut changes = Vec::new();
    for (path, value) in edits {
        match store.set(&path, value) {
            Ok(change) => changes.push(change),
            Err(e) => log::debug!("panel edit rejected: {e}"),
        }
    }
    changes
}
