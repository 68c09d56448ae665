//! Source and target parameter panels.
//!
//! Every select is filled from `/api/options`, so only values the backend
//! supports can be picked. Orthometric datums without a loaded grid are shown
//! but disabled.

use chrono::NaiveDate;
use leptos::*;

use crate::types::{decimal_year, OptionsResponse, SideSelection};

/// How a panel asks for the epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpochInput {
    /// Calendar date, converted to a decimal year
    Date,
    /// Decimal year typed directly
    DecimalYear,
}

/// Form state of one side
#[derive(Clone, Copy)]
pub struct SideForm {
    pub frame: RwSignal<String>,
    pub coords: RwSignal<String>,
    pub utm_zone: RwSignal<u8>,
    pub datum: RwSignal<String>,
    pub epoch: RwSignal<f64>,
    pub date: RwSignal<Option<NaiveDate>>,
    pub epoch_input: EpochInput,
}

impl SideForm {
    pub fn new(frame: &str, epoch: f64, epoch_input: EpochInput) -> Self {
        Self {
            frame: create_rw_signal(frame.to_string()),
            coords: create_rw_signal("Geographic".to_string()),
            utm_zone: create_rw_signal(18),
            datum: create_rw_signal("GRS80".to_string()),
            epoch: create_rw_signal(epoch),
            date: create_rw_signal(None),
            epoch_input,
        }
    }

    pub fn is_projected(&self) -> bool {
        self.coords.get() == "Projected"
    }

    /// Current values as sent to the backend
    pub fn selection(&self) -> SideSelection {
        let (epoch, epoch_date) = match (self.epoch_input, self.date.get()) {
            (EpochInput::Date, Some(date)) => (None, Some(date)),
            _ => (Some(self.epoch.get()), None),
        };
        SideSelection {
            ref_frame: self.frame.get(),
            coords: self.coords.get(),
            utm_zone: self.is_projected().then(|| self.utm_zone.get()),
            vertical_datum: Some(self.datum.get()),
            epoch,
            epoch_date,
        }
    }

    /// Epoch label shown next to the input
    pub fn epoch_label(&self) -> String {
        match (self.epoch_input, self.date.get()) {
            (EpochInput::Date, Some(date)) => format!("{:.4}", decimal_year(date)),
            _ => format!("{:.4}", self.epoch.get()),
        }
    }
}

#[component]
pub fn ParamsPanel(
    title: &'static str,
    form: SideForm,
    options: Signal<Option<OptionsResponse>>,
    #[prop(into)] disabled: Signal<bool>,
) -> impl IntoView {
    let frames = move || options.get().map(|o| o.reference_frames).unwrap_or_default();
    let datums = move || options.get().map(|o| o.vertical_datums).unwrap_or_default();
    let coord_types = move || options.get().map(|o| o.coord_types).unwrap_or_default();
    let zones = move || options.get().map(|o| o.utm_zones);
    let epoch_bounds = move || options.get().map(|o| (o.epoch.min, o.epoch.max)).unwrap_or((1900.0, 3000.0));

    let epoch_input = match form.epoch_input {
        EpochInput::Date => view! {
            <input
                type="date"
                prop:disabled=move || disabled.get()
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    form.date.set(NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok());
                }
            />
        }
        .into_view(),
        EpochInput::DecimalYear => view! {
            <input
                type="number"
                step="0.1"
                min=move || epoch_bounds().0
                max=move || epoch_bounds().1
                prop:value=move || form.epoch.get()
                prop:disabled=move || disabled.get()
                on:change=move |ev| {
                    if let Ok(year) = event_target_value(&ev).parse::<f64>() {
                        form.epoch.set(year);
                    }
                }
            />
        }
        .into_view(),
    };

    view! {
        <fieldset class="params-panel" class:disabled=move || disabled.get()>
            <legend>{title}</legend>

            <label>"Reference frame"
                <select
                    prop:disabled=move || disabled.get()
                    on:change=move |ev| form.frame.set(event_target_value(&ev))
                >
                    <For
                        each=frames
                        key=|c| c.id.clone()
                        children=move |c| {
                            let id = c.id.clone();
                            view! {
                                <option value=c.id.clone() selected=move || form.frame.get() == id>
                                    {c.label}
                                </option>
                            }
                        }
                    />
                </select>
            </label>

            <label>"Coordinates"
                <select
                    prop:disabled=move || disabled.get()
                    on:change=move |ev| form.coords.set(event_target_value(&ev))
                >
                    <For
                        each=coord_types
                        key=|c| c.clone()
                        children=move |c| {
                            let id = c.clone();
                            view! {
                                <option value=c.clone() selected=move || form.coords.get() == id>{c}</option>
                            }
                        }
                    />
                </select>
            </label>

            <label>"UTM zone"
                <input
                    type="number"
                    min=move || zones().map(|z| z.min).unwrap_or(3)
                    max=move || zones().map(|z| z.max).unwrap_or(23)
                    prop:value=move || form.utm_zone.get()
                    prop:disabled=move || disabled.get() || !form.is_projected()
                    on:change=move |ev| {
                        if let Ok(zone) = event_target_value(&ev).parse::<u8>() {
                            form.utm_zone.set(zone);
                        }
                    }
                />
            </label>

            <label>"Vertical datum"
                <select
                    prop:disabled=move || disabled.get()
                    on:change=move |ev| form.datum.set(event_target_value(&ev))
                >
                    <For
                        each=datums
                        key=|d| d.id.clone()
                        children=move |d| {
                            let id = d.id.clone();
                            let label = if d.available {
                                d.label.clone()
                            } else {
                                format!("{} (grid not installed)", d.label)
                            };
                            view! {
                                <option
                                    value=d.id.clone()
                                    disabled=!d.available
                                    selected=move || form.datum.get() == id
                                >
                                    {label}
                                </option>
                            }
                        }
                    />
                </select>
            </label>

            <label>"Epoch"
                {epoch_input}
                <span class="epoch-value">{move || form.epoch_label()}</span>
            </label>
        </fieldset>
    }
}
