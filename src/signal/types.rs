// src/signal/types.rs
//! Core types for the synthetic physiological signal stream

use serde::{Deserialize, Serialize};

/// One physiological reading: heart rate, heart-rate variability and
/// electrodermal activity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Heart rate (bpm)
    #[serde(rename = "HR")]
    pub hr: f64,
    /// Heart-rate variability (ms)
    #[serde(rename = "HRV")]
    pub hrv: f64,
    /// Electrodermal activity (µS)
    #[serde(rename = "EDA")]
    pub eda: f64,
}

/// Named fields of a [`Sample`], in recording order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalField {
    #[serde(rename = "HR")]
    HeartRate,
    #[serde(rename = "HRV")]
    HeartRateVariability,
    #[serde(rename = "EDA")]
    ElectrodermalActivity,
}

impl SignalField {
    pub const ALL: [SignalField; 3] = [
        SignalField::HeartRate,
        SignalField::HeartRateVariability,
        SignalField::ElectrodermalActivity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SignalField::HeartRate => "HR",
            SignalField::HeartRateVariability => "HRV",
            SignalField::ElectrodermalActivity => "EDA",
        }
    }
}

impl std::fmt::Display for SignalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Sample {
    pub fn new(hr: f64, hrv: f64, eda: f64) -> Self {
        Self { hr, hrv, eda }
    }

    pub fn get(&self, field: SignalField) -> f64 {
        match field {
            SignalField::HeartRate => self.hr,
            SignalField::HeartRateVariability => self.hrv,
            SignalField::ElectrodermalActivity => self.eda,
        }
    }

    pub fn get_mut(&mut self, field: SignalField) -> &mut f64 {
        match field {
            SignalField::HeartRate => &mut self.hr,
            SignalField::HeartRateVariability => &mut self.hrv,
            SignalField::ElectrodermalActivity => &mut self.eda,
        }
    }

    /// Apply `f` to every field in recording order, producing a new sample
    pub fn map_fields(&self, mut f: impl FnMut(SignalField, f64) -> f64) -> Self {
        let mut out = *self;
        for field in SignalField::ALL {
            *out.get_mut(field) = f(field, self.get(field));
        }
        out
    }
}
