//! Priority-score formulas.
//!
//! Scores are rounded half away from zero (`f64::round`). Missing inputs never
//! fail a computation; they produce a score of `0` and set `missing_inputs`.

use pscore_fields::{format_number, get_number, FieldSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormula {
    Product,
    EngineeringOrKtlo,
}

impl ScoreFormula {
    pub fn label(self) -> &'static str {
        match self {
            Self::Product => "Product PR",
            Self::EngineeringOrKtlo => "Engineering Enabler/KTLO",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFieldIds {
    pub reach: String,
    pub impact: String,
    pub confidence: String,
    pub effort: String,
}

impl ProductFieldIds {
    pub fn read(&self, fields: &FieldSet) -> ProductInputs {
        ProductInputs {
            reach: get_number(fields, &self.reach),
            impact: get_number(fields, &self.impact),
            confidence: get_number(fields, &self.confidence),
            effort: get_number(fields, &self.effort),
        }
    }

    pub fn ids(&self) -> [&str; 4] {
        [
            self.reach.as_str(),
            self.impact.as_str(),
            self.confidence.as_str(),
            self.effort.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineeringFieldIds {
    pub business_weight: String,
    pub time_criticality: String,
    pub risk_reduction: String,
    pub opportunity_enablement: String,
}

impl EngineeringFieldIds {
    pub fn read(&self, fields: &FieldSet) -> EngineeringInputs {
        EngineeringInputs {
            business_weight: get_number(fields, &self.business_weight),
            time_criticality: get_number(fields, &self.time_criticality),
            risk_reduction: get_number(fields, &self.risk_reduction),
            opportunity_enablement: get_number(fields, &self.opportunity_enablement),
        }
    }

    pub fn ids(&self) -> [&str; 4] {
        [
            self.business_weight.as_str(),
            self.time_criticality.as_str(),
            self.risk_reduction.as_str(),
            self.opportunity_enablement.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductInputs {
    pub reach: Option<f64>,
    pub impact: Option<f64>,
    pub confidence: Option<f64>,
    pub effort: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineeringInputs {
    pub business_weight: Option<f64>,
    pub time_criticality: Option<f64>,
    pub risk_reduction: Option<f64>,
    pub opportunity_enablement: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NamedInput {
    key: &'static str,
    label: &'static str,
    value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub formula: ScoreFormula,
    pub current_score: Option<f64>,
    pub computed_score: f64,
    /// An input was null, or Product effort was zero.
    pub missing_inputs: bool,
    /// Every input and the current score were null.
    pub all_inputs_null: bool,
    /// Current score null, computed `0` and inputs missing.
    pub should_skip_comment: bool,
    inputs: Vec<NamedInput>,
}

impl ScoreResult {
    fn new(
        formula: ScoreFormula,
        current_score: Option<f64>,
        computed_score: f64,
        missing_inputs: bool,
        inputs: Vec<NamedInput>,
    ) -> Self {
        let computed_score = round_half_away_from_zero(computed_score);
        let all_inputs_null =
            current_score.is_none() && inputs.iter().all(|input| input.value.is_none());
        let should_skip_comment =
            current_score.is_none() && computed_score == 0.0 && missing_inputs;
        Self {
            formula,
            current_score,
            computed_score,
            missing_inputs,
            all_inputs_null,
            should_skip_comment,
            inputs,
        }
    }

    /// `Product PR | PriorityScore=.. Reach=.. ...` line for the run log.
    pub fn inputs_summary(&self) -> String {
        let mut summary = format!(
            "{} | PriorityScore={}",
            self.formula.label(),
            format_number(self.current_score)
        );
        for input in &self.inputs {
            summary.push_str(&format!(" {}={}", input.key, format_number(input.value)));
        }
        summary
    }

    /// `Reach=8, Impact=2, ...` breakdown used in comments.
    pub fn inputs_breakdown(&self) -> String {
        self.inputs
            .iter()
            .map(|input| format!("{}={}", input.label, format_number(input.value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn round_half_away_from_zero(value: f64) -> f64 {
    let rounded = value.round();
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `round(reach * impact * confidence / effort)`, or `0` when an input is
/// missing or effort is zero.
pub fn score_product(current_score: Option<f64>, inputs: ProductInputs) -> ScoreResult {
    let named = vec![
        NamedInput {
            key: "Reach",
            label: "Reach",
            value: inputs.reach,
        },
        NamedInput {
            key: "Impact",
            label: "Impact",
            value: inputs.impact,
        },
        NamedInput {
            key: "Confidence",
            label: "Confidence",
            value: inputs.confidence,
        },
        NamedInput {
            key: "Effort",
            label: "Effort",
            value: inputs.effort,
        },
    ];
    let computed = match (inputs.reach, inputs.impact, inputs.confidence, inputs.effort) {
        (Some(reach), Some(impact), Some(confidence), Some(effort)) if effort != 0.0 => {
            Some(reach * impact * confidence / effort)
        }
        _ => None,
    };
    ScoreResult::new(
        ScoreFormula::Product,
        current_score,
        computed.unwrap_or(0.0),
        computed.is_none(),
        named,
    )
}

/// `round(((bw*0.2 + tc*0.3 + rr*0.3 + oe*0.2) - 1) / 3 * 1000)`, or `0` when
/// an input is missing.
pub fn score_engineering(current_score: Option<f64>, inputs: EngineeringInputs) -> ScoreResult {
    let named = vec![
        NamedInput {
            key: "BusinessWeight",
            label: "Business Weight",
            value: inputs.business_weight,
        },
        NamedInput {
            key: "TimeCriticality",
            label: "Time Criticality",
            value: inputs.time_criticality,
        },
        NamedInput {
            key: "RiskReduction",
            label: "Risk Reduction",
            value: inputs.risk_reduction,
        },
        NamedInput {
            key: "OpportunityEnablement",
            label: "Opportunity Enablement",
            value: inputs.opportunity_enablement,
        },
    ];
    let computed = match (
        inputs.business_weight,
        inputs.time_criticality,
        inputs.risk_reduction,
        inputs.opportunity_enablement,
    ) {
        (Some(bw), Some(tc), Some(rr), Some(oe)) => {
            Some(((bw * 0.2 + tc * 0.3 + rr * 0.3 + oe * 0.2) - 1.0) / 3.0 * 1000.0)
        }
        _ => None,
    };
    ScoreResult::new(
        ScoreFormula::EngineeringOrKtlo,
        current_score,
        computed.unwrap_or(0.0),
        computed.is_none(),
        named,
    )
}
