//! Wizard navigation gates derived from the join configuration.
//!
//! Two flags are derived, never stored:
//!
//! - `valid`: more than one table is selected and, in star mode, a fact
//!   table is chosen. The wizard may advance to further configuration.
//! - `finishable`: exactly one table is selected, or in star mode a fact
//!   table is chosen over a non-empty selection. The wizard may finish now.
//!
//! The flags are independent and may both be true.

use serde::{Deserialize, Serialize};

use crate::fact::FactTableResolver;
use crate::selection::SelectionSet;

/// Modeling mode of the datasource being configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelingMode {
    /// Flat relational model, no fact table required.
    #[default]
    Flat,
    /// OLAP star schema, a fact table must be chosen.
    Star,
}

impl ModelingMode {
    pub fn from_star_flag(star_modeling: bool) -> Self {
        if star_modeling {
            ModelingMode::Star
        } else {
            ModelingMode::Flat
        }
    }

    pub fn is_star(self) -> bool {
        self == ModelingMode::Star
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelingMode::Flat => "flat",
            ModelingMode::Star => "star",
        }
    }
}

/// The `{valid, finishable}` pair reported to the wizard host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardState {
    pub valid: bool,
    pub finishable: bool,
}

impl WizardState {
    /// Both gates closed.
    pub const BLOCKED: WizardState = WizardState {
        valid: false,
        finishable: false,
    };

    /// Evaluate both gates from the raw inputs.
    pub fn evaluate(selected: usize, mode: ModelingMode, fact_table_set: bool) -> Self {
        let star_ok = !mode.is_star() || fact_table_set;

        let valid = selected > 1 && star_ok;
        let finishable = selected == 1 || (mode.is_star() && fact_table_set && selected >= 1);

        Self { valid, finishable }
    }

    /// Evaluate both gates from the current model.
    pub fn of(selection: &SelectionSet, fact_table: &FactTableResolver, mode: ModelingMode) -> Self {
        let fact_table_set = fact_table.table(selection).is_some();
        Self::evaluate(selection.len(), mode, fact_table_set)
    }

    /// True if the wizard may leave this step, forward or by finishing.
    pub fn can_complete(&self) -> bool {
        self.valid || self.finishable
    }
}
