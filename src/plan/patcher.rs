use super::masterplan::MashPlan;
use crate::error::{InvalidPatchError, PlanError};
use json_patch::PatchOperation;
use serde::Deserialize;
use serde_json::Value;

/// Applies RFC 6902 JSON Patch operations to plan documents.
/// The caller's document is never mutated and a failed patch never yields a partial result.
pub struct PlanPatcher;

impl PlanPatcher {
    /// Parse a raw JSON array into patch operations.
    /// Unknown op names and missing `value`/`from` members are rejected here.
    pub fn parse_operations(raw: &Value) -> Result<Vec<PatchOperation>, InvalidPatchError> {
        Ok(Vec::<PatchOperation>::deserialize(raw)?)
    }

    /// Apply `operations` in order to a deep copy of `document`
    pub fn patch_plan(
        document: &Value,
        operations: &[PatchOperation],
    ) -> Result<Value, InvalidPatchError> {
        let mut patched = document.clone();
        json_patch::patch(&mut patched, operations).map_err(|e| {
            tracing::warn!(error = %e, "Discarding plan edit");
            InvalidPatchError::from(e)
        })?;
        tracing::debug!(operations = operations.len(), "Applied plan patch");
        Ok(patched)
    }

    /// Parse then apply an operation list given as raw JSON
    pub fn patch_plan_from_json(
        document: &Value,
        operations: &Value,
    ) -> Result<Value, InvalidPatchError> {
        let operations = Self::parse_operations(operations)?;
        Self::patch_plan(document, &operations)
    }

    /// Patch a typed mashup plan and check the result is still a valid plan.
    /// With `durations_ms` the section times are also checked against the shorter track.
    pub fn patch_masterplan(
        plan: &MashPlan,
        operations: &[PatchOperation],
        durations_ms: Option<(u64, u64)>,
    ) -> Result<MashPlan, PlanError> {
        let document =
            serde_json::to_value(plan).map_err(|e| PlanError::Structure(e.to_string()))?;
        let patched = Self::patch_plan(&document, operations)?;
        let plan: MashPlan =
            serde_json::from_value(patched).map_err(|e| PlanError::Structure(e.to_string()))?;

        match durations_ms {
            Some((dur_a, dur_b)) => plan.validate(dur_a, dur_b)?,
            None => plan.validate_structure()?,
        }
        Ok(plan)
    }
}
