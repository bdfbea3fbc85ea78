/*!
 * Permission Evaluation Context
 * Everything a policy stage may look at for one decision
 */

use crate::core::types::GroupName;
use crate::permissions::types::PermissionKind;
use crate::regions::Area;

/// Evaluation context for a single decision
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Winning area, `None` outside every area
    pub area: Option<&'a Area>,
    pub actor: &'a str,
    /// Group chain, most specific first
    pub groups: &'a [GroupName],
    pub kind: PermissionKind,
    /// Per-actor operator override
    pub bypassing: bool,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        area: Option<&'a Area>,
        actor: &'a str,
        groups: &'a [GroupName],
        kind: PermissionKind,
        bypassing: bool,
    ) -> Self {
        Self {
            area,
            actor,
            groups,
            kind,
            bypassing,
        }
    }

    pub fn area_name(&self) -> Option<&'a str> {
        self.area.map(|area| area.name.as_str())
    }
}
