use restrict_runtime::WeaponId;

use crate::evaluator::Verdict;

/// Chat lines shown to a player whose acquisition was blocked.
///
/// Templates accept `{weapon}` and `{limit}` placeholders. An empty template
/// silences that kind of message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTemplates {
    prefix: String,
    restrict: String,
    disabled: String,
}

impl MessageTemplates {
    pub fn new(prefix: &str, restrict: &str, disabled: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            restrict: restrict.to_string(),
            disabled: disabled.to_string(),
        }
    }

    pub fn render(&self, weapon: &WeaponId, verdict: Verdict) -> Option<String> {
        let (template, limit) = match verdict {
            Verdict::NotRestricted => return None,
            Verdict::Disabled => (&self.disabled, 0),
            Verdict::LimitReached { limit } => (&self.restrict, limit),
        };
        if template.is_empty() {
            return None;
        }
        let body = template
            .replace("{weapon}", weapon.as_str())
            .replace("{limit}", &limit.to_string());
        Some(format!("{}{}", self.prefix, body))
    }
}
