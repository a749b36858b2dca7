pub use crate::config::*;

/// A builder for assembling survey responses by hand.
///
/// Useful for tests and for callers that already hold their survey data
/// in memory instead of going through a file reader.
///
/// ```
/// pub use sociometry::builder::SurveyBuilder;
/// # use sociometry::SociometryErrors;
///
/// let mut builder = SurveyBuilder::new("Class 1");
/// builder.add_response_simple("Ana", &["Bea".to_string(), "Carla".to_string()])?;
/// builder.add_response_simple("Bea", &["Ana".to_string()])?;
///
/// let store = builder.build();
/// assert_eq!(store.len(), 2);
/// # Ok::<(), SociometryErrors>(())
/// ```
pub struct SurveyBuilder {
    pub(crate) _group: String,
    pub(crate) _records: Vec<SurveyRecord>,
}

impl SurveyBuilder {
    pub fn new(group: &str) -> SurveyBuilder {
        SurveyBuilder {
            _group: group.to_string(),
            _records: Vec::new(),
        }
    }

    /// Adds one response. Targets are ranked in the order given, the
    /// first being the top choice.
    pub fn add_response_simple(
        &mut self,
        name: &str,
        targets: &[String],
    ) -> Result<(), SociometryErrors> {
        let rankings = targets
            .iter()
            .enumerate()
            .map(|(idx, target)| (target.clone(), (idx + 1).to_string()))
            .collect();
        self.add_response(&SurveyRecord {
            name: name.to_string(),
            group: self._group.clone(),
            rankings,
        })
    }

    /// Adds a full record, with raw rank values attached to each target.
    pub fn add_response(&mut self, record: &SurveyRecord) -> Result<(), SociometryErrors> {
        if record.name.trim().is_empty() {
            return Err(SociometryErrors::MissingRespondentName);
        }
        self._records.push(record.clone());
        Ok(())
    }

    pub fn build(&self) -> PreferenceStore {
        crate::assemble_store(&self._records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nameless_response_is_rejected() {
        let mut builder = SurveyBuilder::new("Class 1");
        let res = builder.add_response_simple("  ", &["Ana".to_string()]);
        assert_eq!(res, Err(SociometryErrors::MissingRespondentName));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn ordered_targets_become_ranks() {
        let mut builder = SurveyBuilder::new("Class 1");
        builder
            .add_response_simple("Ana", &["Bea".to_string(), "Carla".to_string()])
            .unwrap();
        let store = builder.build();
        let prefs = &store.get("ANA").unwrap().preferences;
        assert_eq!(prefs.get("BEA"), Some(&1));
        assert_eq!(prefs.get("CARLA"), Some(&2));
    }
}
