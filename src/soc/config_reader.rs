use crate::soc::*;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub title: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveySource {
    /// The reader to use for this source: "json" (default) or "xlsx".
    pub provider: Option<String>,
    /// Resolved relative to the configuration file.
    pub path: String,
    /// Cohort label attached to every record of this source.
    pub group: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "nameColumnIndex")]
    pub name_column_index: Option<JSValue>,
    #[serde(rename = "firstChoiceColumnIndex")]
    pub first_choice_column_index: Option<JSValue>,
}

impl SurveySource {
    /// The indices are 1-based in the configuration, as in the
    /// spreadsheet world; accessors hand out 0-based positions.
    pub fn name_column_index(&self) -> SocResult<usize> {
        match &self.name_column_index {
            None => Ok(0),
            some => {
                let x = read_js_int(some)?;
                if x < 1 {
                    return ParsingJsonNumberSnafu {}.fail();
                }
                Ok(x - 1)
            }
        }
    }

    pub fn first_choice_column_index(&self) -> SocResult<usize> {
        match &self.first_choice_column_index {
            None => Ok(1),
            some => {
                let x = read_js_int(some)?;
                if x < 1 {
                    return ParsingJsonNumberSnafu {}.fail();
                }
                Ok(x - 1)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(rename = "maxRank")]
    pub max_rank: Option<u32>,
    pub groups: Option<Vec<String>>,
    pub students: Option<Vec<String>>,
    #[serde(rename = "includeNonRespondents")]
    pub include_non_respondents: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "surveySources")]
    pub survey_sources: Vec<SurveySource>,
    pub view: Option<ViewSettings>,
}

pub fn read_config(path: &str) -> SocResult<AppConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    debug!("read_config: read content: {:?}", contents);
    let config: AppConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> SocResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> SocResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
