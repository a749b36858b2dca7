// Reader for forms exports: one spreadsheet row per respondent, the
// choice columns in preference order.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, warn};
use snafu::prelude::*;

use crate::soc::{
    io_common::{rankings_from_ordered, simplify_file_name},
    *,
};

// TODO: support the likert layout (one column per classmate, cells hold
// the rank) that some form templates export.
pub fn read_xlsx_surveys(path: &str, source: &SurveySource) -> SocResult<Vec<ParsedSurvey>> {
    let wrange = get_range(path, source)?;

    let header = wrange.rows().next().context(EmptyExcelSnafu {})?;
    debug!("read_xlsx_surveys: header: {:?}", header);
    let name_col = source.name_column_index()?;
    let start_col = source.first_choice_column_index()?;

    let file_id = simplify_file_name(path);
    let mut res: Vec<ParsedSurvey> = Vec::new();
    let mut iter = wrange.rows();
    iter.next();
    for (idx, row) in iter.enumerate() {
        // Rows are numbered as the spreadsheet shows them, header included.
        let lineno = idx as u64 + 2;
        let name = match row.get(name_col) {
            Some(DataType::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(DataType::String(_)) | Some(DataType::Empty) | None => {
                warn!(
                    "read_xlsx_surveys: row {} has no respondent name, skipping",
                    lineno
                );
                continue;
            }
            Some(other) => {
                let e = SocError::ExcelWrongCellType {
                    lineno,
                    content: format!("{:?}", other),
                };
                warn!("read_xlsx_surveys: skipping row: {}", e);
                continue;
            }
        };

        let mut choices: Vec<String> = Vec::new();
        for cell in row.iter().skip(start_col) {
            match cell {
                DataType::String(s) if !s.trim().is_empty() => choices.push(s.clone()),
                DataType::String(_) | DataType::Empty => {}
                other => {
                    warn!(
                        "read_xlsx_surveys: row {}: ignoring choice cell {:?}",
                        lineno, other
                    );
                }
            }
        }
        debug!(
            "read_xlsx_surveys: row {}: {:?} -> {:?}",
            lineno, name, choices
        );

        res.push(ParsedSurvey {
            id: Some(format!("{}-{:08}", file_id, lineno)),
            name,
            group: source.group.clone(),
            rankings: rankings_from_ordered(&choices),
        });
    }
    Ok(res)
}

fn get_range(path: &str, source: &SurveySource) -> SocResult<calamine::Range<DataType>> {
    let worksheet_name_o = source.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu {}.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using single worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => {
                whatever!(
                    "workbook {} has several worksheets, set excelWorksheetName",
                    path
                )
            }
        }
    }
}
