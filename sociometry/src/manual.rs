/*!

This is the long-form manual for `sociometry` and `sociograph`.

## Input formats

The following formats are supported:
* `json` one JSON document per respondent, collected in a directory
* `xlsx` one spreadsheet row per respondent (Microsoft Forms and Google
  Forms exports)

### `json`

A directory is scanned for `*.json` files; every file holds one survey
response:

```text
{
    "name": "Ana María López",
    "ranking": {
        "Bea Ruiz": 1,
        "Carla Soto (nueva)": 2,
        "Dora Gil": "3"
    }
}
```

The legacy field names `Nombre` and `Seleccion_Jerarquica` are accepted
as aliases, so archives produced by older collection tools load without
conversion. Rank values may be numbers or numeric strings; a value that
cannot be read as an integer is kept with the lowest possible
preference (rank 99), which any realistic rank filter excludes.

Files that cannot be parsed, and files without a usable `name`, are
reported and skipped; the rest of the directory still loads. A missing
directory is reported once and simply contributes no records.

### `xlsx`

One row per respondent, as produced by the spreadsheet export of the
common form services:

|   name    | choice 1 | choice 2 | ... |
|-----------|----------|----------|-----|
| Ana López | Bea Ruiz | Dora Gil |     |
| Bea Ruiz  | Ana López|          |     |

The column order is the preference order: the first choice column is
rank 1, the next rank 2, and so on. Empty cells are skipped. The name
column and the first choice column can be moved with the
`nameColumnIndex` and `firstChoiceColumnIndex` configuration fields
(1-based, as in the spreadsheet world); `excelWorksheetName` selects a
worksheet when the workbook has more than one.

## Configuration

`sociograph` accepts a configuration file in JSON:

```text
{
    "outputSettings": { "title": "Class survey, spring term" },
    "surveySources": [
        { "provider": "json", "path": "responses/class1", "group": "Class 1" },
        { "provider": "json", "path": "responses/class2", "group": "Class 2" },
        { "provider": "xlsx", "path": "forms/class3.xlsx", "group": "Class 3" }
    ],
    "view": {
        "maxRank": 5,
        "groups": ["Class 1", "Class 2"],
        "includeNonRespondents": false
    }
}
```

Paths are resolved relative to the configuration file. Every `view`
field can be overridden on the command line (`--max-rank`, `--groups`,
`--students`, `--include-non-respondents`).

## The view model

Every invocation rebuilds the graph from scratch from the full dataset
and the current filters; no mutuality or popularity result is carried
over between runs. The filters are:

* the **allow-list** — the set of students to display. By default all
  respondents of the active groups; `--students`, or a named selection
  loaded with `--selection-file`/`--selection`, restrict it.
* the **rank threshold** (`--max-rank`) — only preferences with rank at
  or below the threshold are drawn. At `1` only first choices remain.
* the **target policy** — by default an edge is only drawn when its
  target is allow-listed. With `--include-non-respondents` every
  referenced target is drawn, added as a non-respondent node when it
  has no survey of its own.

Two students are a *mutual pair* when each ranks the other within the
active threshold; mutual edges are drawn solid and the pair is counted
once. A student's *popularity* is the in-degree within the visible
graph.

## Named selections

A selections file is a JSON object mapping a selection name to a sorted
list of identity keys:

```text
{
    "tutoring group": ["ANA LÓPEZ", "BEA RUIZ", "DORA GIL"]
}
```

`--save-selection NAME` stores the active allow-list under `NAME`
(merging with the file); `--selection NAME` loads it back. A loaded
selection behaves exactly like a hand-written `--students` list.

*/
