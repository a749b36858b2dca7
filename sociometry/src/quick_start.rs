/*!

# Quick start with Google Forms

This example runs a classroom survey end to end, using an online form to
collect the answers. It uses Google Forms because it is free and
ubiquitous; Microsoft Forms exports load the same way.

**Creating the survey** Create a form with one **Multiple Choice Grid**
question: the rows are the ranking choices (`1`, `2`, `3`, ...), the
columns are the classmates' names. Ask each student to pick, in order,
who they would like to work with.

**Collecting the results** When the survey is closed, open `Responses`
and use `Create spreadsheet`, then download the sheet in the **Excel
format** (xlsx). Each row holds one student's ranked choices.

Run `sociograph` against the export:

```bash
sociograph -i 'class survey.xlsx' --input-type xlsx --group 'Class 1' --out stdout
```

The program prints a JSON summary of the preference graph: one node per
student sized and colored by how often they were chosen, one edge per
ranked preference, solid red edges for mutual choices, and a metrics
block with the visible student, connection and mutual-pair counts.

Narrow the view to the strongest ties only:

```bash
sociograph -i 'class survey.xlsx' --input-type xlsx --group 'Class 1' --max-rank 2
```

At `--max-rank 2` only first and second choices are drawn, and a pair is
mutual only when both students rank each other within those two places.

**Keeping a working set** Once a subset of students is worth revisiting,
save it under a name and reload it later:

```bash
sociograph -i 'class survey.xlsx' --input-type xlsx --group 'Class 1' \
  --students 'Ana López,Bea Ruiz,Dora Gil' \
  --selection-file selections.json --save-selection 'tutoring group'

sociograph -i 'class survey.xlsx' --input-type xlsx --group 'Class 1' \
  --selection-file selections.json --selection 'tutoring group'
```

For multi-cohort datasets and per-file survey archives, write a
configuration file instead; see the [manual](../manual/index.html).

*/
