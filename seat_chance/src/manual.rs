/*!

This is the long-form manual for `seat_chance` and `seatchance`.

## How a chance is decided

For each student and each admission option, the program compares one rank of
the student with the closing ranks (cutoffs) published for that option:

* IIT options use the JEE Advanced rank. NIT, IIIT and GFTI options use the
  JEE Main rank. Any other institute type is not part of the allocation and is
  skipped entirely: it produces no output row.
* Students of the open category (`OC`) are compared using their common rank
  list (CRL) rank. Students of a reserved category (`EWS`, `OBC`, `SC`, `ST`)
  use their category rank.
* The cutoff columns a student may use depend on the category and gender:

| student         | columns, in order                              |
|-----------------|------------------------------------------------|
| OC, male        | `OC_GEN`                                       |
| OC, female      | `OC_FEM`, `OC_GEN`                             |
| SC, male        | `SC_GEN`, `OC_GEN`                             |
| SC, female      | `SC_FEM`, `SC_GEN`, `OC_GEN`, `OC_FEM`         |

  The other reserved categories follow the SC pattern. Columns missing from the
  master sheet are dropped. An unknown category has no column at all.
* The reference cutoff is the lowest of the published values among these
  columns. The chance is `LIKELY` if the rank is at most this value (a tie is
  `LIKELY`), and `UNLIKELY` otherwise.
* If the rank is missing, the chance is `RANK_MISSING`. If no eligible column
  has a value for this option, the chance is `NO_CUTOFF_DATA`.

## Input formats

Both CSV and Excel (.xlsx) files are supported. The format is picked from the
file extension unless the `provider` field of the configuration says
otherwise. For Excel files, the worksheet is chosen with
`excelWorksheetName`; a workbook with a single worksheet does not need it.

Column headers are matched after normalization: surrounding spaces are
removed, the text is upper-cased, and inner spaces become underscores. `College
Code`, `college code` and `COLLEGE_CODE` are the same column.

### Master table

Required columns: `COLLEGE_CODE`, `COURSE_CODE`, `TYPE`. The cutoff columns
`OC_FEM`, `OC_GEN`, `EWS_FEM`, `EWS_GEN`, `OBC_FEM`, `OBC_GEN`, `SC_FEM`,
`SC_GEN`, `ST_FEM`, `ST_GEN` are all optional. Every other column is kept; the
`PROGRAM` column gives the program name in the reports.

```text
COLLEGE_CODE,COURSE_CODE,TYPE,PROGRAM,OC_GEN,OC_FEM,SC_GEN,SC_FEM
101,4110,IIT,Computer Science,300,900,2100,2500
202,4110,NIT,Computer Science,1500,,9000,
```

An option is identified by its college and course codes. If the same pair
appears several times, a warning is printed and all the rows are kept.

### Student batch

Required columns (the spellings are the ones of the published template):

```text
NAME,STUDENT_ID,GENDER,CATEGORY,JEE_ADVACED_CRL_RANK,JEE_ADVNCED_CATEGORY_RANK,JEE_MAIN_CRL_RANK,JEE_MAIN_CATEGORY_RANK
Asha,S1,FEM,SC,,500,,900
```

`GENDER` is `FEM` for the female pool; any other value is the gender-neutral
pool. Ranks that are blank or not positive whole numbers are treated as
missing.

### Choice list

A single student's filled choice list, as exported by the counselling portal.
The college code, course code and choice number columns are required. The
portal leaves the code headers blank, which is accepted:

```text
,Institute,,Program,Choice No.
101,IIT Somewhere,4110,Computer Science,1
```

In this mode the student profile (category, gender, ranks) comes from the
configuration file or from the command line.

## Configuration

```json
{
  "masterFile": { "filePath": "master.xlsx", "excelWorksheetName": "2024" },
  "studentFile": { "filePath": "students.csv" },
  "mode": "batch",
  "outputSettings": {
    "outputFile": "results.csv",
    "unmatchedFile": "unmatched.csv",
    "validationFile": "validation.csv"
  }
}
```

Paths are relative to the configuration file. All the fields can be
overridden from the command line.

For the `choices` mode, add a `student` object:

```json
"student": {
  "studentId": "S1", "name": "Asha", "category": "SC", "gender": "FEM",
  "advancedCrlRank": null, "advancedCategoryRank": 500,
  "mainsCrlRank": null, "mainsCategoryRank": 900
}
```

## Output

One CSV row per evaluated pair, with the columns `Student_ID`, `Student_Name`,
`Student_Category`, `Student_Gender`, `College_Type`, `College_Code`,
`Program_Name`, `Course_Code`, `Student_Rank_Used`, `Rank_Type`,
`Best_Eligible_Cutoff`, `Considered_Cutoffs_for_Option`, `Seat_Chance`. The
choice mode adds a leading `Choice_Number` column. Missing values are written
as `N/A`.

 */
