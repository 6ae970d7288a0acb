/*!

This is the long-form manual for `psi_voting` and `optpr`.

## The quality rule

Each ballot scores each candidate. For a candidate winner set, a ballot's total is the sum
of the scores it gave to the winners. The ballot then contributes `F(total)` to the quality
of the winner set, where `F` grows slower and slower: a voter whose favourites are already
elected gains less from one more of them than a voter with no elected favourite. The
winner set of maximum total quality is elected.

Two choices of `F` are available:
* `fsimmons`: `F(x) = [psi(x + 1/2) - psi(1/2)] / 2` with `psi` the digamma function, `x`
  being the total divided by the top score. `F(0) = 0`, `F(1) = 1`, `F(2) = 4/3`,
  `F(3) = 23/15`, and `F(x + 1) = F(x) + 1/(2x + 1)`.
* `harmonic`: `F(n) = 1 + 1/2 + ... + 1/n`. With approval ballots (top score 1) this is
  proportional approval voting.

## Search modes

### `table`

Integer scores, evaluated through a table of `F` for every total below 512. This is the fast
mode, but it requires `winners * top score < 512` and a score from every ballot for every
candidate.

### `offset`

Real scores in `[0, 1]`. Each ballot total starts at a positive offset `delta` (0.5 by
default) and is evaluated with the fast digamma approximation. A blank score is replaced
by the candidate's average score, which leaves that average unchanged.

## Configuration

The `--config` flag of `optpr` accepts a JSON file:

```json
{
  "outputSettings": { "contestName": "Council", "contestDate": "2015-11-01" },
  "scoreFileSources": [
    { "provider": "csv", "filePath": "scores.csv", "firstVoteRowIndex": 2, "blankLabel": "-" }
  ],
  "candidates": [ { "name": "A" }, { "name": "B" }, { "name": "C" } ],
  "rules": {
    "numberOfWinners": 2,
    "qualityRule": "fsimmons",
    "searchMode": "table",
    "topScore": 9
  }
}
```

The CSV file has one column per candidate, in the order of `candidates`, and one row per
ballot. Empty cells (or cells equal to `blankLabel`) are blanks. If `candidates` is missing,
the names are read from the first row of the first file.

Row and column indices start at 1. The optional source fields are:
* `firstVoteRowIndex`: the first row holding a ballot (default 1)
* `firstVoteColumnIndex`: the column of the first candidate (default 1)
* `countColumnIndex`: a column holding the number of identical ballots of the row
* `idColumnIndex`: a column holding the ballot identifier, used in error messages

The count and identifier columns are skipped when reading scores.

When the table mode finds blanks, `optpr` logs a warning and runs the offset mode instead.
With `--no-fallback`, the summary has no winner and a quality of 0, but still reports the
statistics of each candidate.

*/
