// Primitives for reading CSV score files.

use std::fs::File;

use crate::optpr::{io_common::simplify_file_name, *};

/// Reads one ballot per row, starting at `firstVoteRowIndex`.
pub fn read_csv_scores(path: String, cfs: &FileSource) -> OptprResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(&path);

    let id_idx_o = cfs.id_column_index()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(&path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_scores: lineno: {:?} row: {:?}", lineno, line);
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: u32 = if let Some(count_idx) = count_idx_o {
            let cell = line
                .get(count_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .trim();
            cell.parse::<u32>().ok().context(InvalidCountSnafu {
                lineno,
                value: cell.to_string(),
            })?
        } else {
            1
        };

        let scores: Vec<String> = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != count_idx_o && Some(*col) != id_idx_o)
            .map(|(_, s)| s.trim().to_string())
            .collect();

        res.push(ParsedBallot {
            id,
            lineno,
            count,
            scores,
        });
    }
    Ok(res)
}

/// The candidate names in the first row of the file, from `firstVoteColumnIndex` on.
pub fn read_csv_header(path: &str, cfs: &FileSource) -> OptprResult<Vec<String>> {
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index()?;
    let id_idx_o = cfs.id_column_index()?;
    let mut records = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?
        .into_records();
    let header = records
        .next()
        .context(CsvLineTooShortSnafu { lineno: 1usize })?
        .context(CsvLineParseSnafu {})?;
    Ok(header
        .iter()
        .enumerate()
        .skip(choices_start_col)
        .filter(|(col, _)| Some(*col) != count_idx_o && Some(*col) != id_idx_o)
        .map(|(_, s)| s.trim().to_string())
        .collect())
}

fn get_records(
    path: &String,
    cfs: &FileSource,
) -> OptprResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the spreadsheet world
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

fn make_default_id(path: &String) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path.as_str());
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}
