use crate::optpr::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    pub first_vote_row_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "blankLabel")]
    pub blank_label: Option<String>,
}

impl FileSource {
    /// A CSV source with a header row and one score column per candidate.
    pub fn simple_csv(path: &str, blank_label: Option<String>) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: path.to_string(),
            first_vote_column_index: None,
            first_vote_row_index: Some(json!(2)),
            count_column_index: None,
            id_column_index: None,
            blank_label,
        }
    }

    /// 0-based index of the first score column. Defaults to the first column.
    pub fn first_vote_column_index(&self) -> OptprResult<usize> {
        let x = read_js_int_or(&self.first_vote_column_index, 1)?;
        ensure_whatever!(x >= 1, "firstVoteColumnIndex starts at 1, got {}", x);
        Ok(x - 1)
    }

    /// 1-based index of the first row holding a ballot. Defaults to the first row.
    pub fn first_vote_row_index(&self) -> OptprResult<usize> {
        let x = read_js_int_or(&self.first_vote_row_index, 1)?;
        ensure_whatever!(x >= 1, "firstVoteRowIndex starts at 1, got {}", x);
        Ok(x)
    }

    /// 0-based index of the column holding the number of identical ballots, if any.
    pub fn count_column_index(&self) -> OptprResult<Option<usize>> {
        read_js_index(&self.count_column_index)
    }

    pub fn id_column_index(&self) -> OptprResult<Option<usize>> {
        read_js_index(&self.id_column_index)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionCandidate {
    pub name: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRules {
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: JSValue,
    #[serde(rename = "qualityRule")]
    pub quality_rule: Option<String>,
    #[serde(rename = "searchMode")]
    pub search_mode: Option<String>,
    #[serde(rename = "topScore")]
    pub top_score: Option<JSValue>,
    pub delta: Option<JSValue>,
    #[serde(rename = "rulesDescription")]
    pub rules_description: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "scoreFileSources")]
    pub score_file_sources: Vec<FileSource>,
    #[serde(default)]
    pub candidates: Vec<ElectionCandidate>,
    pub rules: ElectionRules,
}

pub fn read_config(path: &str) -> OptprResult<ElectionConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: String) -> OptprResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub(crate) fn read_js_int(x: &Option<JSValue>) -> OptprResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

pub(crate) fn read_js_float(x: &Option<JSValue>) -> OptprResult<f64> {
    match x {
        Some(JSValue::Number(n)) => n.as_f64().context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<f64>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

fn read_js_int_or(x: &Option<JSValue>, default: usize) -> OptprResult<usize> {
    match x {
        None | Some(JSValue::Null) => Ok(default),
        _ => read_js_int(x),
    }
}

fn read_js_index(x: &Option<JSValue>) -> OptprResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        _ => {
            let idx = read_js_int(x)?;
            ensure_whatever!(idx >= 1, "column indices start at 1, got {}", idx);
            Ok(Some(idx - 1))
        }
    }
}
